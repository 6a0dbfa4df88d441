//! Base markdown theme.
//!
//! A theme is a set of pure style functions. The render pipeline wraps some
//! of them (see [`crate::render::adapter`]) but never replaces the slots, so
//! one theme can be shared by every message on screen.

mod palette;

pub use palette::{Palette, PaletteError};

use crossterm::style::{Color, Stylize};

use crate::highlight;

/// Style function: styled text in, styled text out.
pub type StyleFn = Box<dyn Fn(&str) -> String>;

/// Syntax highlighter: `(code, language)` to one styled string per line.
pub type HighlightFn = Box<dyn Fn(&str, Option<&str>) -> Vec<String>>;

/// The style slots the block renderer reads.
pub struct MarkdownTheme {
    pub heading: StyleFn,
    pub link: StyleFn,
    pub link_url: StyleFn,
    pub code: StyleFn,
    pub code_block: StyleFn,
    pub code_block_border: StyleFn,
    pub quote: StyleFn,
    pub quote_border: StyleFn,
    pub hr: StyleFn,
    pub list_bullet: StyleFn,
    pub bold: StyleFn,
    pub italic: StyleFn,
    pub strikethrough: StyleFn,
    pub underline: StyleFn,
    /// Optional capability; code bodies fall back to `code_block` without it.
    pub highlight_code: Option<HighlightFn>,
    /// Whether the configured code background is painted. Off for
    /// [`MarkdownTheme::plain`], which must stay escape-free.
    pub backgrounds: bool,
}

impl std::fmt::Debug for MarkdownTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownTheme")
            .field("highlight_code", &self.highlight_code.is_some())
            .field("backgrounds", &self.backgrounds)
            .finish_non_exhaustive()
    }
}

fn identity() -> StyleFn {
    Box::new(|text: &str| text.to_string())
}

fn fg(color: Color) -> StyleFn {
    Box::new(move |text| text.with(color).to_string())
}

impl MarkdownTheme {
    /// A theme that emits no escape sequences at all.
    pub fn plain() -> Self {
        Self {
            heading: identity(),
            link: identity(),
            link_url: identity(),
            code: identity(),
            code_block: identity(),
            code_block_border: identity(),
            quote: identity(),
            quote_border: identity(),
            hr: identity(),
            list_bullet: identity(),
            bold: identity(),
            italic: identity(),
            strikethrough: identity(),
            underline: identity(),
            highlight_code: None,
            backgrounds: false,
        }
    }

    /// The default ANSI theme, tuned for the detected terminal background.
    pub fn ansi() -> Self {
        let light = highlight::is_light_background();
        let accent = if light { Color::AnsiValue(24) } else { Color::Cyan };
        let muted = if light {
            Color::AnsiValue(241)
        } else {
            Color::AnsiValue(245)
        };
        let code_fg = if light {
            Color::AnsiValue(238)
        } else {
            Color::AnsiValue(250)
        };

        Self {
            heading: fg(accent),
            link: fg(if light { Color::AnsiValue(25) } else { Color::Blue }),
            link_url: fg(muted),
            code: fg(if light {
                Color::AnsiValue(130)
            } else {
                Color::Yellow
            }),
            code_block: fg(code_fg),
            code_block_border: fg(muted),
            quote: Box::new(move |text| text.with(muted).italic().to_string()),
            quote_border: fg(muted),
            hr: fg(muted),
            list_bullet: fg(accent),
            bold: Box::new(|text| text.bold().to_string()),
            italic: Box::new(|text| text.italic().to_string()),
            strikethrough: Box::new(|text| text.crossed_out().to_string()),
            underline: Box::new(|text| text.underlined().to_string()),
            highlight_code: Some(Box::new(move |code, language| {
                highlight::highlight_code(language, code).unwrap_or_else(|| {
                    code.split('\n')
                        .map(|line| line.with(code_fg).to_string())
                        .collect()
                })
            })),
            backgrounds: true,
        }
    }
}
