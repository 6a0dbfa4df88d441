//! Syntax highlighting for code blocks.
//!
//! Uses syntect with Sublime Text syntax definitions and emits 24-bit ANSI
//! foreground colors. Backgrounds are never set here; the code background
//! belongs to the render pipeline.

use std::fmt::Write as _;
use std::sync::{Mutex, OnceLock};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::text::RESET;

/// Highlight `code` as `language`, one ANSI string per source line.
///
/// Returns `None` when the language is missing or unknown so callers can
/// fall back to their own plain styling.
pub fn highlight_code(language: Option<&str>, code: &str) -> Option<Vec<String>> {
    let syntax_set = syntax_set();
    let language = language.map(str::trim).filter(|lang| !lang.is_empty())?;
    let syntax = syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))?;

    let _scope = crate::perf::scope("highlight.code_block");
    let mode = detected_background();
    let mut highlighter = HighlightLines::new(syntax, theme());
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let mut out = String::new();
        for (style, text) in ranges {
            let text = text.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }
            let fg = adjust_fg_for_background(
                (style.foreground.r, style.foreground.g, style.foreground.b),
                mode,
            );
            let _ = write!(out, "\x1b[38;2;{};{};{}m{text}", fg.0, fg.1, fg.2);
        }
        if !out.is_empty() {
            out.push_str(RESET);
        }
        lines.push(out);
    }
    // `LinesWithEndings` yields nothing for a trailing empty line.
    if code.is_empty() || code.ends_with('\n') {
        lines.push(String::new());
    }
    Some(lines)
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        let theme_set = ThemeSet::load_defaults();
        let preferred = match detected_background() {
            HighlightBackground::Dark => [
                "Monokai Extended",
                "base16-eighties.dark",
                "Solarized (dark)",
                "base16-ocean.dark",
            ]
            .as_slice(),
            HighlightBackground::Light => {
                ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice()
            }
        };

        for name in preferred {
            if let Some(theme) = theme_set.themes.get(*name) {
                return theme.clone();
            }
        }

        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: OnceLock<Mutex<Option<HighlightBackground>>> = OnceLock::new();

/// Force light or dark styling; `None` goes back to `COLORFGBG` detection.
pub fn set_background_mode(mode: Option<HighlightBackground>) {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(mut guard) = lock.lock() {
        *guard = mode;
    }
}

/// The forced background, else the one `COLORFGBG` suggests.
pub fn detected_background() -> HighlightBackground {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(guard) = lock.lock()
        && let Some(mode) = *guard
    {
        return mode;
    }
    background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

pub fn is_light_background() -> bool {
    detected_background() == HighlightBackground::Light
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> HighlightBackground {
    let Some(value) = colorfgbg else {
        return HighlightBackground::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return HighlightBackground::Dark;
    };

    if bg >= 7 {
        HighlightBackground::Light
    } else {
        HighlightBackground::Dark
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
fn adjust_fg_for_background((r, g, b): (u8, u8, u8), mode: HighlightBackground) -> (u8, u8, u8) {
    match mode {
        HighlightBackground::Dark => (r, g, b),
        HighlightBackground::Light => {
            let luma = 0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b);
            if luma < 155.0 {
                return (r, g, b);
            }
            let darken = |c: u8| (f32::from(c) * 0.42).round() as u8;
            (darken(r), darken(g), darken(b))
        }
    }
}
