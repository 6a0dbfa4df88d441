//! Code-block presentation layered over a base theme.
//!
//! [`ThemeAdapter`] borrows the base [`MarkdownTheme`] and a [`CodePatch`]
//! and wraps four of its slots: code body, fence border, highlighter and
//! indent. The base theme is never modified, so re-deriving the patch for a
//! new revision cannot stack wrappers.

use crate::config::Options;
use crate::text::RESET;
use crate::theme::MarkdownTheme;

const FENCE: &str = "```";
const SHORT_RESET: &str = "\x1b[m";
const BACKGROUND_RESET: &str = "\x1b[49m";

/// Per-revision code-block settings derived from [`Options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePatch {
    pub hide_fences: bool,
    pub show_label: bool,
    /// Raw SGR background introducer.
    pub background: Option<String>,
    pub indent: String,
}

impl CodePatch {
    pub fn from_options(options: &Options) -> Self {
        Self {
            hide_fences: options.hide_code_fences,
            show_label: options.show_language_label,
            background: options.code_background_ansi().map(ToString::to_string),
            indent: options.code_indent(),
        }
    }

    #[must_use]
    pub const fn with_fences_hidden(mut self) -> Self {
        self.hide_fences = true;
        self
    }

    fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }
}

/// Put `background` under `text`, keeping it alive across embedded resets.
///
/// The introducer is prefixed, re-emitted after every full reset and
/// substituted for every background reset. Applying twice gives the same
/// string as applying once.
pub fn apply_background(text: &str, background: Option<&str>) -> String {
    let Some(bg) = background.filter(|bg| !bg.is_empty()) else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len() + bg.len() * 2);
    if !text.starts_with(bg) {
        out.push_str(bg);
    }
    let mut rest = text;
    while let Some(idx) = rest.find("\x1b[") {
        let (before, tail) = rest.split_at(idx);
        out.push_str(before);
        if let Some(after) = tail.strip_prefix(BACKGROUND_RESET) {
            if !after.starts_with(bg) {
                out.push_str(bg);
            }
            rest = after;
        } else if let Some(after) = tail
            .strip_prefix(RESET)
            .or_else(|| tail.strip_prefix(SHORT_RESET))
        {
            out.push_str(&tail[..tail.len() - after.len()]);
            if !after.starts_with(bg) {
                out.push_str(bg);
            }
            rest = after;
        } else {
            out.push_str("\x1b[");
            rest = &tail[2..];
        }
    }
    out.push_str(rest);
    out
}

/// The base theme seen through a [`CodePatch`].
#[derive(Debug, Clone, Copy)]
pub struct ThemeAdapter<'a> {
    base: &'a MarkdownTheme,
    patch: &'a CodePatch,
}

impl<'a> ThemeAdapter<'a> {
    pub const fn new(base: &'a MarkdownTheme, patch: &'a CodePatch) -> Self {
        Self { base, patch }
    }

    /// Unwrapped slots (headings, links, quotes, ...).
    pub const fn base(&self) -> &'a MarkdownTheme {
        self.base
    }

    pub const fn patch(&self) -> &'a CodePatch {
        self.patch
    }

    /// The patch background, unless the base theme paints none.
    fn background(&self) -> Option<&'a str> {
        self.patch.background().filter(|_| self.base.backgrounds)
    }

    pub fn code_block(&self, text: &str) -> String {
        apply_background(&(self.base.code_block)(text), self.background())
    }

    /// Highlighted lines with the background applied; `None` when the base
    /// theme has no highlighter.
    pub fn highlight_code(&self, code: &str, lang: Option<&str>) -> Option<Vec<String>> {
        let highlighter = self.base.highlight_code.as_ref()?;
        Some(
            highlighter(code, lang)
                .iter()
                .map(|line| apply_background(line, self.background()))
                .collect(),
        )
    }

    /// Border line for a fence. With fences hidden, a closing fence (or an
    /// unlabelled opening one) collapses to the bare background introducer
    /// or to nothing.
    pub fn code_block_border(&self, line: &str) -> String {
        let background = self.background();
        let Some(info) = line.strip_prefix(FENCE).filter(|_| self.patch.hide_fences) else {
            return apply_background(&(self.base.code_block_border)(line), background);
        };
        let lang = info.trim();
        if lang.is_empty() || !self.patch.show_label {
            return background.unwrap_or_default().to_string();
        }
        let label = (self.base.code_block_border)(&format!("‹{lang}›"));
        apply_background(&format!("{}{label}", self.patch.indent), background)
    }

    /// Indent for code body lines, carrying the background when one is set.
    pub fn code_block_indent(&self) -> String {
        match self.background() {
            Some(bg) => format!("{bg}{}", self.patch.indent),
            None => self.patch.indent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: &str = "\x1b[48;5;236m";

    fn patch(hide_fences: bool, show_label: bool, background: Option<&str>) -> CodePatch {
        CodePatch {
            hide_fences,
            show_label,
            background: background.map(ToString::to_string),
            indent: "  ".to_string(),
        }
    }

    fn bracketed_theme() -> MarkdownTheme {
        let mut theme = MarkdownTheme::plain();
        theme.code_block_border = Box::new(|text| format!("[{text}]"));
        theme.code_block = Box::new(|text| format!("\x1b[33m{text}\x1b[0m"));
        theme.backgrounds = true;
        theme
    }

    #[test]
    fn test_apply_background_without_background_is_noop() {
        assert_eq!(apply_background("a\x1b[0mb", None), "a\x1b[0mb");
        assert_eq!(apply_background("a", Some("")), "a");
    }

    #[test]
    fn test_apply_background_survives_resets() {
        let out = apply_background("\x1b[31ma\x1b[0mb\x1b[mc\x1b[49md", Some(BG));
        assert_eq!(
            out,
            format!("{BG}\x1b[31ma\x1b[0m{BG}b\x1b[m{BG}c{BG}d")
        );
    }

    #[test]
    fn test_apply_background_keeps_other_escapes() {
        let out = apply_background("\x1b[1mbold\x1b[22m", Some(BG));
        assert_eq!(out, format!("{BG}\x1b[1mbold\x1b[22m"));
    }

    #[test]
    fn test_apply_background_on_empty_text() {
        assert_eq!(apply_background("", Some(BG)), BG);
    }

    #[test]
    fn test_border_passes_through_when_fences_shown() {
        let theme = bracketed_theme();
        let patch = patch(false, true, None);
        let adapter = ThemeAdapter::new(&theme, &patch);
        assert_eq!(adapter.code_block_border("```rust"), "[```rust]");
        assert_eq!(adapter.code_block_border("```"), "[```]");
    }

    #[test]
    fn test_border_non_fence_line_gets_background() {
        let theme = bracketed_theme();
        let patch = patch(true, true, Some(BG));
        let adapter = ThemeAdapter::new(&theme, &patch);
        assert_eq!(adapter.code_block_border("~~~"), format!("{BG}[~~~]"));
    }

    #[test]
    fn test_closing_fence_collapses() {
        let theme = bracketed_theme();
        let plain = patch(true, true, None);
        assert_eq!(ThemeAdapter::new(&theme, &plain).code_block_border("```"), "");
        let colored = patch(true, true, Some(BG));
        assert_eq!(
            ThemeAdapter::new(&theme, &colored).code_block_border("```"),
            BG
        );
    }

    #[test]
    fn test_opening_fence_label() {
        let theme = bracketed_theme();
        let labelled = patch(true, true, Some(BG));
        assert_eq!(
            ThemeAdapter::new(&theme, &labelled).code_block_border("```ts"),
            format!("{BG}  [‹ts›]")
        );
        let unlabelled = patch(true, false, Some(BG));
        assert_eq!(
            ThemeAdapter::new(&theme, &unlabelled).code_block_border("```ts"),
            BG
        );
    }

    #[test]
    fn test_code_block_and_indent_carry_background() {
        let theme = bracketed_theme();
        let patch = patch(true, true, Some(BG));
        let adapter = ThemeAdapter::new(&theme, &patch);
        assert_eq!(
            adapter.code_block("x"),
            format!("{BG}\x1b[33mx\x1b[0m{BG}")
        );
        assert_eq!(adapter.code_block_indent(), format!("{BG}  "));
    }

    #[test]
    fn test_highlight_code_is_optional() {
        let theme = MarkdownTheme::plain();
        let patch = patch(true, true, Some(BG));
        assert!(ThemeAdapter::new(&theme, &patch).highlight_code("x", None).is_none());

        let mut theme = MarkdownTheme::plain();
        theme.highlight_code = Some(Box::new(|code, _| {
            code.split('\n').map(|l| format!("{l}\x1b[0m")).collect()
        }));
        theme.backgrounds = true;
        let lines = ThemeAdapter::new(&theme, &patch)
            .highlight_code("a\nb", Some("ts"))
            .unwrap();
        assert_eq!(lines, vec![format!("{BG}a\x1b[0m{BG}"), format!("{BG}b\x1b[0m{BG}")]);
    }

    #[test]
    fn test_plain_theme_ignores_background() {
        let theme = MarkdownTheme::plain();
        let patch = patch(true, true, Some(BG));
        let adapter = ThemeAdapter::new(&theme, &patch);
        assert_eq!(adapter.code_block("x"), "x");
        assert_eq!(adapter.code_block_border("```"), "");
        assert_eq!(adapter.code_block_border("```ts"), "  ‹ts›");
        assert_eq!(adapter.code_block_indent(), "  ");
    }

    #[test]
    fn test_from_options() {
        let options = Options::default().with_code_indent(4);
        let patch = CodePatch::from_options(&options);
        assert!(patch.hide_fences);
        assert!(patch.show_label);
        assert_eq!(patch.background, None);
        assert_eq!(patch.indent, "    ");

        let mut options = Options::default();
        options.hide_code_fences = false;
        assert!(CodePatch::from_options(&options).with_fences_hidden().hide_fences);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn styled_line() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    Just("a".to_string()),
                    Just(" ".to_string()),
                    Just("\x1b[0m".to_string()),
                    Just("\x1b[m".to_string()),
                    Just("\x1b[49m".to_string()),
                    Just("\x1b[1m".to_string()),
                    Just("\x1b[38;2;1;2;3m".to_string()),
                ],
                0..12,
            )
            .prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn apply_background_is_idempotent(line in styled_line()) {
                let once = apply_background(&line, Some(BG));
                let twice = apply_background(&once, Some(BG));
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn background_follows_every_reset(line in styled_line()) {
                let out = apply_background(&line, Some(BG));
                prop_assert!(out.starts_with(BG));
                for reset in ["\x1b[0m", "\x1b[m"] {
                    for (idx, _) in out.match_indices(reset) {
                        prop_assert!(out[idx + reset.len()..].starts_with(BG));
                    }
                }
                prop_assert!(!out.contains("\x1b[49m"));
            }
        }
    }
}
