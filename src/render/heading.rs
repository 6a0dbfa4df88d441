//! Headings without literal `#` markers.

use crate::theme::MarkdownTheme;

/// Render one heading line plus a trailing blank line unless the next
/// token already provides the spacing.
///
/// With `strip_prefixes` on, depth 1 is bold and underlined, depth 2 bold,
/// and deeper headings are bold with two spaces of indent per level past 3.
/// With it off, depths 3 and up keep their `#` marker.
pub fn render_heading(
    theme: &MarkdownTheme,
    depth: u8,
    text: &str,
    strip_prefixes: bool,
    space_after: bool,
) -> Vec<String> {
    let styled = match depth {
        0 | 1 => (theme.heading)(&(theme.bold)(&(theme.underline)(text))),
        2 => (theme.heading)(&(theme.bold)(text)),
        _ if strip_prefixes => {
            let indent = " ".repeat(2 * usize::from(depth - 3));
            format!("{indent}{}", (theme.heading)(&(theme.bold)(text)))
        }
        _ => {
            let prefix = "#".repeat(usize::from(depth));
            (theme.heading)(&(theme.bold)(&format!("{prefix} {text}")))
        }
    };
    let mut lines = vec![styled];
    if !space_after {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::strip_ansi;

    fn marked_theme() -> MarkdownTheme {
        let mut theme = MarkdownTheme::plain();
        theme.bold = Box::new(|text| format!("<b>{text}</b>"));
        theme.underline = Box::new(|text| format!("<u>{text}</u>"));
        theme.heading = Box::new(|text| format!("<h>{text}</h>"));
        theme
    }

    #[test]
    fn test_depth_one_is_bold_underlined() {
        let lines = render_heading(&marked_theme(), 1, "Title", true, false);
        assert_eq!(lines, vec!["<h><b><u>Title</u></b></h>", ""]);
    }

    #[test]
    fn test_depth_two_is_bold() {
        let lines = render_heading(&marked_theme(), 2, "Sub", true, true);
        assert_eq!(lines, vec!["<h><b>Sub</b></h>"]);
    }

    #[test]
    fn test_deep_headings_indent_without_hash() {
        let theme = MarkdownTheme::plain();
        let mut previous_indent = None;
        for depth in 3..=6 {
            let lines = render_heading(&theme, depth, "Deep", true, true);
            assert!(!lines[0].contains('#'));
            let indent = lines[0].len() - lines[0].trim_start().len();
            assert_eq!(indent, 2 * usize::from(depth - 3));
            if let Some(previous) = previous_indent {
                assert!(indent > previous);
            }
            previous_indent = Some(indent);
        }
    }

    #[test]
    fn test_unstripped_deep_heading_keeps_hashes() {
        let lines = render_heading(&MarkdownTheme::plain(), 4, "Deep", false, false);
        assert_eq!(lines, vec!["#### Deep", ""]);
    }

    #[test]
    fn test_shallow_headings_never_have_hash() {
        let theme = MarkdownTheme::ansi();
        for strip in [true, false] {
            for depth in 1..=2 {
                let lines = render_heading(&theme, depth, "Head", strip, true);
                assert!(!strip_ansi(&lines[0]).starts_with('#'));
            }
        }
    }
}
