//! One-shot rendering for non-interactive output.

use std::borrow::Cow;

use crate::config::Options;
use crate::perf;
use crate::text::{is_visibly_blank, trim_trailing_whitespace};
use crate::theme::MarkdownTheme;

use super::adapter::{CodePatch, ThemeAdapter};
use super::block::BlockRenderer;
use super::fence::unwrap_outer_fence;

/// Render a complete message to one string.
///
/// Code fences are always hidden. Each line loses its trailing spaces and
/// tabs, and trailing lines with no visible text are dropped.
pub fn render_print(
    markdown: &str,
    width: usize,
    theme: &MarkdownTheme,
    options: &Options,
) -> String {
    let _scope = perf::scope("render.print");
    let patch = CodePatch::from_options(options).with_fences_hidden();
    let text = if options.unwrap_outer_fence {
        unwrap_outer_fence(markdown)
    } else {
        Cow::Borrowed(markdown)
    };

    let renderer = BlockRenderer::new(ThemeAdapter::new(theme, &patch), options);
    let mut lines: Vec<String> = renderer
        .render_document(&text, width, 0, 0)
        .iter()
        .map(|line| trim_trailing_whitespace(line))
        .collect();
    while lines.last().is_some_and(|line| is_visibly_blank(line)) {
        lines.pop();
    }
    lines.join("\n")
}
