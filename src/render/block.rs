//! Token-to-line rendering.
//!
//! [`BlockRenderer`] turns the token stream into styled lines, one block at a
//! time, then [`BlockRenderer::render_document`] wraps every line to the
//! content width, adds margins and pads to the full width.

use crate::config::Options;
use crate::document::{Inline, Token, tokenize};
use crate::perf;
use crate::text::{RESET, has_open_style, pad_to_width, wrap_text_with_ansi};

use super::adapter::ThemeAdapter;
use super::{heading, list, table};

const QUOTE_BORDER: &str = "│ ";
const MAX_RULE_WIDTH: usize = 80;

/// Renders tokens through a patched theme under one set of [`Options`].
#[derive(Debug, Clone, Copy)]
pub struct BlockRenderer<'a> {
    theme: ThemeAdapter<'a>,
    options: &'a Options,
}

impl<'a> BlockRenderer<'a> {
    pub const fn new(theme: ThemeAdapter<'a>, options: &'a Options) -> Self {
        Self { theme, options }
    }

    pub const fn theme(&self) -> ThemeAdapter<'a> {
        self.theme
    }

    pub const fn options(&self) -> &'a Options {
        self.options
    }

    /// Parse `text` and render it to exactly `width` columns per line.
    ///
    /// Whitespace-only input renders to no lines at all.
    pub fn render_document(
        &self,
        text: &str,
        width: usize,
        padding_x: usize,
        padding_y: usize,
    ) -> Vec<String> {
        let _scope = perf::scope("render.document");
        if text.trim().is_empty() {
            return Vec::new();
        }

        let content_width = width.saturating_sub(padding_x * 2).max(1);
        let normalized = text.replace('\t', "   ");
        let tokens = tokenize(&normalized);
        let rendered = self.render_tokens(&tokens, content_width);

        let margin = " ".repeat(padding_x);
        let empty_line = " ".repeat(width);
        let mut lines = Vec::with_capacity(rendered.len() + padding_y * 2);
        lines.extend(std::iter::repeat_n(empty_line.clone(), padding_y));
        for line in rendered {
            for wrapped in wrap_text_with_ansi(&line, content_width) {
                let mut padded = pad_to_width(&format!("{margin}{wrapped}{margin}"), width);
                if has_open_style(&padded) {
                    padded.push_str(RESET);
                }
                lines.push(padded);
            }
        }
        lines.extend(std::iter::repeat_n(empty_line, padding_y));
        lines
    }

    /// Render a token sequence, each block seeing its successor.
    pub fn render_tokens(&self, tokens: &[Token], width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            lines.extend(self.render_block(token, width, tokens.get(idx + 1)));
        }
        lines
    }

    /// Render one block. `next` decides the trailing blank line: a following
    /// [`Token::Space`] already provides it.
    pub fn render_block(&self, token: &Token, width: usize, next: Option<&Token>) -> Vec<String> {
        let space_after = next.is_some_and(Token::is_space);
        match token {
            Token::Heading { depth, children } => heading::render_heading(
                self.theme.base(),
                *depth,
                &self.render_inline(children),
                self.options.strip_heading_prefixes,
                space_after,
            ),
            Token::Paragraph { children } => {
                let mut lines = split_lines(&self.render_inline(children));
                if next.is_some_and(|next| !next.is_list() && !next.is_space()) {
                    lines.push(String::new());
                }
                lines
            }
            Token::List(list) => list::render_list(self, list, 0, width),
            Token::CodeBlock { lang, body } => {
                self.render_code_block(lang.as_deref(), body, !space_after)
            }
            Token::Table(table) => table::render_table(table, width, self.theme.base()),
            Token::Blockquote { children } => {
                let mut lines = self.render_blockquote(children, width);
                if !space_after {
                    lines.push(String::new());
                }
                lines
            }
            Token::ThematicBreak => {
                let rule = "─".repeat(width.min(MAX_RULE_WIDTH));
                let mut lines = vec![(self.theme.base().hr)(&rule)];
                if !space_after {
                    lines.push(String::new());
                }
                lines
            }
            Token::Text { raw, children } => {
                if children.is_empty() {
                    split_lines(raw)
                } else {
                    split_lines(&self.render_inline(children))
                }
            }
            Token::Html { raw } => split_lines(raw.trim()),
            Token::Space => vec![String::new()],
        }
    }

    /// Fence border, body and closing border of a code block.
    pub fn render_code_block(
        &self,
        lang: Option<&str>,
        body: &str,
        trailing_blank: bool,
    ) -> Vec<String> {
        let _scope = perf::scope("render.code_block");
        let mut lines = vec![
            self.theme
                .code_block_border(&format!("```{}", lang.unwrap_or_default())),
        ];
        let indent = self.theme.code_block_indent();
        match self.theme.highlight_code(body, lang) {
            Some(highlighted) => {
                lines.extend(highlighted.iter().map(|line| format!("{indent}{line}")));
            }
            None => lines.extend(
                body.split('\n')
                    .map(|line| format!("{indent}{}", self.theme.code_block(line))),
            ),
        }
        lines.push(self.theme.code_block_border("```"));
        if trailing_blank {
            lines.push(String::new());
        }
        lines
    }

    fn render_blockquote(&self, children: &[Token], width: usize) -> Vec<String> {
        let base = self.theme.base();
        let inner_width = width.saturating_sub(2).max(1);
        let mut body = Vec::new();
        for (idx, child) in children.iter().enumerate() {
            match child {
                Token::Paragraph { children } | Token::Text { children, .. }
                    if !children.is_empty() =>
                {
                    let text = self.render_inline(children);
                    body.extend(
                        text.split('\n')
                            .map(|line| (base.quote)(&(base.italic)(line))),
                    );
                }
                Token::Text { raw, .. } => {
                    body.extend(raw.split('\n').map(|line| (base.quote)(&(base.italic)(line))));
                }
                _ => body.extend(self.render_block(child, inner_width, children.get(idx + 1))),
            }
        }
        while body.last().is_some_and(String::is_empty) {
            body.pop();
        }

        let border = (base.quote_border)(QUOTE_BORDER);
        body.iter()
            .flat_map(|line| wrap_text_with_ansi(line, inner_width))
            .map(|line| format!("{border}{line}"))
            .collect()
    }

    /// Inline children to one styled string; hard breaks become `\n`.
    pub fn render_inline(&self, inlines: &[Inline]) -> String {
        let base = self.theme.base();
        let mut out = String::new();
        for inline in inlines {
            match inline {
                Inline::Text(text) => out.push_str(text),
                Inline::Strong(children) => out.push_str(&(base.bold)(&self.render_inline(children))),
                Inline::Emphasis(children) => {
                    out.push_str(&(base.italic)(&self.render_inline(children)));
                }
                Inline::Strikethrough(children) => {
                    out.push_str(&(base.strikethrough)(&self.render_inline(children)));
                }
                Inline::Code(code) => out.push_str(&(base.code)(code)),
                Inline::Link { url, children } => {
                    let text = self.render_inline(children);
                    out.push_str(&(base.link)(&(base.underline)(&text)));
                    let plain = Inline::plain_text(children);
                    let bare_url = url.strip_prefix("mailto:").unwrap_or(url);
                    if plain != *url && plain != bare_url {
                        out.push_str(&(base.link_url)(&format!(" ({url})")));
                    }
                }
                Inline::Image { alt, url } => {
                    out.push_str(if alt.is_empty() { url } else { alt });
                }
                Inline::Break => out.push('\n'),
            }
        }
        out
    }
}

pub(super) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(ToString::to_string).collect()
}
