//! Lists, with list-item children rendered as full blocks.

use crate::document::{Inline, List, Token};

use super::block::{BlockRenderer, split_lines};

const MIN_ITEM_WIDTH: usize = 20;

/// One rendered line of a list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLine {
    pub text: String,
    /// Lines of a nested list carry their own indent and bullet.
    pub nested: bool,
}

impl ItemLine {
    fn own(text: String) -> Self {
        Self {
            text,
            nested: false,
        }
    }
}

/// Render `list` at nesting `depth`: two spaces of indent per level, the
/// bullet on the first line of each item and a two-space continuation
/// indent on the rest.
pub fn render_list(
    renderer: &BlockRenderer<'_>,
    list: &List,
    depth: usize,
    width: usize,
) -> Vec<String> {
    let base = renderer.theme().base();
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();

    for (idx, item) in list.items.iter().enumerate() {
        let bullet = match item.task {
            Some(true) => "✓ ".to_string(),
            Some(false) => "□ ".to_string(),
            None if list.ordered => format!("{}. ", list.start + idx),
            None => "- ".to_string(),
        };
        let bullet = (base.list_bullet)(&bullet);

        let item_lines = render_list_item(renderer, &item.children, depth, width);
        let Some((first, rest)) = item_lines.split_first() else {
            lines.push(format!("{indent}{bullet}"));
            continue;
        };

        if first.nested {
            lines.push(first.text.clone());
        } else {
            lines.push(format!("{indent}{bullet}{}", first.text));
        }
        for line in rest {
            if line.nested {
                lines.push(line.text.clone());
            } else {
                lines.push(format!("{indent}  {}", line.text));
            }
        }
    }

    lines
}

/// Render the children of one list item.
///
/// Block children go through the full block renderer at the item's width
/// (never below 20 columns), so tables, quotes, code and headings keep their
/// layout inside lists. With block rendering off, only inline content and
/// code survive.
pub fn render_list_item(
    renderer: &BlockRenderer<'_>,
    children: &[Token],
    depth: usize,
    width: usize,
) -> Vec<ItemLine> {
    if !renderer.options().block_list_items {
        return render_inline_item(renderer, children, depth, width);
    }

    let block_width = width.saturating_sub(2 * depth + 2).max(MIN_ITEM_WIDTH);
    let mut lines = Vec::new();
    for (idx, child) in children.iter().enumerate() {
        match child {
            Token::List(list) => lines.extend(nested(renderer, list, depth, width)),
            Token::Text { raw, children } if children.is_empty() => {
                lines.extend(split_lines(raw).into_iter().map(ItemLine::own));
            }
            Token::Text { children, .. } | Token::Paragraph { children } => {
                lines.extend(inline_lines(renderer, children));
            }
            _ => lines.extend(
                renderer
                    .render_block(child, block_width, children.get(idx + 1))
                    .into_iter()
                    .map(ItemLine::own),
            ),
        }
    }
    lines
}

fn render_inline_item(
    renderer: &BlockRenderer<'_>,
    children: &[Token],
    depth: usize,
    width: usize,
) -> Vec<ItemLine> {
    let mut lines = Vec::new();
    for child in children {
        match child {
            Token::List(list) => lines.extend(nested(renderer, list, depth, width)),
            Token::Text { raw, children } if children.is_empty() => {
                lines.extend(split_lines(raw).into_iter().map(ItemLine::own));
            }
            Token::Text { children, .. }
            | Token::Paragraph { children }
            | Token::Heading { children, .. } => {
                lines.extend(inline_lines(renderer, children));
            }
            Token::CodeBlock { lang, body } => lines.extend(
                renderer
                    .render_code_block(lang.as_deref(), body, false)
                    .into_iter()
                    .map(ItemLine::own),
            ),
            Token::Html { raw } => {
                lines.extend(split_lines(raw.trim()).into_iter().map(ItemLine::own));
            }
            Token::Blockquote { children } => {
                lines.extend(render_inline_item(renderer, children, depth, width));
            }
            Token::Table(table) => {
                for row in std::iter::once(&table.header).chain(table.rows.iter()) {
                    let cells: Vec<String> =
                        row.iter().map(|cell| Inline::plain_text(cell)).collect();
                    lines.push(ItemLine::own(cells.join(" ")));
                }
            }
            Token::ThematicBreak | Token::Space => {}
        }
    }
    lines
}

fn nested(
    renderer: &BlockRenderer<'_>,
    list: &List,
    depth: usize,
    width: usize,
) -> impl Iterator<Item = ItemLine> {
    render_list(renderer, list, depth + 1, width)
        .into_iter()
        .map(|text| ItemLine { text, nested: true })
}

fn inline_lines(renderer: &BlockRenderer<'_>, children: &[Inline]) -> impl Iterator<Item = ItemLine> {
    split_lines(&renderer.render_inline(children))
        .into_iter()
        .map(ItemLine::own)
}
