//! Markdown tokenizing with comrak.

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};

use super::types::{Alignment, Inline, List, ListItem, Table, Token};

/// Tokenize markdown source into block tokens.
///
/// Blocks separated by at least one blank source line get a
/// [`Token::Space`] between them.
pub fn tokenize(source: &str) -> Vec<Token> {
    let _scope = crate::perf::scope("document.tokenize");
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);
    convert_blocks(root, false)
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options
}

fn convert_blocks<'a>(parent: &'a AstNode<'a>, tight: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut prev_end: Option<usize> = None;
    for child in parent.children() {
        let (start, end) = {
            let data = child.data.borrow();
            (data.sourcepos.start.line, data.sourcepos.end.line)
        };
        let Some(token) = convert_block(child, tight) else {
            continue;
        };
        if prev_end.is_some_and(|prev| start > prev + 1) {
            tokens.push(Token::Space);
        }
        prev_end = Some(end);
        tokens.push(token);
    }
    tokens
}

fn convert_block<'a>(node: &'a AstNode<'a>, tight: bool) -> Option<Token> {
    let token = match &node.data.borrow().value {
        NodeValue::Heading(heading) => Token::Heading {
            depth: heading.level,
            children: convert_inlines(node),
        },
        NodeValue::Paragraph if tight => {
            let children = convert_inlines(node);
            let raw = Inline::plain_text(&children);
            if Inline::is_plain(&children) {
                Token::Text {
                    raw,
                    children: Vec::new(),
                }
            } else {
                Token::Text { raw, children }
            }
        }
        NodeValue::Paragraph => Token::Paragraph {
            children: convert_inlines(node),
        },
        NodeValue::CodeBlock(code_block) => {
            let lang = code_block
                .info
                .split_whitespace()
                .next()
                .map(ToString::to_string);
            let literal = code_block.literal.as_str();
            let body = literal
                .strip_suffix("\r\n")
                .or_else(|| literal.strip_suffix('\n'))
                .unwrap_or(literal);
            Token::CodeBlock {
                lang,
                body: body.to_string(),
            }
        }
        NodeValue::List(list) => Token::List(List {
            items: node.children().filter_map(|item| convert_item(item, list.tight)).collect(),
            ordered: list.list_type == ListType::Ordered,
            start: list.start,
        }),
        NodeValue::BlockQuote => Token::Blockquote {
            children: convert_blocks(node, false),
        },
        NodeValue::ThematicBreak => Token::ThematicBreak,
        NodeValue::HtmlBlock(html) => Token::Html {
            raw: html.literal.clone(),
        },
        NodeValue::Table(table) => Token::Table(convert_table(node, &table.alignments)),
        NodeValue::FootnoteDefinition(def) => {
            let mut children = vec![Inline::Text(format!("[^{}]: ", def.name))];
            for child in node.children() {
                children.extend(convert_inlines(child));
            }
            Token::Paragraph { children }
        }
        _ => return None,
    };
    Some(token)
}

fn convert_item<'a>(node: &'a AstNode<'a>, tight: bool) -> Option<ListItem> {
    let task = match &node.data.borrow().value {
        NodeValue::Item(_) => find_task_marker(node),
        NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
        _ => return None,
    };
    Some(ListItem {
        task,
        children: convert_blocks(node, tight),
    })
}

fn find_task_marker<'a>(node: &'a AstNode<'a>) -> Option<bool> {
    node.children().find_map(|child| match &child.data.borrow().value {
        NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
        _ => None,
    })
}

fn convert_table<'a>(node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Table {
    let alignments = alignments
        .iter()
        .map(|alignment| match alignment {
            TableAlignment::None => Alignment::None,
            TableAlignment::Left => Alignment::Left,
            TableAlignment::Center => Alignment::Center,
            TableAlignment::Right => Alignment::Right,
        })
        .collect();

    let mut header = Vec::new();
    let mut rows = Vec::new();
    for row_node in node.children() {
        let is_header = match &row_node.data.borrow().value {
            NodeValue::TableRow(is_header) => *is_header,
            _ => continue,
        };
        let cells: Vec<Vec<Inline>> = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(convert_inlines)
            .collect();
        if is_header {
            header = cells;
        } else {
            rows.push(cells);
        }
    }

    Table {
        alignments,
        header,
        rows,
    }
}

fn convert_inlines<'a>(parent: &'a AstNode<'a>) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in parent.children() {
        push_inline(child, &mut out);
    }
    out
}

fn push_inline<'a>(node: &'a AstNode<'a>, out: &mut Vec<Inline>) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => push_text(out, text),
        NodeValue::SoftBreak => push_text(out, " "),
        NodeValue::LineBreak => out.push(Inline::Break),
        NodeValue::Code(code) => out.push(Inline::Code(code.literal.clone())),
        NodeValue::HtmlInline(html) => push_text(out, html),
        NodeValue::Emph => out.push(Inline::Emphasis(convert_inlines(node))),
        NodeValue::Strong => out.push(Inline::Strong(convert_inlines(node))),
        NodeValue::Strikethrough => out.push(Inline::Strikethrough(convert_inlines(node))),
        NodeValue::Link(link) => out.push(Inline::Link {
            url: link.url.clone(),
            children: convert_inlines(node),
        }),
        NodeValue::Image(link) => out.push(Inline::Image {
            alt: Inline::plain_text(&convert_inlines(node)),
            url: link.url.clone(),
        }),
        NodeValue::FootnoteReference(reference) => {
            push_text(out, &format!("[^{}]", reference.name));
        }
        // Task markers are carried on the list item.
        NodeValue::TaskItem(_) => {}
        _ => {
            for child in node.children() {
                push_inline(child, out);
            }
        }
    }
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Inline {
        Inline::Text(value.to_string())
    }

    #[test]
    fn test_tokenize_empty_document() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_heading() {
        let tokens = tokenize("## Title");
        assert_eq!(
            tokens,
            vec![Token::Heading {
                depth: 2,
                children: vec![text("Title")],
            }]
        );
    }

    #[test]
    fn test_blank_line_between_blocks_becomes_space() {
        let tokens = tokenize("# A\n\nBody");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_space());
    }

    #[test]
    fn test_adjacent_blocks_have_no_space() {
        let tokens = tokenize("# A\nBody");
        assert_eq!(tokens.len(), 2);
        assert!(!tokens.iter().any(Token::is_space));
    }

    #[test]
    fn test_several_blank_lines_give_one_space() {
        let tokens = tokenize("one\n\n\n\ntwo");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_space());
    }

    #[test]
    fn test_code_block_language_and_body() {
        let tokens = tokenize("```rust extra\nfn main() {}\nlet x = 1;\n```");
        assert_eq!(
            tokens,
            vec![Token::CodeBlock {
                lang: Some("rust".to_string()),
                body: "fn main() {}\nlet x = 1;".to_string(),
            }]
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let tokens = tokenize("```\nplain\n```");
        assert!(matches!(&tokens[0], Token::CodeBlock { lang: None, body } if body == "plain"));
    }

    #[test]
    fn test_tight_list_items_are_text() {
        let tokens = tokenize("- one\n- **two**");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {tokens:?}");
        };
        assert!(!list.ordered);
        assert_eq!(list.items.len(), 2);
        assert_eq!(
            list.items[0].children,
            vec![Token::Text {
                raw: "one".to_string(),
                children: Vec::new(),
            }]
        );
        assert_eq!(
            list.items[1].children,
            vec![Token::Text {
                raw: "two".to_string(),
                children: vec![Inline::Strong(vec![text("two")])],
            }]
        );
    }

    #[test]
    fn test_loose_list_items_are_paragraphs() {
        let tokens = tokenize("1. one\n\n2. two");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {tokens:?}");
        };
        assert!(list.ordered);
        assert_eq!(list.start, 1);
        assert!(matches!(list.items[0].children[0], Token::Paragraph { .. }));
    }

    #[test]
    fn test_ordered_list_start() {
        let tokens = tokenize("3. three\n4. four");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list");
        };
        assert_eq!(list.start, 3);
    }

    #[test]
    fn test_nested_list_inside_item() {
        let tokens = tokenize("- outer\n  - inner");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list");
        };
        let children = &list.items[0].children;
        assert_eq!(children.len(), 2);
        assert!(children[1].is_list());
    }

    #[test]
    fn test_table_inside_list_item() {
        let tokens = tokenize("- item\n\n  | a | b |\n  |---|---|\n  | 1 | 2 |");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {tokens:?}");
        };
        assert!(
            list.items[0]
                .children
                .iter()
                .any(|token| matches!(token, Token::Table(_)))
        );
    }

    #[test]
    fn test_task_items() {
        let tokens = tokenize("- [x] done\n- [ ] todo");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list");
        };
        assert_eq!(list.items[0].task, Some(true));
        assert_eq!(list.items[1].task, Some(false));
    }

    #[test]
    fn test_table() {
        let tokens = tokenize("| a | b |\n|:--|--:|\n| 1 | 2 |");
        let Token::Table(table) = &tokens[0] else {
            panic!("expected table, got {tokens:?}");
        };
        assert_eq!(table.alignments, vec![Alignment::Left, Alignment::Right]);
        assert_eq!(table.header, vec![vec![text("a")], vec![text("b")]]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_blockquote() {
        let tokens = tokenize("> quoted");
        assert_eq!(
            tokens,
            vec![Token::Blockquote {
                children: vec![Token::Paragraph {
                    children: vec![text("quoted")],
                }],
            }]
        );
    }

    #[test]
    fn test_html_block() {
        let tokens = tokenize("<div>\nhi\n</div>");
        assert!(matches!(&tokens[0], Token::Html { raw } if raw.contains("<div>")));
    }

    #[test]
    fn test_soft_break_becomes_space_and_hard_break_is_kept() {
        let tokens = tokenize("one\ntwo  \nthree");
        assert_eq!(
            tokens,
            vec![Token::Paragraph {
                children: vec![text("one two"), Inline::Break, text("three")],
            }]
        );
    }

    #[test]
    fn test_inline_markup() {
        let tokens = tokenize("*a* ~~b~~ `c` [d](http://e)");
        let Token::Paragraph { children } = &tokens[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(children[0], Inline::Emphasis(_)));
        assert!(children.iter().any(|i| matches!(i, Inline::Strikethrough(_))));
        assert!(children.contains(&Inline::Code("c".to_string())));
        assert!(
            children
                .iter()
                .any(|i| matches!(i, Inline::Link { url, .. } if url == "http://e"))
        );
    }
}
