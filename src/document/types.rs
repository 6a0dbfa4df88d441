//! Token types produced by the markdown front end.
//!
//! The render pipeline only reads these; nothing downstream mutates a token.

/// A block-level token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Heading {
        depth: u8,
        children: Vec<Inline>,
    },
    Paragraph {
        children: Vec<Inline>,
    },
    List(List),
    CodeBlock {
        lang: Option<String>,
        body: String,
    },
    Table(Table),
    Blockquote {
        children: Vec<Self>,
    },
    ThematicBreak,
    /// Bare text, as found in tight list items.
    ///
    /// `children` is empty when the text carries no inline markup.
    Text {
        raw: String,
        children: Vec<Inline>,
    },
    Html {
        raw: String,
    },
    /// A blank source line between two blocks.
    Space,
}

impl Token {
    pub const fn is_space(&self) -> bool {
        matches!(self, Self::Space)
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub items: Vec<ListItem>,
    pub ordered: bool,
    /// First number of an ordered list.
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// `Some(checked)` for task list items.
    pub task: Option<bool>,
    pub children: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

/// Inline content of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Self>),
    Emphasis(Vec<Self>),
    Strikethrough(Vec<Self>),
    Code(String),
    Link { url: String, children: Vec<Self> },
    Image { alt: String, url: String },
    /// Hard line break.
    Break,
}

impl Inline {
    /// Concatenated text content, markup dropped.
    pub fn plain_text(inlines: &[Self]) -> String {
        let mut out = String::new();
        for inline in inlines {
            inline.push_plain_text(&mut out);
        }
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Self::Text(text) | Self::Code(text) => out.push_str(text),
            Self::Strong(children)
            | Self::Emphasis(children)
            | Self::Strikethrough(children)
            | Self::Link { children, .. } => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
            Self::Image { alt, url } => out.push_str(if alt.is_empty() { url } else { alt }),
            Self::Break => out.push('\n'),
        }
    }

    /// True when every inline is plain text.
    pub fn is_plain(inlines: &[Self]) -> bool {
        inlines.iter().all(|inline| matches!(inline, Self::Text(_)))
    }
}
