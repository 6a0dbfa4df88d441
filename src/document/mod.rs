//! Markdown front end.
//!
//! Parses markdown with comrak and lowers the AST into a flat, read-only
//! token stream for the renderers.

mod parser;
mod types;

pub use parser::tokenize;
pub use types::{Alignment, Inline, List, ListItem, Table, Token};
