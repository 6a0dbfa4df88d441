//! Removal of a single outer ```` ```markdown ```` fence.
//!
//! Assistants sometimes wrap an entire reply in a markdown code fence, which
//! would otherwise render as one big code block.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn outer_fence() -> Option<&'static Regex> {
    static OUTER_FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    OUTER_FENCE
        .get_or_init(|| {
            Regex::new(r"(?s)\A```[ \t]*(?i:markdown|md)[ \t]*\r?\n(.*?)\r?\n```[ \t]*\z").ok()
        })
        .as_ref()
}

/// Return the body of `text` when the whole (trimmed) text is one
/// ```` ```markdown ```` or ```` ```md ```` fence; otherwise `text` itself.
pub fn unwrap_outer_fence(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    let Some(captures) = outer_fence().and_then(|re| re.captures(trimmed)) else {
        return Cow::Borrowed(text);
    };
    Cow::Borrowed(captures.get(1).map_or("", |m| m.as_str()))
}
