//! Runtime edit commands such as `bg codeBg` or `label=off`.

use super::options::Options;
use super::parse::{parse_background, parse_bool_like, parse_indent_width};
use super::service::LiveEdit;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error(
        "unknown setting `{0}` (expected unwrap, fences, label, headings, lists, bg or indent)"
    )]
    UnknownField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Unwrap,
    Fences,
    Label,
    Headings,
    Lists,
    Background,
    Indent,
}

fn field(name: &str) -> Option<Field> {
    let field = match name.to_ascii_lowercase().as_str() {
        "unwrap" | "unwrap-fence" | "unwrapouterfence" => Field::Unwrap,
        "fences" | "hide-fences" | "hidecodefences" => Field::Fences,
        "label" | "language-label" | "showlanguagelabel" => Field::Label,
        "headings" | "strip-headings" | "stripheadingprefixes" => Field::Headings,
        "lists" | "list-blocks" | "blocklistitems" => Field::Lists,
        "bg" | "background" | "code-bg" | "codebackground" => Field::Background,
        "indent" | "code-indent" | "codeindent" => Field::Indent,
        _ => return None,
    };
    Some(field)
}

/// Parse `<field> [value]` (or `<field>=<value>`) against the current options.
///
/// A boolean field without a value toggles. Values that do not parse keep
/// the current setting.
pub fn parse_edit(input: &str, current: &Options) -> Result<LiveEdit, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::Empty);
    }
    let (name, value) = match input.split_once(|c: char| c == '=' || c.is_whitespace()) {
        Some((name, value)) => (name, Some(value.trim())),
        None => (input, None),
    };
    let field = field(name).ok_or_else(|| CommandError::UnknownField(name.to_string()))?;

    let toggle = |current: bool| value.map_or(!current, |value| parse_bool_like(value, current));

    let edit = match field {
        Field::Unwrap => LiveEdit::UnwrapOuterFence(toggle(current.unwrap_outer_fence)),
        Field::Fences => LiveEdit::HideCodeFences(toggle(current.hide_code_fences)),
        Field::Label => LiveEdit::ShowLanguageLabel(toggle(current.show_language_label)),
        Field::Headings => LiveEdit::StripHeadingPrefixes(toggle(current.strip_heading_prefixes)),
        Field::Lists => LiveEdit::BlockListItems(toggle(current.block_list_items)),
        Field::Background => LiveEdit::CodeBackground(
            parse_background(value.unwrap_or_default())
                .key()
                .map(ToString::to_string),
        ),
        Field::Indent => LiveEdit::CodeIndent(
            value
                .and_then(parse_indent_width)
                .unwrap_or_else(|| current.code_indent_width()),
        ),
    };
    Ok(edit)
}
