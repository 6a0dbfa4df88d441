//! ANSI-aware text measurement and wrapping.
//!
//! Rendered lines carry raw SGR escape sequences, so column math has to skip
//! them. Wrapping also has to carry the active styling across line breaks,
//! otherwise a wrapped code line would lose its background on the second row.

use unicode_width::UnicodeWidthChar;

/// Full SGR reset.
pub const RESET: &str = "\x1b[0m";

/// A chunk of styled text: either an escape sequence or one visible char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Escape(&'a str),
    Char(char),
}

/// Iterator over the escape sequences and visible characters of a line.
struct Pieces<'a> {
    rest: &'a str,
}

impl<'a> Pieces<'a> {
    const fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.rest.chars().next()?;
        if ch == '\x1b' {
            let len = escape_len(self.rest);
            let (seq, rest) = self.rest.split_at(len);
            self.rest = rest;
            return Some(Piece::Escape(seq));
        }
        self.rest = &self.rest[ch.len_utf8()..];
        Some(Piece::Char(ch))
    }
}

/// Byte length of the escape sequence at the start of `s`.
///
/// Handles CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ST`) sequences;
/// any other escape is treated as `ESC` plus one character.
fn escape_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.get(1) {
        Some(b'[') => bytes
            .iter()
            .enumerate()
            .skip(2)
            .find(|(_, b)| (0x40..=0x7e).contains(*b))
            .map_or(bytes.len(), |(idx, _)| idx + 1),
        Some(b']') => {
            let mut idx = 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return idx + 1;
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return idx + 2;
                }
                idx += 1;
            }
            bytes.len()
        }
        Some(_) => 1 + s[1..].chars().next().map_or(0, char::len_utf8),
        None => 1,
    }
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

fn is_sgr(seq: &str) -> bool {
    seq.starts_with("\x1b[") && seq.ends_with('m')
}

fn is_full_reset(seq: &str) -> bool {
    seq == RESET || seq == "\x1b[m"
}

/// Remove every escape sequence from `text`.
pub fn strip_ansi(text: &str) -> String {
    Pieces::new(text)
        .filter_map(|piece| match piece {
            Piece::Char(ch) => Some(ch),
            Piece::Escape(_) => None,
        })
        .collect()
}

/// Terminal column width of `text`, ignoring escape sequences.
pub fn visible_width(text: &str) -> usize {
    Pieces::new(text)
        .map(|piece| match piece {
            Piece::Char(ch) => char_width(ch),
            Piece::Escape(_) => 0,
        })
        .sum()
}

/// True when `text` has no visible content besides whitespace.
pub fn is_visibly_blank(text: &str) -> bool {
    Pieces::new(text).all(|piece| match piece {
        Piece::Char(ch) => ch.is_whitespace(),
        Piece::Escape(_) => true,
    })
}

/// Strip trailing spaces and tabs, including ones followed only by escape
/// sequences. The escapes themselves are kept.
pub fn trim_trailing_whitespace(line: &str) -> String {
    let pieces: Vec<Piece<'_>> = Pieces::new(line).collect();
    let keep = pieces
        .iter()
        .rposition(|piece| matches!(piece, Piece::Char(ch) if *ch != ' ' && *ch != '\t'))
        .map_or(0, |idx| idx + 1);
    let mut out = String::with_capacity(line.len());
    for (idx, piece) in pieces.iter().enumerate() {
        match *piece {
            Piece::Escape(seq) => out.push_str(seq),
            Piece::Char(ch) if idx < keep => out.push(ch),
            Piece::Char(_) => {}
        }
    }
    out
}

/// True when `text` leaves SGR styling active at its end.
pub fn has_open_style(text: &str) -> bool {
    let mut open = false;
    for piece in Pieces::new(text) {
        if let Piece::Escape(seq) = piece
            && is_sgr(seq)
        {
            open = !is_full_reset(seq);
        }
    }
    open
}

/// Pad `line` with spaces up to `width` visible columns.
pub fn pad_to_width(line: &str, width: usize) -> String {
    let padding = width.saturating_sub(visible_width(line));
    let mut out = String::with_capacity(line.len() + padding);
    out.push_str(line);
    out.extend(std::iter::repeat_n(' ', padding));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Space,
}

#[derive(Debug)]
struct Token<'a> {
    kind: TokenKind,
    pieces: Vec<Piece<'a>>,
    width: usize,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    for piece in Pieces::new(text) {
        let kind = match piece {
            Piece::Escape(_) => None,
            Piece::Char(ch) if ch.is_whitespace() => Some(TokenKind::Space),
            Piece::Char(_) => Some(TokenKind::Word),
        };
        let width = match piece {
            Piece::Char(ch) => char_width(ch),
            Piece::Escape(_) => 0,
        };
        match (tokens.last_mut(), kind) {
            // Escapes stick to whatever token is being built.
            (Some(last), None) => last.pieces.push(piece),
            (Some(last), Some(kind)) if last.kind == kind => {
                last.pieces.push(piece);
                last.width += width;
            }
            (_, kind) => tokens.push(Token {
                kind: kind.unwrap_or(TokenKind::Word),
                pieces: vec![piece],
                width,
            }),
        }
    }
    tokens
}

struct LineBuilder {
    width: usize,
    lines: Vec<String>,
    current: String,
    current_width: usize,
    active: Vec<String>,
}

impl LineBuilder {
    const fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: String::new(),
            current_width: 0,
            active: Vec::new(),
        }
    }

    fn emit_escape(&mut self, seq: &str) {
        self.current.push_str(seq);
        if is_sgr(seq) {
            if is_full_reset(seq) {
                self.active.clear();
            } else {
                self.active.push(seq.to_string());
            }
        }
    }

    fn emit_char(&mut self, ch: char) {
        let width = char_width(ch);
        if self.current_width > 0 && self.current_width + width > self.width {
            self.break_line();
        }
        self.current.push(ch);
        self.current_width += width;
    }

    fn break_line(&mut self) {
        if !self.active.is_empty() {
            self.current.push_str(RESET);
        }
        self.lines.push(std::mem::take(&mut self.current));
        self.current = self.active.concat();
        self.current_width = 0;
    }

    /// Emit leading or separating whitespace. Continuation rows drop it;
    /// the first row keeps it so indentation survives.
    fn emit_space(&mut self, pieces: &[Piece<'_>]) {
        for piece in pieces {
            match *piece {
                Piece::Escape(seq) => self.emit_escape(seq),
                Piece::Char(ch) => {
                    let at_row_start = self.current_width == 0 && !self.lines.is_empty();
                    if !at_row_start && self.current_width + char_width(ch) <= self.width {
                        self.current.push(ch);
                        self.current_width += char_width(ch);
                    }
                }
            }
        }
    }

    fn emit_word(&mut self, pieces: &[Piece<'_>]) {
        for piece in pieces {
            match *piece {
                Piece::Escape(seq) => self.emit_escape(seq),
                Piece::Char(ch) => self.emit_char(ch),
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.lines.push(self.current);
        self.lines
    }
}

/// Word-wrap a styled line to `width` columns.
///
/// Active SGR state is closed with a reset at each break and re-opened at
/// the start of the next row. Words longer than `width` are split.
pub fn wrap_text_with_ansi(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if visible_width(text) <= width {
        return vec![text.to_string()];
    }

    let mut builder = LineBuilder::new(width);
    let mut pending_space: Option<Token<'_>> = None;

    for token in tokenize(text) {
        match token.kind {
            TokenKind::Space => pending_space = Some(token),
            TokenKind::Word => {
                let space_width = pending_space.as_ref().map_or(0, |space| space.width);
                let overflows = builder.current_width > 0
                    && builder.current_width + space_width + token.width > width;
                if let Some(space) = pending_space.take() {
                    if overflows {
                        for piece in &space.pieces {
                            if let Piece::Escape(seq) = *piece {
                                builder.emit_escape(seq);
                            }
                        }
                    } else {
                        builder.emit_space(&space.pieces);
                    }
                }
                if overflows {
                    builder.break_line();
                }
                builder.emit_word(&token.pieces);
            }
        }
    }
    if let Some(space) = pending_space {
        builder.emit_space(&space.pieces);
    }

    builder.finish()
}
