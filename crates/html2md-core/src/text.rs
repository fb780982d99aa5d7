//! Text content processing.
//!
//! Turns a raw HTML text run into Markdown text: whitespace compression,
//! left trimming, escaping of Markdown syntax characters and entity
//! substitution. Replacement text from the entity table is kept apart as
//! [`Inline::Verbatim`]; everything else passes through the rules of
//! [`TextMode`].

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Inline;
use crate::entities::{EntityTable, Piece};
use crate::options::Options;

/// `N.` or `N)` that a renderer would read as an ordered list item
static NUMBERED_LIST_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[.)](?:\s|$)").expect("valid regex"));

/// Bullets, thematic breaks, setext underlines and tilde fences
static BLOCK_MARKER_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+](?:\s|$)|-+\s*$|=+\s*$|~{3,})").expect("valid regex")
});

/// How a text run is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// Ordinary flowing text: compressed (if enabled) and escaped
    Prose,
    /// Inline code: compressed (if enabled), never escaped
    Code,
    /// Preformatted text: verbatim
    Preformatted,
}

/// Text run processor bound to one conversion's options and entity table
#[derive(Debug, Clone, Copy)]
pub struct TextEmitter<'a> {
    options: &'a Options,
    entities: &'a EntityTable,
}

impl<'a> TextEmitter<'a> {
    pub fn new(options: &'a Options, entities: &'a EntityTable) -> Self {
        Self { options, entities }
    }

    /// Process one text run into a single string.
    ///
    /// `trim_start` is set when the run begins a block or a line, or when
    /// the output so far already ends in whitespace; leading whitespace is
    /// then dropped whatever the compression setting.
    pub fn emit(&self, text: &str, mode: TextMode, trim_start: bool) -> String {
        self.emit_inlines(text, mode, trim_start)
            .into_iter()
            .filter_map(|inline| match inline {
                Inline::Text(text) | Inline::Verbatim(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Process one text run, keeping entity replacements as
    /// [`Inline::Verbatim`] between the processed [`Inline::Text`] runs
    pub fn emit_inlines(&self, text: &str, mode: TextMode, trim_start: bool) -> Vec<Inline> {
        let compress = mode != TextMode::Preformatted && self.options.compress_whitespace;
        let escape = mode == TextMode::Prose;

        let mut inlines = Vec::new();
        let mut result = String::with_capacity(text.len());
        let mut trimming = trim_start && mode != TextMode::Preformatted;
        let mut prev_space = false;

        for piece in self.entities.pieces(text) {
            match piece {
                Piece::Replacement("") => {}
                Piece::Replacement(replacement) => {
                    if !result.is_empty() {
                        inlines.push(Inline::Text(std::mem::take(&mut result)));
                    }
                    inlines.push(Inline::Verbatim(replacement.to_string()));
                    trimming = false;
                    prev_space = false;
                }
                Piece::Literal(literal) => {
                    for c in literal.chars() {
                        if is_html_whitespace(c) {
                            if trimming {
                                continue;
                            }
                            if compress {
                                if !prev_space {
                                    result.push(' ');
                                }
                                prev_space = true;
                                continue;
                            }
                            result.push(c);
                            continue;
                        }

                        trimming = false;
                        prev_space = false;
                        if escape && needs_escape(c) {
                            result.push('\\');
                        }
                        result.push(c);
                    }
                }
            }
        }

        if !result.is_empty() {
            inlines.push(Inline::Text(result));
        }
        inlines
    }

    /// Process an attribute value: entities substituted, nothing escaped
    pub fn attribute(&self, value: &str) -> String {
        self.entities.decode(value.trim())
    }
}

/// HTML's ASCII whitespace set
pub fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn needs_escape(c: char) -> bool {
    matches!(c, '\\' | '*' | '_' | '`' | '[' | ']')
}

/// Whether a line starts with block syntax that a leading backslash
/// neutralises: headings, quotes, bullets, thematic breaks, setext
/// underlines and tilde fences
pub fn starts_block_marker(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('>') || BLOCK_MARKER_START.is_match(line)
}

/// Escape the block syntax a line would otherwise start with.
///
/// Block markers are always neutralised. `N.` and `N)` are only escaped
/// when `escape_numbered` is set; otherwise they are left for the renderer
/// to interpret.
pub fn escape_line_start(line: &str, escape_numbered: bool) -> Cow<'_, str> {
    if starts_block_marker(line) {
        return Cow::Owned(format!("\\{}", line));
    }

    if escape_numbered {
        if let Some(caps) = NUMBERED_LIST_START.captures(line) {
            let digits = caps.get(1).map_or(0, |m| m.end());
            return Cow::Owned(format!("{}\\{}", &line[..digits], &line[digits..]));
        }
    }

    Cow::Borrowed(line)
}

/// Whether a word would be read as block syntax if it started a line
pub fn starts_block_syntax(word: &str) -> bool {
    let Some(first) = word.chars().next() else {
        return false;
    };

    if matches!(first, '#' | '>' | '-' | '+' | '*' | '=' | '|') || word.starts_with("~~~") {
        return true;
    }

    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(word.as_bytes().get(digits), Some(b'.') | Some(b')'))
}
