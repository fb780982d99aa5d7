//! Line-break policy for paragraph text.
//!
//! Breaks only at whitespace. Once a line has reached the soft width the
//! next whitespace becomes a break; a word that would carry the line past
//! the hard width is moved to the next line instead. Words are never
//! split, and no break is placed before a word that would be read as
//! block syntax at the start of a line. Verbatim text, bracketed by the
//! serializer's layout markers, is never broken and its markers take no
//! columns.

use crate::serialize::{is_verbatim_marker, VERBATIM_CLOSE, VERBATIM_OPEN};
use crate::text::starts_block_syntax;

/// Wrap one logical line.
///
/// `column` is the width already taken by the block prefix (quote markers,
/// list indentation) on every physical line.
pub fn wrap_line(line: &str, column: usize, soft: usize, hard: usize) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / soft.max(1));
    let mut width = column;
    let mut has_word = false;

    for (separator, word) in words(line) {
        let word_width = word.chars().filter(|c| !is_verbatim_marker(*c)).count();

        if has_word {
            let separator_width = separator.chars().count();
            let past_soft = width >= soft;
            let past_hard = width + separator_width + word_width > hard;
            let syntax = starts_block_syntax(word.trim_start_matches(VERBATIM_OPEN));

            if (past_soft || past_hard) && !syntax {
                out.push('\n');
                width = column;
            } else {
                out.push_str(separator);
                width += separator_width;
            }
        } else {
            out.push_str(separator);
            width += separator.chars().count();
        }

        out.push_str(word);
        width += word_width;
        has_word = true;
    }

    out
}

/// Split into `(preceding whitespace, word)` pairs; trailing whitespace is dropped
fn words(line: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut rest = line;

    std::iter::from_fn(move || {
        let word_start = rest.find(|c: char| !is_break_space(c))?;
        let after = &rest[word_start..];
        let len = word_len(after);

        let pair = (&rest[..word_start], &after[..len]);
        rest = &after[len..];
        Some(pair)
    })
}

/// Length of the word at the start of `text`; verbatim text never breaks
fn word_len(text: &str) -> usize {
    let mut verbatim = false;

    for (i, c) in text.char_indices() {
        match c {
            VERBATIM_OPEN => verbatim = true,
            VERBATIM_CLOSE => verbatim = false,
            c if is_break_space(c) && !verbatim => return i,
            _ => {}
        }
    }

    text.len()
}

fn is_break_space(c: char) -> bool {
    c == ' ' || c == '\t'
}
