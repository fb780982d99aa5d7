//! HTML entity conversion table
//!
//! Maps the literal spelling of an entity (`&amp;`, `&#169;`, `&#x1F600;`)
//! to the text that replaces it in the Markdown output. Spellings that are
//! not in the table are left in the output untouched.

use indexmap::IndexMap;

/// Conversions every new table starts with
pub const DEFAULT_CONVERSIONS: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&nbsp;", " "),
    ("&rarr;", "\u{2192}"),
];

/// A piece of text after entity lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Source text outside any known entity
    Literal(&'a str),
    /// Replacement for a known entity, to be emitted verbatim
    Replacement(&'a str),
}

/// Entity spelling to replacement text.
///
/// Each table is independent; mutating one never affects another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTable {
    conversions: IndexMap<String, String>,
    longest: usize,
}

impl EntityTable {
    /// Create a table seeded with [`DEFAULT_CONVERSIONS`]
    pub fn new() -> Self {
        let mut table = Self::empty();
        for (spelling, replacement) in DEFAULT_CONVERSIONS {
            table.add(spelling, replacement);
        }
        table
    }

    /// Create a table without any conversions
    pub fn empty() -> Self {
        Self {
            conversions: IndexMap::new(),
            longest: 0,
        }
    }

    /// Insert or overwrite a conversion
    pub fn add(&mut self, spelling: &str, replacement: &str) {
        self.longest = self.longest.max(spelling.len());
        self.conversions
            .insert(spelling.to_string(), replacement.to_string());
    }

    /// Remove a conversion; unknown spellings are ignored
    pub fn remove(&mut self, spelling: &str) {
        if self.conversions.shift_remove(spelling).is_some() {
            self.longest = self.conversions.keys().map(String::len).max().unwrap_or(0);
        }
    }

    /// Remove every conversion, defaults included
    pub fn clear(&mut self) {
        self.conversions.clear();
        self.longest = 0;
    }

    /// Look up the replacement for a spelling
    pub fn lookup(&self, spelling: &str) -> Option<&str> {
        self.conversions.get(spelling).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.conversions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty()
    }

    /// Split text into literal runs and entity replacements
    pub fn pieces<'a>(&'a self, text: &'a str) -> Vec<Piece<'a>> {
        let mut pieces = Vec::new();
        let mut literal_start = 0;
        let mut pos = 0;

        while let Some(found) = text[pos..].find('&') {
            let amp = pos + found;

            match self.match_at(text, amp) {
                Some((end, replacement)) => {
                    if literal_start < amp {
                        pieces.push(Piece::Literal(&text[literal_start..amp]));
                    }
                    pieces.push(Piece::Replacement(replacement));
                    literal_start = end;
                    pos = end;
                }
                None => pos = amp + 1,
            }
        }

        if literal_start < text.len() {
            pieces.push(Piece::Literal(&text[literal_start..]));
        }

        pieces
    }

    /// Replace every known entity in `text`
    pub fn decode(&self, text: &str) -> String {
        if self.is_empty() || !text.contains('&') {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len());
        for piece in self.pieces(text) {
            match piece {
                Piece::Literal(s) | Piece::Replacement(s) => result.push_str(s),
            }
        }
        result
    }

    /// Match a known spelling starting at byte `amp` (which holds `&`)
    fn match_at<'a>(&'a self, text: &str, amp: usize) -> Option<(usize, &'a str)> {
        if self.longest == 0 {
            return None;
        }

        let rest = &text[amp..];
        let limit = rest.len().min(self.longest);
        // `;` is ASCII, so every index it sits at is a char boundary
        let semicolon = rest.as_bytes()[..limit].iter().position(|&b| b == b';')?;
        let spelling = &rest[..=semicolon];

        self.lookup(spelling)
            .map(|replacement| (amp + semicolon + 1, replacement))
    }
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}
