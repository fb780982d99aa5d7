//! Configuration options for HTML to Markdown conversion

/// Default nesting limit for tree building and conversion
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Error returned by [`Options::validate`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("soft break must be greater than zero when line splitting is enabled")]
    ZeroSoftBreak,

    #[error("hard break must be greater than zero when line splitting is enabled")]
    ZeroHardBreak,

    #[error("hard break ({hard}) is smaller than soft break ({soft})")]
    HardBelowSoft { soft: usize, hard: usize },

    #[error("list marker {0:?} is not printable")]
    InvalidListMarker(char),

    #[error("max depth must be greater than zero")]
    ZeroMaxDepth,
}

/// Options for a conversion.
///
/// Options are plain values: two instances compare equal when every field
/// matches. A converter reads them but never mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Wrap long paragraph lines
    pub split_lines: bool,

    /// Column after which the next whitespace becomes a line break
    pub soft_break: usize,

    /// Column a line must not pass if an earlier whitespace exists
    pub hard_break: usize,

    /// Bullet marker for unordered lists
    pub unordered_list: char,

    /// Delimiter written after the numeral of ordered list items
    pub ordered_list: char,

    /// Emit the document `<title>` as a level-1 heading
    pub include_title: bool,

    /// Emit pipe tables (otherwise cells degrade to paragraphs)
    pub format_table: bool,

    /// Collapse runs of whitespace in text to a single space
    pub compress_whitespace: bool,

    /// Escape `N.` at the start of a line so it is not read as a list item
    pub escape_numbered_list: bool,

    /// Strip leading whitespace from every output line outside code fences
    pub force_left_trim: bool,

    /// Maximum element nesting honoured before content is flattened
    pub max_depth: usize,
}

impl Options {
    /// Check the options for values that make no sense together.
    ///
    /// Conversion never requires this: invalid wrap widths simply disable
    /// wrapping. It exists for callers that build options from user input.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.split_lines {
            if self.soft_break == 0 {
                return Err(OptionsError::ZeroSoftBreak);
            }
            if self.hard_break == 0 {
                return Err(OptionsError::ZeroHardBreak);
            }
            if self.hard_break < self.soft_break {
                return Err(OptionsError::HardBelowSoft {
                    soft: self.soft_break,
                    hard: self.hard_break,
                });
            }
        }

        for marker in [self.unordered_list, self.ordered_list] {
            if marker.is_whitespace() || marker.is_control() {
                return Err(OptionsError::InvalidListMarker(marker));
            }
        }

        if self.max_depth == 0 {
            return Err(OptionsError::ZeroMaxDepth);
        }

        Ok(())
    }

    /// Effective `(soft, hard)` wrap widths, or `None` when wrapping is off
    pub fn wrap_widths(&self) -> Option<(usize, usize)> {
        if !self.split_lines || self.soft_break == 0 || self.hard_break == 0 {
            return None;
        }
        Some((self.soft_break, self.hard_break.max(self.soft_break)))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            split_lines: true,
            soft_break: 80,
            hard_break: 100,
            unordered_list: '-',
            ordered_list: '.',
            include_title: true,
            format_table: true,
            compress_whitespace: true,
            escape_numbered_list: true,
            force_left_trim: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
