//! Markdown Abstract Syntax Tree
//!
//! The converter builds this tree from HTML nodes and the block formatter
//! serializes it. Text held in [`Inline::Text`] has already been through
//! the text emitter: it is compressed and escaped. Entity replacements are
//! held in [`Inline::Verbatim`] and reach the output unchanged.

/// A block-level Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Sequence of blocks separated by blank lines
    Document(Vec<Block>),

    /// Heading with level (1-6) and inline content
    Heading { level: u8, content: Vec<Inline> },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Block quote containing nested blocks
    BlockQuote(Vec<Block>),

    /// List (ordered or unordered)
    List {
        ordered: bool,
        /// Number of the first item; negative values render from 0
        start: i64,
        items: Vec<ListItem>,
    },

    /// Fenced code block
    CodeBlock {
        language: Option<String>,
        code: String,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// Pipe table
    Table(Table),
}

/// A list item containing blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Block>,
}

impl ListItem {
    pub fn new(content: Vec<Block>) -> Self {
        Self { content }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self {
            content: vec![Block::Paragraph(inlines)],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.iter().all(|b| b.is_blank())
    }
}

/// Column alignment from the header cell's `align` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("left") => Alignment::Left,
            Some("center") => Alignment::Center,
            Some("right") => Alignment::Right,
            _ => Alignment::None,
        }
    }
}

/// A table: the first row is the header, the rest are data rows.
///
/// Rows may be ragged; the formatter pads them to the widest row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

impl Table {
    /// Number of columns after repair
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn is_blank(&self) -> bool {
        self.header.iter().all(|c| inlines_are_blank(c))
            && self
                .rows
                .iter()
                .all(|r| r.iter().all(|c| inlines_are_blank(c)))
    }
}

/// An inline Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Processed text
    Text(String),

    /// Entity replacement text: never escaped, trimmed or wrapped inside
    Verbatim(String),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// Underline, kept as inline HTML
    Underline(Vec<Inline>),

    /// Inline code
    Code(String),

    /// Link with content, URL, and optional title
    Link {
        content: Vec<Inline>,
        url: String,
        title: Option<String>,
    },

    /// Image with alt text, URL, and optional title
    Image {
        alt: String,
        url: String,
        title: Option<String>,
    },

    /// Hard line break
    LineBreak,
}

impl Block {
    /// Check if this block is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Block::Document(blocks) | Block::BlockQuote(blocks) => {
                blocks.iter().all(|b| b.is_blank())
            }
            Block::Paragraph(inlines) => inlines_are_blank(inlines),
            Block::Heading { content, .. } => inlines_are_blank(content),
            Block::List { items, .. } => items.iter().all(|i| i.is_blank()),
            Block::CodeBlock { code, .. } => code.trim().is_empty(),
            Block::Table(table) => table.is_blank(),
            Block::ThematicBreak => false,
        }
    }
}

impl Inline {
    /// Check if this inline is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text(text) | Inline::Verbatim(text) => text.trim().is_empty(),
            Inline::Strong(inlines) | Inline::Emphasis(inlines) | Inline::Underline(inlines) => {
                inlines_are_blank(inlines)
            }
            Inline::Code(code) => code.is_empty(),
            Inline::Link { content, .. } => inlines_are_blank(content),
            Inline::Image { .. } => false,
            Inline::LineBreak => true,
        }
    }
}

/// Whether a run of inlines renders to nothing but whitespace
pub fn inlines_are_blank(inlines: &[Inline]) -> bool {
    inlines.iter().all(Inline::is_blank)
}
