//! Tag categories and element classification tables.

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements that may be left open at end of input without an anomaly
pub const IMPLIED_END_ELEMENTS: &[&str] = &["html", "head", "body"];

/// Elements whose end tag may be omitted while a parent is still open
pub const OPTIONAL_END_ELEMENTS: &[&str] = &[
    "p", "li", "dt", "dd", "tr", "td", "th", "thead", "tbody", "tfoot",
    "option", "optgroup", "colgroup",
];

/// Block-level elements; a `<p>` is closed when one of these opens
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "dir", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main",
    "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Check if a tag holds raw text
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Check if a tag's end tag may be omitted
pub fn has_optional_end(tag: &str) -> bool {
    OPTIONAL_END_ELEMENTS.contains(&tag)
}

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// What the converter does with an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Heading(u8),
    Paragraph,
    Emphasis,
    Strong,
    Underline,
    Code,
    Pre,
    List { ordered: bool },
    ListItem,
    Table,
    TableSection,
    TableRow,
    TableCell { header: bool },
    Caption,
    BlockQuote,
    LineBreak,
    ThematicBreak,
    Anchor,
    Image,
    Title,
    /// Block-level element without Markdown syntax of its own
    Container,
    /// Element dropped together with its content
    Ignored,
    /// Inline element without Markdown syntax of its own
    Passthrough,
}

impl Tag {
    /// Classify a lowercase tag name
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "h6" => Tag::Heading(6),
            "p" => Tag::Paragraph,
            "em" | "i" | "cite" | "dfn" => Tag::Emphasis,
            "strong" | "b" => Tag::Strong,
            "u" => Tag::Underline,
            "code" | "kbd" | "samp" | "tt" => Tag::Code,
            "pre" => Tag::Pre,
            "ul" | "menu" | "dir" => Tag::List { ordered: false },
            "ol" => Tag::List { ordered: true },
            "li" => Tag::ListItem,
            "table" => Tag::Table,
            "thead" | "tbody" | "tfoot" => Tag::TableSection,
            "tr" => Tag::TableRow,
            "th" => Tag::TableCell { header: true },
            "td" => Tag::TableCell { header: false },
            "caption" => Tag::Caption,
            "blockquote" => Tag::BlockQuote,
            "br" => Tag::LineBreak,
            "hr" => Tag::ThematicBreak,
            "a" => Tag::Anchor,
            "img" => Tag::Image,
            "title" => Tag::Title,
            "" | "html" | "body" | "head" | "div" | "section" | "article" | "main"
            | "header" | "footer" | "aside" | "figure" | "figcaption" | "address"
            | "center" | "details" | "summary" | "dl" | "dt" | "dd" | "fieldset"
            | "form" | "hgroup" => Tag::Container,
            "script" | "style" | "noscript" | "template" | "meta" | "link" | "nav"
            | "base" | "iframe" | "object" | "svg" | "canvas" | "textarea" | "select"
            | "button" => Tag::Ignored,
            _ => Tag::Passthrough,
        }
    }

    /// Whether the element starts a new Markdown block
    pub fn is_block(self) -> bool {
        !matches!(
            self,
            Tag::Emphasis
                | Tag::Strong
                | Tag::Underline
                | Tag::Code
                | Tag::LineBreak
                | Tag::Anchor
                | Tag::Image
                | Tag::Passthrough
                | Tag::Ignored
        )
    }
}
