//! html2md-core - Markdown AST, text emission and block formatting
//!
//! This crate holds everything on the Markdown side of the conversion:
//! the options, the entity table, the text emitter that escapes and
//! normalizes text runs, the Markdown AST, and the block formatter that
//! serializes it. The `html2md` crate builds the AST from HTML.
//!
//! # Architecture
//!
//! ```text
//!               ┌─────────────┐   ┌──────────────┐
//! HTML text ──▶ │ TextEmitter │──▶│              │
//!               └─────────────┘   │ Markdown AST │ ──BlockFormatter──▶ Markdown String
//! HTML tags ─────────────────────▶│              │
//!                                 └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use html2md_core::{serialize, Block, Inline, Options};
//!
//! let ast = Block::Document(vec![
//!     Block::Heading {
//!         level: 1,
//!         content: vec![Inline::Text("Hello World".to_string())],
//!     },
//!     Block::Paragraph(vec![
//!         Inline::Text("This is ".to_string()),
//!         Inline::Strong(vec![Inline::Text("bold".to_string())]),
//!         Inline::Text(" text.".to_string()),
//!     ]),
//! ]);
//!
//! let markdown = serialize(&ast, &Options::default());
//! assert_eq!(markdown, "# Hello World\n\nThis is **bold** text.\n");
//! ```

mod ast;
mod entities;
mod options;
mod serialize;
mod text;
mod wrap;

pub use ast::{inlines_are_blank, Alignment, Block, Inline, ListItem, Table};
pub use entities::{EntityTable, Piece, DEFAULT_CONVERSIONS};
pub use options::{Options, OptionsError, DEFAULT_MAX_DEPTH};
pub use serialize::{serialize, BlockFormatter};
pub use text::{
    escape_line_start, is_html_whitespace, starts_block_marker, starts_block_syntax, TextEmitter,
    TextMode,
};
pub use wrap::wrap_line;
