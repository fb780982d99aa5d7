//! # html2md
//!
//! Convert HTML documents and fragments to Markdown.
//!
//! The input is parsed by a small tolerant parser that repairs broken
//! markup instead of rejecting it. Every repair is recorded as an
//! [`Anomaly`]; a conversion always produces output, and
//! [`Converter::ok`] tells whether any repair was needed.
//!
//! ## Design
//!
//! - **html2md-core** holds the Markdown side: [`Options`], the
//!   [`EntityTable`], the [`TextEmitter`], the Markdown AST and the
//!   [`BlockFormatter`].
//! - **html2md** (this crate) parses HTML into [`Node`]s and walks them,
//!   dispatching each element on its [`Tag`] category.
//!
//! Callers that already have a DOM can build the [`Node`] tree directly
//! and use [`convert_node`].
//!
//! ## Example
//!
//! ```rust
//! use html2md::{convert, convert_with_options, Options};
//!
//! assert_eq!(convert("<h1>Hello World</h1>"), "# Hello World\n");
//!
//! let options = Options {
//!     unordered_list: '*',
//!     ..Default::default()
//! };
//! let markdown = convert_with_options("<ul><li>First</li><li>Second</li></ul>", &options);
//! assert_eq!(markdown, "* First\n* Second\n");
//! ```
//!
//! ## Example (Converter)
//!
//! ```rust
//! use html2md::{Anomaly, Converter};
//!
//! let mut converter = Converter::new("<p>Unclosed paragraph");
//! assert_eq!(converter.convert(), "Unclosed paragraph\n");
//! assert!(!converter.ok());
//! assert_eq!(
//!     converter.anomalies(),
//!     &[Anomaly::UnclosedTag { tag: "p".to_string() }]
//! );
//! ```

mod converter;
mod error;
pub mod html;
pub mod node;
pub mod tag;

pub use converter::{convert, convert_node, convert_with_options, Converter};
pub use error::Anomaly;
pub use html::{parse, parse_html, Parsed};
pub use node::{Attributes, Element, Node};
pub use tag::Tag;

pub use html2md_core::{
    serialize, Alignment, Block, BlockFormatter, EntityTable, Inline, ListItem, Options,
    OptionsError, Table, TextEmitter, TextMode, DEFAULT_CONVERSIONS, DEFAULT_MAX_DEPTH,
};
