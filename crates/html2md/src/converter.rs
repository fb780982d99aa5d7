//! Converter - the main entry point for HTML to Markdown conversion.
//!
//! The converter walks the node tree once, dispatching each element on its
//! [`Tag`] category. Text runs go through the [`TextEmitter`]; structure is
//! collected into the Markdown AST, which the block formatter then renders.

use html2md_core::{
    inlines_are_blank, is_html_whitespace, serialize, Alignment, Block, EntityTable, Inline,
    ListItem, Options, Table, TextEmitter, TextMode,
};
use once_cell::unsync::OnceCell;

use crate::error::Anomaly;
use crate::html::{parse, Parsed};
use crate::node::{Element, Node};
use crate::tag::Tag;

/// Converts one HTML input to Markdown.
///
/// The converter owns its options and entity table. Entity table changes
/// take effect on the next [`convert`](Converter::convert) call.
///
/// ```rust
/// use html2md::Converter;
///
/// let mut converter = Converter::new("<h1>Hello</h1><p>&copy; 2024</p>");
/// converter.add_html_symbol_conversion("&copy;", "©");
///
/// assert_eq!(converter.convert(), "# Hello\n\n© 2024\n");
/// assert!(converter.ok());
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    html: String,
    options: Options,
    entities: EntityTable,
    /// The tree only depends on the input and the depth limit
    parsed: OnceCell<Parsed>,
    anomalies: Vec<Anomaly>,
}

impl Converter {
    /// Create a converter with default options
    pub fn new(html: impl Into<String>) -> Self {
        Self::with_options(html, Options::default())
    }

    /// Create a converter with custom options
    pub fn with_options(html: impl Into<String>, options: Options) -> Self {
        Self {
            html: html.into(),
            options,
            entities: EntityTable::new(),
            parsed: OnceCell::new(),
            anomalies: Vec::new(),
        }
    }

    /// Convert the input to Markdown.
    ///
    /// Always returns the fullest reconstruction it can; check
    /// [`ok`](Converter::ok) to learn whether the input needed repairs.
    pub fn convert(&mut self) -> String {
        let parsed = self
            .parsed
            .get_or_init(|| parse(&self.html, self.options.max_depth));

        let mut walker = Walker::new(&self.options, &self.entities);
        let document = walker.document(&parsed.root);
        let markdown = serialize(&document, &self.options);

        let mut anomalies = parsed.anomalies.clone();
        anomalies.extend(walker.anomalies);

        log::trace!(
            "converted {} bytes of HTML to {} bytes of Markdown, {} anomalies",
            self.html.len(),
            markdown.len(),
            anomalies.len()
        );

        self.anomalies = anomalies;
        markdown
    }

    /// Whether the most recent conversion needed no structural repairs
    pub fn ok(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Structural problems found by the most recent conversion
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Add or overwrite an entity conversion
    pub fn add_html_symbol_conversion(&mut self, spelling: &str, replacement: &str) -> &mut Self {
        self.entities.add(spelling, replacement);
        self
    }

    /// Remove an entity conversion; its spelling is then kept literally
    pub fn remove_html_symbol_conversion(&mut self, spelling: &str) -> &mut Self {
        self.entities.remove(spelling);
        self
    }

    /// Remove every entity conversion, including the defaults
    pub fn clear_html_symbol_conversions(&mut self) -> &mut Self {
        self.entities.clear();
        self
    }

    /// Get the options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get the entity table
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }
}

/// Convert HTML to Markdown with default options
pub fn convert(html: &str) -> String {
    Converter::new(html).convert()
}

/// Convert HTML to Markdown with custom options
pub fn convert_with_options(html: &str, options: &Options) -> String {
    Converter::with_options(html, options.clone()).convert()
}

/// Convert an already built node tree with the default entity table.
///
/// A nameless root element is treated as a fragment: only its children
/// are converted.
pub fn convert_node(node: &Node, options: &Options) -> String {
    let entities = EntityTable::new();
    let mut walker = Walker::new(options, &entities);
    let document = walker.document(node);
    serialize(&document, options)
}

struct Row {
    head: bool,
    cells: Vec<Cell>,
}

struct Cell {
    /// `th` rather than `td`
    header: bool,
    align: Alignment,
    content: Vec<Inline>,
}

/// Tree walk state for one conversion
struct Walker<'a> {
    options: &'a Options,
    emitter: TextEmitter<'a>,
    anomalies: Vec<Anomaly>,
    depth: usize,
    depth_exceeded: bool,
    /// Nothing has been emitted on the current line yet
    line_start: bool,
    /// The last emitted text ends in whitespace
    after_space: bool,
    /// A block element ended inside inline content
    pending_break: bool,
}

impl<'a> Walker<'a> {
    fn new(options: &'a Options, entities: &'a EntityTable) -> Self {
        Self {
            options,
            emitter: TextEmitter::new(options, entities),
            anomalies: Vec::new(),
            depth: 0,
            depth_exceeded: false,
            line_start: true,
            after_space: false,
            pending_break: false,
        }
    }

    fn record(&mut self, anomaly: Anomaly) {
        log::debug!("{}", anomaly);
        self.anomalies.push(anomaly);
    }

    fn document(&mut self, node: &Node) -> Block {
        let mut blocks = Vec::new();
        match node {
            Node::Element(root) if root.name.is_empty() => {
                self.collect_blocks(&root.children, &mut blocks)
            }
            _ => self.collect_blocks(std::slice::from_ref(node), &mut blocks),
        }
        log::trace!("built {} top-level blocks", blocks.len());
        Block::Document(blocks)
    }

    /// Run `f` one element deeper, or skip it past the depth limit
    fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth >= self.options.max_depth {
            if !self.depth_exceeded {
                self.depth_exceeded = true;
                log::warn!(
                    "element nesting exceeds {} levels, skipping deeper content",
                    self.options.max_depth
                );
                self.record(Anomaly::DepthLimitExceeded {
                    limit: self.options.max_depth,
                });
            }
            return None;
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }

    fn start_line(&mut self) {
        self.line_start = true;
        self.after_space = false;
        self.pending_break = false;
    }

    fn collect_blocks(&mut self, nodes: &[Node], out: &mut Vec<Block>) {
        let mut inlines = Vec::new();
        self.start_line();

        for node in nodes {
            match node {
                Node::Text(text) => self.push_text(text, &mut inlines),
                Node::Element(element) => {
                    let tag = match Tag::from_name(&element.name) {
                        Tag::Passthrough if has_block_child(element) => Tag::Container,
                        tag => tag,
                    };

                    if tag.is_block() {
                        self.flush_paragraph(&mut inlines, out);
                        self.descend(|w| w.block_element(element, tag, out));
                        self.start_line();
                    } else {
                        self.descend(|w| w.inline_element(element, tag, &mut inlines));
                    }
                }
            }
        }

        self.flush_paragraph(&mut inlines, out);
    }

    fn flush_paragraph(&mut self, inlines: &mut Vec<Inline>, out: &mut Vec<Block>) {
        if !inlines_are_blank(inlines) {
            out.push(Block::Paragraph(std::mem::take(inlines)));
        }
        inlines.clear();
        self.start_line();
    }

    fn block_element(&mut self, element: &Element, tag: Tag, out: &mut Vec<Block>) {
        match tag {
            Tag::Heading(level) => {
                let content = self.inline_content(&element.children);
                out.push(Block::Heading { level, content });
            }

            Tag::Paragraph
            | Tag::Container
            | Tag::ListItem
            | Tag::TableSection
            | Tag::TableRow
            | Tag::TableCell { .. }
            | Tag::Caption => self.collect_blocks(&element.children, out),

            Tag::BlockQuote => {
                let mut content = Vec::new();
                self.collect_blocks(&element.children, &mut content);
                out.push(Block::BlockQuote(content));
            }

            Tag::Pre => {
                let mut raw = String::new();
                self.raw_text(&element.children, &mut raw);
                out.push(Block::CodeBlock {
                    language: code_language(element),
                    code: self.emitter.emit(&raw, TextMode::Preformatted, false),
                });
            }

            Tag::List { ordered } => self.list(element, ordered, out),

            Tag::Table => self.table(element, out),

            Tag::ThematicBreak => out.push(Block::ThematicBreak),

            Tag::Title => {
                if self.options.include_title {
                    let content = self.inline_content(&element.children);
                    out.push(Block::Heading { level: 1, content });
                }
            }

            Tag::Emphasis
            | Tag::Strong
            | Tag::Underline
            | Tag::Code
            | Tag::LineBreak
            | Tag::Anchor
            | Tag::Image
            | Tag::Ignored
            | Tag::Passthrough => {
                let mut inlines = Vec::new();
                self.inline_element(element, tag, &mut inlines);
                self.flush_paragraph(&mut inlines, out);
            }
        }
    }

    fn inline_element(&mut self, element: &Element, tag: Tag, out: &mut Vec<Inline>) {
        match tag {
            Tag::Emphasis => {
                let content = self.nested_inlines(element, out);
                out.push(Inline::Emphasis(content));
            }

            Tag::Strong => {
                let content = self.nested_inlines(element, out);
                out.push(Inline::Strong(content));
            }

            Tag::Underline => {
                let content = self.nested_inlines(element, out);
                out.push(Inline::Underline(content));
            }

            Tag::Code => {
                let mut raw = String::new();
                self.raw_text(&element.children, &mut raw);
                let code = self.emitter.emit(&raw, TextMode::Code, false);
                let code = code.trim_matches(is_html_whitespace);
                if !code.is_empty() {
                    self.push_inline(Inline::Code(code.to_string()), out);
                }
            }

            Tag::LineBreak => {
                if self.options.compress_whitespace {
                    if let Some(Inline::Text(text)) = out.last_mut() {
                        let len = text.trim_end_matches(' ').len();
                        text.truncate(len);
                    }
                }
                out.push(Inline::LineBreak);
                self.start_line();
            }

            Tag::Anchor => {
                let content = self.nested_inlines(element, out);
                let url = element
                    .attr("href")
                    .map(|href| self.emitter.attribute(href))
                    .unwrap_or_default();
                let title = self.title_attr(element);
                out.push(Inline::Link {
                    content,
                    url,
                    title,
                });
            }

            Tag::Image => {
                let src = element
                    .attr("src")
                    .map(|src| self.emitter.attribute(src))
                    .filter(|src| !src.is_empty());
                let Some(url) = src else {
                    self.record(Anomaly::MissingAttribute {
                        tag: element.name.clone(),
                        attribute: "src".to_string(),
                    });
                    return;
                };

                let alt = element
                    .attr("alt")
                    .map(|alt| self.emitter.emit(alt, TextMode::Prose, true))
                    .unwrap_or_default();
                let image = Inline::Image {
                    alt: alt.trim_end_matches(is_html_whitespace).to_string(),
                    url,
                    title: self.title_attr(element),
                };
                self.push_inline(image, out);
            }

            Tag::Passthrough => self.collect_inlines(&element.children, out),

            Tag::Ignored => {}

            // Block structure inside inline content keeps only a line break
            Tag::ThematicBreak | Tag::Title => self.pending_break = true,

            Tag::Pre => {
                self.pending_break = true;
                self.inline_element(element, Tag::Code, out);
                self.pending_break = true;
            }

            Tag::Heading(_)
            | Tag::Paragraph
            | Tag::List { .. }
            | Tag::ListItem
            | Tag::Table
            | Tag::TableSection
            | Tag::TableRow
            | Tag::TableCell { .. }
            | Tag::Caption
            | Tag::BlockQuote
            | Tag::Container => {
                self.pending_break = true;
                self.collect_inlines(&element.children, out);
                self.pending_break = true;
            }
        }
    }

    fn collect_inlines(&mut self, nodes: &[Node], out: &mut Vec<Inline>) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_text(text, out),
                Node::Element(element) => {
                    let tag = Tag::from_name(&element.name);
                    self.descend(|w| w.inline_element(element, tag, out));
                }
            }
        }
    }

    /// Inline content of a block that starts on a fresh line
    fn inline_content(&mut self, nodes: &[Node]) -> Vec<Inline> {
        let mut content = Vec::new();
        self.start_line();
        self.collect_inlines(nodes, &mut content);
        self.start_line();
        content
    }

    /// Children of a delimited inline, after settling a pending break
    fn nested_inlines(&mut self, element: &Element, out: &mut Vec<Inline>) -> Vec<Inline> {
        self.settle_break(out);
        let mut content = Vec::new();
        self.collect_inlines(&element.children, &mut content);
        content
    }

    fn settle_break(&mut self, out: &mut Vec<Inline>) {
        if self.pending_break && !inlines_are_blank(out) {
            out.push(Inline::LineBreak);
            self.line_start = true;
            self.after_space = false;
        }
        self.pending_break = false;
    }

    fn push_inline(&mut self, inline: Inline, out: &mut Vec<Inline>) {
        self.settle_break(out);
        out.push(inline);
        self.line_start = false;
        self.after_space = false;
    }

    fn push_text(&mut self, raw: &str, out: &mut Vec<Inline>) {
        let breaking = self.pending_break && !inlines_are_blank(out);
        let trim = breaking
            || self.line_start
            || (self.options.compress_whitespace && self.after_space);

        let inlines = self.emitter.emit_inlines(raw, TextMode::Prose, trim);
        let Some(last) = inlines.last() else {
            return;
        };

        if breaking {
            out.push(Inline::LineBreak);
        }
        self.pending_break = false;
        self.line_start = false;
        // Entity replacements leave the whitespace state reset
        self.after_space = matches!(last, Inline::Text(text) if text.ends_with(is_html_whitespace));
        out.extend(inlines);
    }

    /// Unprocessed text of a subtree, with `<br>` as a newline
    fn raw_text(&mut self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => match Tag::from_name(&element.name) {
                    Tag::LineBreak => out.push('\n'),
                    Tag::Ignored => {}
                    _ => {
                        self.descend(|w| w.raw_text(&element.children, out));
                    }
                },
            }
        }
    }

    fn title_attr(&self, element: &Element) -> Option<String> {
        element
            .attr("title")
            .map(|title| self.emitter.attribute(title))
            .filter(|title| !title.is_empty())
    }

    fn list(&mut self, element: &Element, ordered: bool, out: &mut Vec<Block>) {
        let start = if ordered {
            element
                .attr("start")
                .and_then(|start| start.trim().parse::<i64>().ok())
                .unwrap_or(1)
        } else {
            1
        };

        let mut items: Vec<ListItem> = Vec::new();

        for node in &element.children {
            if let Node::Element(child) = node {
                if Tag::from_name(&child.name) == Tag::ListItem {
                    let mut content = Vec::new();
                    self.descend(|w| w.collect_blocks(&child.children, &mut content));
                    items.push(ListItem::new(content));
                    continue;
                }
            }

            // Anything else belongs to the preceding item
            let mut content = Vec::new();
            self.collect_blocks(std::slice::from_ref(node), &mut content);
            if content.is_empty() {
                continue;
            }
            match items.last_mut() {
                Some(item) => item.content.extend(content),
                None => items.push(ListItem::new(content)),
            }
        }

        if !items.is_empty() {
            out.push(Block::List {
                ordered,
                start,
                items,
            });
        }
    }

    fn table(&mut self, element: &Element, out: &mut Vec<Block>) {
        let mut caption = None;
        let mut rows = Vec::new();
        self.table_rows(element, false, &mut rows, &mut caption);

        if let Some(caption) = caption.filter(|c| !inlines_are_blank(c)) {
            out.push(Block::Paragraph(caption));
        }
        if rows.is_empty() {
            return;
        }

        if !self.options.format_table {
            for cell in rows.into_iter().flat_map(|row| row.cells) {
                if !inlines_are_blank(&cell.content) {
                    out.push(Block::Paragraph(cell.content));
                }
            }
            return;
        }

        // The first `thead` row, else the first row of `th` cells, else the first row
        let header_index = rows
            .iter()
            .position(|row| row.head)
            .or_else(|| {
                rows.iter()
                    .position(|row| row.cells.iter().all(|cell| cell.header))
            })
            .unwrap_or(0);
        let header = rows.remove(header_index);

        out.push(Block::Table(Table {
            alignments: header.cells.iter().map(|cell| cell.align).collect(),
            header: header.cells.into_iter().map(|cell| cell.content).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.cells.into_iter().map(|cell| cell.content).collect())
                .collect(),
        }));
    }

    fn table_rows(
        &mut self,
        element: &Element,
        head: bool,
        rows: &mut Vec<Row>,
        caption: &mut Option<Vec<Inline>>,
    ) {
        for child in element.element_children() {
            match Tag::from_name(&child.name) {
                Tag::Caption => {
                    if let Some(content) = self.descend(|w| w.inline_content(&child.children)) {
                        *caption = Some(content);
                    }
                }
                Tag::TableSection => {
                    let head = child.name == "thead";
                    self.descend(|w| w.table_rows(child, head, rows, caption));
                }
                Tag::TableRow => {
                    let cells = self
                        .descend(|w| w.table_cells(child))
                        .unwrap_or_default();
                    if !cells.is_empty() {
                        rows.push(Row { head, cells });
                    }
                }
                Tag::TableCell { header } => {
                    let Some(cell) = self.descend(|w| w.table_cell(child, header)) else {
                        continue;
                    };
                    match rows.last_mut() {
                        Some(row) => row.cells.push(cell),
                        None => rows.push(Row {
                            head,
                            cells: vec![cell],
                        }),
                    }
                }
                _ => {}
            }
        }
    }

    fn table_cells(&mut self, row: &Element) -> Vec<Cell> {
        let mut cells = Vec::new();
        for child in row.element_children() {
            if let Tag::TableCell { header } = Tag::from_name(&child.name) {
                if let Some(cell) = self.descend(|w| w.table_cell(child, header)) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    fn table_cell(&mut self, cell: &Element, header: bool) -> Cell {
        Cell {
            header,
            align: Alignment::from_attr(cell.attr("align")),
            content: self.inline_content(&cell.children),
        }
    }
}

fn has_block_child(element: &Element) -> bool {
    element
        .element_children()
        .any(|child| Tag::from_name(&child.name).is_block())
}

/// `language-x` or `lang-x` class on the inner `<code>` or the `<pre>` itself
fn code_language(pre: &Element) -> Option<String> {
    let class = pre
        .element_children()
        .find(|child| child.name == "code")
        .and_then(|code| code.attr("class"))
        .or_else(|| pre.attr("class"))?;

    class
        .split_ascii_whitespace()
        .find_map(|name| {
            name.strip_prefix("language-")
                .or_else(|| name.strip_prefix("lang-"))
        })
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}
