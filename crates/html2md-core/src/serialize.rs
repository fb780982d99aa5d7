//! Markdown AST serialization
//!
//! [`BlockFormatter`] renders blocks bottom-up: each block is rendered to a
//! string first and its container then prefixes the lines (quote markers,
//! list indentation). The formatter tracks how many columns those prefixes
//! take so paragraph wrapping can account for them.
//!
//! [`Inline::Verbatim`] text is bracketed by two noncharacters while the
//! document is laid out. Trimming stops at them, line-start escaping and
//! wrapping step around them, and [`BlockFormatter::format`] removes them
//! last.

use std::borrow::Cow;

use crate::ast::{Alignment, Block, Inline, ListItem, Table};
use crate::options::Options;
use crate::text::{escape_line_start, starts_block_marker};
use crate::wrap::wrap_line;

/// Indentation unit for list item content and nested lists
const LIST_INDENT: usize = 4;

/// Opens verbatim text during layout
pub(crate) const VERBATIM_OPEN: char = '\u{FDD0}';
/// Closes verbatim text during layout
pub(crate) const VERBATIM_CLOSE: char = '\u{FDD1}';

pub(crate) fn is_verbatim_marker(c: char) -> bool {
    c == VERBATIM_OPEN || c == VERBATIM_CLOSE
}

/// Serialize a block to a Markdown string.
///
/// Non-empty output ends with exactly one newline, unless verbatim text
/// at the very end brings newlines of its own.
pub fn serialize(block: &Block, options: &Options) -> String {
    BlockFormatter::new(options).format(block)
}

/// Where inline content is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineContext {
    Paragraph,
    Heading,
    TableCell,
}

/// Stateful block emitter
pub struct BlockFormatter<'a> {
    options: &'a Options,
    /// Columns taken by enclosing quote markers and list indentation
    prefix_width: usize,
}

impl<'a> BlockFormatter<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            prefix_width: 0,
        }
    }

    /// Render a whole document
    pub fn format(&mut self, block: &Block) -> String {
        let mut output = self.render_block(block);

        if self.options.force_left_trim {
            output = left_trim_lines(&output);
        }

        let trimmed_len = output.trim_end().len();
        output.truncate(trimmed_len);
        output.retain(|c| !is_verbatim_marker(c));
        if !output.is_empty() {
            output.push('\n');
        }
        output
    }

    fn render_block(&mut self, block: &Block) -> String {
        match block {
            Block::Document(blocks) => self.render_blocks(blocks),

            Block::Heading { level, content } => self.render_heading(*level, content),

            Block::Paragraph(inlines) => self.render_paragraph(inlines),

            Block::BlockQuote(blocks) => {
                self.prefix_width += 2;
                let content = self.render_blocks(blocks);
                self.prefix_width -= 2;

                if content.is_empty() {
                    return String::new();
                }

                content
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }

            Block::List {
                ordered,
                start,
                items,
            } => self.render_list(*ordered, *start, items),

            Block::CodeBlock { language, code } => render_code_block(language.as_deref(), code),

            Block::ThematicBreak => "---".to_string(),

            Block::Table(table) => self.render_table(table),
        }
    }

    /// Render blocks separated by blank lines, skipping empty ones
    fn render_blocks(&mut self, blocks: &[Block]) -> String {
        let mut rendered = Vec::with_capacity(blocks.len());

        for block in blocks {
            if block.is_blank() {
                continue;
            }
            let text = self.render_block(block);
            if !text.is_empty() {
                rendered.push(text);
            }
        }

        rendered.join("\n\n")
    }

    fn render_heading(&mut self, level: u8, content: &[Inline]) -> String {
        let text = render_inlines(content, InlineContext::Heading);
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        format!("{} {}", "#".repeat(level.clamp(1, 6) as usize), text)
    }

    fn render_paragraph(&mut self, inlines: &[Inline]) -> String {
        let text = render_inlines(inlines, InlineContext::Paragraph);
        let text = text.trim_matches(|c: char| c.is_ascii_whitespace());

        if text.is_empty() {
            return String::new();
        }

        let wrap = self.options.wrap_widths();
        let mut lines = Vec::new();

        for line in split_outside_verbatim(text) {
            // Keep a hard break's trailing spaces out of the wrapping
            let body = line.trim_end_matches(' ');
            let hard_break = &line[body.len()..];

            let body = escape_paragraph_line(body, self.options.escape_numbered_list);
            let body = match wrap {
                Some((soft, hard)) => wrap_line(&body, self.prefix_width, soft, hard),
                None => body.into_owned(),
            };

            lines.push(format!("{}{}", body, hard_break));
        }

        lines.join("\n")
    }

    fn render_list(&mut self, ordered: bool, start: i64, items: &[ListItem]) -> String {
        let mut rendered = Vec::with_capacity(items.len());
        // Markdown list numbers cannot be negative
        let start = start.max(0);

        for (i, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}{} ", start.saturating_add(i as i64), self.options.ordered_list)
            } else {
                format!("{} ", self.options.unordered_list)
            };
            let indent = marker.chars().count().max(LIST_INDENT);

            self.prefix_width += indent;
            let content = self.render_list_item(item);
            self.prefix_width -= indent;

            let mut text = String::with_capacity(marker.len() + content.len());
            for (n, line) in content.lines().enumerate() {
                if n == 0 {
                    text.push_str(&marker);
                } else {
                    text.push('\n');
                    if !line.is_empty() {
                        text.push_str(&" ".repeat(indent));
                    }
                }
                text.push_str(line);
            }
            if content.is_empty() {
                text.push_str(marker.trim_end());
            }

            rendered.push(text);
        }

        rendered.join("\n")
    }

    fn render_list_item(&mut self, item: &ListItem) -> String {
        let mut text = String::new();
        let mut previous: Option<&Block> = None;

        for block in &item.content {
            if block.is_blank() {
                continue;
            }
            let rendered = self.render_block(block);
            if rendered.is_empty() {
                continue;
            }

            if let Some(prev) = previous {
                // A list right after the item's text stays tight
                let tight = matches!(prev, Block::Paragraph(_)) && matches!(block, Block::List { .. });
                text.push_str(if tight { "\n" } else { "\n\n" });
            }
            text.push_str(&rendered);
            previous = Some(block);
        }

        text
    }

    fn render_table(&mut self, table: &Table) -> String {
        let columns = table.column_count();
        if columns == 0 {
            return String::new();
        }

        let mut lines = Vec::with_capacity(table.rows.len() + 2);
        lines.push(table_row(&table.header, columns));

        let separator: Vec<&str> = (0..columns)
            .map(|i| match table.alignments.get(i).copied().unwrap_or_default() {
                Alignment::None => "---",
                Alignment::Left => ":---",
                Alignment::Center => ":---:",
                Alignment::Right => "---:",
            })
            .collect();
        lines.push(format!("| {} |", separator.join(" | ")));

        for row in &table.rows {
            lines.push(table_row(row, columns));
        }

        lines.join("\n")
    }
}

/// One `| a | b |` line, padded with empty cells up to `columns`
fn table_row(cells: &[Vec<Inline>], columns: usize) -> String {
    let rendered: Vec<String> = (0..columns)
        .map(|i| {
            cells
                .get(i)
                .map(|cell| {
                    render_inlines(cell, InlineContext::TableCell)
                        .trim()
                        .replace('|', "\\|")
                })
                .unwrap_or_default()
        })
        .collect();

    format!("| {} |", rendered.join(" | "))
}

/// Split a paragraph into lines at newlines outside verbatim text
fn split_outside_verbatim(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut verbatim = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            VERBATIM_OPEN => verbatim = true,
            VERBATIM_CLOSE => verbatim = false,
            '\n' if !verbatim => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    lines.push(&text[start..]);
    lines
}

/// Escape block syntax at the start of a paragraph line.
///
/// Verbatim text is never altered: a leading backslash may precede it, but
/// a numbered-list escape only lands in literal text before it.
fn escape_paragraph_line(line: &str, escape_numbered: bool) -> Cow<'_, str> {
    let Some(split) = line.find(VERBATIM_OPEN) else {
        return escape_line_start(line, escape_numbered);
    };

    let plain: String = line.chars().filter(|c| !is_verbatim_marker(*c)).collect();
    if starts_block_marker(&plain) {
        return Cow::Owned(format!("\\{}", line));
    }

    let (literal, verbatim) = line.split_at(split);
    match escape_line_start(literal, escape_numbered) {
        Cow::Owned(escaped) => Cow::Owned(escaped + verbatim),
        Cow::Borrowed(_) => Cow::Borrowed(line),
    }
}

fn render_code_block(language: Option<&str>, code: &str) -> String {
    let code = code.trim_end_matches(['\n', '\r']);
    let code = code.strip_prefix('\n').unwrap_or(code);
    let fence = "`".repeat((longest_run(code, '`') + 1).max(3));

    format!("{}{}\n{}\n{}", fence, language.unwrap_or(""), code, fence)
}

fn render_inlines(inlines: &[Inline], context: InlineContext) -> String {
    let mut out = String::new();
    for inline in inlines {
        render_inline(inline, context, &mut out);
    }
    out
}

fn render_inline(inline: &Inline, context: InlineContext, out: &mut String) {
    match inline {
        Inline::Text(text) => {
            if context == InlineContext::Paragraph {
                push_plain(text, out);
            } else {
                push_plain(&text.replace(['\n', '\r'], " "), out);
            }
        }

        Inline::Verbatim(text) => {
            out.push(VERBATIM_OPEN);
            push_plain(text, out);
            out.push(VERBATIM_CLOSE);
        }

        Inline::Strong(content) => wrap_delimited(content, "**", "**", context, out),

        Inline::Emphasis(content) => wrap_delimited(content, "*", "*", context, out),

        Inline::Underline(content) => wrap_delimited(content, "<u>", "</u>", context, out),

        Inline::Code(code) => {
            if code.is_empty() {
                return;
            }
            let backticks = "`".repeat(longest_run(code, '`') + 1);
            let space = if code.starts_with('`') || code.ends_with('`') {
                " "
            } else {
                ""
            };
            out.push_str(&backticks);
            out.push_str(space);
            push_plain(code, out);
            out.push_str(space);
            out.push_str(&backticks);
        }

        Inline::Link {
            content,
            url,
            title,
        } => {
            let text = render_inlines(content, context);
            if text.trim().is_empty() {
                return;
            }
            if url.is_empty() {
                out.push_str(&text);
                return;
            }
            out.push('[');
            out.push_str(text.trim());
            out.push_str("](");
            push_destination(url, title.as_deref(), out);
            out.push(')');
        }

        Inline::Image { alt, url, title } => {
            out.push_str("![");
            push_plain(alt, out);
            out.push_str("](");
            push_destination(url, title.as_deref(), out);
            out.push(')');
        }

        Inline::LineBreak => match context {
            InlineContext::Paragraph => out.push_str("  \n"),
            InlineContext::Heading => out.push(' '),
            InlineContext::TableCell => out.push_str("<br>"),
        },
    }
}

/// Surround content with delimiters, keeping edge whitespace outside them
fn wrap_delimited(
    content: &[Inline],
    open: &str,
    close: &str,
    context: InlineContext,
    out: &mut String,
) {
    let inner = render_inlines(content, context);
    let core = inner.trim();
    if core.is_empty() {
        out.push_str(if inner.is_empty() { "" } else { " " });
        return;
    }

    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];

    out.push_str(collapse_edge(leading));
    out.push_str(open);
    out.push_str(core);
    out.push_str(close);
    out.push_str(collapse_edge(trailing));
}

fn collapse_edge(whitespace: &str) -> &str {
    if whitespace.is_empty() {
        ""
    } else if whitespace.contains('\n') && whitespace.ends_with("  \n") {
        "  \n"
    } else {
        " "
    }
}

/// Push text that must not carry layout markers of its own
fn push_plain(text: &str, out: &mut String) {
    out.extend(text.chars().filter(|c| !is_verbatim_marker(*c)));
}

fn push_destination(url: &str, title: Option<&str>, out: &mut String) {
    for c in url.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            c if is_verbatim_marker(c) => {}
            c => out.push(c),
        }
    }
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        out.push_str(" \"");
        push_plain(&title.replace('"', "\\\""), out);
        out.push('"');
    }
}

fn longest_run(text: &str, needle: char) -> usize {
    text.chars()
        .fold((0, 0), |(max, current), c| {
            if c == needle {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

/// Strip leading whitespace from every line outside fenced code
fn left_trim_lines(text: &str) -> String {
    let mut in_fence = false;
    let mut lines = Vec::new();

    for line in text.split('\n') {
        let trimmed = line.trim_start();
        let is_fence = trimmed.starts_with("```");

        if in_fence && !is_fence {
            lines.push(line);
        } else {
            lines.push(trimmed);
        }
        if is_fence {
            in_fence = !in_fence;
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn default_options() -> Options {
        Options::default()
    }

    #[test]
    fn test_paragraph() {
        let block = Block::Paragraph(vec![text("Hello World")]);
        assert_eq!(serialize(&block, &default_options()), "Hello World\n");
    }

    #[test]
    fn test_empty_document() {
        let block = Block::Document(vec![Block::Paragraph(vec![text("  ")])]);
        assert_eq!(serialize(&block, &default_options()), "");
    }

    #[test]
    fn test_heading_atx() {
        let block = Block::Heading {
            level: 3,
            content: vec![text("Section")],
        };
        assert_eq!(serialize(&block, &default_options()), "### Section\n");
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let block = Block::Document(vec![
            Block::Heading {
                level: 1,
                content: vec![text("Title")],
            },
            Block::Paragraph(vec![text("Body")]),
            Block::ThematicBreak,
        ]);
        assert_eq!(serialize(&block, &default_options()), "# Title\n\nBody\n\n---\n");
    }

    #[test]
    fn test_strong_and_emphasis_nesting() {
        let block = Block::Paragraph(vec![Inline::Strong(vec![
            text("bold "),
            Inline::Emphasis(vec![text("both")]),
        ])]);
        assert_eq!(serialize(&block, &default_options()), "**bold *both***\n");
    }

    #[test]
    fn test_edge_whitespace_moves_outside_delimiters() {
        let block = Block::Paragraph(vec![
            text("a"),
            Inline::Strong(vec![text(" b ")]),
            text("c"),
        ]);
        assert_eq!(serialize(&block, &default_options()), "a **b** c\n");
    }

    #[test]
    fn test_hard_break() {
        let block = Block::Paragraph(vec![text("4."), Inline::LineBreak, text("Next")]);
        assert_eq!(serialize(&block, &default_options()), "4\\.  \nNext\n");

        let options = Options {
            escape_numbered_list: false,
            ..Default::default()
        };
        assert_eq!(serialize(&block, &options), "4.  \nNext\n");
    }

    #[test]
    fn test_inline_code_with_backticks() {
        let block = Block::Paragraph(vec![Inline::Code("a`b".to_string())]);
        assert_eq!(serialize(&block, &default_options()), "``a`b``\n");
    }

    #[test]
    fn test_link_and_image() {
        let block = Block::Paragraph(vec![
            Inline::Link {
                content: vec![text("Example")],
                url: "https://example.com/a b".to_string(),
                title: Some("Say \"hi\"".to_string()),
            },
            text(" "),
            Inline::Image {
                alt: "Alt".to_string(),
                url: "i.png".to_string(),
                title: None,
            },
        ]);
        assert_eq!(
            serialize(&block, &default_options()),
            "[Example](https://example.com/a%20b \"Say \\\"hi\\\"\") ![Alt](i.png)\n"
        );
    }

    #[test]
    fn test_blank_link_dropped() {
        let block = Block::Paragraph(vec![
            text("x"),
            Inline::Link {
                content: vec![text(" ")],
                url: "u".to_string(),
                title: None,
            },
        ]);
        assert_eq!(serialize(&block, &default_options()), "x\n");
    }

    #[test]
    fn test_code_block() {
        let block = Block::CodeBlock {
            language: Some("rust".to_string()),
            code: "let x = 1;\n".to_string(),
        };
        assert_eq!(
            serialize(&block, &default_options()),
            "```rust\nlet x = 1;\n```\n"
        );
    }

    #[test]
    fn test_blockquote_nesting() {
        let block = Block::BlockQuote(vec![
            Block::Paragraph(vec![text("Outer")]),
            Block::BlockQuote(vec![Block::Paragraph(vec![text("Inner")])]),
        ]);
        assert_eq!(
            serialize(&block, &default_options()),
            "> Outer\n>\n> > Inner\n"
        );
    }

    #[test]
    fn test_unordered_list_marker() {
        let options = Options {
            unordered_list: '*',
            ..Default::default()
        };
        let block = Block::List {
            ordered: false,
            start: 1,
            items: vec![
                ListItem::from_inlines(vec![text("First")]),
                ListItem::from_inlines(vec![text("Second")]),
            ],
        };
        assert_eq!(serialize(&block, &options), "* First\n* Second\n");
    }

    #[test]
    fn test_ordered_list_with_start_and_delimiter() {
        let options = Options {
            ordered_list: ')',
            ..Default::default()
        };
        let block = Block::List {
            ordered: true,
            start: 3,
            items: vec![
                ListItem::from_inlines(vec![text("Three")]),
                ListItem::from_inlines(vec![text("Four")]),
            ],
        };
        assert_eq!(serialize(&block, &options), "3) Three\n4) Four\n");
    }

    #[test]
    fn test_nested_list_indent() {
        let inner = Block::List {
            ordered: true,
            start: 1,
            items: vec![ListItem::from_inlines(vec![text("Inner")])],
        };
        let block = Block::List {
            ordered: false,
            start: 1,
            items: vec![
                ListItem::new(vec![Block::Paragraph(vec![text("Outer")]), inner]),
                ListItem::from_inlines(vec![text("Next")]),
            ],
        };
        assert_eq!(
            serialize(&block, &default_options()),
            "- Outer\n    1. Inner\n- Next\n"
        );
    }

    #[test]
    fn test_table_with_ragged_rows() {
        let block = Block::Table(Table {
            alignments: vec![Alignment::None, Alignment::Right],
            header: vec![vec![text("A")], vec![text("B")]],
            rows: vec![vec![vec![text("1")]], vec![vec![text("x|y")], vec![text("2")]]],
        });
        assert_eq!(
            serialize(&block, &default_options()),
            "| A | B |\n| --- | ---: |\n| 1 |  |\n| x\\|y | 2 |\n"
        );
    }

    #[test]
    fn test_table_cell_line_break() {
        let block = Block::Table(Table {
            alignments: vec![],
            header: vec![vec![text("a"), Inline::LineBreak, text("b")]],
            rows: vec![],
        });
        assert_eq!(
            serialize(&block, &default_options()),
            "| a<br>b |\n| --- |\n"
        );
    }

    #[test]
    fn test_paragraph_wrapping() {
        let options = Options {
            soft_break: 10,
            hard_break: 15,
            ..Default::default()
        };
        let block = Block::Paragraph(vec![text("one two three four five")]);
        assert_eq!(serialize(&block, &options), "one two three\nfour five\n");

        let options = Options {
            split_lines: false,
            ..options
        };
        assert_eq!(serialize(&block, &options), "one two three four five\n");
    }

    #[test]
    fn test_line_start_escaping() {
        let block = Block::Paragraph(vec![text("# not heading")]);
        assert_eq!(serialize(&block, &default_options()), "\\# not heading\n");
    }

    #[test]
    fn test_line_start_tilde_fence_and_paren_number() {
        let block = Block::Document(vec![
            Block::Paragraph(vec![text("~~~")]),
            Block::Paragraph(vec![text("1) x")]),
        ]);
        assert_eq!(serialize(&block, &default_options()), "\\~~~\n\n1\\) x\n");
    }

    fn verbatim(s: &str) -> Inline {
        Inline::Verbatim(s.to_string())
    }

    #[test]
    fn test_verbatim_is_not_escaped_or_trimmed() {
        let block = Block::Document(vec![
            Block::Paragraph(vec![verbatim("1. x"), text(" done")]),
            Block::Paragraph(vec![text("x"), verbatim("\t")]),
            Block::Paragraph(vec![verbatim(" *y* ")]),
        ]);
        assert_eq!(
            serialize(&block, &default_options()),
            "1. x done\n\nx\t\n\n *y* \n"
        );
    }

    #[test]
    fn test_verbatim_block_marker_gets_leading_backslash() {
        let block = Block::Paragraph(vec![verbatim(">"), text(" quoted")]);
        assert_eq!(serialize(&block, &default_options()), "\\> quoted\n");
    }

    #[test]
    fn test_verbatim_not_wrapped() {
        let options = Options {
            soft_break: 10,
            hard_break: 12,
            ..Default::default()
        };
        let block = Block::Paragraph(vec![
            text("one two "),
            verbatim("Jane Q Public"),
            text(" tail"),
        ]);
        assert_eq!(serialize(&block, &options), "one two\nJane Q Public\ntail\n");
    }

    #[test]
    fn test_negative_list_start_renders_from_zero() {
        let block = Block::List {
            ordered: true,
            start: -2,
            items: vec![
                ListItem::from_inlines(vec![text("a")]),
                ListItem::from_inlines(vec![text("b")]),
            ],
        };
        assert_eq!(serialize(&block, &default_options()), "0. a\n1. b\n");
    }

    #[test]
    fn test_force_left_trim() {
        let options = Options {
            force_left_trim: true,
            ..Default::default()
        };
        let block = Block::Document(vec![
            Block::List {
                ordered: false,
                start: 1,
                items: vec![ListItem::new(vec![
                    Block::Paragraph(vec![text("a")]),
                    Block::Paragraph(vec![text("b")]),
                ])],
            },
            Block::CodeBlock {
                language: None,
                code: "  keep".to_string(),
            },
        ]);
        assert_eq!(serialize(&block, &options), "- a\n\nb\n\n```\n  keep\n```\n");
    }
}
