//! Tolerant HTML parsing.
//!
//! A small tokenizer and tree builder that turn HTML text into the
//! [`Node`] structure used by the converter. It is not an HTML5 parser:
//! it knows void elements, raw-text elements and the common optional end
//! tags, and records everything else that looks wrong as an [`Anomaly`]
//! instead of failing.

use std::collections::BTreeMap;

use crate::error::Anomaly;
use crate::node::{Element, Node};
use crate::tag::{has_optional_end, is_block, is_raw_text, is_void, IMPLIED_END_ELEMENTS};

/// Result of parsing: the tree and what had to be repaired to build it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub root: Node,
    pub anomalies: Vec<Anomaly>,
}

/// Parse an HTML string into a Node tree.
///
/// The root is a nameless fragment element. Elements nested deeper than
/// `max_depth` are flattened into their ancestor at the limit.
///
/// # Example
///
/// ```rust
/// use html2md::parse;
///
/// let parsed = parse("<p>Hello <em>World</em>", 512);
/// assert_eq!(parsed.root.children()[0].tag_name(), Some("p"));
/// assert_eq!(parsed.anomalies.len(), 1);
/// ```
pub fn parse(html: &str, max_depth: usize) -> Parsed {
    let mut builder = TreeBuilder::new(max_depth);

    for token in Tokenizer::new(html) {
        match token {
            Token::Text(text) => builder.text(text),
            Token::StartTag {
                element,
                self_closing,
            } => builder.start(element, self_closing),
            Token::EndTag { name } => builder.end(&name),
            Token::Malformed { offset } => builder.record(Anomaly::MalformedTag { offset }),
        }
    }

    let parsed = builder.finish();
    log::trace!(
        "parsed {} bytes of HTML with {} anomalies",
        html.len(),
        parsed.anomalies.len()
    );
    parsed
}

/// Parse an HTML string into a Node tree, discarding anomalies.
///
/// ```rust
/// use html2md::{convert_node, parse_html, Options};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
/// let markdown = convert_node(&node, &Options::default());
/// assert_eq!(markdown, "# Hello *World*\n");
/// ```
pub fn parse_html(html: &str) -> Node {
    parse(html, html2md_core::DEFAULT_MAX_DEPTH).root
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    StartTag { element: Element, self_closing: bool },
    EndTag { name: String },
    Malformed { offset: usize },
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Open raw-text element whose end tag ends the current text
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
        }
    }

    fn start_tag(&mut self, start: usize) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let name_end = scan(bytes, start + 1, |b| !is_space(b) && b != b'/' && b != b'>');
        let mut element = Element::new(&self.input[start + 1..name_end]);
        let mut self_closing = false;
        let mut i = name_end;

        loop {
            i = scan(bytes, i, is_space);
            match bytes.get(i) {
                None => return self.malformed(start),
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    i += 1;
                    self_closing = bytes.get(i) == Some(&b'>');
                    continue;
                }
                Some(_) => {}
            }

            let attr_end = scan(bytes, i, |b| !is_space(b) && !matches!(b, b'/' | b'>' | b'='));
            if attr_end == i {
                // Stray `=`
                i += 1;
                continue;
            }
            let attr_name = &self.input[i..attr_end];

            i = scan(bytes, attr_end, is_space);
            let mut value = "";
            if bytes.get(i) == Some(&b'=') {
                i = scan(bytes, i + 1, is_space);
                match bytes.get(i) {
                    Some(&quote @ (b'"' | b'\'')) => {
                        let Some(len) = self.input[i + 1..].find(quote as char) else {
                            return self.malformed(start);
                        };
                        value = &self.input[i + 1..i + 1 + len];
                        i += len + 2;
                    }
                    Some(_) => {
                        let end = scan(bytes, i, |b| !is_space(b) && b != b'>');
                        value = &self.input[i..end];
                        i = end;
                    }
                    None => return self.malformed(start),
                }
            }

            element.set_attr(attr_name, value);
        }

        self.pos = i;
        if !self_closing && is_raw_text(&element.name) {
            self.raw_text = Some(element.name.clone());
        }

        Token::StartTag {
            element,
            self_closing,
        }
    }

    fn end_tag(&mut self, start: usize) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let name_end = scan(bytes, start + 2, |b| !is_space(b) && b != b'/' && b != b'>');
        let name = self.input[start + 2..name_end].to_ascii_lowercase();

        match self.input[name_end..].find('>') {
            Some(len) => {
                self.pos = name_end + len + 1;
                Token::EndTag { name }
            }
            None => self.malformed(start),
        }
    }

    /// Skip past `terminator`; `false` if the input ends first
    fn skip_past(&mut self, from: usize, terminator: &str) -> bool {
        match self.input[from..].find(terminator) {
            Some(len) => {
                self.pos = from + len + terminator.len();
                true
            }
            None => {
                self.pos = self.input.len();
                false
            }
        }
    }

    /// The rest of the input cannot be tokenized
    fn malformed(&mut self, start: usize) -> Token<'a> {
        self.pos = self.input.len();
        Token::Malformed { offset: start }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let start = self.pos;
            let rest = self.input.get(start..).filter(|r| !r.is_empty())?;

            if let Some(name) = self.raw_text.take() {
                let end = find_end_tag(rest, &name).unwrap_or(rest.len());
                if end > 0 {
                    self.pos += end;
                    return Some(Token::Text(&rest[..end]));
                }
            }

            let bytes = rest.as_bytes();
            if bytes[0] != b'<' {
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                return Some(Token::Text(&rest[..end]));
            }

            match bytes.get(1) {
                Some(b'!') if rest.starts_with("<!--") => {
                    if !self.skip_past(start + 4, "-->") {
                        return Some(Token::Malformed { offset: start });
                    }
                }
                Some(b'!') | Some(b'?') => {
                    if !self.skip_past(start + 2, ">") {
                        return Some(Token::Malformed { offset: start });
                    }
                }
                Some(b'/') if bytes.get(2).is_some_and(u8::is_ascii_alphabetic) => {
                    return Some(self.end_tag(start));
                }
                Some(c) if c.is_ascii_alphabetic() => return Some(self.start_tag(start)),
                _ => {
                    self.pos += 1;
                    return Some(Token::Text(&rest[..1]));
                }
            }
        }
    }
}

/// Byte offset of `</name` closing a raw-text element
fn find_end_tag(rest: &str, name: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut from = 0;

    while let Some(len) = rest[from..].find("</") {
        let at = from + len;
        let name_start = at + 2;
        let name_end = name_start + name.len();

        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|n| n.eq_ignore_ascii_case(name.as_bytes()));
        let terminated = bytes
            .get(name_end)
            .map_or(true, |&b| is_space(b) || b == b'/' || b == b'>');

        if matches_name && terminated {
            return Some(at);
        }
        from = name_start;
    }

    None
}

/// First index at or after `from` whose byte fails `keep`
fn scan(bytes: &[u8], from: usize, keep: impl Fn(u8) -> bool) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|&b| !keep(b)))
        .map_or(bytes.len(), |len| from + len)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

struct TreeBuilder {
    /// Open elements; index 0 is the fragment root
    stack: Vec<Element>,
    /// Open counts of elements flattened past the depth limit, by name
    flattened: BTreeMap<String, usize>,
    max_depth: usize,
    depth_exceeded: bool,
    anomalies: Vec<Anomaly>,
}

impl TreeBuilder {
    fn new(max_depth: usize) -> Self {
        Self {
            stack: vec![Element::default()],
            flattened: BTreeMap::new(),
            max_depth,
            depth_exceeded: false,
            anomalies: Vec::new(),
        }
    }

    fn record(&mut self, anomaly: Anomaly) {
        log::debug!("{}", anomaly);
        self.anomalies.push(anomaly);
    }

    fn text(&mut self, text: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.add_child(Node::text(text));
        }
    }

    fn start(&mut self, element: Element, self_closing: bool) {
        self.close_implied_by(&element.name);

        if self.stack.len() > self.max_depth {
            if !self.depth_exceeded {
                self.depth_exceeded = true;
                log::warn!("HTML nesting exceeds {} levels, flattening", self.max_depth);
                self.record(Anomaly::DepthLimitExceeded {
                    limit: self.max_depth,
                });
            }
            if !self_closing && !is_void(&element.name) {
                *self.flattened.entry(element.name).or_insert(0) += 1;
            }
            return;
        }

        if self_closing || is_void(&element.name) {
            if let Some(top) = self.stack.last_mut() {
                top.add_child(Node::Element(element));
            }
        } else {
            self.stack.push(element);
        }
    }

    fn end(&mut self, name: &str) {
        if let Some(open) = self.flattened.get_mut(name) {
            *open -= 1;
            if *open == 0 {
                self.flattened.remove(name);
            }
            return;
        }

        // `</br>` is read as `<br>`
        if name == "br" {
            self.start(Element::new("br"), true);
            return;
        }

        let Some(index) = self.find_open(&[name], &[]) else {
            self.record(Anomaly::UnexpectedClosingTag {
                tag: name.to_string(),
            });
            return;
        };

        while self.stack.len() > index + 1 {
            if let Some(tag) = self.stack.last().map(|e| e.name.clone()) {
                if !has_optional_end(&tag) {
                    self.record(Anomaly::MisnestedTag { tag });
                }
            }
            self.close_top();
        }
        self.close_top();
    }

    /// Close elements whose end tag is implied by opening `name`
    fn close_implied_by(&mut self, name: &str) {
        let implied = match name {
            "li" => self.find_open(&["li"], &["ul", "ol", "menu", "dir", "table"]),
            "dt" | "dd" => self.find_open(&["dt", "dd"], &["dl", "table"]),
            "tr" => self.find_open(&["tr"], &["thead", "tbody", "tfoot", "table"]),
            "td" | "th" => self.find_open(&["td", "th"], &["tr", "table"]),
            "thead" | "tbody" | "tfoot" => self.find_open(&["thead", "tbody", "tfoot"], &["table"]),
            _ => None,
        };
        if let Some(index) = implied {
            self.close_to(index);
        }

        if is_block(name) {
            let open_paragraph = self.find_open(
                &["p"],
                &["table", "td", "th", "caption", "button", "object", "template"],
            );
            if let Some(index) = open_paragraph {
                self.close_to(index);
            }
        }
    }

    /// Stack index of the innermost open element named in `names`,
    /// searching no further than a `boundaries` element
    fn find_open(&self, names: &[&str], boundaries: &[&str]) -> Option<usize> {
        for (index, element) in self.stack.iter().enumerate().skip(1).rev() {
            if names.contains(&element.name.as_str()) {
                return Some(index);
            }
            if boundaries.contains(&element.name.as_str()) {
                return None;
            }
        }
        None
    }

    /// Close the element at `index` and everything inside it
    fn close_to(&mut self, index: usize) {
        while self.stack.len() > index.max(1) {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(element) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.add_child(Node::Element(element));
            }
        }
    }

    fn finish(mut self) -> Parsed {
        for (tag, open) in std::mem::take(&mut self.flattened) {
            for _ in 0..open {
                self.record(Anomaly::UnclosedTag { tag: tag.clone() });
            }
        }

        while self.stack.len() > 1 {
            if let Some(tag) = self.stack.last().map(|e| e.name.clone()) {
                if !IMPLIED_END_ELEMENTS.contains(&tag.as_str()) {
                    self.record(Anomaly::UnclosedTag { tag });
                }
            }
            self.close_top();
        }

        Parsed {
            root: Node::Element(self.stack.pop().unwrap_or_default()),
            anomalies: self.anomalies,
        }
    }
}
