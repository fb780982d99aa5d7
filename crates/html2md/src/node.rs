//! DOM node structure consumed by the converter.
//!
//! [`parse_html`](crate::parse_html) produces this tree, but any HTML
//! parser can build it directly and hand it to
//! [`convert_node`](crate::convert_node).

use smallvec::SmallVec;

/// Element attributes; most elements carry only a few
pub type Attributes = SmallVec<[(String, String); 4]>;

/// A DOM node: an element or a run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Raw text, entity spellings still in place
    Text(String),
}

/// An element with lowercase tag name, attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element::new(tag_name))
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut element = Element::new(tag_name);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        Node::Element(element)
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Tag name of an element, `None` for text
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.name.as_str())
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.as_element()?.attr(name)
    }

    /// Get all child nodes
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    /// Add a child node; text nodes ignore children
    pub fn add_child(&mut self, child: Node) {
        if let Node::Element(element) = self {
            element.add_child(child);
        }
    }

    /// Concatenated raw text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name == "br" => out.push('\n'),
            Node::Element(element) => {
                for child in &element.children {
                    child.push_text(out);
                }
            }
        }
    }
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            name: tag_name.to_ascii_lowercase(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute; a later value for the same name wins
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    /// Add a child, merging adjacent text nodes
    pub fn add_child(&mut self, child: Node) {
        if let (Node::Text(text), Some(Node::Text(last))) = (&child, self.children.last_mut()) {
            last.push_str(text);
            return;
        }
        self.children.push(child);
    }

    /// Child elements only
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}
