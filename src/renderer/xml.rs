//! Element trees, their deterministic XML serialization and parsing

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::value::Value;

use super::XmlConfig;

/// Errors from reading an XML document back into an [`Element`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),
    #[error("unexpected closing tag </{found}>, expected </{expected}>")]
    Mismatched { expected: String, found: String },
    #[error("document has no root element")]
    NoRoot,
}

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given tag
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// All direct child elements with the given tag
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }
}

/// Serialize an element tree
pub fn write_document(root: &Element, config: &XmlConfig) -> String {
    let mut builder = XmlBuilder::new(config.clone());
    builder.element(root);
    builder.build()
}

/// Build XML text incrementally
pub struct XmlBuilder {
    config: XmlConfig,
    out: String,
    depth: usize,
}

impl XmlBuilder {
    pub fn new(config: XmlConfig) -> Self {
        let mut out = String::new();
        if config.declaration {
            out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            if config.pretty_print {
                out.push('\n');
            }
        }
        Self {
            config,
            out,
            depth: 0,
        }
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            " ".repeat(self.config.indent * self.depth)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn open_tag(element: &Element) -> String {
        let mut tag = format!("<{}", element.name);
        for (key, value) in &element.attributes {
            tag.push_str(&format!(r#" {}="{}""#, key, escape_attr(value)));
        }
        tag
    }

    /// Append one element and its subtree
    pub fn element(&mut self, element: &Element) {
        let indent = self.indent_str();
        let open = Self::open_tag(element);

        if element.children.is_empty() {
            self.out.push_str(&format!("{}{}/>{}", indent, open, self.newline()));
            return;
        }

        // Text-only and mixed content stay on one line so text round-trips exactly
        if !element.has_element_children() || element.children.iter().any(|c| matches!(c, XmlNode::Text(_))) {
            self.out.push_str(&indent);
            self.out.push_str(&open);
            self.out.push('>');
            self.inline_children(&element.children);
            self.out.push_str(&format!("</{}>{}", element.name, self.newline()));
            return;
        }

        self.out.push_str(&format!("{}{}>{}", indent, open, self.newline()));
        self.depth += 1;
        for child in element.elements() {
            self.element(child);
        }
        self.depth -= 1;
        self.out.push_str(&format!("{}</{}>{}", indent, element.name, self.newline()));
    }

    fn inline_children(&mut self, children: &[XmlNode]) {
        for child in children {
            match child {
                XmlNode::Text(text) => self.out.push_str(&escape_text(text)),
                XmlNode::Element(e) => {
                    let compact = XmlConfig {
                        pretty_print: false,
                        declaration: false,
                        ..self.config.clone()
                    };
                    self.out.push_str(&write_document(e, &compact));
                }
            }
        }
    }

    pub fn build(self) -> String {
        self.out
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Parse an XML document into its root element
///
/// Whitespace-only text between child elements is formatting and is dropped;
/// text inside text-only elements is kept verbatim.
pub fn parse_document(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::Malformed(format!("{} at byte {}", e, reader.buffer_position())))?;
        match event {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(end) => {
                let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let mut element = stack.pop().ok_or_else(|| XmlError::Mismatched {
                    expected: String::new(),
                    found: found.clone(),
                })?;
                if element.name != found {
                    return Err(XmlError::Mismatched {
                        expected: element.name,
                        found,
                    });
                }
                if element.has_element_children() {
                    element
                        .children
                        .retain(|c| !matches!(c, XmlNode::Text(t) if t.trim().is_empty()));
                }
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    parent.push_text(text.into_owned());
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(String::from_utf8_lossy(&data.into_inner()).into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or(XmlError::NoRoot)
}

fn start_element(start: &BytesStart) -> Result<Element, XmlError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Turn a map key into a valid XML element name
///
/// Characters other than ASCII letters, digits, `_` and `.` (including `-`)
/// become `_`; a name that does not start with a letter or `_` is prefixed
/// with `_`.
pub fn normalize_key(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let valid_start = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start {
        name.insert(0, '_');
    }
    name
}

/// Convert a value into an element named `name`
///
/// Maps become children sorted by normalized key, lists become repeated
/// `item` children and scalars become text. `Null` and the empty string
/// produce an empty element.
pub fn value_to_element(name: &str, value: &Value) -> Element {
    let mut element = Element::new(normalize_key(name));
    match value {
        Value::Map(map) => {
            let mut entries: Vec<(String, &Value)> =
                map.iter().map(|(k, v)| (normalize_key(k), v)).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in entries {
                element.push(value_to_element(&key, value));
            }
        }
        Value::List(items) => {
            for item in items {
                element.push(value_to_element("item", item));
            }
        }
        Value::Null => {}
        scalar => element.push_text(scalar.to_string()),
    }
    element
}
