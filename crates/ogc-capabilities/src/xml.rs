//! Minimal XML element tree built from quick-xml events.
//!
//! Capability documents mix namespaces freely (`ows:Title`, `wms:Layer`,
//! unprefixed defaults), so elements and attributes are keyed by local name
//! only. Namespace declarations are dropped.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CapabilityParseError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Local name, prefix stripped.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated text and CDATA content.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a whole document into its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => stack.push(XmlElement::from_start(&e)),
                Ok(Event::Empty(e)) => {
                    let element = XmlElement::from_start(&e);
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Ok(Event::Text(t)) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map(Cow::into_owned)
                            .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(CapabilityParseError::Xml {
                        position: reader.buffer_position(),
                        message: e.to_string(),
                    })
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(CapabilityParseError::Xml {
                position: reader.buffer_position(),
                message: format!("unclosed element '{}'", open.name),
            });
        }

        root.ok_or(CapabilityParseError::Empty)
    }

    fn from_start(e: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        let attributes = e
            .attributes()
            .flatten()
            .filter(|attr| !attr.key.as_ref().starts_with(b"xmlns"))
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                let value = attr
                    .unescape_value()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                (key, value)
            })
            .collect();

        Self {
            name,
            attributes,
            ..Self::default()
        }
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a chain of direct children.
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Trimmed text content, `None` when blank.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(|c| c.text()).map(str::to_string)
    }

    pub fn find_text(&self, path: &[&str]) -> Option<String> {
        self.find(path).and_then(|c| c.text()).map(str::to_string)
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Boolean attribute as written by OGC servers: `1`/`true` or `0`/`false`.
    pub fn bool_attr(&self, name: &str) -> Option<bool> {
        match self.attr(name)?.trim() {
            "1" | "true" | "TRUE" | "True" => Some(true),
            "0" | "false" | "FALSE" | "False" => Some(false),
            _ => None,
        }
    }

    pub fn f64_attr(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// Link target: `xlink:href` if present, else the text content.
    pub fn href(&self) -> Option<String> {
        self.attr("href")
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .or_else(|| self.text())
            .map(str::to_string)
    }

    /// Texts of `item` children below the `container` child, e.g. `KeywordList/Keyword`.
    pub fn child_texts(&self, container: &str, item: &str) -> Vec<String> {
        self.child(container)
            .map(|c| {
                c.children_named(item)
                    .filter_map(|i| i.text())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}
