//! Lenient XML tree for device responses.
//!
//! The device's response schema drifts between firmware versions, so
//! responses are loaded into a small element tree and queried by element
//! name (first match, depth-first) instead of being decoded all-or-nothing.
//! Malformed input yields whatever was parsed before the error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// An element with its attributes, direct text and children.
#[derive(Debug, Clone, Default)]
pub(crate) struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    /// Direct text; entities already decoded, CDATA kept literally.
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart) -> Self {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let attrs = start
            .attributes()
            .flatten()
            .map(|a| {
                let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
                let value = html_escape::decode_html_entities(&String::from_utf8_lossy(&a.value))
                    .into_owned();
                (key, value)
            })
            .collect();

        Self {
            name,
            attrs,
            ..Default::default()
        }
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Non-empty attribute value, owned.
    pub fn attr_owned(&self, name: &str) -> Option<String> {
        self.attr(name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Trimmed direct text of this element.
    pub fn text(&self) -> String {
        self.text.trim().to_string()
    }

    /// First element named `name` in document order, including `self`.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// All elements named `name` in document order, including `self`.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect(name, found);
        }
    }

    /// Non-empty text of the first element named `name`.
    pub fn find_text(&self, name: &str) -> Option<String> {
        self.find(name).map(XmlElement::text).filter(|t| !t.is_empty())
    }
}

/// Parses `xml` into a tree rooted at an unnamed document node.
pub(crate) fn parse_document(xml: &str) -> XmlElement {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(XmlElement::from_start(e)),
            Ok(Event::Empty(ref e)) => attach(&mut stack, XmlElement::from_start(e)),
            Ok(Event::End(_)) => {
                if stack.len() > 1 {
                    if let Some(done) = stack.pop() {
                        attach(&mut stack, done);
                    }
                }
            }
            Ok(Event::Text(ref e)) => append_text(
                &mut stack,
                &html_escape::decode_html_entities(&String::from_utf8_lossy(e)),
            ),
            Ok(Event::CData(ref e)) => append_text(&mut stack, &String::from_utf8_lossy(e)),
            Ok(Event::GeneralRef(ref e)) => append_text(
                &mut stack,
                &html_escape::decode_html_entities(&format!("&{};", String::from_utf8_lossy(e))),
            ),
            Ok(Event::Eof) => break,
            Err(e) => {
                log::debug!("[Device] XML parse error (keeping partial tree): {}", e);
                break;
            }
            _ => {}
        }
    }

    // Close anything left open by truncated input
    while stack.len() > 1 {
        if let Some(open) = stack.pop() {
            attach(&mut stack, open);
        }
    }

    stack.pop().unwrap_or_default()
}

fn attach(stack: &mut [XmlElement], element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}
