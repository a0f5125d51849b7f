//! Namespace-aware, node-at-a-time XML reading for the SVG element factory.
//!
//! The factory never tokenizes XML itself: it consumes one element node at a
//! time through the [`NodeReader`] contract (local name, namespace URI and an
//! attribute cursor). [`EventReader`] produces those nodes from a document
//! using quick-xml.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;
use tracing::trace;

/// Namespace URI of SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// Namespace URI bound to the conventional `xlink` prefix.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
/// Namespace URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error("encoding: {0}")]
    Encoding(String),
}

/// One attribute of an element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Prefix of the qualified name (`xlink` in `xlink:href`).
    pub prefix: Option<String>,
    /// Name with any prefix removed. A bare `xmlns` keeps `xmlns`.
    pub local_name: String,
    /// Unescaped attribute value.
    pub value: String,
}

impl XmlAttribute {
    /// Qualified name as written in the document.
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}:{}", self.local_name)),
            None => Cow::Borrowed(&self.local_name),
        }
    }
}

/// Read-only view of the element node the reader is positioned on.
///
/// Mirrors a cursor-style XML reader: attributes are visited one at a time
/// with [`NodeReader::move_to_next_attribute`]; the name and value accessors
/// refer to the attribute under the cursor.
pub trait NodeReader {
    /// Local name of the current element.
    fn local_name(&self) -> &str;
    /// Resolved namespace URI of the current element, empty when unbound.
    fn namespace_uri(&self) -> &str;
    /// Advance to the next attribute, returning `false` once exhausted.
    fn move_to_next_attribute(&mut self) -> bool;
    /// Local name of the attribute under the cursor.
    fn attribute_local_name(&self) -> &str;
    /// Value of the attribute under the cursor.
    fn attribute_value(&self) -> &str;
}

/// Owned snapshot of one start (or empty) element tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub local_name: String,
    pub namespace_uri: String,
    pub attributes: Vec<XmlAttribute>,
    cursor: Option<usize>,
}

impl XmlNode {
    pub fn new(local_name: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: namespace_uri.into(),
            attributes: Vec::new(),
            cursor: None,
        }
    }

    /// Builder-style helper for assembling nodes by hand.
    pub fn with_attribute(mut self, qualified_name: &str, value: impl Into<String>) -> Self {
        let (prefix, local_name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified_name.to_string()),
        };
        self.attributes.push(XmlAttribute {
            prefix,
            local_name,
            value: value.into(),
        });
        self
    }

    /// Rewind the attribute cursor so the node can be visited again.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    fn current(&self) -> Option<&XmlAttribute> {
        self.cursor.and_then(|idx| self.attributes.get(idx))
    }
}

impl NodeReader for XmlNode {
    fn local_name(&self) -> &str {
        &self.local_name
    }

    fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    fn move_to_next_attribute(&mut self) -> bool {
        let next = self.cursor.map_or(0, |idx| idx + 1);
        if next < self.attributes.len() {
            self.cursor = Some(next);
            true
        } else {
            self.cursor = Some(self.attributes.len());
            false
        }
    }

    fn attribute_local_name(&self) -> &str {
        self.current().map_or("", |attr| attr.local_name.as_str())
    }

    fn attribute_value(&self) -> &str {
        self.current().map_or("", |attr| attr.value.as_str())
    }
}

/// Structural events relevant to tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Opening tag; children follow until the matching [`XmlEvent::End`].
    Start(XmlNode),
    /// Self-closing tag with no children.
    Empty(XmlNode),
    /// Closing tag of the most recent open element.
    End,
    /// Character data (text or CDATA), already unescaped.
    Text(String),
}

/// Pull reader turning an XML document into [`XmlEvent`]s.
pub struct EventReader<'a> {
    reader: NsReader<&'a [u8]>,
    buf: Vec<u8>,
}

impl<'a> EventReader<'a> {
    pub fn from_str(xml: &'a str) -> Self {
        let mut reader = NsReader::from_str(xml);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Return the next structural event, or `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>, XmlError> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|err| XmlError::Xml(err.to_string()))?;
            match event {
                Event::Start(e) => {
                    let node = build_node(&self.reader, &e)?;
                    return Ok(Some(XmlEvent::Start(node)));
                }
                Event::Empty(e) => {
                    let node = build_node(&self.reader, &e)?;
                    return Ok(Some(XmlEvent::Empty(node)));
                }
                Event::End(_) => return Ok(Some(XmlEvent::End)),
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|err| XmlError::Xml(err.to_string()))?;
                    return Ok(Some(XmlEvent::Text(text.into_owned())));
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Event::Eof => return Ok(None),
                other => {
                    trace!(event = ?other, "skipping non-structural xml event");
                }
            }
        }
    }
}

fn build_node(reader: &NsReader<&[u8]>, event: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
    let (ns, local) = reader.resolve_element(event.name());
    let namespace_uri = match ns {
        ResolveResult::Bound(Namespace(uri)) => String::from_utf8_lossy(uri).into_owned(),
        ResolveResult::Unbound => String::new(),
        ResolveResult::Unknown(prefix) => {
            return Err(XmlError::Invalid(format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )))
        }
    };
    let local_name = utf8(local.as_ref())?.to_string();

    let mut attributes = Vec::new();
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let prefix = match attr.key.prefix() {
            Some(prefix) => Some(utf8(prefix.as_ref())?.to_string()),
            None => None,
        };
        let local_name = utf8(attr.key.local_name().as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?
            .into_owned();
        attributes.push(XmlAttribute {
            prefix,
            local_name,
            value,
        });
    }

    Ok(XmlNode {
        local_name,
        namespace_uri,
        attributes,
        cursor: None,
    })
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|err| XmlError::Encoding(format!("invalid UTF-8 name: {err}")))
}

/// Decode raw document bytes into text, dropping a leading UTF-8 BOM.
pub fn decode_document(bytes: &[u8]) -> Result<&str, XmlError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body).map_err(|err| XmlError::Encoding(format!("invalid UTF-8: {err}")))
}
