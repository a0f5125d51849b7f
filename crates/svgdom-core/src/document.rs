//! Builds an element tree from a whole document.

use svgdom_xml::{decode_document, EventReader, XmlEvent, XmlNode};
use tracing::debug;

use crate::dispatch::AttributeWarning;
use crate::element::{Descendants, Element};
use crate::factory::ElementFactory;
use crate::DomError;

/// Caller-supplied knobs for one parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Location of the document, used to resolve relative `href`s.
    pub base_uri: Option<String>,
    /// Push effective style declarations into typed properties as each
    /// element closes.
    pub flush_styles: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            base_uri: None,
            flush_styles: true,
        }
    }
}

/// Per-document state handed to attribute converters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    pub base_uri: Option<String>,
}

/// A parsed SVG document: the root element plus the warnings raised while
/// building it.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
    base_uri: Option<String>,
    diagnostics: Vec<AttributeWarning>,
}

impl Document {
    pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Self, DomError> {
        Self::parse_with(&mut ElementFactory::new(), text, options)
    }

    /// Parse raw bytes. A UTF-8 byte order mark is skipped.
    pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Self, DomError> {
        let text = decode_document(bytes)?;
        Self::parse_str(text, options)
    }

    /// Parse with an explicit factory, e.g. one backed by a private registry.
    pub fn parse_with(
        factory: &mut ElementFactory<'_>,
        text: &str,
        options: &ParseOptions,
    ) -> Result<Self, DomError> {
        let ctx = ParseContext {
            base_uri: options.base_uri.clone(),
        };
        let mut reader = EventReader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::Start(mut node) => {
                    let element = create(factory, &mut node, &ctx, &stack, root.is_some())?;
                    stack.push(element);
                }
                XmlEvent::Empty(mut node) => {
                    let element = create(factory, &mut node, &ctx, &stack, root.is_some())?;
                    close(factory, element, &ctx, options, &mut stack, &mut root);
                }
                XmlEvent::End => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DomError::Structure("unexpected closing tag".into()))?;
                    close(factory, element, &ctx, options, &mut stack, &mut root);
                }
                XmlEvent::Text(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    match stack.last_mut() {
                        Some(current) => current.push_content(&text),
                        None => {
                            return Err(DomError::Structure(
                                "character data outside the root element".into(),
                            ))
                        }
                    }
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(DomError::Structure(format!(
                "element <{}> is not closed",
                open.name()
            )));
        }
        let root = root.ok_or(DomError::EmptyDocument)?;
        let diagnostics = factory.take_warnings();
        debug!(
            elements = root.descendants().count(),
            warnings = diagnostics.len(),
            "document parsed"
        );
        Ok(Document {
            root,
            base_uri: ctx.base_uri,
            diagnostics,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Conversion warnings in document order.
    pub fn diagnostics(&self) -> &[AttributeWarning] {
        &self.diagnostics
    }

    /// First element in document order whose `id` equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.descendants().find(|element| element.id() == Some(id))
    }

    /// Pre-order walk starting at the root.
    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }
}

fn create(
    factory: &mut ElementFactory<'_>,
    node: &mut XmlNode,
    ctx: &ParseContext,
    stack: &[Element],
    have_root: bool,
) -> Result<Element, DomError> {
    if stack.is_empty() {
        if have_root {
            return Err(DomError::Structure(format!(
                "second top-level element <{}>",
                node.local_name
            )));
        }
        factory.create_document(node, ctx)
    } else {
        factory.create_element(node, Some(ctx))
    }
}

fn close(
    factory: &mut ElementFactory<'_>,
    mut element: Element,
    ctx: &ParseContext,
    options: &ParseOptions,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
) {
    if options.flush_styles {
        factory.flush_styles(&mut element, ctx);
    }
    match stack.last_mut() {
        Some(parent) => parent.append_child(element),
        None => *root = Some(element),
    }
}
