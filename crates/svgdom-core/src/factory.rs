//! Turns XML nodes into typed elements.

use svgdom_xml::{NodeReader, SVG_NAMESPACE};
use tracing::debug;

use crate::binding::BindingCache;
use crate::dispatch::AttributeWarning;
use crate::document::ParseContext;
use crate::element::{Element, ElementKind};
use crate::registry::{Registry, ROOT_TAG};
use crate::DomError;

/// Creates elements for one parse and collects the conversion warnings
/// raised while doing so.
#[derive(Debug)]
pub struct ElementFactory<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) bindings: &'a BindingCache,
    pub(crate) diagnostics: Vec<AttributeWarning>,
}

impl ElementFactory<'static> {
    /// Factory backed by the process-wide registry and binding cache.
    pub fn new() -> Self {
        Self::with_parts(Registry::global(), BindingCache::global())
    }
}

impl Default for ElementFactory<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ElementFactory<'a> {
    pub fn with_parts(registry: &'a Registry, bindings: &'a BindingCache) -> Self {
        Self {
            registry,
            bindings,
            diagnostics: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn bindings(&self) -> &'a BindingCache {
        self.bindings
    }

    /// Create the document element. Only an `<svg>` node in the SVG (or no)
    /// namespace is accepted.
    pub fn create_document<N>(
        &mut self,
        node: &mut N,
        ctx: &ParseContext,
    ) -> Result<Element, DomError>
    where
        N: NodeReader + ?Sized,
    {
        if node.local_name() != ROOT_TAG || is_foreign(node.namespace_uri()) {
            return Err(DomError::NotSvgRoot(qualified(node)));
        }
        Ok(self.create(node, true, ctx))
    }

    /// Create a descendant element. `ctx` is the owning document's parse
    /// context and must be present.
    pub fn create_element<N>(
        &mut self,
        node: &mut N,
        ctx: Option<&ParseContext>,
    ) -> Result<Element, DomError>
    where
        N: NodeReader + ?Sized,
    {
        let ctx = ctx.ok_or_else(|| DomError::MissingDocument(qualified(node)))?;
        Ok(self.create(node, false, ctx))
    }

    fn create<N>(&mut self, node: &mut N, is_root: bool, ctx: &ParseContext) -> Element
    where
        N: NodeReader + ?Sized,
    {
        let local_name = node.local_name().to_string();
        let namespace_uri = node.namespace_uri();
        let mut element = if is_foreign(namespace_uri) {
            Element::foreign(local_name, namespace_uri)
        } else if local_name == ROOT_TAG {
            if is_root {
                Element::new(ElementKind::Document)
            } else {
                Element::new(ElementKind::Fragment)
            }
        } else {
            match self.registry.lookup_excluding_root(&local_name) {
                Some(descriptor) => {
                    Element::with_name(descriptor.kind, local_name, String::new())
                }
                None => Element::unknown(local_name),
            }
        };
        debug!(
            tag = element.name(),
            kind = ?element.kind(),
            "creating element"
        );
        self.apply_attributes(&mut element, node, ctx);
        element
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[AttributeWarning] {
        &self.diagnostics
    }

    /// Drain the collected warnings.
    pub fn take_warnings(&mut self) -> Vec<AttributeWarning> {
        std::mem::take(&mut self.diagnostics)
    }
}

fn is_foreign(namespace_uri: &str) -> bool {
    !namespace_uri.is_empty() && namespace_uri != SVG_NAMESPACE
}

fn qualified<N: NodeReader + ?Sized>(node: &N) -> String {
    match node.namespace_uri() {
        "" => node.local_name().to_string(),
        ns => format!("{{{ns}}}{}", node.local_name()),
    }
}
