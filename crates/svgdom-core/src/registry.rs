//! Process-wide table of known element types keyed by tag name.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::element::ElementKind;

/// Tag of the root element; implemented by more than one kind.
pub const ROOT_TAG: &str = "svg";

/// One `(tag name, implementing kind)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub tag_name: &'static str,
    pub kind: ElementKind,
}

const fn desc(tag_name: &'static str, kind: ElementKind) -> ElementDescriptor {
    ElementDescriptor { tag_name, kind }
}

/// Every element type compiled into the crate, in registration order.
pub const ELEMENT_DESCRIPTORS: &[ElementDescriptor] = &[
    desc("svg", ElementKind::Fragment),
    desc("svg", ElementKind::Document),
    desc("g", ElementKind::Group),
    desc("defs", ElementKind::Defs),
    desc("desc", ElementKind::Description),
    desc("title", ElementKind::Title),
    desc("metadata", ElementKind::Metadata),
    desc("symbol", ElementKind::Symbol),
    desc("use", ElementKind::Use),
    desc("switch", ElementKind::Switch),
    desc("a", ElementKind::Anchor),
    desc("image", ElementKind::Image),
    desc("style", ElementKind::StyleSheet),
    desc("rect", ElementKind::Rect),
    desc("circle", ElementKind::Circle),
    desc("ellipse", ElementKind::Ellipse),
    desc("line", ElementKind::Line),
    desc("polyline", ElementKind::Polyline),
    desc("polygon", ElementKind::Polygon),
    desc("path", ElementKind::Path),
    desc("text", ElementKind::Text),
    desc("tspan", ElementKind::TextSpan),
    desc("textPath", ElementKind::TextPath),
    desc("linearGradient", ElementKind::LinearGradient),
    desc("radialGradient", ElementKind::RadialGradient),
    desc("stop", ElementKind::Stop),
    desc("pattern", ElementKind::Pattern),
    desc("clipPath", ElementKind::ClipPath),
    desc("mask", ElementKind::Mask),
    desc("marker", ElementKind::Marker),
    desc("filter", ElementKind::Filter),
    desc("feGaussianBlur", ElementKind::FeGaussianBlur),
    desc("feOffset", ElementKind::FeOffset),
    desc("feFlood", ElementKind::FeFlood),
    desc("feBlend", ElementKind::FeBlend),
    desc("feMerge", ElementKind::FeMerge),
    desc("feMergeNode", ElementKind::FeMergeNode),
];

/// Read-only index over a descriptor table.
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<ElementDescriptor>,
    by_tag_excluding_root: HashMap<&'static str, ElementDescriptor>,
    by_tag_all: HashMap<&'static str, Vec<ElementKind>>,
}

impl Registry {
    /// Registry over [`ELEMENT_DESCRIPTORS`], built on first use.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| Registry::from_descriptors(ELEMENT_DESCRIPTORS))
    }

    /// Index an explicit table. For a repeated non-root tag the first
    /// descriptor is the one returned by [`Registry::lookup_excluding_root`].
    pub fn from_descriptors(table: &[ElementDescriptor]) -> Self {
        let mut by_tag_excluding_root: HashMap<&'static str, ElementDescriptor> = HashMap::new();
        let mut by_tag_all: HashMap<&'static str, Vec<ElementKind>> = HashMap::new();
        for descriptor in table {
            by_tag_all
                .entry(descriptor.tag_name)
                .or_default()
                .push(descriptor.kind);
            if descriptor.tag_name == ROOT_TAG {
                continue;
            }
            if let Some(first) = by_tag_excluding_root.get(descriptor.tag_name) {
                debug!(
                    tag = descriptor.tag_name,
                    kept = ?first.kind,
                    ignored = ?descriptor.kind,
                    "duplicate element descriptor"
                );
                continue;
            }
            by_tag_excluding_root.insert(descriptor.tag_name, *descriptor);
        }
        debug!(
            descriptors = table.len(),
            tags = by_tag_all.len(),
            "element registry built"
        );
        Registry {
            descriptors: table.to_vec(),
            by_tag_excluding_root,
            by_tag_all,
        }
    }

    /// All descriptors in registration order.
    pub fn all_element_types(&self) -> &[ElementDescriptor] {
        &self.descriptors
    }

    /// Case-sensitive lookup that never answers for [`ROOT_TAG`].
    pub fn lookup_excluding_root(&self, tag_name: &str) -> Option<&ElementDescriptor> {
        self.by_tag_excluding_root.get(tag_name)
    }

    /// Every kind registered under `tag_name`, in registration order.
    pub fn all_implementations_of(&self, tag_name: &str) -> &[ElementKind] {
        self.by_tag_all.get(tag_name).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_tag_has_two_implementations_and_no_lookup() {
        let registry = Registry::global();
        assert_eq!(
            registry.all_implementations_of("svg"),
            [ElementKind::Fragment, ElementKind::Document]
        );
        assert!(registry.lookup_excluding_root("svg").is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = Registry::global();
        let rect = registry.lookup_excluding_root("rect").expect("rect");
        assert_eq!(rect.kind, ElementKind::Rect);
        assert!(registry.lookup_excluding_root("RECT").is_none());
        assert!(registry.lookup_excluding_root("lineargradient").is_none());
        assert_eq!(
            registry
                .lookup_excluding_root("linearGradient")
                .map(|d| d.kind),
            Some(ElementKind::LinearGradient)
        );
        assert!(registry.all_implementations_of("blink").is_empty());
    }

    #[test]
    fn every_descriptor_tag_matches_its_kind() {
        let registry = Registry::global();
        assert_eq!(registry.all_element_types().len(), ELEMENT_DESCRIPTORS.len());
        for descriptor in registry.all_element_types() {
            assert_eq!(descriptor.kind.tag_name(), Some(descriptor.tag_name));
        }
    }

    #[test]
    fn first_registered_descriptor_wins() {
        let registry = Registry::from_descriptors(&[
            desc("g", ElementKind::Group),
            desc("g", ElementKind::Switch),
            desc("svg", ElementKind::Document),
        ]);
        assert_eq!(
            registry.lookup_excluding_root("g").map(|d| d.kind),
            Some(ElementKind::Group)
        );
        assert_eq!(
            registry.all_implementations_of("g"),
            [ElementKind::Group, ElementKind::Switch]
        );
        assert_eq!(registry.all_implementations_of("svg"), [ElementKind::Document]);
    }
}
