//! Routes raw attributes to styles, typed properties or the custom attribute
//! bag.

use std::fmt;

use svgdom_css::parse_stylesheet;
use svgdom_xml::NodeReader;
use tracing::{trace, warn};

use crate::document::ParseContext;
use crate::element::{effective, Element, ElementKind, Specificity};
use crate::factory::ElementFactory;
use crate::presentation::is_presentation_attribute;
use crate::values::ConversionError;

/// Namespace bookkeeping and version attributes the root never keeps.
const ROOT_IGNORED: [&str; 4] = ["xmlns", "xlink", "xmlns:xlink", "version"];

/// An attribute value that could not be converted. The property it targets
/// keeps its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeWarning {
    pub attribute: String,
    pub element_type: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for AttributeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attribute '{}' cannot be set - type '{}' cannot convert from string '{}': {}",
            self.attribute, self.element_type, self.value, self.reason
        )
    }
}

impl<'a> ElementFactory<'a> {
    /// Apply every attribute of `node` to `element`.
    ///
    /// `xmlns` is skipped, `style` is split into inline declarations,
    /// presentation attributes become style declarations, and everything
    /// else goes through [`ElementFactory::set_property_value`].
    pub fn apply_attributes<N>(&mut self, element: &mut Element, node: &mut N, ctx: &ParseContext)
    where
        N: NodeReader + ?Sized,
    {
        while node.move_to_next_attribute() {
            let name = node.attribute_local_name();
            let value = node.attribute_value();
            if name == "xmlns" {
                continue;
            }
            if name == "style" && element.kind() != ElementKind::Foreign {
                add_inline_style(element, value);
            } else if is_presentation_attribute(name) {
                element.add_style(name, value, Specificity::PresentationAttribute, false);
            } else {
                self.set_property_value(element, name, value, ctx, false);
            }
        }
    }

    /// Assign one raw value. Returns `false` only for a style with no typed
    /// property, which then stays a style declaration.
    pub fn set_property_value(
        &mut self,
        element: &mut Element,
        name: &str,
        value: &str,
        ctx: &ParseContext,
        is_style: bool,
    ) -> bool {
        let value = if name == "opacity" && value == "undefined" {
            "1"
        } else {
            value
        };

        if let Some(binding) = self.bindings.resolve(element.kind(), name) {
            match binding.convert(value, ctx) {
                Ok(typed) => binding.apply(element, typed),
                Err(err) => self.record_warning(element, name, value, err),
            }
            return true;
        }

        if element.is_svg_root() {
            if !ROOT_IGNORED
                .iter()
                .any(|ignored| name.eq_ignore_ascii_case(ignored))
            {
                element.set_custom_attribute(name, value);
            }
            return true;
        }

        if is_style {
            return false;
        }
        element.set_custom_attribute(name, value);
        true
    }

    /// Push the effective declaration of every recorded style property
    /// through [`ElementFactory::set_property_value`]. The declarations
    /// themselves are kept.
    pub fn flush_styles(&mut self, element: &mut Element, ctx: &ParseContext) {
        let winners: Vec<(String, String)> = element
            .styles()
            .iter()
            .filter_map(|(name, declarations)| {
                effective(declarations).map(|decl| (name.clone(), decl.value.clone()))
            })
            .collect();
        for (name, value) in winners {
            if !self.set_property_value(element, &name, &value, ctx, true) {
                trace!(element = element.name(), property = %name, "style kept without typed property");
            }
        }
    }

    fn record_warning(
        &mut self,
        element: &Element,
        name: &str,
        value: &str,
        err: ConversionError,
    ) {
        let element_type = element.kind().type_name();
        warn!(
            attribute = name,
            element_type,
            value,
            error = %err,
            "attribute value cannot be converted"
        );
        self.diagnostics.push(AttributeWarning {
            attribute: name.to_string(),
            element_type,
            value: value.to_string(),
            reason: err.to_string(),
        });
    }
}

fn add_inline_style(element: &mut Element, text: &str) {
    for rule in parse_stylesheet(&format!("#a{{{text}}}")) {
        for declaration in rule.declarations {
            element.add_style(
                &declaration.name,
                &declaration.value,
                Specificity::InlineStyle,
                declaration.important,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingCache;
    use crate::color::Paint;
    use crate::element::ElementData;
    use crate::values::Color;
    use crate::registry::Registry;
    use svgdom_xml::{XmlNode, SVG_NAMESPACE};

    fn build(node: XmlNode) -> (Element, Vec<AttributeWarning>) {
        let mut factory = ElementFactory::new();
        let ctx = ParseContext::default();
        let mut node = node;
        let mut element = if node.local_name == "svg" {
            factory.create_document(&mut node, &ctx).expect("root")
        } else {
            factory.create_element(&mut node, Some(&ctx)).expect("element")
        };
        factory.flush_styles(&mut element, &ctx);
        (element, factory.take_warnings())
    }

    fn rect() -> XmlNode {
        XmlNode::new("rect", SVG_NAMESPACE)
    }

    #[test]
    fn malformed_fill_is_suppressed_with_a_warning() {
        let (element, warnings) = build(rect().with_attribute("fill", "not-a-color"));
        assert_eq!(element.presentation.fill, None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].attribute, "fill");
        assert_eq!(warnings[0].value, "not-a-color");
        assert_eq!(warnings[0].element_type, ElementKind::Rect.type_name());
        assert!(warnings[0].to_string().contains("cannot convert from string 'not-a-color'"));
    }

    #[test]
    fn malformed_plain_attribute_leaves_payload_unset() {
        let (element, warnings) = build(rect().with_attribute("width", "wide").with_attribute("x", "3"));
        let ElementData::Rect(data) = &element.data else {
            panic!("rect payload");
        };
        assert!(data.width.is_none());
        assert!(data.x.is_some());
        assert_eq!(warnings.len(), 1);
        assert!(element.custom_attributes().is_empty());
    }

    #[test]
    fn opacity_undefined_reads_as_one() {
        let (undefined, warnings) = build(rect().with_attribute("opacity", "undefined"));
        let (one, _) = build(rect().with_attribute("opacity", "1"));
        assert!(warnings.is_empty());
        assert_eq!(undefined.presentation.opacity, Some(1.0));
        assert_eq!(undefined.presentation.opacity, one.presentation.opacity);
    }

    #[test]
    fn inline_style_outranks_presentation_attribute() {
        let (element, _) = build(
            rect()
                .with_attribute("fill", "red")
                .with_attribute("style", "fill:blue; stroke: green !important"),
        );
        let fills: Vec<_> = element
            .style_declarations("fill")
            .iter()
            .map(|d| (d.value.as_str(), d.specificity))
            .collect();
        assert_eq!(
            fills,
            [
                ("red", Specificity::PresentationAttribute),
                ("blue", Specificity::InlineStyle)
            ]
        );
        let winner = element.effective_style("fill").expect("fill");
        assert_eq!(winner.specificity, Specificity::InlineStyle);
        assert_eq!(element.presentation.fill, Some(Paint::Color(Color::new_rgb(0, 0, 255))));
        assert!(element.effective_style("stroke").expect("stroke").important);
    }

    #[test]
    fn styles_and_custom_attributes_follow_document_order() {
        let (element, _) = build(
            rect()
                .with_attribute("stroke", "red")
                .with_attribute("style", "opacity:0.5; fill:blue")
                .with_attribute("zeta", "1")
                .with_attribute("alpha", "2"),
        );
        let styles: Vec<_> = element.styles().keys().map(String::as_str).collect();
        assert_eq!(styles, ["stroke", "opacity", "fill"]);
        let custom: Vec<_> = element.custom_attributes().keys().map(String::as_str).collect();
        assert_eq!(custom, ["zeta", "alpha"]);
        assert_eq!(element.presentation.opacity, Some(0.5));
    }

    #[test]
    fn unbound_attributes_are_kept_verbatim() {
        let (element, _) = build(rect().with_attribute("data-foo", "bar"));
        assert_eq!(element.custom_attribute("data-foo"), Some("bar"));
    }

    #[test]
    fn unbound_style_stays_a_style() {
        let (element, _) = build(rect().with_attribute("cursor", "pointer"));
        assert!(element.custom_attribute("cursor").is_none());
        assert_eq!(element.effective_style("cursor").map(|d| d.value.as_str()), Some("pointer"));
    }

    #[test]
    fn root_bootstrap_attributes_are_dropped() {
        let node = XmlNode::new("svg", SVG_NAMESPACE)
            .with_attribute("xmlns", SVG_NAMESPACE)
            .with_attribute("xmlns:xlink", "http://www.w3.org/1999/xlink")
            .with_attribute("VERSION", "1.1")
            .with_attribute("baseProfile", "tiny")
            .with_attribute("width", "100");
        let (root, warnings) = build(node);
        assert!(warnings.is_empty());
        let custom: Vec<_> = root.custom_attributes().keys().map(String::as_str).collect();
        assert_eq!(custom, ["baseProfile"]);
        let ElementData::Viewport(viewport) = &root.data else {
            panic!("viewport payload");
        };
        assert!(viewport.width.is_some());
    }

    #[test]
    fn style_on_foreign_element_is_a_custom_attribute() {
        let node = XmlNode::new("div", "http://www.w3.org/1999/xhtml")
            .with_attribute("style", "color: red");
        let (element, _) = build(node);
        assert!(element.styles().is_empty());
        assert_eq!(element.custom_attribute("style"), Some("color: red"));
    }

    #[test]
    fn repeated_attributes_hit_the_cache() {
        let registry = Registry::global();
        let bindings = BindingCache::new();
        let mut factory = ElementFactory::with_parts(registry, &bindings);
        let ctx = ParseContext::default();
        for _ in 0..3 {
            let mut node = rect().with_attribute("x", "1").with_attribute("data-a", "b");
            factory.create_element(&mut node, Some(&ctx)).expect("rect");
        }
        assert_eq!(bindings.metadata_lookups(), 2);
    }
}
