use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use svgdom::dom::{AttributeWarning, Element};
use svgdom::{Document, ParseOptions};

pub fn open_document(path: &Path, flush_styles: bool) -> Result<Document> {
    let options = ParseOptions {
        flush_styles,
        ..ParseOptions::default()
    };
    svgdom::open_with_options(path, options).with_context(|| format!("parse {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct WarningEntry {
    pub attribute: String,
    pub element_type: String,
    pub value: String,
    pub reason: String,
}

impl From<&AttributeWarning> for WarningEntry {
    fn from(warning: &AttributeWarning) -> Self {
        Self {
            attribute: warning.attribute.clone(),
            element_type: warning.element_type.to_string(),
            value: warning.value.clone(),
            reason: warning.reason.clone(),
        }
    }
}

/// Short `tag#id` label for tree listings.
pub fn element_label(element: &Element) -> String {
    let mut label = match element.namespace_uri() {
        "" => element.name().to_string(),
        ns => format!("{{{ns}}}{}", element.name()),
    };
    if let Some(id) = element.id() {
        label.push('#');
        label.push_str(id);
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgdom::dom::ElementKind;

    #[test]
    fn labels_include_namespace_and_id() {
        let mut rect = Element::new(ElementKind::Rect);
        rect.core.id = Some("r1".into());
        assert_eq!(element_label(&rect), "rect#r1");
        let foreign = Element::foreign("p", "urn:x");
        assert_eq!(element_label(&foreign), "{urn:x}p");
    }
}
