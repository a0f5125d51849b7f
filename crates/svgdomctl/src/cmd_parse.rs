use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use svgdom::dom::{AttributeWarning, Element};
use tracing::info;

use crate::common::{self, WarningEntry};

#[derive(Serialize)]
struct NodeEntry {
    tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    namespace: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    styles: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    custom_attributes: IndexMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeEntry>,
}

impl From<&Element> for NodeEntry {
    fn from(element: &Element) -> Self {
        let styles = element
            .styles()
            .keys()
            .filter_map(|name| {
                element
                    .effective_style(name)
                    .map(|decl| (name.clone(), decl.value.clone()))
            })
            .collect();
        Self {
            tag: element.name().to_string(),
            namespace: element.namespace_uri().to_string(),
            kind: format!("{:?}", element.kind()),
            id: element.id().map(str::to_string),
            styles,
            custom_attributes: element.custom_attributes().clone(),
            content: element.content().to_string(),
            children: element.children().iter().map(NodeEntry::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct ParseReport {
    file: String,
    elements: usize,
    root: NodeEntry,
    warnings: Vec<WarningEntry>,
}

pub fn run(path: &Path, flush_styles: bool, json: bool) -> Result<()> {
    let doc = common::open_document(path, flush_styles)?;
    let elements = doc.descendants().count();
    info!(
        file = %path.display(),
        elements,
        warnings = doc.diagnostics().len(),
        "parsed document"
    );

    if json {
        let report = ParseReport {
            file: path.display().to_string(),
            elements,
            root: NodeEntry::from(doc.root()),
            warnings: doc.diagnostics().iter().map(WarningEntry::from).collect(),
        };
        return common::print_json(&report);
    }

    let mut lines = Vec::new();
    render_tree(doc.root(), 0, &mut lines);
    lines.extend(render_warnings(doc.diagnostics()));
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn render_tree(element: &Element, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{} ({:?})", common::element_label(element), element.kind());
    if !element.custom_attributes().is_empty() {
        let names: Vec<&str> = element
            .custom_attributes()
            .keys()
            .map(String::as_str)
            .collect();
        line.push_str(&format!(" custom=[{}]", names.join(", ")));
    }
    lines.push(line);
    for child in element.children() {
        render_tree(child, depth + 1, lines);
    }
}

fn render_warnings(warnings: &[AttributeWarning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Warnings:".to_string()];
    lines.extend(warnings.iter().map(|warning| format!("  {warning}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgdom::dom::{ElementKind, Specificity};

    fn sample_tree() -> Element {
        let mut group = Element::new(ElementKind::Group);
        group.core.id = Some("g1".into());
        let mut rect = Element::new(ElementKind::Rect);
        rect.set_custom_attribute("zeta", "1");
        rect.set_custom_attribute("alpha", "2");
        rect.add_style("stroke", "red", Specificity::PresentationAttribute, false);
        rect.add_style("fill", "blue", Specificity::InlineStyle, false);
        group.append_child(rect);
        group
    }

    #[test]
    fn tree_lines_indent_children_and_list_custom_attributes() {
        let mut lines = Vec::new();
        render_tree(&sample_tree(), 0, &mut lines);
        assert_eq!(lines, ["g#g1 (Group)", "  rect (Rect) custom=[zeta, alpha]"]);
    }

    #[test]
    fn warnings_follow_a_heading() {
        assert!(render_warnings(&[]).is_empty());
        let warning = AttributeWarning {
            attribute: "width".into(),
            element_type: "Rect",
            value: "wide".into(),
            reason: "invalid number".into(),
        };
        let lines = render_warnings(&[warning]);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Warnings:");
        assert!(lines[2].starts_with("  attribute 'width' cannot be set"));
        assert!(lines[2].ends_with("'wide': invalid number"));
    }

    #[test]
    fn json_nodes_keep_document_order() {
        let entry = NodeEntry::from(&sample_tree());
        let text = serde_json::to_string(&entry).expect("serialise node");
        let zeta = text.find("\"zeta\"").expect("zeta key");
        let alpha = text.find("\"alpha\"").expect("alpha key");
        assert!(zeta < alpha);
        let stroke = text.find("\"stroke\":\"red\"").expect("stroke style");
        let fill = text.find("\"fill\":\"blue\"").expect("fill style");
        assert!(stroke < fill);
        assert!(text.starts_with("{\"tag\":\"g\""));
        assert!(text.contains("\"id\":\"g1\""));
    }
}
