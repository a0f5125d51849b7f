use anyhow::Result;
use serde::Serialize;
use svgdom::dom::{Capabilities, Registry};

use crate::common;

#[derive(Serialize)]
struct ElementTypeEntry {
    tag: &'static str,
    kind: String,
    type_name: &'static str,
    capabilities: Vec<&'static str>,
}

pub fn run(json: bool) -> Result<()> {
    let registry = Registry::global();
    let entries: Vec<ElementTypeEntry> = registry
        .all_element_types()
        .iter()
        .map(|descriptor| ElementTypeEntry {
            tag: descriptor.tag_name,
            kind: format!("{:?}", descriptor.kind),
            type_name: descriptor.kind.type_name(),
            capabilities: capability_names(descriptor.kind.capabilities()),
        })
        .collect();

    if json {
        return common::print_json(&entries);
    }

    println!("{:<16} {:<16} {}", "TAG", "KIND", "CAPABILITIES");
    for entry in &entries {
        println!(
            "{:<16} {:<16} {}",
            entry.tag,
            entry.kind,
            entry.capabilities.join("|")
        );
    }
    Ok(())
}

fn capability_names(caps: Capabilities) -> Vec<&'static str> {
    caps.iter_names().map(|(name, _)| name).collect()
}
