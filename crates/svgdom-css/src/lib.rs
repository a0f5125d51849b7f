//! CSS rule and declaration-block parsing for SVG `style` attributes and
//! style sheets, backed by `simplecss`.
//!
//! Nothing here ever fails: at-rules are skipped and a block stops at its
//! first malformed declaration, keeping the ones before it. Values are
//! returned as text; typing them is the caller's job.

use simplecss::{DeclarationTokenizer, StyleSheet};
use tracing::trace;

/// A single `name: value` pair from a declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, ASCII-lowercased.
    pub name: String,
    /// Value text with `!important` removed.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

impl From<simplecss::Declaration<'_>> for Declaration {
    fn from(decl: simplecss::Declaration<'_>) -> Self {
        Self {
            name: decl.name.to_ascii_lowercase(),
            value: decl.value.to_string(),
            important: decl.important,
        }
    }
}

/// A qualified rule with its declarations in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Normalized selector text (`#a` reads back as `*[id='a']`).
    pub selector: String,
    /// `[ids, classes and attributes, types]`.
    pub specificity: [u8; 3],
    pub declarations: Vec<Declaration>,
}

/// Parse a style sheet into its rules, ordered by ascending specificity.
/// A selector list yields one rule per selector.
pub fn parse_stylesheet(input: &str) -> Vec<StyleRule> {
    let sheet = StyleSheet::parse(input);
    let rules: Vec<StyleRule> = sheet
        .rules
        .iter()
        .map(|rule| StyleRule {
            selector: rule.selector.to_string(),
            specificity: rule.selector.specificity(),
            declarations: rule.declarations.iter().copied().map(Declaration::from).collect(),
        })
        .collect();
    trace!(rules = rules.len(), "parsed style sheet");
    rules
}

/// Parse the inside of a declaration block (`fill: red; stroke: blue`).
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    DeclarationTokenizer::from(input).map(Declaration::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(decls: &[Declaration]) -> Vec<&str> {
        decls.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn inline_block_keeps_declaration_order() {
        let rules = parse_stylesheet("#a{fill:blue; stroke : red;stroke-width:2}");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, "*[id='a']");
        assert_eq!(rules[0].specificity, [1, 0, 0]);
        let decls = &rules[0].declarations;
        assert_eq!(names(decls), ["fill", "stroke", "stroke-width"]);
        assert_eq!(decls[1].value, "red");
        assert_eq!(decls[2].value, "2");
        assert!(decls.iter().all(|d| !d.important));
    }

    #[test]
    fn important_flag_is_split_off() {
        let decls = parse_declarations("fill: red !important; opacity:.5!important; stroke:#00f");
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].value, "red");
        assert!(decls[0].important);
        assert_eq!(decls[1].value, ".5");
        assert!(decls[1].important);
        assert_eq!(decls[2].value, "#00f");
        assert!(!decls[2].important);
    }

    #[test]
    fn separators_inside_strings_and_functions_are_kept() {
        let decls = parse_declarations(
            "font-family: 'A;B', serif; fill: url(data:x;y) none; /* c; d */ stroke:green",
        );
        assert_eq!(names(&decls), ["font-family", "fill", "stroke"]);
        assert_eq!(decls[0].value, "'A;B', serif");
        assert_eq!(decls[1].value, "url(data:x;y) none");
        assert_eq!(decls[2].value, "green");
    }

    #[test]
    fn names_are_lowercased() {
        let decls = parse_declarations("Opacity:\n 0.5  ;FILL:red");
        assert_eq!(names(&decls), ["opacity", "fill"]);
        assert_eq!(decls[0].value, "0.5");
    }

    #[test]
    fn block_stops_at_first_malformed_declaration() {
        let decls = parse_declarations("fill:red; stroke blue; opacity:1");
        assert_eq!(names(&decls), ["fill"]);
        assert!(parse_declarations("").is_empty());
        assert!(parse_declarations(": 2").is_empty());
    }

    #[test]
    fn stylesheet_skips_at_rules_and_recovers_at_eof() {
        let css = "/* x */ @media print { rect { fill: red } }\n\
                   .a { stroke: blue }\n\
                   rect,  circle { fill: green }";
        let rules = parse_stylesheet(css);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].selector, "rect");
        assert_eq!(rules[1].selector, "circle");
        assert_eq!(rules[1].declarations[0].value, "green");
        assert_eq!(rules[2].specificity, [0, 1, 0]);
        assert_eq!(rules[2].declarations[0].value, "blue");

        assert!(parse_stylesheet("dangling selector").is_empty());
        assert!(parse_stylesheet("  /* unterminated").is_empty());
    }
}
