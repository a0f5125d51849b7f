use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::common;

/// Test file prefixes that need scripting, animation, linking or
/// interaction to be meaningful.
const SKIPPED_PREFIXES: [&str; 5] = [
    "animate-",
    "conform-viewer",
    "linking-",
    "interact-",
    "script-",
];

#[derive(Debug, Serialize)]
struct FileResult {
    file: String,
    parsed: bool,
    expected_to_pass: bool,
    elements: usize,
    warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConformReport {
    total: usize,
    parsed: usize,
    failed: usize,
    regressions: Vec<String>,
    results: Vec<FileResult>,
}

pub fn run(dir: &Path, passing: Option<PathBuf>, json: bool) -> Result<()> {
    let passing_path = passing.unwrap_or_else(|| dir.join("..").join("PassingTests.txt"));
    let expected = load_passing(&passing_path)?;
    let files = collect_test_files(dir)?;
    info!(dir = %dir.display(), files = files.len(), "running conformance sweep");

    let results: Vec<FileResult> = files
        .iter()
        .map(|name| check_file(dir, name, expected.contains(name)))
        .collect();
    let parsed = results.iter().filter(|r| r.parsed).count();
    let regressions: Vec<String> = results
        .iter()
        .filter(|r| r.expected_to_pass && !r.parsed)
        .map(|r| r.file.clone())
        .collect();
    let report = ConformReport {
        total: results.len(),
        parsed,
        failed: results.len() - parsed,
        regressions,
        results,
    };

    if json {
        common::print_json(&report)?;
    } else {
        print_report(&report);
    }

    if !report.regressions.is_empty() {
        bail!(
            "{} file(s) listed in {} failed to parse",
            report.regressions.len(),
            passing_path.display()
        );
    }
    Ok(())
}

/// Names of files expected to pass, one per line. A missing list is empty.
fn load_passing(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "no passing list");
        return Ok(HashSet::new());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(parse_passing(&text))
}

fn parse_passing(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn collect_test_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))? {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".svg") && is_candidate(&name) {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

fn is_candidate(name: &str) -> bool {
    !SKIPPED_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) && !name.contains("-dom-")
}

fn check_file(dir: &Path, name: &str, expected_to_pass: bool) -> FileResult {
    match svgdom::open(dir.join(name)) {
        Ok(doc) => FileResult {
            file: name.to_string(),
            parsed: true,
            expected_to_pass,
            elements: doc.descendants().count(),
            warnings: doc.diagnostics().len(),
            error: None,
        },
        Err(err) => {
            warn!(file = name, error = %err, "failed to parse");
            FileResult {
                file: name.to_string(),
                parsed: false,
                expected_to_pass,
                elements: 0,
                warnings: 0,
                error: Some(err.to_string()),
            }
        }
    }
}

fn print_report(report: &ConformReport) {
    println!("{:<40} {:<8} {:>8} {:>8}", "FILE", "STATUS", "ELEMENTS", "WARNINGS");
    for result in &report.results {
        let status = match (result.parsed, result.expected_to_pass) {
            (true, _) => "ok",
            (false, true) => "REGRESS",
            (false, false) => "fail",
        };
        println!(
            "{:<40} {:<8} {:>8} {:>8}",
            result.file, status, result.elements, result.warnings
        );
        if let Some(error) = &result.error {
            println!("    {error}");
        }
    }
    println!(
        "\n{} files: {} parsed, {} failed, {} regressions",
        report.total,
        report.parsed,
        report.failed,
        report.regressions.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_runner_excluded_files() {
        assert!(is_candidate("struct-use-01-t.svg"));
        assert!(is_candidate("painting-fill-01-t.svg"));
        assert!(!is_candidate("animate-elem-02-t.svg"));
        assert!(!is_candidate("conform-viewers-01-t.svg"));
        assert!(!is_candidate("types-dom-01-b.svg"));
        assert!(!is_candidate("linking-a-01-b.svg"));
        assert!(!is_candidate("interact-zoom-01-t.svg"));
        assert!(!is_candidate("script-handle-01-b.svg"));
    }

    #[test]
    fn passing_list_ignores_blank_lines() {
        let set = parse_passing("a.svg\n\n  b.svg \r\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("b.svg"));
    }

    #[test]
    fn sweep_reports_regressions() {
        let dir = std::env::temp_dir().join(format!("svgdomctl-conform-{}", std::process::id()));
        let svg_dir = dir.join("svg");
        fs::create_dir_all(&svg_dir).expect("temp dir");
        fs::write(
            svg_dir.join("shapes-rect-01-t.svg"),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1"/></svg>"#,
        )
        .expect("write good");
        fs::write(svg_dir.join("shapes-bad-01-t.svg"), "<svg><g></svg>").expect("write bad");
        fs::write(svg_dir.join("script-x-01-t.svg"), "not xml").expect("write skipped");
        fs::write(dir.join("PassingTests.txt"), "shapes-rect-01-t.svg\n").expect("write list");

        let files = collect_test_files(&svg_dir).expect("list");
        assert_eq!(files, ["shapes-bad-01-t.svg", "shapes-rect-01-t.svg"]);
        assert!(run(&svg_dir, None, true).is_ok());

        fs::write(
            dir.join("PassingTests.txt"),
            "shapes-rect-01-t.svg\nshapes-bad-01-t.svg\n",
        )
        .expect("rewrite list");
        assert!(run(&svg_dir, None, true).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
