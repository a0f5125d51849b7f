#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level SVG facade that re-exports the workspace crates and provides
//! convenience entry points.
//!
//! ```rust,no_run
//! use svgdom::{dom::ElementKind, SvgError};
//!
//! # fn run() -> Result<(), SvgError> {
//! let doc = svgdom::open("tests/struct-use-01.svg")?;
//! for warning in doc.diagnostics() {
//!     eprintln!("{warning}");
//! }
//! let shapes = doc
//!     .descendants()
//!     .filter(|e| e.kind() == ElementKind::Rect)
//!     .count();
//! println!("{shapes} rects");
//! # Ok(())
//! # }
//! ```

pub use svgdom_core as dom;
pub use svgdom_css as css;
pub use svgdom_xml as xml;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use dom::{
    AttributeWarning, Document, DomError, Element, ElementData, ElementKind, ParseOptions,
};

/// Error type produced by the high level SVG facade.
#[derive(Debug, Error)]
pub enum SvgError {
    /// Wrapper around errors raised while building the element tree.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Reading the document from disk failed.
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse an in-memory document with default options.
pub fn parse(bytes: &[u8]) -> Result<Document, SvgError> {
    parse_with_options(bytes, &ParseOptions::default())
}

pub fn parse_with_options(bytes: &[u8], options: &ParseOptions) -> Result<Document, SvgError> {
    Ok(Document::parse_bytes(bytes, options)?)
}

/// Read and parse a file. Relative references resolve against its location.
pub fn open(path: impl AsRef<Path>) -> Result<Document, SvgError> {
    open_with_options(path, ParseOptions::default())
}

/// Like [`open`], keeping any caller-supplied base URI.
pub fn open_with_options(
    path: impl AsRef<Path>,
    mut options: ParseOptions,
) -> Result<Document, SvgError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| SvgError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if options.base_uri.is_none() {
        options.base_uri = Some(file_uri(path));
    }
    debug!(path = %path.display(), len = bytes.len(), "parsing svg file");
    parse_with_options(&bytes, &options)
}

fn file_uri(path: &Path) -> String {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_returns_typed_document() {
        let doc = parse(br#"<svg xmlns="http://www.w3.org/2000/svg"><rect fill="nope"/></svg>"#)
            .expect("parse");
        assert_eq!(doc.root().children()[0].kind(), ElementKind::Rect);
        assert_eq!(doc.diagnostics().len(), 1);
    }

    #[test]
    fn errors_are_wrapped() {
        let err = parse(b"<g/>").unwrap_err();
        assert!(matches!(err, SvgError::Dom(DomError::NotSvgRoot(_))));

        let err = open("definitely/not/here.svg").unwrap_err();
        assert!(matches!(err, SvgError::Io { .. }));
        assert!(err.to_string().contains("here.svg"));
    }

    #[test]
    fn open_sets_file_base_uri() {
        let dir = std::env::temp_dir().join(format!("svgdom-open-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let file = dir.join("img.svg");
        fs::write(
            &file,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><image href="pic.png"/></svg>"#,
        )
        .expect("write fixture");
        let doc = open(&file).expect("open");
        let base = doc.base_uri().expect("base uri");
        assert!(base.starts_with("file://"));
        assert!(base.ends_with("img.svg"));
        let ElementData::Image(image) = &doc.root().children()[0].data else {
            panic!("image payload");
        };
        let href = image.href.as_deref().expect("href");
        assert!(href.starts_with("file://"));
        assert!(href.ends_with("pic.png"));
        fs::remove_dir_all(&dir).ok();
    }
}
