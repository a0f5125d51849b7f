//! SVG object model: element registry, attribute bindings, element factory
//! and document builder.

pub mod binding;
pub mod color;
pub mod dispatch;
pub mod document;
pub mod element;
pub mod factory;
pub mod presentation;
pub mod registry;
pub mod transform;
pub mod values;

use svgdom_xml::XmlError;
use thiserror::Error;

pub use binding::{Binding, BindingCache};
pub use color::Paint;
pub use dispatch::AttributeWarning;
pub use document::{Document, ParseContext, ParseOptions};
pub use element::{
    Capabilities, Element, ElementData, ElementKind, Specificity, StyleDeclaration,
};
pub use factory::ElementFactory;
pub use presentation::is_presentation_attribute;
pub use registry::{ElementDescriptor, Registry};
pub use transform::{TransformItem, TransformList};
pub use values::{AttributeValue, Color, ConversionError, Length, LengthUnit};

pub use svgtypes;

/// Error type produced while building a document.
#[derive(Debug, Error)]
pub enum DomError {
    /// A non-root element was created without its document's context.
    #[error("no document context for element: {0}")]
    MissingDocument(String),
    /// The document element is not `<svg>`.
    #[error("document root must be <svg>, found: {0}")]
    NotSvgRoot(String),
    /// The input contains no element at all.
    #[error("document has no root element")]
    EmptyDocument,
    /// Tags are unbalanced or there is more than one top-level element.
    #[error("malformed document: {0}")]
    Structure(String),
    #[error(transparent)]
    Xml(#[from] XmlError),
}
