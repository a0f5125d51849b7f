//! Element tree nodes: kinds, typed payloads, style declarations and custom
//! attributes.

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::color::Paint;
use crate::transform::TransformList;
use crate::values::{
    AspectRatio, Color, CoordinateUnits, Display, FillRule, Length, LengthList, MarkerUnits,
    Point, Reference, SpreadMethod, StrokeLineCap, StrokeLineJoin, TextAnchor, ViewBox,
    Visibility, XmlSpace,
};

bitflags! {
    /// Static capabilities of an element kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// May hold child elements that take part in rendering.
        const CONTAINER = 1 << 0;
        /// Draws something itself (shapes, text, images, `use`).
        const GRAPHIC = 1 << 1;
        /// Never rendered directly; only reachable by reference.
        const NON_RENDERING = 1 << 2;
        /// Carries human readable text (`desc`, `title`, `metadata`).
        const DESCRIPTIVE = 1 << 3;
        /// Paint server (gradients, patterns).
        const PAINT_SERVER = 1 << 4;
        /// Filter primitive (`fe*`).
        const FILTER_PRIMITIVE = 1 << 5;
    }
}

macro_rules! element_kinds {
    ($($kind:ident => $tag:expr, $caps:expr;)+) => {
        /// Concrete element type handle.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ElementKind {
            $($kind),+
        }

        impl ElementKind {
            /// Tag name this kind is registered under, if any.
            pub fn tag_name(self) -> Option<&'static str> {
                match self {
                    $(ElementKind::$kind => $tag),+
                }
            }

            /// Fully qualified type name used in diagnostics.
            pub fn type_name(self) -> &'static str {
                match self {
                    $(ElementKind::$kind => concat!(module_path!(), "::", stringify!($kind))),+
                }
            }

            pub fn capabilities(self) -> Capabilities {
                match self {
                    $(ElementKind::$kind => $caps),+
                }
            }
        }
    };
}

const NONE: Capabilities = Capabilities::empty();
const CONTAINER: Capabilities = Capabilities::CONTAINER;
const GRAPHIC: Capabilities = Capabilities::GRAPHIC;
const HIDDEN_CONTAINER: Capabilities =
    Capabilities::CONTAINER.union(Capabilities::NON_RENDERING);
const DESCRIPTIVE: Capabilities = Capabilities::DESCRIPTIVE.union(Capabilities::NON_RENDERING);
const PAINT_SERVER: Capabilities = Capabilities::PAINT_SERVER
    .union(Capabilities::NON_RENDERING)
    .union(Capabilities::CONTAINER);
const PRIMITIVE: Capabilities =
    Capabilities::FILTER_PRIMITIVE.union(Capabilities::NON_RENDERING);

element_kinds! {
    Document => Some("svg"), CONTAINER;
    Fragment => Some("svg"), CONTAINER;
    Group => Some("g"), CONTAINER;
    Defs => Some("defs"), HIDDEN_CONTAINER;
    Description => Some("desc"), DESCRIPTIVE;
    Title => Some("title"), DESCRIPTIVE;
    Metadata => Some("metadata"), DESCRIPTIVE;
    Symbol => Some("symbol"), HIDDEN_CONTAINER;
    Use => Some("use"), GRAPHIC;
    Switch => Some("switch"), CONTAINER;
    Anchor => Some("a"), CONTAINER;
    Image => Some("image"), GRAPHIC;
    StyleSheet => Some("style"), Capabilities::NON_RENDERING;
    Rect => Some("rect"), GRAPHIC;
    Circle => Some("circle"), GRAPHIC;
    Ellipse => Some("ellipse"), GRAPHIC;
    Line => Some("line"), GRAPHIC;
    Polyline => Some("polyline"), GRAPHIC;
    Polygon => Some("polygon"), GRAPHIC;
    Path => Some("path"), GRAPHIC;
    Text => Some("text"), GRAPHIC.union(CONTAINER);
    TextSpan => Some("tspan"), GRAPHIC.union(CONTAINER);
    TextPath => Some("textPath"), GRAPHIC.union(CONTAINER);
    LinearGradient => Some("linearGradient"), PAINT_SERVER;
    RadialGradient => Some("radialGradient"), PAINT_SERVER;
    Stop => Some("stop"), Capabilities::NON_RENDERING;
    Pattern => Some("pattern"), PAINT_SERVER;
    ClipPath => Some("clipPath"), HIDDEN_CONTAINER;
    Mask => Some("mask"), HIDDEN_CONTAINER;
    Marker => Some("marker"), HIDDEN_CONTAINER;
    Filter => Some("filter"), HIDDEN_CONTAINER;
    FeGaussianBlur => Some("feGaussianBlur"), PRIMITIVE;
    FeOffset => Some("feOffset"), PRIMITIVE;
    FeFlood => Some("feFlood"), PRIMITIVE;
    FeBlend => Some("feBlend"), PRIMITIVE;
    FeMerge => Some("feMerge"), PRIMITIVE.union(CONTAINER);
    FeMergeNode => Some("feMergeNode"), PRIMITIVE;
    Unknown => None, NONE;
    Foreign => None, NONE;
}

impl ElementKind {
    /// Whether nothing under this element is drawn in normal rendering.
    pub fn suppresses_rendering(self) -> bool {
        self.capabilities().contains(Capabilities::NON_RENDERING)
    }

    /// Default-construct the typed payload for this kind.
    pub fn instantiate(self) -> ElementData {
        match self {
            ElementKind::Document | ElementKind::Fragment | ElementKind::Symbol => {
                ElementData::Viewport(Default::default())
            }
            ElementKind::Use => ElementData::Use(Default::default()),
            ElementKind::Anchor => ElementData::Anchor(Default::default()),
            ElementKind::Image => ElementData::Image(Default::default()),
            ElementKind::StyleSheet => ElementData::StyleSheet(Default::default()),
            ElementKind::Rect => ElementData::Rect(Default::default()),
            ElementKind::Circle => ElementData::Circle(Default::default()),
            ElementKind::Ellipse => ElementData::Ellipse(Default::default()),
            ElementKind::Line => ElementData::Line(Default::default()),
            ElementKind::Polyline | ElementKind::Polygon => ElementData::Points(Default::default()),
            ElementKind::Path => ElementData::Path(Default::default()),
            ElementKind::Text | ElementKind::TextSpan => ElementData::Text(Default::default()),
            ElementKind::TextPath => ElementData::TextPath(Default::default()),
            ElementKind::LinearGradient => ElementData::LinearGradient(Default::default()),
            ElementKind::RadialGradient => ElementData::RadialGradient(Default::default()),
            ElementKind::Stop => ElementData::Stop(Default::default()),
            ElementKind::Pattern => ElementData::Pattern(Default::default()),
            ElementKind::ClipPath => ElementData::ClipPath(Default::default()),
            ElementKind::Mask => ElementData::Mask(Default::default()),
            ElementKind::Marker => ElementData::Marker(Default::default()),
            ElementKind::Filter => ElementData::Filter(Default::default()),
            ElementKind::FeGaussianBlur
            | ElementKind::FeOffset
            | ElementKind::FeFlood
            | ElementKind::FeBlend
            | ElementKind::FeMerge
            | ElementKind::FeMergeNode => ElementData::FilterPrimitive(Default::default()),
            ElementKind::Group
            | ElementKind::Defs
            | ElementKind::Description
            | ElementKind::Title
            | ElementKind::Metadata
            | ElementKind::Switch
            | ElementKind::Unknown
            | ElementKind::Foreign => ElementData::Empty,
        }
    }
}

/// `id`, `class`, `xml:space` and `xml:lang`, shared by every element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoreAttributes {
    pub id: Option<String>,
    pub class: Option<Vec<String>>,
    pub space: Option<XmlSpace>,
    pub lang: Option<String>,
}

/// Typed presentation properties. Populated from presentation attributes and
/// inline style once styles are flushed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Presentation {
    pub fill: Option<Paint>,
    pub fill_opacity: Option<f64>,
    pub fill_rule: Option<FillRule>,
    pub stroke: Option<Paint>,
    pub stroke_opacity: Option<f64>,
    pub stroke_width: Option<Length>,
    pub stroke_linecap: Option<StrokeLineCap>,
    pub stroke_linejoin: Option<StrokeLineJoin>,
    pub stroke_miterlimit: Option<f64>,
    pub stroke_dasharray: Option<LengthList>,
    pub stroke_dashoffset: Option<Length>,
    pub opacity: Option<f64>,
    pub clip_rule: Option<FillRule>,
    pub clip_path: Option<Reference>,
    pub mask: Option<Reference>,
    pub filter: Option<Reference>,
    pub marker_start: Option<Reference>,
    pub marker_mid: Option<Reference>,
    pub marker_end: Option<Reference>,
    pub visibility: Option<Visibility>,
    pub display: Option<Display>,
    pub color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<Length>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub text_anchor: Option<TextAnchor>,
    pub stop_color: Option<Color>,
    pub stop_opacity: Option<f64>,
    pub flood_color: Option<Color>,
    pub flood_opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportData {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub view_box: Option<ViewBox>,
    pub preserve_aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UseData {
    pub href: Option<String>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnchorData {
    pub href: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageData {
    pub href: Option<String>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub preserve_aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheetData {
    pub media_type: Option<String>,
    pub media: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RectData {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub rx: Option<Length>,
    pub ry: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CircleData {
    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub r: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EllipseData {
    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub rx: Option<Length>,
    pub ry: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineData {
    pub x1: Option<Length>,
    pub y1: Option<Length>,
    pub x2: Option<Length>,
    pub y2: Option<Length>,
}

/// Vertices of a `polyline` or `polygon`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointsData {
    pub points: Option<Vec<Point>>,
}

/// Path data is kept as text; segment parsing is the renderer's concern.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData {
    pub d: Option<String>,
    pub path_length: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextData {
    pub x: Option<LengthList>,
    pub y: Option<LengthList>,
    pub dx: Option<LengthList>,
    pub dy: Option<LengthList>,
    pub rotate: Option<Vec<f64>>,
    pub text_length: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextPathData {
    pub href: Option<String>,
    pub start_offset: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearGradientData {
    pub href: Option<String>,
    pub x1: Option<Length>,
    pub y1: Option<Length>,
    pub x2: Option<Length>,
    pub y2: Option<Length>,
    pub gradient_units: Option<CoordinateUnits>,
    pub gradient_transform: Option<TransformList>,
    pub spread_method: Option<SpreadMethod>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadialGradientData {
    pub href: Option<String>,
    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub r: Option<Length>,
    pub fx: Option<Length>,
    pub fy: Option<Length>,
    pub gradient_units: Option<CoordinateUnits>,
    pub gradient_transform: Option<TransformList>,
    pub spread_method: Option<SpreadMethod>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopData {
    /// Offset normalized to `[0, 1]`; percentages are divided by 100.
    pub offset: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternData {
    pub href: Option<String>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub pattern_units: Option<CoordinateUnits>,
    pub pattern_content_units: Option<CoordinateUnits>,
    pub pattern_transform: Option<TransformList>,
    pub view_box: Option<ViewBox>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClipPathData {
    pub clip_path_units: Option<CoordinateUnits>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaskData {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub mask_units: Option<CoordinateUnits>,
    pub mask_content_units: Option<CoordinateUnits>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerData {
    pub ref_x: Option<Length>,
    pub ref_y: Option<Length>,
    pub marker_width: Option<Length>,
    pub marker_height: Option<Length>,
    pub marker_units: Option<MarkerUnits>,
    pub orient: Option<String>,
    pub view_box: Option<ViewBox>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterData {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub filter_units: Option<CoordinateUnits>,
    pub primitive_units: Option<CoordinateUnits>,
}

/// Attributes shared by the `fe*` primitives; each kind binds the subset it
/// understands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterPrimitiveData {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub result: Option<String>,
    pub input: Option<String>,
    pub input2: Option<String>,
    pub std_deviation: Option<Vec<f64>>,
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub mode: Option<String>,
}

/// Kind-specific typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementData {
    Empty,
    Viewport(ViewportData),
    Use(UseData),
    Anchor(AnchorData),
    Image(ImageData),
    StyleSheet(StyleSheetData),
    Rect(RectData),
    Circle(CircleData),
    Ellipse(EllipseData),
    Line(LineData),
    Points(PointsData),
    Path(PathData),
    Text(TextData),
    TextPath(TextPathData),
    LinearGradient(LinearGradientData),
    RadialGradient(RadialGradientData),
    Stop(StopData),
    Pattern(PatternData),
    ClipPath(ClipPathData),
    Mask(MaskData),
    Marker(MarkerData),
    Filter(FilterData),
    FilterPrimitive(FilterPrimitiveData),
}

/// Precedence rank of a style declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Specificity {
    PresentationAttribute,
    InlineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
    pub value: String,
    pub specificity: Specificity,
    pub important: bool,
}

/// One node of the element tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    namespace_uri: String,
    kind: ElementKind,
    pub core: CoreAttributes,
    pub presentation: Presentation,
    pub transform: Option<TransformList>,
    pub data: ElementData,
    styles: IndexMap<String, Vec<StyleDeclaration>>,
    custom_attributes: IndexMap<String, String>,
    content: String,
    children: Vec<Element>,
}

impl Element {
    /// Default-construct a registered kind under its own tag name.
    pub fn new(kind: ElementKind) -> Self {
        let name = kind.tag_name().unwrap_or_default();
        Self::with_name(kind, name.to_string(), String::new())
    }

    /// Placeholder for a tag in the SVG namespace that has no registered kind.
    pub fn unknown(tag_name: impl Into<String>) -> Self {
        Self::with_name(ElementKind::Unknown, tag_name.into(), String::new())
    }

    /// Element from a non-SVG namespace.
    pub fn foreign(tag_name: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        Self::with_name(ElementKind::Foreign, tag_name.into(), namespace_uri.into())
    }

    pub(crate) fn with_name(kind: ElementKind, name: String, namespace_uri: String) -> Self {
        Self {
            name,
            namespace_uri,
            kind,
            core: CoreAttributes::default(),
            presentation: Presentation::default(),
            transform: None,
            data: kind.instantiate(),
            styles: IndexMap::new(),
            custom_attributes: IndexMap::new(),
            content: String::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of a foreign element; empty for SVG elements.
    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Document or nested `<svg>` fragment.
    pub fn is_svg_root(&self) -> bool {
        matches!(self.kind, ElementKind::Document | ElementKind::Fragment)
    }

    pub fn id(&self) -> Option<&str> {
        self.core.id.as_deref()
    }

    /// Record a style declaration after any earlier ones for the same property.
    pub fn add_style(
        &mut self,
        name: &str,
        value: &str,
        specificity: Specificity,
        important: bool,
    ) {
        self.styles
            .entry(name.to_string())
            .or_default()
            .push(StyleDeclaration {
                value: value.to_string(),
                specificity,
                important,
            });
    }

    /// Every recorded declaration, grouped by property name in the order
    /// each property was first declared.
    pub fn styles(&self) -> &IndexMap<String, Vec<StyleDeclaration>> {
        &self.styles
    }

    /// Declarations for `name` in insertion order.
    pub fn style_declarations(&self, name: &str) -> &[StyleDeclaration] {
        self.styles.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Winning declaration for `name`: `!important` first, then higher
    /// specificity, then the later declaration.
    pub fn effective_style(&self, name: &str) -> Option<&StyleDeclaration> {
        effective(self.style_declarations(name))
    }

    /// Unrecognized attributes in document order.
    pub fn custom_attributes(&self) -> &IndexMap<String, String> {
        &self.custom_attributes
    }

    pub fn custom_attribute(&self, name: &str) -> Option<&str> {
        self.custom_attributes.get(name).map(String::as_str)
    }

    pub fn set_custom_attribute(&mut self, name: &str, value: &str) {
        self.custom_attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Character data collected from text and CDATA children.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn push_content(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Pre-order walk over this element and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub(crate) fn effective(declarations: &[StyleDeclaration]) -> Option<&StyleDeclaration> {
    declarations
        .iter()
        .max_by_key(|decl| (decl.important, decl.specificity))
}

/// Iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}
