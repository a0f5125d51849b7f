//! Per `(element kind, attribute name)` converter and setter lookup with a
//! process-wide memo.

use std::collections::HashMap;
use std::fmt;
use std::ptr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::debug;

use crate::document::ParseContext;
use crate::element::{Element, ElementData, ElementKind};
use crate::values::{parse_number, parse_number_list, parse_points, AttributeValue, ConversionError};

/// Parses the raw attribute text into a typed value.
pub type Converter = fn(&str, &ParseContext) -> Result<AttributeValue, ConversionError>;
/// Stores a converted value on the element.
pub type Setter = fn(&mut Element, AttributeValue);

/// Static description of one bindable attribute.
pub struct AttributeSpec {
    pub name: &'static str,
    convert: Converter,
    apply: Setter,
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolved converter and setter for one attribute of one element kind.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    owner: ElementKind,
    spec: &'static AttributeSpec,
}

impl Binding {
    pub fn owner(&self) -> ElementKind {
        self.owner
    }

    pub fn attribute(&self) -> &'static str {
        self.spec.name
    }

    pub fn convert(&self, raw: &str, ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
        (self.spec.convert)(raw, ctx)
    }

    pub fn apply(&self, element: &mut Element, value: AttributeValue) {
        (self.spec.apply)(element, value)
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && ptr::eq(self.spec, other.spec)
    }
}

impl Eq for Binding {}

/// Memoized binding lookups. Negative results are cached too and nothing is
/// ever evicted.
#[derive(Debug, Default)]
pub struct BindingCache {
    entries: Mutex<HashMap<ElementKind, HashMap<String, Option<Binding>>>>,
    lookups: AtomicUsize,
}

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache shared by every factory that does not bring its own.
    pub fn global() -> &'static BindingCache {
        static CACHE: OnceLock<BindingCache> = OnceLock::new();
        CACHE.get_or_init(BindingCache::new)
    }

    /// Binding for `attribute` on `owner`, computing and caching it on first
    /// use. The check and the insert happen under one lock.
    pub fn resolve(&self, owner: ElementKind, attribute: &str) -> Option<Binding> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let per_kind = entries.entry(owner).or_default();
        if let Some(cached) = per_kind.get(attribute) {
            return *cached;
        }
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let binding = find_spec(owner, attribute).map(|spec| Binding { owner, spec });
        debug!(
            owner = owner.type_name(),
            attribute,
            bound = binding.is_some(),
            "binding cache miss"
        );
        per_kind.insert(attribute.to_string(), binding);
        binding
    }

    /// Number of table scans performed so far; one per distinct key.
    pub fn metadata_lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Number of cached `(kind, attribute)` entries, positive or negative.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scan order: kind payload, shared `transform`, presentation, core.
fn find_spec(owner: ElementKind, attribute: &str) -> Option<&'static AttributeSpec> {
    let tables = tables();
    let kind_specs = tables.by_kind.get(&owner).map(Vec::as_slice).unwrap_or_default();
    let transform: &[AttributeSpec] = if accepts_transform(owner) {
        tables.transform.as_slice()
    } else {
        &[]
    };
    kind_specs
        .iter()
        .chain(transform)
        .chain(&tables.presentation)
        .chain(&tables.core)
        .find(|spec| spec.name == attribute)
}

fn accepts_transform(kind: ElementKind) -> bool {
    use ElementKind::*;
    matches!(
        kind,
        Group
            | Defs
            | Use
            | Switch
            | Anchor
            | Image
            | Rect
            | Circle
            | Ellipse
            | Line
            | Polyline
            | Polygon
            | Path
            | Text
            | ClipPath
    )
}

fn parsed<T>(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError>
where
    T: FromStr + Into<AttributeValue>,
    ConversionError: From<T::Err>,
{
    raw.trim().parse::<T>().map(Into::into).map_err(ConversionError::from)
}

fn number(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    parse_number(raw).map(AttributeValue::Number)
}

fn numbers(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    parse_number_list(raw).map(AttributeValue::Numbers)
}

fn opacity(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    parse_number(raw).map(|value| AttributeValue::Number(value.clamp(0.0, 1.0)))
}

fn offset(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    let text = raw.trim();
    let value = match text.strip_suffix('%') {
        Some(percent) => parse_number(percent)? / 100.0,
        None => parse_number(text)?,
    };
    Ok(AttributeValue::Number(value.clamp(0.0, 1.0)))
}

fn text(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    Ok(AttributeValue::Text(raw.to_string()))
}

fn classes(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    Ok(AttributeValue::Classes(
        raw.split_whitespace().map(str::to_string).collect(),
    ))
}

fn points(raw: &str, _ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    parse_points(raw).map(AttributeValue::Points)
}

/// `href` values: fragments and absolute IRIs are kept, relative ones are
/// joined to the document base when there is one.
fn iri(raw: &str, ctx: &ParseContext) -> Result<AttributeValue, ConversionError> {
    let reference = raw.trim();
    if reference.is_empty() {
        return Err(ConversionError::new("empty IRI reference"));
    }
    if reference.starts_with('#') || has_scheme(reference) {
        return Ok(AttributeValue::Text(reference.to_string()));
    }
    let resolved = match ctx.base_uri.as_deref() {
        Some(base) => match base.rfind('/') {
            Some(slash) => format!("{}{}", &base[..=slash], reference),
            None => reference.to_string(),
        },
        None => reference.to_string(),
    };
    Ok(AttributeValue::Text(resolved))
}

fn has_scheme(reference: &str) -> bool {
    match reference.find(':') {
        Some(colon) if colon > 0 => reference[..colon]
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')),
        _ => false,
    }
}

/// Attribute stored on a field reachable from the element itself.
macro_rules! field {
    ($name:literal, $convert:expr, $($path:ident).+ : $variant:ident) => {
        AttributeSpec {
            name: $name,
            convert: $convert,
            apply: |element, value| {
                if let AttributeValue::$variant(value) = value {
                    element.$($path).+ = Some(value);
                }
            },
        }
    };
}

/// Attribute stored in the kind payload.
macro_rules! payload {
    ($name:literal, $convert:expr, $data:ident . $field:ident : $variant:ident) => {
        AttributeSpec {
            name: $name,
            convert: $convert,
            apply: |element, value| {
                if let (ElementData::$data(data), AttributeValue::$variant(value)) =
                    (&mut element.data, value)
                {
                    data.$field = Some(value);
                }
            },
        }
    };
}

macro_rules! lengths {
    ($data:ident: $($name:literal => $field:ident),+ $(,)?) => {
        [$(payload!($name, parsed::<crate::values::Length>, $data.$field: Length)),+]
    };
}

struct Tables {
    by_kind: HashMap<ElementKind, Vec<AttributeSpec>>,
    transform: Vec<AttributeSpec>,
    presentation: Vec<AttributeSpec>,
    core: Vec<AttributeSpec>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> Tables {
    use crate::color::Paint;
    use crate::transform::TransformList;
    use crate::values::{
        AspectRatio, Color, CoordinateUnits, Display, FillRule, Length, LengthList, MarkerUnits,
        Reference, SpreadMethod, StrokeLineCap, StrokeLineJoin, TextAnchor, ViewBox, Visibility,
        XmlSpace,
    };

    let core = vec![
        field!("id", text, core.id: Text),
        field!("class", classes, core.class: Classes),
        field!("space", parsed::<XmlSpace>, core.space: Space),
        field!("lang", text, core.lang: Text),
    ];

    let presentation = vec![
        field!("fill", parsed::<Paint>, presentation.fill: Paint),
        field!("fill-opacity", opacity, presentation.fill_opacity: Number),
        field!("fill-rule", parsed::<FillRule>, presentation.fill_rule: FillRule),
        field!("stroke", parsed::<Paint>, presentation.stroke: Paint),
        field!("stroke-opacity", opacity, presentation.stroke_opacity: Number),
        field!("stroke-width", parsed::<Length>, presentation.stroke_width: Length),
        field!("stroke-linecap", parsed::<StrokeLineCap>, presentation.stroke_linecap: LineCap),
        field!("stroke-linejoin", parsed::<StrokeLineJoin>, presentation.stroke_linejoin: LineJoin),
        field!("stroke-miterlimit", number, presentation.stroke_miterlimit: Number),
        field!("stroke-dasharray", parsed::<LengthList>, presentation.stroke_dasharray: Lengths),
        field!("stroke-dashoffset", parsed::<Length>, presentation.stroke_dashoffset: Length),
        field!("opacity", opacity, presentation.opacity: Number),
        field!("clip-rule", parsed::<FillRule>, presentation.clip_rule: FillRule),
        field!("clip-path", parsed::<Reference>, presentation.clip_path: Reference),
        field!("mask", parsed::<Reference>, presentation.mask: Reference),
        field!("filter", parsed::<Reference>, presentation.filter: Reference),
        field!("marker-start", parsed::<Reference>, presentation.marker_start: Reference),
        field!("marker-mid", parsed::<Reference>, presentation.marker_mid: Reference),
        field!("marker-end", parsed::<Reference>, presentation.marker_end: Reference),
        field!("visibility", parsed::<Visibility>, presentation.visibility: Visibility),
        field!("display", parsed::<Display>, presentation.display: Display),
        field!("color", parsed::<Color>, presentation.color: Color),
        field!("font-family", text, presentation.font_family: Text),
        field!("font-size", parsed::<Length>, presentation.font_size: Length),
        field!("font-weight", text, presentation.font_weight: Text),
        field!("font-style", text, presentation.font_style: Text),
        field!("text-anchor", parsed::<TextAnchor>, presentation.text_anchor: TextAnchor),
        field!("stop-color", parsed::<Color>, presentation.stop_color: Color),
        field!("stop-opacity", opacity, presentation.stop_opacity: Number),
        field!("flood-color", parsed::<Color>, presentation.flood_color: Color),
        field!("flood-opacity", opacity, presentation.flood_opacity: Number),
    ];

    let transform = vec![field!("transform", parsed::<TransformList>, transform: Transform)];

    let viewport = || {
        let mut specs = Vec::from(lengths!(Viewport:
            "x" => x, "y" => y, "width" => width, "height" => height));
        specs.push(payload!("viewBox", parsed::<ViewBox>, Viewport.view_box: ViewBox));
        specs.push(payload!(
            "preserveAspectRatio",
            parsed::<AspectRatio>,
            Viewport.preserve_aspect_ratio: AspectRatio
        ));
        specs
    };
    let text_positioning = || {
        vec![
            payload!("x", parsed::<LengthList>, Text.x: Lengths),
            payload!("y", parsed::<LengthList>, Text.y: Lengths),
            payload!("dx", parsed::<LengthList>, Text.dx: Lengths),
            payload!("dy", parsed::<LengthList>, Text.dy: Lengths),
            payload!("rotate", numbers, Text.rotate: Numbers),
            payload!("textLength", parsed::<Length>, Text.text_length: Length),
        ]
    };
    let primitive_region = || {
        let mut specs = Vec::from(lengths!(FilterPrimitive:
            "x" => x, "y" => y, "width" => width, "height" => height));
        specs.push(payload!("result", text, FilterPrimitive.result: Text));
        specs
    };
    let points_specs = || vec![payload!("points", points, Points.points: Points)];

    let mut by_kind = HashMap::new();
    by_kind.insert(ElementKind::Document, viewport());
    by_kind.insert(ElementKind::Fragment, viewport());
    by_kind.insert(
        ElementKind::Symbol,
        vec![
            payload!("viewBox", parsed::<ViewBox>, Viewport.view_box: ViewBox),
            payload!(
                "preserveAspectRatio",
                parsed::<AspectRatio>,
                Viewport.preserve_aspect_ratio: AspectRatio
            ),
        ],
    );

    let mut use_specs = vec![payload!("href", iri, Use.href: Text)];
    use_specs.extend(lengths!(Use: "x" => x, "y" => y, "width" => width, "height" => height));
    by_kind.insert(ElementKind::Use, use_specs);

    by_kind.insert(
        ElementKind::Anchor,
        vec![
            payload!("href", iri, Anchor.href: Text),
            payload!("target", text, Anchor.target: Text),
        ],
    );

    let mut image = vec![payload!("href", iri, Image.href: Text)];
    image.extend(lengths!(Image: "x" => x, "y" => y, "width" => width, "height" => height));
    image.push(payload!(
        "preserveAspectRatio",
        parsed::<AspectRatio>,
        Image.preserve_aspect_ratio: AspectRatio
    ));
    by_kind.insert(ElementKind::Image, image);

    by_kind.insert(
        ElementKind::StyleSheet,
        vec![
            payload!("type", text, StyleSheet.media_type: Text),
            payload!("media", text, StyleSheet.media: Text),
        ],
    );

    by_kind.insert(
        ElementKind::Rect,
        Vec::from(lengths!(Rect:
            "x" => x, "y" => y, "width" => width, "height" => height, "rx" => rx, "ry" => ry)),
    );
    by_kind.insert(
        ElementKind::Circle,
        Vec::from(lengths!(Circle: "cx" => cx, "cy" => cy, "r" => r)),
    );
    by_kind.insert(
        ElementKind::Ellipse,
        Vec::from(lengths!(Ellipse: "cx" => cx, "cy" => cy, "rx" => rx, "ry" => ry)),
    );
    by_kind.insert(
        ElementKind::Line,
        Vec::from(lengths!(Line: "x1" => x1, "y1" => y1, "x2" => x2, "y2" => y2)),
    );
    by_kind.insert(ElementKind::Polyline, points_specs());
    by_kind.insert(ElementKind::Polygon, points_specs());
    by_kind.insert(
        ElementKind::Path,
        vec![
            payload!("d", text, Path.d: Text),
            payload!("pathLength", number, Path.path_length: Number),
        ],
    );
    by_kind.insert(ElementKind::Text, text_positioning());
    by_kind.insert(ElementKind::TextSpan, text_positioning());
    by_kind.insert(
        ElementKind::TextPath,
        vec![
            payload!("href", iri, TextPath.href: Text),
            payload!("startOffset", parsed::<Length>, TextPath.start_offset: Length),
        ],
    );

    let mut linear = vec![payload!("href", iri, LinearGradient.href: Text)];
    linear.extend(lengths!(LinearGradient: "x1" => x1, "y1" => y1, "x2" => x2, "y2" => y2));
    linear.extend([
        payload!("gradientUnits", parsed::<CoordinateUnits>, LinearGradient.gradient_units: Units),
        payload!(
            "gradientTransform",
            parsed::<TransformList>,
            LinearGradient.gradient_transform: Transform
        ),
        payload!("spreadMethod", parsed::<SpreadMethod>, LinearGradient.spread_method: Spread),
    ]);
    by_kind.insert(ElementKind::LinearGradient, linear);

    let mut radial = vec![payload!("href", iri, RadialGradient.href: Text)];
    radial.extend(lengths!(RadialGradient:
        "cx" => cx, "cy" => cy, "r" => r, "fx" => fx, "fy" => fy));
    radial.extend([
        payload!("gradientUnits", parsed::<CoordinateUnits>, RadialGradient.gradient_units: Units),
        payload!(
            "gradientTransform",
            parsed::<TransformList>,
            RadialGradient.gradient_transform: Transform
        ),
        payload!("spreadMethod", parsed::<SpreadMethod>, RadialGradient.spread_method: Spread),
    ]);
    by_kind.insert(ElementKind::RadialGradient, radial);

    by_kind.insert(
        ElementKind::Stop,
        vec![payload!("offset", offset, Stop.offset: Number)],
    );

    let mut pattern = vec![payload!("href", iri, Pattern.href: Text)];
    pattern.extend(lengths!(Pattern: "x" => x, "y" => y, "width" => width, "height" => height));
    pattern.extend([
        payload!("patternUnits", parsed::<CoordinateUnits>, Pattern.pattern_units: Units),
        payload!(
            "patternContentUnits",
            parsed::<CoordinateUnits>,
            Pattern.pattern_content_units: Units
        ),
        payload!(
            "patternTransform",
            parsed::<TransformList>,
            Pattern.pattern_transform: Transform
        ),
        payload!("viewBox", parsed::<ViewBox>, Pattern.view_box: ViewBox),
    ]);
    by_kind.insert(ElementKind::Pattern, pattern);

    by_kind.insert(
        ElementKind::ClipPath,
        vec![payload!(
            "clipPathUnits",
            parsed::<CoordinateUnits>,
            ClipPath.clip_path_units: Units
        )],
    );

    let mut mask = Vec::from(lengths!(Mask:
        "x" => x, "y" => y, "width" => width, "height" => height));
    mask.extend([
        payload!("maskUnits", parsed::<CoordinateUnits>, Mask.mask_units: Units),
        payload!("maskContentUnits", parsed::<CoordinateUnits>, Mask.mask_content_units: Units),
    ]);
    by_kind.insert(ElementKind::Mask, mask);

    let mut marker = Vec::from(lengths!(Marker:
        "refX" => ref_x, "refY" => ref_y,
        "markerWidth" => marker_width, "markerHeight" => marker_height));
    marker.extend([
        payload!("markerUnits", parsed::<MarkerUnits>, Marker.marker_units: MarkerUnits),
        payload!("orient", text, Marker.orient: Text),
        payload!("viewBox", parsed::<ViewBox>, Marker.view_box: ViewBox),
    ]);
    by_kind.insert(ElementKind::Marker, marker);

    let mut filter = Vec::from(lengths!(Filter:
        "x" => x, "y" => y, "width" => width, "height" => height));
    filter.extend([
        payload!("filterUnits", parsed::<CoordinateUnits>, Filter.filter_units: Units),
        payload!("primitiveUnits", parsed::<CoordinateUnits>, Filter.primitive_units: Units),
    ]);
    by_kind.insert(ElementKind::Filter, filter);

    let mut blur = primitive_region();
    blur.extend([
        payload!("in", text, FilterPrimitive.input: Text),
        payload!("stdDeviation", numbers, FilterPrimitive.std_deviation: Numbers),
    ]);
    by_kind.insert(ElementKind::FeGaussianBlur, blur);

    let mut fe_offset = primitive_region();
    fe_offset.extend([
        payload!("in", text, FilterPrimitive.input: Text),
        payload!("dx", number, FilterPrimitive.dx: Number),
        payload!("dy", number, FilterPrimitive.dy: Number),
    ]);
    by_kind.insert(ElementKind::FeOffset, fe_offset);

    by_kind.insert(ElementKind::FeFlood, primitive_region());

    let mut blend = primitive_region();
    blend.extend([
        payload!("in", text, FilterPrimitive.input: Text),
        payload!("in2", text, FilterPrimitive.input2: Text),
        payload!("mode", text, FilterPrimitive.mode: Text),
    ]);
    by_kind.insert(ElementKind::FeBlend, blend);

    by_kind.insert(ElementKind::FeMerge, primitive_region());
    by_kind.insert(
        ElementKind::FeMergeNode,
        vec![payload!("in", text, FilterPrimitive.input: Text)],
    );

    debug!(kinds = by_kind.len(), "attribute binding tables built");
    Tables {
        by_kind,
        transform,
        presentation,
        core,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Paint;
    use crate::values::{Color, Length, LengthUnit};

    fn ctx() -> ParseContext {
        ParseContext::default()
    }

    #[test]
    fn repeated_resolution_scans_once() {
        let cache = BindingCache::new();
        let first = cache.resolve(ElementKind::Rect, "width").expect("rect width");
        let second = cache.resolve(ElementKind::Rect, "width").expect("rect width");
        assert_eq!(first, second);
        assert_eq!(first.attribute(), "width");
        assert_eq!(first.owner(), ElementKind::Rect);
        assert_eq!(cache.metadata_lookups(), 1);

        assert!(cache.resolve(ElementKind::Rect, "data-foo").is_none());
        assert!(cache.resolve(ElementKind::Rect, "data-foo").is_none());
        assert_eq!(cache.metadata_lookups(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn same_attribute_on_different_kinds_is_a_different_key() {
        let cache = BindingCache::new();
        let rect = cache.resolve(ElementKind::Rect, "x").expect("rect x");
        let use_x = cache.resolve(ElementKind::Use, "x").expect("use x");
        assert_ne!(rect, use_x);
        assert_eq!(cache.metadata_lookups(), 2);
    }

    #[test]
    fn scan_covers_payload_shared_presentation_and_core() {
        let cache = BindingCache::new();
        assert!(cache.resolve(ElementKind::Circle, "r").is_some());
        assert!(cache.resolve(ElementKind::Circle, "transform").is_some());
        assert!(cache.resolve(ElementKind::LinearGradient, "transform").is_none());
        assert!(cache
            .resolve(ElementKind::LinearGradient, "gradientTransform")
            .is_some());
        assert!(cache.resolve(ElementKind::Unknown, "fill").is_some());
        assert!(cache.resolve(ElementKind::Foreign, "id").is_some());
        assert!(cache.resolve(ElementKind::Group, "r").is_none());
        assert!(cache.resolve(ElementKind::Document, "version").is_none());
    }

    #[test]
    fn binding_converts_and_applies() {
        let cache = BindingCache::new();
        let mut rect = Element::new(ElementKind::Rect);

        let width = cache.resolve(ElementKind::Rect, "width").expect("width");
        let value = width.convert("10mm", &ctx()).expect("length");
        width.apply(&mut rect, value);
        let ElementData::Rect(data) = &rect.data else {
            panic!("rect payload");
        };
        assert_eq!(data.width, Some(Length::new(10.0, LengthUnit::Mm)));

        let fill = cache.resolve(ElementKind::Rect, "fill").expect("fill");
        let value = fill.convert("red", &ctx()).expect("paint");
        fill.apply(&mut rect, value);
        assert_eq!(rect.presentation.fill, Some(Paint::Color(Color::new_rgb(255, 0, 0))));

        assert!(fill.convert("not-a-color", &ctx()).is_err());
    }

    #[test]
    fn opacity_and_offset_are_clamped() {
        let ctx = ctx();
        assert_eq!(opacity("1.5", &ctx).ok(), Some(AttributeValue::Number(1.0)));
        assert_eq!(opacity("-2", &ctx).ok(), Some(AttributeValue::Number(0.0)));
        assert_eq!(offset("50%", &ctx).ok(), Some(AttributeValue::Number(0.5)));
        assert_eq!(offset("0.25", &ctx).ok(), Some(AttributeValue::Number(0.25)));
        assert!(opacity("undefined", &ctx).is_err());
    }

    #[test]
    fn iri_resolves_relative_references_against_base() {
        let ctx = ParseContext {
            base_uri: Some("file:///suite/svg/struct-use-01.svg".to_string()),
        };
        assert_eq!(
            iri("#shape", &ctx).ok(),
            Some(AttributeValue::Text("#shape".into()))
        );
        assert_eq!(
            iri("images/a.png", &ctx).ok(),
            Some(AttributeValue::Text("file:///suite/svg/images/a.png".into()))
        );
        assert_eq!(
            iri("http://example.com/x.svg#y", &ctx).ok(),
            Some(AttributeValue::Text("http://example.com/x.svg#y".into()))
        );
        assert!(iri("  ", &ctx).is_err());
    }

    #[test]
    fn concurrent_resolution_keeps_one_entry_per_key() {
        let cache = BindingCache::new();
        let keys = [
            (ElementKind::Rect, "x"),
            (ElementKind::Rect, "fill"),
            (ElementKind::Circle, "r"),
            (ElementKind::Path, "d"),
            (ElementKind::Group, "bogus"),
        ];
        let results: Vec<Vec<Option<Binding>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        keys.iter()
                            .map(|(kind, name)| cache.resolve(*kind, name))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("resolver thread"))
                .collect()
        });
        assert_eq!(cache.len(), keys.len());
        assert_eq!(cache.metadata_lookups(), keys.len());
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
