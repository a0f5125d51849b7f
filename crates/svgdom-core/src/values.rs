//! Typed attribute values.
//!
//! Lengths, numbers, colors, view boxes and aspect ratios come from
//! `svgtypes`; the keyword enums are local. Every failure surfaces as a
//! [`ConversionError`], so a malformed attribute never panics and never
//! aborts a parse.

use std::fmt;
use std::str::FromStr;

use svgtypes::{FuncIRI, LengthListParser, NumberListParser, PointsParser};

pub use svgtypes::{Align, AspectRatio, Color, Length, LengthUnit, ViewBox};

use crate::color::Paint;
use crate::transform::TransformList;

/// Raised when attribute text cannot be converted to its typed property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    msg: String,
}

impl ConversionError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        Self { msg: msg.into() }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for ConversionError {}

impl From<svgtypes::Error> for ConversionError {
    fn from(err: svgtypes::Error) -> Self {
        ConversionError::new(err.to_string())
    }
}

impl From<svgtypes::ViewBoxError> for ConversionError {
    fn from(err: svgtypes::ViewBoxError) -> Self {
        ConversionError::new(err.to_string())
    }
}

/// A comma or whitespace separated list of lengths. `none` is the empty list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LengthList(pub Vec<Length>);

impl FromStr for LengthList {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text == "none" {
            return Ok(LengthList::default());
        }
        let items = LengthListParser::from(text).collect::<Result<Vec<Length>, _>>()?;
        if items.is_empty() {
            return Err(ConversionError::new("empty length list"));
        }
        Ok(LengthList(items))
    }
}

/// One vertex of a `points` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Parse a `points` attribute into coordinate pairs. An odd coordinate count
/// is an error rather than a silently dropped vertex.
pub fn parse_points(s: &str) -> Result<Vec<Point>, ConversionError> {
    let count = parse_number_list(s)?.len();
    if count % 2 != 0 {
        return Err(ConversionError::new(format!(
            "odd number of coordinates ({count}) in point list"
        )));
    }
    Ok(PointsParser::from(s.trim())
        .map(|(x, y)| Point { x, y })
        .collect())
}

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ConversionError::new(format!(
                        "invalid {} keyword '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(
    /// Shape used at the corners of stroked paths.
    StrokeLineJoin {
        Inherit => "inherit",
        Miter => "miter",
        MiterClip => "miter-clip",
        Round => "round",
        Bevel => "bevel",
        Arcs => "arcs",
    }
);

keyword_enum!(
    /// Shape used at the ends of open stroked subpaths.
    StrokeLineCap {
        Inherit => "inherit",
        Butt => "butt",
        Round => "round",
        Square => "square",
    }
);

keyword_enum!(FillRule {
    Inherit => "inherit",
    NonZero => "nonzero",
    EvenOdd => "evenodd",
});

keyword_enum!(Visibility {
    Inherit => "inherit",
    Visible => "visible",
    Hidden => "hidden",
    Collapse => "collapse",
});

keyword_enum!(Display {
    Inherit => "inherit",
    Inline => "inline",
    Block => "block",
    None => "none",
    InlineBlock => "inline-block",
    ListItem => "list-item",
    RunIn => "run-in",
    Compact => "compact",
    Marker => "marker",
    Table => "table",
    InlineTable => "inline-table",
    TableRowGroup => "table-row-group",
    TableHeaderGroup => "table-header-group",
    TableFooterGroup => "table-footer-group",
    TableRow => "table-row",
    TableColumnGroup => "table-column-group",
    TableColumn => "table-column",
    TableCell => "table-cell",
    TableCaption => "table-caption",
});

keyword_enum!(TextAnchor {
    Inherit => "inherit",
    Start => "start",
    Middle => "middle",
    End => "end",
});

keyword_enum!(
    /// Coordinate system for `*Units` attributes.
    CoordinateUnits {
        UserSpaceOnUse => "userSpaceOnUse",
        ObjectBoundingBox => "objectBoundingBox",
    }
);

keyword_enum!(MarkerUnits {
    StrokeWidth => "strokeWidth",
    UserSpaceOnUse => "userSpaceOnUse",
});

keyword_enum!(SpreadMethod {
    Pad => "pad",
    Reflect => "reflect",
    Repeat => "repeat",
});

keyword_enum!(
    /// Value of `xml:space`.
    XmlSpace {
        Default => "default",
        Preserve => "preserve",
    }
);

/// A functional IRI reference (`url(#id)`) or `none`, as used by `clip-path`,
/// `mask`, `filter` and the marker properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    None,
    Url(String),
}

impl FromStr for Reference {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text == "none" {
            return Ok(Reference::None);
        }
        let FuncIRI(link) = FuncIRI::from_str(text)?;
        Ok(Reference::Url(format!("#{link}")))
    }
}

/// Parse a plain number, rejecting units and trailing text.
pub fn parse_number(s: &str) -> Result<f64, ConversionError> {
    let svgtypes::Number(value) = s.trim().parse::<svgtypes::Number>()?;
    Ok(value)
}

/// Parse a list of numbers separated by whitespace and/or commas.
pub fn parse_number_list(s: &str) -> Result<Vec<f64>, ConversionError> {
    NumberListParser::from(s.trim())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(ConversionError::from)
}

/// Output of an attribute converter, consumed by the matching setter.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Length(Length),
    Lengths(LengthList),
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
    Classes(Vec<String>),
    Paint(Paint),
    Color(Color),
    Reference(Reference),
    Transform(TransformList),
    ViewBox(ViewBox),
    AspectRatio(AspectRatio),
    Points(Vec<Point>),
    LineJoin(StrokeLineJoin),
    LineCap(StrokeLineCap),
    FillRule(FillRule),
    Visibility(Visibility),
    Display(Display),
    TextAnchor(TextAnchor),
    Units(CoordinateUnits),
    MarkerUnits(MarkerUnits),
    Spread(SpreadMethod),
    Space(XmlSpace),
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for AttributeValue {
            fn from(value: $ty) -> Self {
                AttributeValue::$variant(value)
            }
        })+
    };
}

value_from!(
    Length => Length,
    LengthList => Lengths,
    Paint => Paint,
    Color => Color,
    Reference => Reference,
    TransformList => Transform,
    ViewBox => ViewBox,
    AspectRatio => AspectRatio,
    StrokeLineJoin => LineJoin,
    StrokeLineCap => LineCap,
    FillRule => FillRule,
    Visibility => Visibility,
    Display => Display,
    TextAnchor => TextAnchor,
    CoordinateUnits => Units,
    MarkerUnits => MarkerUnits,
    SpreadMethod => Spread,
    XmlSpace => Space,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_lists_and_none() {
        let list: LengthList = "1 2mm, 3%".parse().unwrap();
        assert_eq!(
            list.0,
            vec![
                Length::new_number(1.0),
                Length::new(2.0, LengthUnit::Mm),
                Length::new(3.0, LengthUnit::Percent),
            ]
        );
        assert!("none".parse::<LengthList>().unwrap().0.is_empty());
        assert!("".parse::<LengthList>().is_err());
        assert!("1 x".parse::<LengthList>().is_err());
    }

    #[test]
    fn number_lists_accept_svg_separators() {
        assert_eq!(
            parse_number_list("1,2 3-4 .5.5").unwrap(),
            vec![1.0, 2.0, 3.0, -4.0, 0.5, 0.5]
        );
        assert!(parse_number_list("1 x").is_err());
        assert_eq!(parse_number(" 42 ").unwrap(), 42.0);
        assert!(parse_number("42px").is_err());
        assert!(parse_number("undefined").is_err());
    }

    #[test]
    fn points_need_pairs() {
        let points = parse_points("0,0 10,0 10,10").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], Point { x: 10.0, y: 10.0 });
        assert!(parse_points("0,0 10").is_err());
        assert!(parse_points("0,0 a").is_err());
    }

    #[test]
    fn keywords_round_trip_their_text() {
        for join in [
            StrokeLineJoin::Miter,
            StrokeLineJoin::MiterClip,
            StrokeLineJoin::Arcs,
        ] {
            assert_eq!(join.as_str().parse::<StrokeLineJoin>().unwrap(), join);
        }
        assert!("Round".parse::<StrokeLineJoin>().is_err());
        assert_eq!(
            "userSpaceOnUse".parse::<CoordinateUnits>().unwrap(),
            CoordinateUnits::UserSpaceOnUse
        );
    }

    #[test]
    fn references() {
        assert_eq!("none".parse::<Reference>().unwrap(), Reference::None);
        assert_eq!(
            "url( '#clip' )".parse::<Reference>().unwrap(),
            Reference::Url("#clip".into())
        );
        assert!("url(#a) junk".parse::<Reference>().is_err());
        assert!("#a".parse::<Reference>().is_err());
    }

    #[test]
    fn svgtypes_errors_become_conversion_errors() {
        let err: ConversionError = "0 0 -1 5".parse::<ViewBox>().unwrap_err().into();
        assert!(!err.to_string().is_empty());
        let err: ConversionError = "10furlongs".parse::<Length>().unwrap_err().into();
        assert!(!err.to_string().is_empty());
    }
}
