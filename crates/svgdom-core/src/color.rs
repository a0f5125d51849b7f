//! Paint values as written in `fill` and `stroke`.

use std::str::FromStr;

use svgtypes::PaintFallback;

use crate::values::{Color, ConversionError};

/// Value of `fill` / `stroke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    None,
    CurrentColor,
    Inherit,
    ContextFill,
    ContextStroke,
    Color(Color),
    /// Paint server reference with an optional fallback used when the
    /// reference does not resolve.
    Server {
        iri: String,
        fallback: Option<Box<Paint>>,
    },
}

impl From<PaintFallback> for Paint {
    fn from(fallback: PaintFallback) -> Self {
        match fallback {
            PaintFallback::None => Paint::None,
            PaintFallback::CurrentColor => Paint::CurrentColor,
            PaintFallback::Color(color) => Paint::Color(color),
        }
    }
}

impl From<svgtypes::Paint<'_>> for Paint {
    fn from(paint: svgtypes::Paint<'_>) -> Self {
        match paint {
            svgtypes::Paint::None => Paint::None,
            svgtypes::Paint::Inherit => Paint::Inherit,
            svgtypes::Paint::CurrentColor => Paint::CurrentColor,
            svgtypes::Paint::ContextFill => Paint::ContextFill,
            svgtypes::Paint::ContextStroke => Paint::ContextStroke,
            svgtypes::Paint::Color(color) => Paint::Color(color),
            svgtypes::Paint::FuncIRI(link, fallback) => Paint::Server {
                iri: format!("#{link}"),
                fallback: fallback.map(|f| Box::new(Paint::from(f))),
            },
        }
    }
}

impl FromStr for Paint {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(svgtypes::Paint::from_str(s)?.into())
    }
}
