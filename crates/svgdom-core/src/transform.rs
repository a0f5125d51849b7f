//! `transform`, `gradientTransform` and `patternTransform` lists.
//!
//! Items are kept in source order, as `svgtypes` tokenizes them: a rotation
//! about a centre arrives as translate, rotate, translate.

use std::str::FromStr;

use svgtypes::TransformListParser;

use crate::values::ConversionError;

pub use svgtypes::TransformListToken as TransformItem;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformList {
    pub items: Vec<TransformItem>,
    /// The whole list folded into one affine matrix.
    pub matrix: svgtypes::Transform,
}

impl TransformList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromStr for TransformList {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let items = TransformListParser::from(s).collect::<Result<Vec<_>, _>>()?;
        let matrix = s.parse::<svgtypes::Transform>()?;
        Ok(TransformList { items, matrix })
    }
}
