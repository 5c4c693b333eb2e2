//! Sample coordinates accepted by axes.

use std::fmt;

/// One coordinate of a sample, or one category label.
///
/// Continuous and integer axes take `Float` and `Int`; category axes take
/// `Int` or `Str` depending on their element type.
#[derive(Clone, Debug, PartialEq)]
pub enum Coord {
    /// A real-valued coordinate.
    Float(f64),
    /// An integer coordinate or integer category label.
    Int(i64),
    /// A string category label.
    Str(String),
}

impl Coord {
    /// Numeric view of the coordinate, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Str(_) => None,
        }
    }

    /// Short name of the coordinate's type, used in error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Coord {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<i64> for Coord {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Coord {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Coord {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Coord {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
