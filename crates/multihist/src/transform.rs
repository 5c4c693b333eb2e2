//! Coordinate transforms for regular axes.

use std::fmt;

/// Monotonic map applied to coordinates before the regular binning law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// No transform.
    Id,
    /// Natural logarithm.
    Log,
    /// Square root.
    Sqrt,
    /// `x^power`.
    Pow(f64),
}

impl Transform {
    /// Map a coordinate into the binning space.
    pub fn forward(self, x: f64) -> f64 {
        match self {
            Self::Id => x,
            Self::Log => x.ln(),
            Self::Sqrt => x.sqrt(),
            Self::Pow(p) => x.powf(p),
        }
    }

    /// Map a binning-space value back to a coordinate.
    pub fn inverse(self, x: f64) -> f64 {
        match self {
            Self::Id => x,
            Self::Log => x.exp(),
            Self::Sqrt => x * x,
            Self::Pow(p) => x.powf(1.0 / p),
        }
    }

    /// Suffix used in the axis display name.
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Self::Id => "",
            Self::Log => "_log",
            Self::Sqrt => "_sqrt",
            Self::Pow(_) => "_pow",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Log => f.write_str("log"),
            Self::Sqrt => f.write_str("sqrt"),
            Self::Pow(p) => write!(f, "pow({p})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn inverse_undoes_forward() {
        for t in [Transform::Id, Transform::Log, Transform::Sqrt, Transform::Pow(0.5)] {
            for x in [1.0, 2.5, 9.0, 100.0] {
                assert_relative_eq!(t.inverse(t.forward(x)), x, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn negative_input_is_nan() {
        assert!(Transform::Log.forward(-1.0).is_nan());
        assert!(Transform::Pow(0.5).forward(-1.0).is_nan());
    }
}
