//! Bin descriptors returned by axis lookups.

use crate::coord::Coord;

/// A half-open interval `[lower, upper)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    /// Lower edge.
    pub lower: f64,
    /// Upper edge.
    pub upper: f64,
}

impl Interval {
    /// Midpoint of the interval.
    pub fn center(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `x` falls inside. Descending intervals are handled.
    pub fn contains(&self, x: f64) -> bool {
        if self.lower <= self.upper {
            self.lower <= x && x < self.upper
        } else {
            self.upper < x && x <= self.lower
        }
    }
}

/// One bin of an axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Bin {
    /// A continuous or integer bin.
    Interval(Interval),
    /// A category bin, holding its label.
    Category(Coord),
}

impl Bin {
    /// The interval, unless this is a category bin.
    pub fn interval(&self) -> Option<Interval> {
        match self {
            Self::Interval(i) => Some(*i),
            Self::Category(_) => None,
        }
    }

    /// The label, if this is a category bin.
    pub fn label(&self) -> Option<&Coord> {
        match self {
            Self::Interval(_) => None,
            Self::Category(c) => Some(c),
        }
    }
}
