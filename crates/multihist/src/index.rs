//! Index expressions for selecting, slicing, rebinning and summing bins.
//!
//! An expression is a list of [`Index`] entries, one per axis, where a
//! single [`Index::Ellipsis`] may stand in for the full range of every axis
//! not named explicitly.
//!
//! - [`Index::At`] selects one bin and removes the axis. Integer positions
//!   use the axis' internal numbering, so `-1` and `size` address the flow
//!   bins where they exist.
//! - [`Index::Slice`] keeps the bins in `[start, stop)`. Flow bins survive
//!   only on a side where the cut is at the original edge. A
//!   [`Action::Rebin`] merges groups of bins (a trailing partial group
//!   becomes a shorter last bin); [`Action::Sum`] folds the selected range
//!   and removes the axis.

use std::ops::{Add, Range, RangeFrom, RangeFull, RangeTo, Sub};

use crate::{
    accumulators::Cell,
    axis::AxisVariant,
    coord::Coord,
    error::{Error, Result},
    histogram::Histogram,
    reduce::AxisPlan,
};

/// Anchor of a location.
#[derive(Clone, Debug, PartialEq)]
enum Anchor {
    /// A bin number.
    Bin(i64),
    /// The bin containing a coordinate.
    Value(Coord),
    /// The underflow bin.
    Underflow,
    /// The overflow bin.
    Overflow,
}

/// A bin position, resolved against an axis when the expression is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Loc {
    /// Anchor.
    anchor: Anchor,
    /// Offset added after resolution.
    offset: i64,
}

impl Loc {
    /// Bin number `i`.
    pub fn bin(i: i64) -> Self {
        Self {
            anchor: Anchor::Bin(i),
            offset: 0,
        }
    }

    /// The bin containing coordinate `x`.
    pub fn value(x: impl Into<Coord>) -> Self {
        Self {
            anchor: Anchor::Value(x.into()),
            offset: 0,
        }
    }

    /// The bin of category label `c`.
    pub fn category(c: impl Into<Coord>) -> Self {
        Self::value(c)
    }

    /// The underflow bin.
    pub fn underflow() -> Self {
        Self {
            anchor: Anchor::Underflow,
            offset: 0,
        }
    }

    /// The overflow bin.
    pub fn overflow() -> Self {
        Self {
            anchor: Anchor::Overflow,
            offset: 0,
        }
    }

    /// Bin number on `axis`, in `-1..=size` for valid positions.
    pub(crate) fn resolve(&self, axis: &AxisVariant) -> Result<i64> {
        let base = match &self.anchor {
            Anchor::Bin(i) => *i,
            Anchor::Value(x) => axis.index(x)?,
            Anchor::Underflow => -1,
            Anchor::Overflow => axis.size() as i64,
        };
        Ok(base + self.offset)
    }
}

impl Add<i64> for Loc {
    type Output = Self;

    fn add(mut self, k: i64) -> Self {
        self.offset += k;
        self
    }
}

impl Sub<i64> for Loc {
    type Output = Self;

    fn sub(mut self, k: i64) -> Self {
        self.offset -= k;
        self
    }
}

impl From<i64> for Loc {
    fn from(i: i64) -> Self {
        Self::bin(i)
    }
}

/// What to do with the bins a slice keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Merge groups of this many bins.
    Rebin(usize),
    /// Sum the range and drop the axis.
    Sum,
}

/// A range of bins with an optional action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Slice {
    /// First bin, or the axis start when open.
    pub start: Option<Loc>,
    /// One past the last bin, or the axis end when open.
    pub stop: Option<Loc>,
    /// Optional rebin or sum.
    pub action: Option<Action>,
}

impl Slice {
    /// The full axis.
    pub fn all() -> Self {
        Self::default()
    }

    /// Bins between two optional locations.
    pub fn new(start: Option<Loc>, stop: Option<Loc>) -> Self {
        Self {
            start,
            stop,
            action: None,
        }
    }

    /// Merge groups of `factor` bins.
    #[must_use]
    pub fn rebin(mut self, factor: usize) -> Self {
        self.action = Some(Action::Rebin(factor));
        self
    }

    /// Sum the selected bins.
    #[must_use]
    pub fn sum(mut self) -> Self {
        self.action = Some(Action::Sum);
        self
    }
}

impl From<Range<i64>> for Slice {
    fn from(r: Range<i64>) -> Self {
        Self::new(Some(Loc::bin(r.start)), Some(Loc::bin(r.end)))
    }
}

impl From<RangeFrom<i64>> for Slice {
    fn from(r: RangeFrom<i64>) -> Self {
        Self::new(Some(Loc::bin(r.start)), None)
    }
}

impl From<RangeTo<i64>> for Slice {
    fn from(r: RangeTo<i64>) -> Self {
        Self::new(None, Some(Loc::bin(r.end)))
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

/// One entry of an index expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Index {
    /// Select a single bin.
    At(Loc),
    /// Keep, rebin or sum a range of bins.
    Slice(Slice),
    /// The full range of every axis not otherwise named.
    Ellipsis,
}

impl From<i64> for Index {
    fn from(i: i64) -> Self {
        Self::At(Loc::bin(i))
    }
}

impl From<Loc> for Index {
    fn from(l: Loc) -> Self {
        Self::At(l)
    }
}

impl From<Slice> for Index {
    fn from(s: Slice) -> Self {
        Self::Slice(s)
    }
}

impl From<Range<i64>> for Index {
    fn from(r: Range<i64>) -> Self {
        Self::Slice(r.into())
    }
}

impl From<RangeFrom<i64>> for Index {
    fn from(r: RangeFrom<i64>) -> Self {
        Self::Slice(r.into())
    }
}

impl From<RangeTo<i64>> for Index {
    fn from(r: RangeTo<i64>) -> Self {
        Self::Slice(r.into())
    }
}

impl From<RangeFull> for Index {
    fn from(r: RangeFull) -> Self {
        Self::Slice(r.into())
    }
}

/// Result of applying an index expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// Every axis was selected or summed.
    Value(Cell),
    /// Some axes survive.
    Histogram(Histogram),
}

impl Selection {
    /// The scalar, if the result is one.
    pub fn into_value(self) -> Option<Cell> {
        match self {
            Self::Value(c) => Some(c),
            Self::Histogram(_) => None,
        }
    }

    /// The histogram, if the result is one.
    pub fn into_histogram(self) -> Option<Histogram> {
        match self {
            Self::Value(_) => None,
            Self::Histogram(h) => Some(h),
        }
    }
}

/// Replace the ellipsis with full slices so there is one entry per axis.
///
/// The expression may not be longer than `rank`, may hold at most one
/// ellipsis, and without one must have exactly `rank` entries.
pub(crate) fn expand(exprs: &[Index], rank: usize) -> Result<Vec<Index>> {
    let ellipses = exprs.iter().filter(|e| matches!(e, Index::Ellipsis)).count();
    if ellipses > 1 {
        return Err(Error::index("an index can only have a single ellipsis"));
    }
    if exprs.len() > rank {
        return Err(Error::index(format!(
            "too many indices ({}) for histogram of rank {rank}",
            exprs.len()
        )));
    }
    if ellipses == 0 && exprs.len() != rank {
        return Err(Error::index(format!(
            "expected {rank} indices, got {}",
            exprs.len()
        )));
    }
    let mut out = Vec::with_capacity(rank);
    for e in exprs {
        if matches!(e, Index::Ellipsis) {
            let fill = rank + 1 - exprs.len();
            out.extend((0..fill).map(|_| Index::Slice(Slice::all())));
        } else {
            out.push(e.clone());
        }
    }
    Ok(out)
}

/// Resolve a slice bound, clamped to `[0, size]`.
fn bound(loc: Option<&Loc>, axis: &AxisVariant, open: usize) -> Result<usize> {
    match loc {
        None => Ok(open),
        Some(l) => Ok(l.resolve(axis)?.clamp(0, axis.size() as i64) as usize),
    }
}

/// Plan for one axis under one expression entry.
pub(crate) fn plan(axis: &AxisVariant, entry: &Index) -> Result<AxisPlan> {
    match entry {
        Index::At(loc) => {
            let i = loc.resolve(axis)?;
            if !axis.is_representable(i) {
                return Err(Error::index(format!(
                    "bin {i} is not addressable on an axis of size {} with options {}",
                    axis.size(),
                    axis.options()
                )));
            }
            Ok(AxisPlan::select(axis.extent(), axis.slot(i)))
        }
        Index::Slice(s) => {
            let size = axis.size();
            let start = bound(s.start.as_ref(), axis, 0)?;
            let stop = bound(s.stop.as_ref(), axis, size)?;
            if start >= stop {
                return Err(Error::index(format!(
                    "empty selection [{start}, {stop}) on an axis of size {size}"
                )));
            }
            let (under, over) = (start == 0, stop == size);
            match s.action {
                Some(Action::Sum) => Ok(AxisPlan::project(axis, start, stop, under, over)),
                Some(Action::Rebin(0)) => Err(Error::index("rebin factor must be positive")),
                action => {
                    let merge = match action {
                        Some(Action::Rebin(n)) => n,
                        _ => 1,
                    };
                    let new = axis.slice(start, stop, merge)?;
                    tracing::trace!(start, stop, merge, axis = %new, "planned slice");
                    Ok(AxisPlan::keep(axis, new, (start, stop, merge), under, over))
                }
            }
        }
        Index::Ellipsis => Err(Error::index("unexpanded ellipsis")),
    }
}
