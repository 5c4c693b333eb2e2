//! Axes: the public [`Axis`] wrapper and its native representation.
//!
//! Every constructor builds an [`AxisVariant`], resolves its option set and
//! casts it through the class registry, so the wrapper always knows which
//! class (and family) it belongs to.

/// Bin descriptors.
mod bin;
/// Category law.
mod category;
/// Integer law.
mod integer;
/// Regular law.
mod regular;
/// Variable law.
mod variable;
/// Native representation and type tags.
mod variant;

use std::fmt;

pub use self::{
    bin::{Bin, Interval},
    variant::{AxisType, AxisVariant, Law, Located},
};
use crate::{
    coord::Coord,
    error::{Error, Result},
    options::{AxisOptions, Flags, Opt, Options},
    registry::{self, ClassRef, Family},
    transform::Transform,
};

/// Most bins a single fill may add to a growing axis.
const MAX_GROWTH: usize = 1 << 24;

/// Number of bins needed to grow by `bins` (whole, positive) to reach `x`.
fn growth_bins(bins: f64, x: f64) -> Result<usize> {
    if bins > MAX_GROWTH as f64 {
        return Err(Error::index(format!(
            "growing to {x} would add {bins} bins, more than {MAX_GROWTH}"
        )));
    }
    Ok(bins as usize)
}

/// Options a continuous axis reads from keyword flags, with defaults.
const CONTINUOUS_FLAGS: [(Opt, bool); 4] = [
    (Opt::Underflow, true),
    (Opt::Overflow, true),
    (Opt::Growth, false),
    (Opt::Circular, false),
];

/// Options a category axis reads from keyword flags.
const CATEGORY_FLAGS: [(Opt, bool); 1] = [(Opt::Growth, false)];

/// One histogram dimension.
#[derive(Clone, Debug)]
pub struct Axis {
    /// Class selected by the registry.
    class: ClassRef,
    /// Native axis.
    native: AxisVariant,
}

impl Axis {
    /// Cast a native axis in the main family.
    pub fn from_native(native: AxisVariant) -> Result<Self> {
        Self::cast(None, native)
    }

    /// Cast a native axis with a family context.
    pub(crate) fn cast(context: Option<Family>, native: AxisVariant) -> Result<Self> {
        let (class, native) = registry::cast_axis(context, native)?;
        Ok(Self { class, native })
    }

    /// The same axis tagged with another class.
    pub(crate) fn with_class(self, class: ClassRef) -> Self {
        Self { class, ..self }
    }

    /// The same axis, cast in `family`.
    pub fn in_family(&self, family: Family) -> Result<Self> {
        Self::cast(Some(family), self.native.clone())
    }

    /// `bins` equal bins over `[start, stop)` with both flow bins.
    pub fn regular(bins: usize, start: f64, stop: f64) -> Result<Self> {
        Self::regular_with(bins, start, stop, &AxisOptions::default())
    }

    /// Regular axis with explicit options.
    pub fn regular_with(bins: usize, start: f64, stop: f64, opts: &AxisOptions) -> Result<Self> {
        Self::from_native(AxisVariant::regular(
            bins,
            start,
            stop,
            Transform::Id,
            opts.requested(),
            opts.metadata.clone(),
        )?)
    }

    /// Regular axis configured by keyword flags (`underflow`, `overflow`,
    /// `growth`, `circular`, `metadata`).
    pub fn regular_with_flags(
        bins: usize,
        start: f64,
        stop: f64,
        mut flags: Flags,
    ) -> Result<Self> {
        let options = flags.options(&CONTINUOUS_FLAGS)?;
        let metadata = flags.optional("metadata");
        flags.finish()?;
        Self::from_native(AxisVariant::regular(
            bins,
            start,
            stop,
            Transform::Id,
            options,
            metadata,
        )?)
    }

    /// Regular axis whose coordinates wrap with period `stop - start`.
    pub fn circular(bins: usize, start: f64, stop: f64, metadata: Option<&str>) -> Result<Self> {
        let opts = AxisOptions {
            circular: true,
            metadata: metadata.map(str::to_string),
            ..AxisOptions::default()
        };
        Self::regular_with(bins, start, stop, &opts)
    }

    /// Shared body of the transformed constructors.
    fn transformed(
        bins: usize,
        start: f64,
        stop: f64,
        transform: Transform,
        metadata: Option<&str>,
    ) -> Result<Self> {
        Self::from_native(AxisVariant::regular(
            bins,
            start,
            stop,
            transform,
            Options::UOFLOW,
            metadata.map(str::to_string),
        )?)
    }

    /// Regular axis in log space.
    pub fn regular_log(bins: usize, start: f64, stop: f64, metadata: Option<&str>) -> Result<Self> {
        Self::transformed(bins, start, stop, Transform::Log, metadata)
    }

    /// Regular axis in sqrt space.
    pub fn regular_sqrt(
        bins: usize,
        start: f64,
        stop: f64,
        metadata: Option<&str>,
    ) -> Result<Self> {
        Self::transformed(bins, start, stop, Transform::Sqrt, metadata)
    }

    /// Regular axis in `x^power` space.
    pub fn regular_pow(
        bins: usize,
        start: f64,
        stop: f64,
        power: f64,
        metadata: Option<&str>,
    ) -> Result<Self> {
        Self::transformed(bins, start, stop, Transform::Pow(power), metadata)
    }

    /// Axis with explicit edges and both flow bins.
    pub fn variable(edges: &[f64]) -> Result<Self> {
        Self::variable_with(edges, &AxisOptions::default())
    }

    /// Variable axis with explicit options.
    pub fn variable_with(edges: &[f64], opts: &AxisOptions) -> Result<Self> {
        Self::from_native(AxisVariant::variable(
            edges.to_vec(),
            opts.requested(),
            opts.metadata.clone(),
        )?)
    }

    /// Variable axis configured by keyword flags.
    pub fn variable_with_flags(edges: &[f64], mut flags: Flags) -> Result<Self> {
        let options = flags.options(&CONTINUOUS_FLAGS)?;
        let metadata = flags.optional("metadata");
        flags.finish()?;
        Self::from_native(AxisVariant::variable(edges.to_vec(), options, metadata)?)
    }

    /// Integer bins for `start..stop` with both flow bins.
    pub fn integer(start: i64, stop: i64) -> Result<Self> {
        Self::integer_with(start, stop, &AxisOptions::default())
    }

    /// Integer axis with explicit options.
    pub fn integer_with(start: i64, stop: i64, opts: &AxisOptions) -> Result<Self> {
        Self::from_native(AxisVariant::integer(
            start,
            stop,
            opts.requested(),
            opts.metadata.clone(),
        )?)
    }

    /// Integer axis configured by keyword flags.
    pub fn integer_with_flags(start: i64, stop: i64, mut flags: Flags) -> Result<Self> {
        let options = flags.options(&CONTINUOUS_FLAGS)?;
        let metadata = flags.optional("metadata");
        flags.finish()?;
        Self::from_native(AxisVariant::integer(start, stop, options, metadata)?)
    }

    /// Fixed category axis. Labels must all be integers or all strings.
    pub fn category<C: Into<Coord>>(labels: impl IntoIterator<Item = C>) -> Result<Self> {
        Self::category_with(labels, &AxisOptions::default())
    }

    /// Category axis with explicit options; only `growth` and `metadata`
    /// are read.
    pub fn category_with<C: Into<Coord>>(
        labels: impl IntoIterator<Item = C>,
        opts: &AxisOptions,
    ) -> Result<Self> {
        let mut requested = Options::NONE;
        if opts.growth {
            requested = requested.with(Opt::Growth);
        }
        if opts.circular {
            requested = requested.with(Opt::Circular);
        }
        Self::from_native(AxisVariant::category(
            labels.into_iter().map(Into::into).collect(),
            requested,
            opts.metadata.clone(),
        )?)
    }

    /// Category axis configured by keyword flags (`growth`, `metadata`).
    pub fn category_with_flags<C: Into<Coord>>(
        labels: impl IntoIterator<Item = C>,
        mut flags: Flags,
    ) -> Result<Self> {
        let options = flags.options(&CATEGORY_FLAGS)?;
        let metadata = flags.optional("metadata");
        flags.finish()?;
        Self::from_native(AxisVariant::category(
            labels.into_iter().map(Into::into).collect(),
            options,
            metadata,
        )?)
    }

    /// Registry class of this axis.
    pub fn class(&self) -> ClassRef {
        self.class
    }

    /// Native representation.
    pub fn native(&self) -> &AxisVariant {
        &self.native
    }

    /// Native type tag.
    pub fn native_type(&self) -> AxisType {
        self.native.native_type()
    }

    /// Resolved options.
    pub fn options(&self) -> Options {
        self.native.options()
    }

    /// Metadata label.
    pub fn metadata(&self) -> Option<&str> {
        self.native.metadata()
    }

    /// Replace the metadata label.
    pub fn set_metadata(&mut self, metadata: Option<&str>) {
        self.native.set_metadata(metadata.map(str::to_string));
    }

    /// Number of in-range bins.
    pub fn size(&self) -> usize {
        self.native.size()
    }

    /// Number of bins including flow bins.
    pub fn extent(&self) -> usize {
        self.native.extent()
    }

    /// Bin index of a coordinate in `-1..=size`.
    pub fn index(&self, x: impl Into<Coord>) -> Result<i64> {
        self.native.index(&x.into())
    }

    /// Coordinate at fractional bin position `i`.
    pub fn value(&self, i: f64) -> Result<f64> {
        self.native.value(i)
    }

    /// Bin `i`, flow and beyond included for continuous axes.
    pub fn bin(&self, i: i64) -> Result<Bin> {
        self.native.bin(i)
    }

    /// In-range bin `i`.
    ///
    /// Negative `i` is taken modulo `size`, so `-1` is the last bin and
    /// `-size - 1` wraps to it again; `i >= size` is an index error.
    pub fn get(&self, i: i64) -> Result<Bin> {
        let size = self.size() as i64;
        if i >= size {
            return Err(Error::index(format!(
                "bin {i} out of range for axis of size {size}"
            )));
        }
        self.native.bin(i.rem_euclid(size))
    }

    /// In-range bin edges.
    pub fn edges(&self) -> Result<Vec<f64>> {
        self.native.edges()
    }

    /// In-range bin centers.
    pub fn centers(&self) -> Result<Vec<f64>> {
        self.native.centers()
    }

    /// In-range bin widths.
    pub fn widths(&self) -> Result<Vec<f64>> {
        self.native.widths()
    }

    /// In-range bins in order.
    pub fn iter(&self) -> impl Iterator<Item = Bin> + '_ {
        (0..self.size() as i64).filter_map(|i| self.native.bin(i).ok())
    }
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.native == other.native
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.native, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_and_relaxed_access() -> Result<()> {
        let ax = Axis::regular(4, 1.0, 2.0)?;
        assert_eq!(ax.get(-1)?, ax.bin(3)?);
        assert!(ax.get(4).is_err());
        assert_eq!(ax.get(-4)?, ax.bin(0)?);
        assert_eq!(ax.get(-5)?, ax.bin(3)?);
        let below = ax.bin(-2)?.interval().map(|i| (i.lower, i.upper));
        assert_eq!(below, Some((f64::NEG_INFINITY, f64::NEG_INFINITY)));
        let above = ax.bin(5)?.interval().map(|i| (i.lower, i.upper));
        assert_eq!(above, Some((f64::INFINITY, f64::INFINITY)));
        assert_eq!(ax.iter().count(), 4);
        Ok(())
    }

    #[test]
    fn flags_path_rejects_unknown_keywords() -> Result<()> {
        let flags: Flags = "bad_keyword=ra".parse()?;
        assert!(matches!(
            Axis::regular_with_flags(1, 1.0, 2.0, flags),
            Err(Error::Config(_))
        ));
        let flags: Flags = "growth=true, metadata=pt".parse()?;
        let ax = Axis::integer_with_flags(0, 3, flags)?;
        assert_eq!(ax.native_type(), AxisType::IntegerGrowth);
        assert_eq!(ax.metadata(), Some("pt"));
        Ok(())
    }

    #[test]
    fn category_edges_are_unsupported() -> Result<()> {
        let ax = Axis::category(["a", "b"])?;
        assert!(matches!(ax.edges(), Err(Error::Capability(_))));
        assert!(matches!(ax.centers(), Err(Error::Capability(_))));
        assert_eq!(ax.bin(1)?.label(), Some(&Coord::from("b")));
        assert_eq!(ax.class().name(), "Category");
        Ok(())
    }
}
