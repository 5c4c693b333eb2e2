//! The histogram: axes, a storage kind and the bin buffer.
//!
//! Bins are laid out row-major over the axis extents (the last axis varies
//! fastest), flow bins included. A fill locates the sample on every axis
//! first and only then commits growth and the increment, so a failed fill
//! leaves the histogram untouched.

use std::{fmt, ops::Add};

use ndarray::{Array1, ArrayD, IxDyn};
use smallvec::SmallVec;

use crate::{
    accumulators::Cell,
    axis::{Axis, AxisVariant, Located},
    coord::Coord,
    error::{Error, Result},
    index::{self, Index, Selection},
    reduce::{self, AxisPlan},
    registry::Family,
    storage::{Storage, StorageKind, buffer::Buffer},
};

/// A multi-dimensional histogram.
#[derive(Clone, Debug)]
pub struct Histogram {
    /// Axes in order.
    axes: Vec<Axis>,
    /// Storage wrapper.
    storage: Storage,
    /// Bin contents.
    buffer: Buffer,
    /// Family used to cast axes and storage.
    family: Family,
}

impl Histogram {
    /// Empty histogram in the main family.
    pub fn new(axes: Vec<Axis>, kind: StorageKind) -> Result<Self> {
        Self::with_family(axes, kind, Family::MAIN)
    }

    /// Empty histogram whose axes and storage are cast in `family`.
    pub fn with_family(axes: Vec<Axis>, kind: StorageKind, family: Family) -> Result<Self> {
        if axes.is_empty() {
            return Err(Error::config("a histogram needs at least one axis"));
        }
        let axes = axes
            .iter()
            .map(|a| a.in_family(family))
            .collect::<Result<Vec<_>>>()?;
        let len = axes.iter().map(Axis::extent).product();
        Ok(Self {
            axes,
            storage: Storage::in_family(kind, family)?,
            buffer: Buffer::new(kind, len),
            family,
        })
    }

    /// Assemble a histogram from reduced parts.
    fn from_parts(natives: Vec<AxisVariant>, buffer: Buffer, family: Family) -> Result<Self> {
        let axes = natives
            .into_iter()
            .map(|n| Axis::cast(Some(family), n))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            axes,
            storage: Storage::in_family(buffer.kind(), family)?,
            buffer,
            family,
        })
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Number of bins, flow bins included.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Axis `i`.
    pub fn axis(&self, i: usize) -> Result<&Axis> {
        self.axes
            .get(i)
            .ok_or_else(|| Error::index(format!("axis {i} out of range for rank {}", self.rank())))
    }

    /// All axes.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Storage wrapper.
    pub fn storage_type(&self) -> Storage {
        self.storage
    }

    /// Family the axes and storage were cast in.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Slot counts per axis.
    fn extents(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::extent).collect()
    }

    /// Flat buffer position of per-axis slots.
    fn flat(&self, slots: impl IntoIterator<Item = usize>) -> usize {
        slots
            .into_iter()
            .zip(&self.axes)
            .fold(0, |acc, (s, a)| acc * a.extent() + s)
    }

    /// Record one entry.
    pub fn fill<C: Into<Coord>>(&mut self, coords: impl IntoIterator<Item = C>) -> Result<()> {
        self.fill_with(coords, None, None)
    }

    /// Record one weighted entry.
    pub fn fill_weighted<C: Into<Coord>>(
        &mut self,
        coords: impl IntoIterator<Item = C>,
        weight: f64,
    ) -> Result<()> {
        self.fill_with(coords, Some(weight), None)
    }

    /// Record one entry with a sample for mean storages.
    pub fn fill_sample<C: Into<Coord>>(
        &mut self,
        coords: impl IntoIterator<Item = C>,
        sample: f64,
    ) -> Result<()> {
        self.fill_with(coords, None, Some(sample))
    }

    /// Record one weighted entry with a sample.
    pub fn fill_weighted_sample<C: Into<Coord>>(
        &mut self,
        coords: impl IntoIterator<Item = C>,
        weight: f64,
        sample: f64,
    ) -> Result<()> {
        self.fill_with(coords, Some(weight), Some(sample))
    }

    /// Record many entries, one coordinate list each.
    pub fn fill_all<S, C>(&mut self, samples: impl IntoIterator<Item = S>) -> Result<()>
    where
        S: IntoIterator<Item = C>,
        C: Into<Coord>,
    {
        samples.into_iter().try_for_each(|s| self.fill(s))
    }

    /// Record many entries on a one-dimensional histogram.
    pub fn fill_1d<C: Into<Coord>>(&mut self, values: impl IntoIterator<Item = C>) -> Result<()> {
        if self.rank() != 1 {
            return Err(Error::index(format!(
                "fill_1d needs a rank 1 histogram, this one has rank {}",
                self.rank()
            )));
        }
        values.into_iter().try_for_each(|v| self.fill([v]))
    }

    /// Locate a sample on every axis without modifying anything.
    fn locate<C: Into<Coord>>(&self, coords: impl IntoIterator<Item = C>) -> Result<Vec<Located>> {
        let coords: Vec<Coord> = coords.into_iter().map(Into::into).collect();
        if coords.len() != self.rank() {
            return Err(Error::index(format!(
                "expected {} coordinates, got {}",
                self.rank(),
                coords.len()
            )));
        }
        self.axes
            .iter()
            .zip(&coords)
            .map(|(a, c)| a.native().locate(c))
            .collect()
    }

    /// Shared fill path.
    fn fill_with<C: Into<Coord>>(
        &mut self,
        coords: impl IntoIterator<Item = C>,
        weight: Option<f64>,
        sample: Option<f64>,
    ) -> Result<()> {
        self.storage.kind().check_fill(weight, sample)?;
        let located = self.locate(coords)?;
        if located.iter().any(|l| l.grown.is_some()) {
            self.grow(&located)?;
        }
        if let Some(j) = self.slot_of(&located) {
            self.buffer.fill(j, weight, sample);
        }
        Ok(())
    }

    /// Flat slot of located indices, or `None` if any falls outside the
    /// representable bins.
    fn slot_of(&self, located: &[Located]) -> Option<usize> {
        let mut slots: SmallVec<[usize; 8]> = SmallVec::with_capacity(located.len());
        for (axis, loc) in self.axes.iter().zip(located) {
            let native = axis.native();
            if !native.is_representable(loc.index) {
                return None;
            }
            slots.push(native.slot(loc.index));
        }
        Some(self.flat(slots))
    }

    /// Replace grown axes and move the existing contents to their new slots.
    fn grow(&mut self, located: &[Located]) -> Result<()> {
        let mut plans = Vec::with_capacity(self.rank());
        let mut axes = Vec::with_capacity(self.rank());
        for (d, (axis, loc)) in self.axes.iter().zip(located).enumerate() {
            match &loc.grown {
                Some(new) => {
                    tracing::debug!(
                        axis = d,
                        from = axis.size(),
                        to = new.size(),
                        front = loc.front,
                        "axis grew"
                    );
                    axes.push(Axis::cast(Some(self.family), new.clone())?);
                    plans.push(AxisPlan::regrow(axis.native(), new.clone(), loc.front));
                }
                None => {
                    axes.push(axis.clone());
                    plans.push(AxisPlan::identity(axis.native()));
                }
            }
        }
        let order: Vec<usize> = (0..self.rank()).collect();
        let (_, buffer) = reduce::gather(&self.buffer, &self.extents(), &plans, &order);
        tracing::debug!(from = self.buffer.len(), to = buffer.len(), "storage reallocated");
        self.axes = axes;
        self.buffer = buffer;
        Ok(())
    }

    /// Record one entry through a shared reference. Needs `atomic_int`
    /// storage and no growing axis.
    pub fn fill_concurrent<C: Into<Coord>>(
        &self,
        coords: impl IntoIterator<Item = C>,
    ) -> Result<()> {
        if let Some(a) = self.axes.iter().find(|a| a.options().growth()) {
            return Err(Error::capability(format!(
                "concurrent filling is not supported with growing axis {a}"
            )));
        }
        if self.storage.kind() != StorageKind::AtomicInt {
            return Err(Error::capability(format!(
                "concurrent filling needs atomic_int storage, not {}",
                self.storage.kind()
            )));
        }
        let located = self.locate(coords)?;
        match self.slot_of(&located) {
            Some(j) => self.buffer.fill_shared(j, 1),
            None => Ok(()),
        }
    }

    /// Content of the bin at per-axis indices in `-1..=size`.
    pub fn at(&self, indices: &[i64]) -> Result<Cell> {
        if indices.len() != self.rank() {
            return Err(Error::index(format!(
                "expected {} indices, got {}",
                self.rank(),
                indices.len()
            )));
        }
        let mut slots: SmallVec<[usize; 8]> = SmallVec::with_capacity(indices.len());
        for (axis, &i) in self.axes.iter().zip(indices) {
            if !axis.native().is_representable(i) {
                return Err(Error::index(format!(
                    "bin {i} is not addressable on axis {axis}"
                )));
            }
            slots.push(axis.native().slot(i));
        }
        Ok(self.buffer.get(self.flat(slots)))
    }

    /// Apply an index expression.
    pub fn index(&self, exprs: &[Index]) -> Result<Selection> {
        let entries = index::expand(exprs, self.rank())?;
        let plans = self
            .axes
            .iter()
            .zip(&entries)
            .map(|(a, e)| index::plan(a.native(), e))
            .collect::<Result<Vec<_>>>()?;
        let order: Vec<usize> = (0..self.rank()).collect();
        self.reduce(&plans, &order)
    }

    /// Gather through `plans` and wrap the result.
    fn reduce(&self, plans: &[AxisPlan], order: &[usize]) -> Result<Selection> {
        let (natives, buffer) = reduce::gather(&self.buffer, &self.extents(), plans, order);
        if natives.is_empty() {
            return Ok(Selection::Value(buffer.get(0)));
        }
        Ok(Selection::Histogram(Self::from_parts(natives, buffer, self.family)?))
    }

    /// Total over in-range bins, and flow bins too with `flow`.
    pub fn sum(&self, flow: bool) -> Cell {
        let plans: Vec<AxisPlan> = self
            .axes
            .iter()
            .map(|a| AxisPlan::project(a.native(), 0, a.size(), flow, flow))
            .collect();
        let (_, buffer) = reduce::gather(&self.buffer, &self.extents(), &plans, &[]);
        buffer.get(0)
    }

    /// Keep only the listed axes, in the listed order, summing over all
    /// bins (flow included) of the others.
    pub fn project(&self, keep: &[usize]) -> Result<Self> {
        if keep.is_empty() {
            return Err(Error::index("project needs at least one axis"));
        }
        let mut seen = vec![false; self.rank()];
        for &d in keep {
            if d >= self.rank() || seen[d] {
                return Err(Error::index(format!(
                    "cannot project onto axis {d} of a rank {} histogram",
                    self.rank()
                )));
            }
            seen[d] = true;
        }
        let plans: Vec<AxisPlan> = self
            .axes
            .iter()
            .zip(&seen)
            .map(|(a, &kept)| {
                if kept {
                    AxisPlan::identity(a.native())
                } else {
                    AxisPlan::project(a.native(), 0, a.size(), true, true)
                }
            })
            .collect();
        match self.reduce(&plans, keep)? {
            Selection::Histogram(h) => Ok(h),
            Selection::Value(_) => Err(Error::index("projection produced no axes")),
        }
    }

    /// Dense copy of the bin contents; without `flow` only in-range bins.
    pub fn view(&self, flow: bool) -> Result<ArrayD<Cell>> {
        let full = ArrayD::from_shape_vec(IxDyn(&self.extents()), self.buffer.cells())
            .map_err(|e| Error::index(format!("storage does not match axis extents: {e}")))?;
        if flow {
            return Ok(full);
        }
        let view = full.slice_each_axis(|desc| {
            let native = self.axes[desc.axis.index()].native();
            let lo = usize::from(native.options().underflow());
            ndarray::Slice::from(lo..lo + native.size())
        });
        Ok(view.to_owned())
    }

    /// Headline values of [`Histogram::view`].
    pub fn values(&self, flow: bool) -> Result<ArrayD<f64>> {
        Ok(self.view(flow)?.mapv(|c| c.value()))
    }

    /// Variance estimates of [`Histogram::view`].
    pub fn variances(&self, flow: bool) -> Result<ArrayD<f64>> {
        Ok(self.view(flow)?.mapv(|c| c.variance()))
    }

    /// Values plus one edge array per axis. Category axes use their bin
    /// numbers as edges; with `flow`, flow bins get infinite outer edges.
    pub fn to_dense(&self, flow: bool) -> Result<(ArrayD<f64>, Vec<Array1<f64>>)> {
        let edges = self
            .axes
            .iter()
            .map(|a| Array1::from(a.native().dense_edges(flow)))
            .collect();
        Ok((self.values(flow)?, edges))
    }

    /// Zero every bin.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    /// Multiply every bin by `factor`.
    pub fn scale(&mut self, factor: f64) -> Result<()> {
        self.buffer.scale(factor)
    }
}

impl Add<&Histogram> for &Histogram {
    type Output = Result<Histogram>;

    fn add(self, rhs: &Histogram) -> Result<Histogram> {
        if self.axes != rhs.axes || self.storage != rhs.storage {
            return Err(Error::capability(
                "only histograms with equal axes and storage can be added",
            ));
        }
        let mut out = self.clone();
        out.buffer.add_all(&rhs.buffer);
        Ok(out)
    }
}

impl PartialEq for Histogram {
    fn eq(&self, other: &Self) -> bool {
        self.axes == other.axes && self.storage == other.storage && self.buffer == other.buffer
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Histogram(")?;
        for a in &self.axes {
            writeln!(f, "  {a},")?;
        }
        write!(f, "  storage={})", self.storage)?;
        let total = self.sum(true);
        if matches!(total, Cell::Count(_) | Cell::Real(_)) {
            write!(f, " # Sum: {total}")?;
        }
        Ok(())
    }
}
