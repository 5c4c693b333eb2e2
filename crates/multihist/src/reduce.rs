//! Gathering storage into a reduced or reshaped histogram.
//!
//! Every histogram transformation that changes the bin layout (slicing,
//! rebinning, summing, projecting, growing) is expressed as one
//! [`AxisPlan`] per source axis. [`gather`] walks every source slot once and
//! merges it into its destination slot, so results never alias the source.

use crate::{axis::AxisVariant, storage::buffer::Buffer};

/// What happens to one source axis.
#[derive(Clone, Debug)]
pub enum AxisPlan {
    /// The axis disappears; slots marked `true` are summed in.
    Fold(Vec<bool>),
    /// The axis survives as `axis`; `map[s]` is the destination slot of
    /// source slot `s`, or `None` to drop it.
    Keep {
        /// Destination slot per source slot.
        map: Vec<Option<usize>>,
        /// Resulting axis.
        axis: AxisVariant,
    },
}

impl AxisPlan {
    /// Fold only slot `s` of an axis with `extent` slots.
    pub fn select(extent: usize, s: usize) -> Self {
        Self::Fold((0..extent).map(|t| t == s).collect())
    }

    /// Fold in-range bins `[lo, hi)` and, on request, the flow bins.
    pub fn project(axis: &AxisVariant, lo: usize, hi: usize, under: bool, over: bool) -> Self {
        Self::Fold(
            (0..axis.extent())
                .map(|s| {
                    let i = axis.index_of_slot(s);
                    match i {
                        -1 => under,
                        i if i == axis.size() as i64 => over,
                        i => (lo as i64..hi as i64).contains(&i),
                    }
                })
                .collect(),
        )
    }

    /// Keep in-range bins `[lo, hi)` merged by `merge` as `new`, and the
    /// flow bins where requested.
    pub fn keep(
        axis: &AxisVariant,
        new: AxisVariant,
        (lo, hi, merge): (usize, usize, usize),
        under: bool,
        over: bool,
    ) -> Self {
        let map = (0..axis.extent())
            .map(|s| {
                let i = axis.index_of_slot(s);
                let target = match i {
                    -1 if under => -1,
                    i if i == axis.size() as i64 && over => new.size() as i64,
                    i if (lo as i64..hi as i64).contains(&i) => (i - lo as i64) / merge as i64,
                    _ => return None,
                };
                new.is_representable(target).then(|| new.slot(target))
            })
            .collect();
        Self::Keep { map, axis: new }
    }

    /// Keep every slot of a grown axis, shifting in-range bins by `front`.
    pub fn regrow(axis: &AxisVariant, new: AxisVariant, front: usize) -> Self {
        let map = (0..axis.extent())
            .map(|s| {
                let i = axis.index_of_slot(s);
                let target = if i == -1 {
                    -1
                } else if i == axis.size() as i64 {
                    new.size() as i64
                } else {
                    i + front as i64
                };
                new.is_representable(target).then(|| new.slot(target))
            })
            .collect();
        Self::Keep { map, axis: new }
    }

    /// Identity plan.
    pub fn identity(axis: &AxisVariant) -> Self {
        Self::Keep {
            map: (0..axis.extent()).map(Some).collect(),
            axis: axis.clone(),
        }
    }

    /// The surviving axis, if any.
    pub fn axis(&self) -> Option<&AxisVariant> {
        match self {
            Self::Fold(_) => None,
            Self::Keep { axis, .. } => Some(axis),
        }
    }
}

/// Apply `plans` to `buffer` laid out over `extents`, emitting the kept
/// axes in `order`. Returns the output axes and buffer; with no kept axis
/// the buffer has a single slot.
pub fn gather(
    buffer: &Buffer,
    extents: &[usize],
    plans: &[AxisPlan],
    order: &[usize],
) -> (Vec<AxisVariant>, Buffer) {
    let axes: Vec<AxisVariant> = order
        .iter()
        .filter_map(|&d| plans[d].axis().cloned())
        .collect();
    let mut strides = vec![0; plans.len()];
    let mut stride = 1;
    for &d in order.iter().rev() {
        if let Some(axis) = plans[d].axis() {
            strides[d] = stride;
            stride *= axis.extent();
        }
    }
    tracing::trace!(source = buffer.len(), target = stride, "gathering storage");
    let out = buffer.gather(stride, |j| {
        let mut rest = j;
        let mut target = 0;
        for d in (0..plans.len()).rev() {
            let s = rest % extents[d];
            rest /= extents[d];
            match &plans[d] {
                AxisPlan::Fold(mask) => {
                    if !mask[s] {
                        return None;
                    }
                }
                AxisPlan::Keep { map, .. } => target += map[s]? * strides[d],
            }
        }
        Some(target)
    });
    (axes, out)
}
