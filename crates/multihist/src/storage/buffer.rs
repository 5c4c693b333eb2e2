//! Dense bin buffers, one layout per storage kind.
//!
//! Buffers are flat and indexed by storage slot; the histogram owns the
//! mapping from multi-dimensional bin coordinates to slots.

use std::sync::atomic::{AtomicU64, Ordering};

use super::StorageKind;
use crate::{
    accumulators::{Cell, Mean, WeightedMean, WeightedSum},
    error::{Error, Result},
};

/// Add `n` to a counter, failing if the sum does not fit its width.
fn bump<T>(slot: &mut T, n: u64) -> bool
where
    T: Copy + Into<u64> + TryFrom<u64>,
{
    match (*slot).into().checked_add(n).and_then(|s| T::try_from(s).ok()) {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

/// Counters that start narrow and widen as values grow.
#[derive(Clone, Debug)]
pub(crate) enum Unlimited {
    /// 8-bit counters.
    U8(Vec<u8>),
    /// 16-bit counters.
    U16(Vec<u16>),
    /// 32-bit counters.
    U32(Vec<u32>),
    /// 64-bit counters.
    U64(Vec<u64>),
    /// Reals, after a non-integral weight or a 64-bit overflow.
    F64(Vec<f64>),
}

impl Unlimited {
    /// Number of slots.
    fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Content of slot `i`.
    fn get(&self, i: usize) -> Cell {
        match self {
            Self::U8(v) => Cell::Count(u64::from(v[i])),
            Self::U16(v) => Cell::Count(u64::from(v[i])),
            Self::U32(v) => Cell::Count(u64::from(v[i])),
            Self::U64(v) => Cell::Count(v[i]),
            Self::F64(v) => Cell::Real(v[i]),
        }
    }

    /// Widen every counter by one step.
    fn promote(&mut self) {
        let next = match self {
            Self::U8(v) => Self::U16(v.iter().map(|&x| u16::from(x)).collect()),
            Self::U16(v) => Self::U32(v.iter().map(|&x| u32::from(x)).collect()),
            Self::U32(v) => Self::U64(v.iter().map(|&x| u64::from(x)).collect()),
            Self::U64(v) => Self::F64(v.iter().map(|&x| x as f64).collect()),
            Self::F64(_) => return,
        };
        tracing::trace!(len = self.len(), "widening unlimited storage");
        *self = next;
    }

    /// Switch to reals, then apply `f` to the slots.
    fn with_real(&mut self, f: impl FnOnce(&mut [f64])) {
        while !matches!(self, Self::F64(_)) {
            self.promote();
        }
        if let Self::F64(v) = self {
            f(v);
        }
    }

    /// Add a whole count to slot `i`.
    fn add_count(&mut self, i: usize, n: u64) {
        loop {
            let done = match self {
                Self::U8(v) => bump(&mut v[i], n),
                Self::U16(v) => bump(&mut v[i], n),
                Self::U32(v) => bump(&mut v[i], n),
                Self::U64(v) => bump(&mut v[i], n),
                Self::F64(v) => {
                    v[i] += n as f64;
                    true
                }
            };
            if done {
                return;
            }
            self.promote();
        }
    }

    /// Add a weight to slot `i`, switching to reals if it is not a whole
    /// non-negative number.
    fn add(&mut self, i: usize, w: f64) {
        if w >= 0.0 && w.fract() == 0.0 && w < u64::MAX as f64 && !matches!(self, Self::F64(_)) {
            self.add_count(i, w as u64);
        } else {
            self.with_real(|v| v[i] += w);
        }
    }
}

/// Bin contents of a histogram.
#[derive(Debug)]
pub(crate) enum Buffer {
    /// Integer counts.
    Int(Vec<u64>),
    /// Real sums.
    Double(Vec<f64>),
    /// Atomic counts.
    Atomic(Vec<AtomicU64>),
    /// Adaptive counts.
    Unlimited(Unlimited),
    /// Weighted sums.
    Weight(Vec<WeightedSum>),
    /// Means.
    Mean(Vec<Mean>),
    /// Weighted means.
    WeightedMean(Vec<WeightedMean>),
}

impl Buffer {
    /// Zeroed buffer of `len` slots.
    pub fn new(kind: StorageKind, len: usize) -> Self {
        match kind {
            StorageKind::Int => Self::Int(vec![0; len]),
            StorageKind::Double => Self::Double(vec![0.0; len]),
            StorageKind::AtomicInt => Self::Atomic((0..len).map(|_| AtomicU64::new(0)).collect()),
            StorageKind::Unlimited => Self::Unlimited(Unlimited::U8(vec![0; len])),
            StorageKind::Weight => Self::Weight(vec![WeightedSum::default(); len]),
            StorageKind::Mean => Self::Mean(vec![Mean::default(); len]),
            StorageKind::WeightedMean => Self::WeightedMean(vec![WeightedMean::default(); len]),
        }
    }

    /// Storage kind of the layout.
    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Int(_) => StorageKind::Int,
            Self::Double(_) => StorageKind::Double,
            Self::Atomic(_) => StorageKind::AtomicInt,
            Self::Unlimited(_) => StorageKind::Unlimited,
            Self::Weight(_) => StorageKind::Weight,
            Self::Mean(_) => StorageKind::Mean,
            Self::WeightedMean(_) => StorageKind::WeightedMean,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Atomic(v) => v.len(),
            Self::Unlimited(u) => u.len(),
            Self::Weight(v) => v.len(),
            Self::Mean(v) => v.len(),
            Self::WeightedMean(v) => v.len(),
        }
    }

    /// Content of slot `i`.
    pub fn get(&self, i: usize) -> Cell {
        match self {
            Self::Int(v) => Cell::Count(v[i]),
            Self::Double(v) => Cell::Real(v[i]),
            Self::Atomic(v) => Cell::Count(v[i].load(Ordering::Relaxed)),
            Self::Unlimited(u) => u.get(i),
            Self::Weight(v) => Cell::Weighted(v[i]),
            Self::Mean(v) => Cell::Mean(v[i]),
            Self::WeightedMean(v) => Cell::WeightedMean(v[i]),
        }
    }

    /// Every slot in order.
    pub fn cells(&self) -> Vec<Cell> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Record one entry in slot `i`. Arguments are validated by
    /// [`StorageKind::check_fill`] beforehand.
    pub fn fill(&mut self, i: usize, weight: Option<f64>, sample: Option<f64>) {
        let w = weight.unwrap_or(1.0);
        let x = sample.unwrap_or(0.0);
        match self {
            Self::Int(v) => v[i] = v[i].saturating_add(w as u64),
            Self::Double(v) => v[i] += w,
            Self::Atomic(v) => {
                v[i].fetch_add(w as u64, Ordering::Relaxed);
            }
            Self::Unlimited(u) => u.add(i, w),
            Self::Weight(v) => v[i].fill(w),
            Self::Mean(v) => v[i].fill(w, x),
            Self::WeightedMean(v) => v[i].fill(w, x),
        }
    }

    /// Add `n` to slot `i` of an atomic buffer through a shared reference.
    pub fn fill_shared(&self, i: usize, n: u64) -> Result<()> {
        match self {
            Self::Atomic(v) => {
                v[i].fetch_add(n, Ordering::Relaxed);
                Ok(())
            }
            _ => Err(Error::capability(format!(
                "concurrent filling needs atomic_int storage, not {}",
                self.kind()
            ))),
        }
    }

    /// Merge slot `j` of `other`, which has the same kind, into slot `i`.
    pub fn add_from(&mut self, i: usize, other: &Self, j: usize) {
        match (self, other.get(j)) {
            (Self::Int(v), Cell::Count(n)) => v[i] = v[i].saturating_add(n),
            (Self::Atomic(v), Cell::Count(n)) => {
                v[i].fetch_add(n, Ordering::Relaxed);
            }
            (Self::Double(v), Cell::Real(x)) => v[i] += x,
            (Self::Unlimited(u), Cell::Count(n)) => u.add_count(i, n),
            (Self::Unlimited(u), Cell::Real(x)) => u.with_real(|v| v[i] += x),
            (Self::Weight(v), Cell::Weighted(w)) => v[i] += w,
            (Self::Mean(v), Cell::Mean(m)) => v[i] += m,
            (Self::WeightedMean(v), Cell::WeightedMean(m)) => v[i] += m,
            _ => {}
        }
    }

    /// A new buffer of `len` slots with every source slot `j` merged into
    /// `map(j)`; slots mapped to `None` are dropped.
    pub fn gather(&self, len: usize, map: impl Fn(usize) -> Option<usize>) -> Self {
        let mut out = Self::new(self.kind(), len);
        for j in 0..self.len() {
            if let Some(i) = map(j) {
                out.add_from(i, self, j);
            }
        }
        out
    }

    /// Merge every slot of `other` into the same slot of `self`.
    pub fn add_all(&mut self, other: &Self) {
        for i in 0..self.len().min(other.len()) {
            self.add_from(i, other, i);
        }
    }

    /// Multiply every slot by `factor`.
    pub fn scale(&mut self, factor: f64) -> Result<()> {
        match self {
            Self::Int(_) | Self::Atomic(_) => {
                return Err(Error::capability(format!(
                    "{} storage cannot be scaled",
                    self.kind()
                )));
            }
            Self::Double(v) => v.iter_mut().for_each(|x| *x *= factor),
            Self::Unlimited(u) => u.with_real(|v| v.iter_mut().for_each(|x| *x *= factor)),
            Self::Weight(v) => v.iter_mut().for_each(|x| x.scale(factor)),
            Self::Mean(v) => v.iter_mut().for_each(|x| x.scale(factor)),
            Self::WeightedMean(v) => v.iter_mut().for_each(|x| x.scale(factor)),
        }
        Ok(())
    }

    /// Zero every slot, keeping the length.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind(), self.len());
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        match self {
            Self::Int(v) => Self::Int(v.clone()),
            Self::Double(v) => Self::Double(v.clone()),
            Self::Atomic(v) => Self::Atomic(
                v.iter()
                    .map(|a| AtomicU64::new(a.load(Ordering::Relaxed)))
                    .collect(),
            ),
            Self::Unlimited(u) => Self::Unlimited(u.clone()),
            Self::Weight(v) => Self::Weight(v.clone()),
            Self::Mean(v) => Self::Mean(v.clone()),
            Self::WeightedMean(v) => Self::WeightedMean(v.clone()),
        }
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.cells() == other.cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_widens_then_turns_real() {
        let mut b = Buffer::new(StorageKind::Unlimited, 2);
        b.fill(0, Some(250.0), None);
        b.fill(0, Some(10.0), None);
        assert_eq!(b.get(0), Cell::Count(260));
        assert!(matches!(b, Buffer::Unlimited(Unlimited::U16(_))));
        b.fill(1, Some(0.5), None);
        assert!(matches!(b, Buffer::Unlimited(Unlimited::F64(_))));
        assert_eq!(b.get(0), Cell::Real(260.0));
        assert_eq!(b.get(1), Cell::Real(0.5));
    }

    #[test]
    fn unlimited_survives_64_bit_overflow() {
        let mut b = Buffer::new(StorageKind::Unlimited, 1);
        b.add_from(0, &Buffer::Int(vec![u64::MAX]), 0);
        b.fill(0, None, None);
        assert!(matches!(b.get(0), Cell::Real(_)));
    }

    #[test]
    fn gather_merges_slots() {
        let mut b = Buffer::new(StorageKind::Weight, 4);
        for i in 0..4 {
            b.fill(i, Some(1.0 + i as f64), None);
        }
        let g = b.gather(2, |j| Some(j / 2));
        assert_eq!(g.get(0), Cell::Weighted(WeightedSum::new(3.0, 5.0)));
        assert_eq!(g.get(1), Cell::Weighted(WeightedSum::new(7.0, 25.0)));
        let dropped = b.gather(1, |j| (j == 3).then_some(0));
        assert_eq!(dropped.get(0), Cell::Weighted(WeightedSum::new(4.0, 16.0)));
    }

    #[test]
    fn integer_storage_cannot_scale() {
        let mut b = Buffer::new(StorageKind::Int, 1);
        assert!(b.scale(2.0).is_err());
        let mut d = Buffer::new(StorageKind::Double, 1);
        d.fill(0, Some(1.5), None);
        assert!(d.scale(2.0).is_ok());
        assert_eq!(d.get(0), 3.0);
    }

    #[test]
    fn shared_fill_needs_atomics() {
        let b = Buffer::new(StorageKind::AtomicInt, 1);
        assert!(b.fill_shared(0, 2).is_ok());
        assert_eq!(b.get(0), Cell::Count(2));
        assert!(Buffer::new(StorageKind::Int, 1).fill_shared(0, 1).is_err());
    }
}
