//! Unit-width bins over a contiguous integer range.

use super::growth_bins;
use crate::error::{Error, Result};

/// Integer binning law: bin `k` holds `[min + k, min + k + 1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Integer {
    /// Value of the first bin.
    min: i64,
    /// Number of in-range bins.
    size: usize,
}

impl Integer {
    /// Construct the range `[start, stop)`.
    pub fn new(start: i64, stop: i64) -> Result<Self> {
        if stop <= start {
            return Err(Error::config(format!(
                "integer axis needs start < stop, got [{start}, {stop})"
            )));
        }
        let size = stop
            .checked_sub(start)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                Error::config(format!("integer range [{start}, {stop}) is too wide"))
            })?;
        Ok(Self { min: start, size })
    }

    /// Number of in-range bins.
    pub fn size(&self) -> usize {
        self.size
    }

    /// First value of the range.
    pub fn start(&self) -> i64 {
        self.min
    }

    /// One past the last value of the range.
    pub fn stop(&self) -> i64 {
        self.min + self.size as i64
    }

    /// Index of an exact integer.
    pub fn index_int(&self, x: i64) -> i64 {
        let z = x.saturating_sub(self.min);
        z.clamp(-1, self.size as i64)
    }

    /// Index of a real coordinate; fractional values are floored, NaN maps
    /// to `size`.
    pub fn index(&self, x: f64) -> i64 {
        if x.is_nan() {
            return self.size as i64;
        }
        let z = x.floor() - self.min as f64;
        if z < 0.0 {
            -1
        } else if z >= self.size as f64 {
            self.size as i64
        } else {
            z as i64
        }
    }

    /// Coordinate at fractional bin `i`; infinite beyond the flow bins.
    pub fn value(&self, i: f64) -> f64 {
        if i < 0.0 {
            f64::NEG_INFINITY
        } else if i > self.size as f64 {
            f64::INFINITY
        } else {
            self.min as f64 + i
        }
    }

    /// Grow by whole integers to include `x`; returns `(index, bins added in
    /// front)`.
    pub fn grow(&mut self, x: f64) -> Result<(i64, usize)> {
        if !x.is_finite() {
            return Err(too_far(x));
        }
        let i = x.floor() - self.min as f64;
        let size = self.size as f64;
        if i < 0.0 {
            let added = growth_bins(-i, x)?;
            self.min = self
                .min
                .checked_sub(added as i64)
                .ok_or_else(|| too_far(x))?;
            self.size += added;
            return Ok((0, added));
        }
        if i >= size {
            let added = growth_bins(i - size + 1.0, x)?;
            if self.min.checked_add((self.size + added) as i64).is_none() {
                return Err(too_far(x));
            }
            self.size += added;
        }
        Ok((i as i64, 0))
    }

    /// The sub-range `[begin, end)` in bin numbers.
    pub fn slice(&self, begin: usize, end: usize) -> Self {
        Self {
            min: self.min + begin as i64,
            size: end - begin,
        }
    }
}

/// Error for a growth target the axis cannot reach.
fn too_far(x: f64) -> Error {
    Error::index(format!("cannot grow an integer axis to {x}"))
}
