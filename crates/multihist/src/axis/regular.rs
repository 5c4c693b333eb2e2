//! Evenly spaced bins, optionally in a transformed coordinate space.

use super::growth_bins;
use crate::{
    error::{Error, Result},
    transform::Transform,
};

/// Regular binning law.
///
/// `min` and `delta` live in the transformed space; `delta` is negative for
/// a descending axis (`start > stop`), which mirrors the bin numbering.
#[derive(Clone, Debug, PartialEq)]
pub struct Regular {
    /// Number of in-range bins.
    size: usize,
    /// Transformed lower edge of bin 0.
    min: f64,
    /// Transformed span of the whole axis.
    delta: f64,
    /// Coordinate transform.
    transform: Transform,
}

impl Regular {
    /// Construct `bins` equal bins between `start` and `stop`.
    pub fn new(bins: usize, start: f64, stop: f64, transform: Transform) -> Result<Self> {
        if bins == 0 {
            return Err(Error::config("bins must be greater than 0"));
        }
        if let Transform::Pow(p) = transform
            && (p == 0.0 || !p.is_finite())
        {
            return Err(Error::config(format!("power must be finite and non-zero, got {p}")));
        }
        let min = transform.forward(start);
        let max = transform.forward(stop);
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::config(format!(
                "range [{start}, {stop}] is not finite under the {transform} transform"
            )));
        }
        let delta = max - min;
        if delta == 0.0 {
            return Err(Error::config("range of axis is zero"));
        }
        Ok(Self {
            size: bins,
            min,
            delta,
            transform,
        })
    }

    /// Number of in-range bins.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Coordinate transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Normalised position of `x`: 0 at the first edge, 1 at the last.
    fn z(&self, x: f64) -> f64 {
        (self.transform.forward(x) - self.min) / self.delta
    }

    /// Bin of a normalised position known to lie in `[0, 1)`.
    fn bin_of(&self, z: f64) -> i64 {
        ((z * self.size as f64) as i64).min(self.size as i64 - 1)
    }

    /// Index law for a bounded axis: `-1` below, `size` at or above the
    /// last edge and for NaN.
    pub fn index(&self, x: f64) -> i64 {
        let z = self.z(x);
        if z < 1.0 {
            if z >= 0.0 { self.bin_of(z) } else { -1 }
        } else {
            self.size as i64
        }
    }

    /// Index law for a circular axis. Non-finite coordinates land in the
    /// wrap slot at `size`.
    pub fn index_circular(&self, x: f64) -> i64 {
        let z = self.z(x);
        if !z.is_finite() {
            return self.size as i64;
        }
        self.bin_of(z - z.floor())
    }

    /// Transformed edge at fractional bin `i` of a bounded axis.
    fn internal_value(&self, i: f64) -> f64 {
        let z = i / self.size as f64;
        if z < 0.0 {
            f64::NEG_INFINITY * self.delta
        } else if z > 1.0 {
            f64::INFINITY * self.delta
        } else {
            (1.0 - z) * self.min + z * (self.min + self.delta)
        }
    }

    /// Coordinate at fractional bin `i`; infinite beyond the flow bins.
    pub fn value(&self, i: f64) -> f64 {
        self.transform.inverse(self.internal_value(i))
    }

    /// Coordinate at fractional bin `i` of a circular axis, unbounded.
    pub fn value_circular(&self, i: f64) -> f64 {
        let z = i / self.size as f64;
        self.transform.inverse(self.min + z * self.delta)
    }

    /// Grow to include `x` and return `(index, bins added in front)`.
    ///
    /// New bins keep the original width. Infinities and NaN are routed to
    /// the flow bins instead of growing. A finite `x` too far out to reach
    /// in one step is an index error and leaves the axis unchanged.
    pub fn grow(&mut self, x: f64) -> Result<(i64, usize)> {
        let z = self.z(x);
        let width = self.delta / self.size as f64;
        let size = self.size as f64;
        if z < 1.0 {
            if z >= 0.0 {
                return Ok((self.bin_of(z), 0));
            }
            if z.is_finite() {
                let added = growth_bins(-(z * size).floor(), x)?;
                let stop = self.min + self.delta;
                self.min -= added as f64 * width;
                self.delta = stop - self.min;
                self.size += added;
                return Ok((0, added));
            }
            return Ok((-1, 0));
        }
        if z.is_finite() {
            let added = growth_bins((z * size).floor() - size + 1.0, x)?;
            self.size += added;
            self.delta = width * self.size as f64;
            return Ok((self.size as i64 - 1, 0));
        }
        Ok((self.size as i64, 0))
    }

    /// The sub-axis covering bins `[begin, end)`, merged by `merge`.
    ///
    /// Callers guarantee `merge` divides `end - begin`. Untouched ends keep
    /// their exact edge values.
    pub fn slice(&self, begin: usize, end: usize, merge: usize) -> Self {
        if begin == 0 && end == self.size {
            return Self {
                size: self.size / merge,
                ..self.clone()
            };
        }
        let lo = if begin == 0 {
            self.min
        } else {
            self.internal_value(begin as f64)
        };
        let hi = if end == self.size {
            self.min + self.delta
        } else {
            self.internal_value(end as f64)
        };
        Self {
            size: (end - begin) / merge,
            min: lo,
            delta: hi - lo,
            transform: self.transform,
        }
    }
}
