//! Per-bin accumulators and the [`Cell`] value returned by bin lookups.
//!
//! The running statistics use Welford-style updates so that merging and
//! filling stay numerically stable.

use std::{fmt, ops::AddAssign};

/// Sum of weights with its variance estimate (sum of squared weights).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightedSum {
    /// Sum of weights.
    pub value: f64,
    /// Sum of squared weights.
    pub variance: f64,
}

impl WeightedSum {
    /// Accumulator holding a single weight.
    pub fn new(value: f64, variance: f64) -> Self {
        Self { value, variance }
    }

    /// Add one weighted entry.
    pub fn fill(&mut self, weight: f64) {
        self.value += weight;
        self.variance += weight * weight;
    }

    /// Multiply by a constant.
    pub fn scale(&mut self, factor: f64) {
        self.value *= factor;
        self.variance *= factor * factor;
    }
}

impl AddAssign for WeightedSum {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
        self.variance += rhs.variance;
    }
}

impl AddAssign<f64> for WeightedSum {
    fn add_assign(&mut self, weight: f64) {
        self.fill(weight);
    }
}

impl fmt::Display for WeightedSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "weighted_sum(value={}, variance={})", self.value, self.variance)
    }
}

/// Count, mean and sample variance of a stream of samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mean {
    /// Number of entries, possibly fractional when filled with weights.
    count: f64,
    /// Running mean.
    value: f64,
    /// Sum of squared deviations from the running mean.
    sum_of_deltas_squared: f64,
}

impl Mean {
    /// Accumulator from its three moments; `variance` is the sample
    /// variance.
    pub fn new(count: f64, value: f64, variance: f64) -> Self {
        Self {
            count,
            value,
            sum_of_deltas_squared: variance * (count - 1.0),
        }
    }

    /// Add one sample counted `weight` times. A fill that leaves the count
    /// at zero only updates the count.
    pub fn fill(&mut self, weight: f64, x: f64) {
        self.count += weight;
        if self.count == 0.0 {
            return;
        }
        let delta = x - self.value;
        self.value += weight * delta / self.count;
        self.sum_of_deltas_squared += weight * delta * (x - self.value);
    }

    /// Number of entries.
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Mean of the samples.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Sample variance; NaN with fewer than two entries.
    pub fn variance(&self) -> f64 {
        if self.count > 1.0 {
            self.sum_of_deltas_squared / (self.count - 1.0)
        } else {
            f64::NAN
        }
    }

    /// Multiply every sample by a constant.
    pub fn scale(&mut self, factor: f64) {
        self.value *= factor;
        self.sum_of_deltas_squared *= factor * factor;
    }
}

impl AddAssign for Mean {
    fn add_assign(&mut self, rhs: Self) {
        let count = self.count + rhs.count;
        if count == 0.0 {
            return;
        }
        let value = (self.count * self.value + rhs.count * rhs.value) / count;
        self.sum_of_deltas_squared += rhs.sum_of_deltas_squared
            + self.count * (self.value - value).powi(2)
            + rhs.count * (rhs.value - value).powi(2);
        self.count = count;
        self.value = value;
    }
}

impl fmt::Display for Mean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean(count={}, value={}, variance={})",
            self.count,
            self.value,
            self.variance()
        )
    }
}

/// Weighted mean and variance of a stream of weighted samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightedMean {
    /// Sum of weights.
    sum_of_weights: f64,
    /// Sum of squared weights.
    sum_of_weights_squared: f64,
    /// Running weighted mean.
    value: f64,
    /// Weighted sum of squared deviations from the running mean.
    sum_of_weighted_deltas_squared: f64,
}

impl WeightedMean {
    /// Add one sample with a weight.
    pub fn fill(&mut self, weight: f64, x: f64) {
        self.sum_of_weights += weight;
        self.sum_of_weights_squared += weight * weight;
        if self.sum_of_weights == 0.0 {
            return;
        }
        let delta = x - self.value;
        self.value += weight * delta / self.sum_of_weights;
        self.sum_of_weighted_deltas_squared += weight * delta * (x - self.value);
    }

    /// Sum of weights.
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }

    /// Sum of squared weights.
    pub fn sum_of_weights_squared(&self) -> f64 {
        self.sum_of_weights_squared
    }

    /// Weighted mean.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Variance corrected for the effective number of entries.
    pub fn variance(&self) -> f64 {
        let effective = self.sum_of_weights - self.sum_of_weights_squared / self.sum_of_weights;
        self.sum_of_weighted_deltas_squared / effective
    }

    /// Multiply every sample by a constant.
    pub fn scale(&mut self, factor: f64) {
        self.value *= factor;
        self.sum_of_weighted_deltas_squared *= factor * factor;
    }
}

impl AddAssign for WeightedMean {
    fn add_assign(&mut self, rhs: Self) {
        let sw = self.sum_of_weights + rhs.sum_of_weights;
        if sw == 0.0 {
            return;
        }
        let value = (self.sum_of_weights * self.value + rhs.sum_of_weights * rhs.value) / sw;
        self.sum_of_weighted_deltas_squared += rhs.sum_of_weighted_deltas_squared
            + self.sum_of_weights * (self.value - value).powi(2)
            + rhs.sum_of_weights * (rhs.value - value).powi(2);
        self.sum_of_weights = sw;
        self.sum_of_weights_squared += rhs.sum_of_weights_squared;
        self.value = value;
    }
}

impl fmt::Display for WeightedMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weighted_mean(wsum={}, wsum2={}, value={}, variance={})",
            self.sum_of_weights,
            self.sum_of_weights_squared,
            self.value,
            self.variance()
        )
    }
}

/// Content of one bin.
#[derive(Clone, Copy, Debug)]
pub enum Cell {
    /// Integer count.
    Count(u64),
    /// Real-valued sum of weights.
    Real(f64),
    /// Sum of weights with variance.
    Weighted(WeightedSum),
    /// Sample statistics.
    Mean(Mean),
    /// Weighted sample statistics.
    WeightedMean(WeightedMean),
}

impl Cell {
    /// Headline value: the count, the sum of weights or the mean.
    pub fn value(&self) -> f64 {
        match self {
            Self::Count(n) => *n as f64,
            Self::Real(v) => *v,
            Self::Weighted(w) => w.value,
            Self::Mean(m) => m.value(),
            Self::WeightedMean(m) => m.value(),
        }
    }

    /// Variance estimate, where the accumulator carries one. Plain counts
    /// use Poisson statistics.
    pub fn variance(&self) -> f64 {
        match self {
            Self::Count(n) => *n as f64,
            Self::Real(v) => *v,
            Self::Weighted(w) => w.variance,
            Self::Mean(m) => m.variance(),
            Self::WeightedMean(m) => m.variance(),
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Count(a), Self::Count(b)) => a == b,
            (Self::Count(_) | Self::Real(_), Self::Count(_) | Self::Real(_)) => {
                self.value() == other.value()
            }
            (Self::Weighted(a), Self::Weighted(b)) => a == b,
            (Self::Mean(a), Self::Mean(b)) => a == b,
            (Self::WeightedMean(a), Self::WeightedMean(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<f64> for Cell {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Self::Count(_) | Self::Real(_)) && self.value() == *other
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Weighted(w) => fmt::Display::fmt(w, f),
            Self::Mean(m) => fmt::Display::fmt(m, f),
            Self::WeightedMean(m) => fmt::Display::fmt(m, f),
        }
    }
}
