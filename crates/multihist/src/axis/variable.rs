//! Bins with arbitrary, strictly increasing edges.

use crate::error::{Error, Result};

/// Variable binning law.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Edges, at least two, strictly increasing and finite.
    edges: Vec<f64>,
}

impl Variable {
    /// Construct from bin edges.
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::config("at least two edges are required"));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(Error::config("edges must be finite"));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::config("edges must be strictly ascending"));
        }
        Ok(Self { edges })
    }

    /// Number of in-range bins.
    pub fn size(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Index law: `-1` below the first edge, `size` at or above the last
    /// edge and for NaN.
    pub fn index(&self, x: f64) -> i64 {
        if x.is_nan() {
            return self.size() as i64;
        }
        self.edges.partition_point(|e| *e <= x) as i64 - 1
    }

    /// Coordinate at fractional bin `i`; infinite beyond the flow bins.
    pub fn value(&self, i: f64) -> f64 {
        let size = self.size() as f64;
        if i < 0.0 {
            return f64::NEG_INFINITY;
        }
        if i == size {
            return self.edges[self.size()];
        }
        if i > size {
            return f64::INFINITY;
        }
        let k = i as usize;
        let z = i - k as f64;
        if z == 0.0 {
            self.edges[k]
        } else {
            (1.0 - z) * self.edges[k] + z * self.edges[k + 1]
        }
    }

    /// Grow to include `x` and return `(index, bins added in front)`.
    ///
    /// A new edge is placed just past `x`, or half the boundary bin width
    /// beyond the old boundary if that is farther out.
    pub fn grow(&mut self, x: f64) -> (i64, usize) {
        let i = self.index(x);
        if !x.is_finite() {
            return (if x < 0.0 { -1 } else { self.size() as i64 }, 0);
        }
        let size = self.size();
        if i < 0 {
            let half = self.value(0.5) - self.value(0.0);
            let edge = x.min(self.edges[0] - half);
            self.edges.insert(0, edge);
            return (0, 1);
        }
        if (i as usize) < size {
            return (i, 0);
        }
        let half = self.value(size as f64) - self.value(size as f64 - 0.5);
        let edge = x.next_up().max(self.edges[size] + half);
        self.edges.push(edge);
        (i, 0)
    }

    /// The sub-axis covering bins `[begin, end)`, merged by `merge`.
    ///
    /// A trailing partial group becomes a shorter final bin.
    pub fn slice(&self, begin: usize, end: usize, merge: usize) -> Self {
        let mut edges: Vec<f64> = (begin..=end).step_by(merge).map(|i| self.edges[i]).collect();
        if (end - begin) % merge != 0 {
            edges.push(self.edges[end]);
        }
        Self { edges }
    }
}
