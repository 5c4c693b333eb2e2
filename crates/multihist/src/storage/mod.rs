//! Storage kinds and the public storage wrapper.
//!
//! [`StorageKind`] names the seven accumulator layouts; [`Storage`] is the
//! wrapper a kind casts to through the class registry. The dense buffers
//! that hold bin contents live in [`buffer`].

/// Dense per-kind bin buffers.
pub(crate) mod buffer;

use std::fmt;

use crate::{
    error::{Error, Result},
    registry::{self, Base, ClassRef, Family, NativeType},
};

/// Accumulator layout of a histogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKind {
    /// 64-bit integer counts.
    Int,
    /// Real-valued sums of weights.
    Double,
    /// 64-bit integer counts that support concurrent filling.
    AtomicInt,
    /// Counts that widen on demand, then switch to reals.
    Unlimited,
    /// Sums of weights with variances.
    Weight,
    /// Sample means.
    Mean,
    /// Weighted sample means.
    WeightedMean,
}

impl StorageKind {
    /// Every storage kind.
    pub const ALL: [Self; 7] = [
        Self::Int,
        Self::Double,
        Self::AtomicInt,
        Self::Unlimited,
        Self::Weight,
        Self::Mean,
        Self::WeightedMean,
    ];

    /// Snake-case name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::AtomicInt => "atomic_int",
            Self::Unlimited => "unlimited",
            Self::Weight => "weight",
            Self::Mean => "mean",
            Self::WeightedMean => "weighted_mean",
        }
    }

    /// Whether bins hold integer counts.
    pub fn is_integral(self) -> bool {
        matches!(self, Self::Int | Self::AtomicInt)
    }

    /// Validate fill arguments for this kind before anything is touched.
    pub(crate) fn check_fill(self, weight: Option<f64>, sample: Option<f64>) -> Result<()> {
        match self {
            Self::Mean | Self::WeightedMean if sample.is_none() => {
                return Err(Error::capability(format!(
                    "{} storage requires a sample",
                    self.name()
                )));
            }
            Self::Mean | Self::WeightedMean => {}
            _ if sample.is_some() => {
                return Err(Error::capability(format!(
                    "{} storage does not take a sample",
                    self.name()
                )));
            }
            _ => {}
        }
        if let Some(w) = weight {
            if self.is_integral() && !(w >= 0.0 && w.fract() == 0.0 && w.is_finite()) {
                return Err(Error::capability(format!(
                    "{} storage only takes whole non-negative weights, got {w}",
                    self.name()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Public storage wrapper: a kind tagged with the class it cast to.
#[derive(Clone, Copy, Debug)]
pub struct Storage {
    /// Class selected by the registry.
    class: ClassRef,
    /// Accumulator layout.
    kind: StorageKind,
}

impl Storage {
    /// Wrapper for `kind` in the main family.
    pub fn new(kind: StorageKind) -> Result<Self> {
        Self::in_family(kind, Family::MAIN)
    }

    /// Wrapper for `kind`, cast in `family`.
    pub fn in_family(kind: StorageKind, family: Family) -> Result<Self> {
        let class = registry::cast_class(Some(family), NativeType::Storage(kind), Base::Storage)?;
        Ok(Self { class, kind })
    }

    /// Accumulator layout.
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Class selected by the registry.
    pub fn class(&self) -> ClassRef {
        self.class
    }
}

impl PartialEq for Storage {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl PartialEq<StorageKind> for Storage {
    fn eq(&self, other: &StorageKind) -> bool {
        self.kind == *other
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.class.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_argument_rules() {
        assert!(StorageKind::Int.check_fill(Some(2.0), None).is_ok());
        assert!(StorageKind::Int.check_fill(Some(0.5), None).is_err());
        assert!(StorageKind::AtomicInt.check_fill(Some(-1.0), None).is_err());
        assert!(StorageKind::Double.check_fill(Some(-0.5), None).is_ok());
        assert!(StorageKind::Weight.check_fill(None, Some(1.0)).is_err());
        assert!(StorageKind::Mean.check_fill(None, None).is_err());
        assert!(StorageKind::Mean.check_fill(Some(2.0), Some(1.0)).is_ok());
        assert!(StorageKind::WeightedMean.check_fill(None, Some(1.0)).is_ok());
    }

    #[test]
    fn wrapper_names_main_class() -> Result<()> {
        let s = Storage::new(StorageKind::Double)?;
        assert_eq!(s, StorageKind::Double);
        assert_eq!(s.to_string(), "Double()");
        assert_eq!(s.class().family(), Family::MAIN);
        Ok(())
    }
}
