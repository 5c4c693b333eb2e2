//! Multi-dimensional histograms with variant axes and pluggable storage.
//!
//! A [`Histogram`] combines independently configured [`Axis`] values with
//! one [`StorageKind`]. Axes and storages are native variants cast to public
//! classes through a family-aware [`registry`], and histograms are read and
//! reshaped through one indexing algebra (see [`index`]).
//!
//! # Axis kinds
//!
//! - Regular (optionally circular, or in log, sqrt or power space)
//! - Variable
//! - Integer
//! - Category (integer or string labels)
//!
//! # Example
//!
//! ```
//! use multihist::{Axis, Histogram, Index, StorageKind};
//!
//! let mut h = Histogram::new(vec![Axis::regular(10, 0.0, 1.0)?], StorageKind::Int)?;
//! h.fill_1d([0.25, 0.25, 0.25, 0.15])?;
//! assert_eq!(h.at(&[2])?, 3.0);
//! let first_half = h.index(&[(..5).into()])?.into_histogram();
//! assert_eq!(first_half.map(|h| h.axis(0).map(|a| a.size()).ok()), Some(Some(5)));
//! # Ok::<(), multihist::error::Error>(())
//! ```

/// Accumulators and bin cells.
pub mod accumulators;
/// Axes and their native representation.
pub mod axis;
/// Sample coordinates.
pub mod coord;
/// Lowercase constructors kept for older callers.
pub mod deprecated;
/// Error types used across the crate.
pub mod error;
/// The histogram.
pub mod histogram;
/// Index expressions.
pub mod index;
/// Axis options and keyword flags.
pub mod options;
/// Storage gathering for reshaped histograms.
mod reduce;
/// Family-aware class registry.
pub mod registry;
/// Storage kinds and buffers.
pub mod storage;
/// Coordinate transforms.
pub mod transform;

pub use crate::{
    accumulators::Cell,
    axis::{Axis, AxisType, Bin, Interval},
    coord::Coord,
    histogram::Histogram,
    index::{Action, Index, Loc, Selection, Slice},
    options::{AxisOptions, Flags, Opt, Options},
    registry::Family,
    storage::{Storage, StorageKind},
};
