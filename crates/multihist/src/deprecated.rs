//! Lowercase axis constructors kept for older callers.
//!
//! Axes built here carry one of the lowercase classes (`regular`,
//! `variable`, `integer`, `category`). Those classes claim no native types,
//! so anything derived from such an axis (a slice, a grown copy) casts back
//! to the regular classes.

#![allow(deprecated)]

use crate::{
    axis::Axis,
    coord::Coord,
    error::{Error, Result},
    options::AxisOptions,
    registry::{self, Family},
};

/// Re-tag an axis with a lowercase class.
fn renamed(axis: Axis, name: &str) -> Result<Axis> {
    let class = registry::lookup(name, Family::MAIN)
        .ok_or_else(|| Error::config(format!("class {name} is not registered")))?;
    Ok(axis.with_class(class))
}

/// Use [`Axis::regular_with`].
#[deprecated(note = "use Axis::regular_with")]
pub fn regular(bins: usize, start: f64, stop: f64, opts: &AxisOptions) -> Result<Axis> {
    renamed(Axis::regular_with(bins, start, stop, opts)?, "regular")
}

/// Use [`Axis::circular`].
#[deprecated(note = "use Axis::circular")]
pub fn circular(bins: usize, start: f64, stop: f64, metadata: Option<&str>) -> Result<Axis> {
    renamed(Axis::circular(bins, start, stop, metadata)?, "regular")
}

/// Use [`Axis::regular_log`].
#[deprecated(note = "use Axis::regular_log")]
pub fn regular_log(bins: usize, start: f64, stop: f64, metadata: Option<&str>) -> Result<Axis> {
    renamed(Axis::regular_log(bins, start, stop, metadata)?, "regular")
}

/// Use [`Axis::regular_sqrt`].
#[deprecated(note = "use Axis::regular_sqrt")]
pub fn regular_sqrt(bins: usize, start: f64, stop: f64, metadata: Option<&str>) -> Result<Axis> {
    renamed(Axis::regular_sqrt(bins, start, stop, metadata)?, "regular")
}

/// Use [`Axis::regular_pow`].
#[deprecated(note = "use Axis::regular_pow")]
pub fn regular_pow(
    bins: usize,
    start: f64,
    stop: f64,
    power: f64,
    metadata: Option<&str>,
) -> Result<Axis> {
    renamed(Axis::regular_pow(bins, start, stop, power, metadata)?, "regular")
}

/// Use [`Axis::variable_with`].
#[deprecated(note = "use Axis::variable_with")]
pub fn variable(edges: &[f64], opts: &AxisOptions) -> Result<Axis> {
    renamed(Axis::variable_with(edges, opts)?, "variable")
}

/// Use [`Axis::integer_with`].
#[deprecated(note = "use Axis::integer_with")]
pub fn integer(start: i64, stop: i64, opts: &AxisOptions) -> Result<Axis> {
    renamed(Axis::integer_with(start, stop, opts)?, "integer")
}

/// Use [`Axis::category_with`].
#[deprecated(note = "use Axis::category_with")]
pub fn category<C: Into<Coord>>(
    labels: impl IntoIterator<Item = C>,
    opts: &AxisOptions,
) -> Result<Axis> {
    renamed(Axis::category_with(labels, opts)?, "category")
}
