//! The native axis representation shared by every public axis class.
//!
//! An [`AxisVariant`] pairs a binning law with a resolved option set. Each
//! valid pairing has an [`AxisType`] tag, which is what the class registry
//! keys on.

use std::fmt;

use super::{
    bin::{Bin, Interval},
    category::Category,
    integer::Integer,
    regular::Regular,
    variable::Variable,
};
use crate::{
    coord::Coord,
    error::{Error, Result},
    options::{Opt, Options},
    transform::Transform,
};

/// Tag of a concrete native axis type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisType {
    /// Regular, no flow bins.
    RegularNone,
    /// Regular, underflow only.
    RegularUflow,
    /// Regular, overflow only.
    RegularOflow,
    /// Regular, both flow bins.
    RegularUoflow,
    /// Regular, both flow bins, growing.
    RegularUoflowGrowth,
    /// Regular, wrapping.
    RegularCircular,
    /// Regular in log space.
    RegularLog,
    /// Regular in sqrt space.
    RegularSqrt,
    /// Regular in power space.
    RegularPow,
    /// Variable, no flow bins.
    VariableNone,
    /// Variable, underflow only.
    VariableUflow,
    /// Variable, overflow only.
    VariableOflow,
    /// Variable, both flow bins.
    VariableUoflow,
    /// Variable, both flow bins, growing.
    VariableUoflowGrowth,
    /// Integer, no flow bins.
    IntegerNone,
    /// Integer, underflow only.
    IntegerUflow,
    /// Integer, overflow only.
    IntegerOflow,
    /// Integer, both flow bins.
    IntegerUoflow,
    /// Integer, growing.
    IntegerGrowth,
    /// Integer labels.
    CategoryInt,
    /// Integer labels, growing.
    CategoryIntGrowth,
    /// String labels.
    CategoryStr,
    /// String labels, growing.
    CategoryStrGrowth,
}

impl AxisType {
    /// Every native axis type.
    pub const ALL: [Self; 23] = [
        Self::RegularNone,
        Self::RegularUflow,
        Self::RegularOflow,
        Self::RegularUoflow,
        Self::RegularUoflowGrowth,
        Self::RegularCircular,
        Self::RegularLog,
        Self::RegularSqrt,
        Self::RegularPow,
        Self::VariableNone,
        Self::VariableUflow,
        Self::VariableOflow,
        Self::VariableUoflow,
        Self::VariableUoflowGrowth,
        Self::IntegerNone,
        Self::IntegerUflow,
        Self::IntegerOflow,
        Self::IntegerUoflow,
        Self::IntegerGrowth,
        Self::CategoryInt,
        Self::CategoryIntGrowth,
        Self::CategoryStr,
        Self::CategoryStrGrowth,
    ];

    /// Snake-case name of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::RegularNone => "regular_none",
            Self::RegularUflow => "regular_uflow",
            Self::RegularOflow => "regular_oflow",
            Self::RegularUoflow => "regular_uoflow",
            Self::RegularUoflowGrowth => "regular_uoflow_growth",
            Self::RegularCircular => "regular_circular",
            Self::RegularLog => "regular_log",
            Self::RegularSqrt => "regular_sqrt",
            Self::RegularPow => "regular_pow",
            Self::VariableNone => "variable_none",
            Self::VariableUflow => "variable_uflow",
            Self::VariableOflow => "variable_oflow",
            Self::VariableUoflow => "variable_uoflow",
            Self::VariableUoflowGrowth => "variable_uoflow_growth",
            Self::IntegerNone => "integer_none",
            Self::IntegerUflow => "integer_uflow",
            Self::IntegerOflow => "integer_oflow",
            Self::IntegerUoflow => "integer_uoflow",
            Self::IntegerGrowth => "integer_growth",
            Self::CategoryInt => "category_int",
            Self::CategoryIntGrowth => "category_int_growth",
            Self::CategoryStr => "category_str",
            Self::CategoryStrGrowth => "category_str_growth",
        }
    }
}

impl fmt::Display for AxisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binning law of a native axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Law {
    /// Evenly spaced bins.
    Regular(Regular),
    /// Explicit edges.
    Variable(Variable),
    /// Unit-width integer bins.
    Integer(Integer),
    /// Discrete labels.
    Category(Category),
}

/// Where a fill coordinate lands, computed without touching the axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Located {
    /// Bin index in `-1..=size` of the axis after growth.
    pub index: i64,
    /// Bins prepended by growth.
    pub front: usize,
    /// The grown axis, if growth changed it.
    pub grown: Option<AxisVariant>,
}

/// Native axis: a law, a resolved option set and a metadata label.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisVariant {
    /// Binning law.
    law: Law,
    /// Resolved options.
    options: Options,
    /// Opaque label.
    metadata: Option<String>,
}

/// Option sets accepted by regular and variable axes as requested.
const CONTINUOUS_SETS: [&[Opt]; 5] = [
    &[],
    &[Opt::Underflow],
    &[Opt::Overflow],
    &[Opt::Underflow, Opt::Overflow],
    &[Opt::Underflow, Opt::Overflow, Opt::Growth],
];

/// Resolve a requested option set for a continuous axis.
fn resolve_continuous(requested: Options, circular_ok: bool) -> Result<Options> {
    if CONTINUOUS_SETS.iter().any(|s| Options::of(s) == requested) {
        return Ok(requested);
    }
    if circular_ok && requested == Options::UOFLOW.with(Opt::Circular) {
        return Ok(Options::of(&[Opt::Overflow, Opt::Circular]));
    }
    Err(Error::config(format!(
        "unsupported collection of options: {requested}"
    )))
}

impl AxisVariant {
    /// Regular axis with a requested option set.
    pub fn regular(
        bins: usize,
        start: f64,
        stop: f64,
        transform: Transform,
        requested: Options,
        metadata: Option<String>,
    ) -> Result<Self> {
        let options = if transform == Transform::Id {
            resolve_continuous(requested, true)?
        } else if requested == Options::UOFLOW {
            requested
        } else {
            return Err(Error::config(format!(
                "transformed regular axes support only underflow | overflow, got {requested}"
            )));
        };
        Ok(Self {
            law: Law::Regular(Regular::new(bins, start, stop, transform)?),
            options,
            metadata,
        })
    }

    /// Variable axis with a requested option set.
    pub fn variable(edges: Vec<f64>, requested: Options, metadata: Option<String>) -> Result<Self> {
        Ok(Self {
            law: Law::Variable(Variable::new(edges)?),
            options: resolve_continuous(requested, false)?,
            metadata,
        })
    }

    /// Integer axis with a requested option set. Growth drops the flow bins.
    pub fn integer(
        start: i64,
        stop: i64,
        requested: Options,
        metadata: Option<String>,
    ) -> Result<Self> {
        if requested.circular() {
            return Err(Error::config("integer axes cannot be circular"));
        }
        let options = if requested.growth() {
            Options::of(&[Opt::Growth])
        } else {
            requested
        };
        Ok(Self {
            law: Law::Integer(Integer::new(start, stop)?),
            options,
            metadata,
        })
    }

    /// Category axis. Only `growth` is read from the request; a fixed
    /// category axis always has an overflow bin for unknown labels.
    pub fn category(
        labels: Vec<Coord>,
        requested: Options,
        metadata: Option<String>,
    ) -> Result<Self> {
        if requested.circular() {
            return Err(Error::config("category axes cannot be circular"));
        }
        let options = if requested.growth() {
            Options::of(&[Opt::Growth])
        } else {
            Options::of(&[Opt::Overflow])
        };
        Ok(Self {
            law: Law::Category(Category::new(labels)?),
            options,
            metadata,
        })
    }

    /// Binning law.
    pub fn law(&self) -> &Law {
        &self.law
    }

    /// Resolved options.
    pub fn options(&self) -> Options {
        self.options
    }

    /// Metadata label.
    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// Replace the metadata label.
    pub fn set_metadata(&mut self, metadata: Option<String>) {
        self.metadata = metadata;
    }

    /// Native type tag.
    pub fn native_type(&self) -> AxisType {
        let o = self.options;
        match &self.law {
            Law::Regular(r) => match r.transform() {
                Transform::Log => AxisType::RegularLog,
                Transform::Sqrt => AxisType::RegularSqrt,
                Transform::Pow(_) => AxisType::RegularPow,
                Transform::Id if o.circular() => AxisType::RegularCircular,
                Transform::Id if o.growth() => AxisType::RegularUoflowGrowth,
                Transform::Id => match (o.underflow(), o.overflow()) {
                    (false, false) => AxisType::RegularNone,
                    (true, false) => AxisType::RegularUflow,
                    (false, true) => AxisType::RegularOflow,
                    (true, true) => AxisType::RegularUoflow,
                },
            },
            Law::Variable(_) if o.growth() => AxisType::VariableUoflowGrowth,
            Law::Variable(_) => match (o.underflow(), o.overflow()) {
                (false, false) => AxisType::VariableNone,
                (true, false) => AxisType::VariableUflow,
                (false, true) => AxisType::VariableOflow,
                (true, true) => AxisType::VariableUoflow,
            },
            Law::Integer(_) if o.growth() => AxisType::IntegerGrowth,
            Law::Integer(_) => match (o.underflow(), o.overflow()) {
                (false, false) => AxisType::IntegerNone,
                (true, false) => AxisType::IntegerUflow,
                (false, true) => AxisType::IntegerOflow,
                (true, true) => AxisType::IntegerUoflow,
            },
            Law::Category(c) => match (c.is_str(), o.growth()) {
                (false, false) => AxisType::CategoryInt,
                (false, true) => AxisType::CategoryIntGrowth,
                (true, false) => AxisType::CategoryStr,
                (true, true) => AxisType::CategoryStrGrowth,
            },
        }
    }

    /// Number of in-range bins.
    pub fn size(&self) -> usize {
        match &self.law {
            Law::Regular(r) => r.size(),
            Law::Variable(v) => v.size(),
            Law::Integer(i) => i.size(),
            Law::Category(c) => c.size(),
        }
    }

    /// Number of storage slots, flow bins included.
    pub fn extent(&self) -> usize {
        self.size() + self.options.flow_bins()
    }

    /// Whether this is a category axis.
    pub fn is_category(&self) -> bool {
        matches!(self.law, Law::Category(_))
    }

    /// Numeric view of a coordinate for a continuous axis.
    fn numeric(&self, c: &Coord) -> Result<f64> {
        c.as_f64().ok_or_else(|| {
            Error::index(format!("{} axis cannot look up a {} value", self.native_type(), c.kind()))
        })
    }

    /// Bin index of `c` in `-1..=size`, without growth.
    pub fn index(&self, c: &Coord) -> Result<i64> {
        Ok(match &self.law {
            Law::Regular(r) if self.options.circular() => r.index_circular(self.numeric(c)?),
            Law::Regular(r) => r.index(self.numeric(c)?),
            Law::Variable(v) => v.index(self.numeric(c)?),
            Law::Integer(i) => match c {
                Coord::Int(x) => i.index_int(*x),
                _ => i.index(self.numeric(c)?),
            },
            Law::Category(cat) => cat.index(c)?,
        })
    }

    /// Locate a fill coordinate, growing a copy of the axis if needed.
    ///
    /// A fixed category axis rejects unknown labels.
    pub fn locate(&self, c: &Coord) -> Result<Located> {
        let index = self.index(c)?;
        let in_range = (0..self.size() as i64).contains(&index);
        if in_range || !self.options.growth() {
            if !in_range && self.is_category() {
                return Err(Error::index(format!("{c} is not a category of this axis")));
            }
            return Ok(Located {
                index,
                front: 0,
                grown: None,
            });
        }
        let mut grown = self.clone();
        let (index, front) = match &mut grown.law {
            Law::Regular(r) => r.grow(self.numeric(c)?)?,
            Law::Variable(v) => v.grow(self.numeric(c)?),
            Law::Integer(i) => i.grow(self.numeric(c)?)?,
            Law::Category(cat) => (cat.grow(c)?, 0),
        };
        let changed = grown.size() != self.size();
        Ok(Located {
            index,
            front,
            grown: changed.then_some(grown),
        })
    }

    /// Whether index `i` has a storage slot.
    pub fn is_representable(&self, i: i64) -> bool {
        if i == -1 {
            self.options.underflow()
        } else if i == self.size() as i64 {
            self.options.overflow()
        } else {
            (0..self.size() as i64).contains(&i)
        }
    }

    /// Storage slot of a representable index.
    pub fn slot(&self, i: i64) -> usize {
        (i + i64::from(self.options.underflow())) as usize
    }

    /// Index of storage slot `s`.
    pub fn index_of_slot(&self, s: usize) -> i64 {
        s as i64 - i64::from(self.options.underflow())
    }

    /// Coordinate at fractional bin position `i`.
    pub fn value(&self, i: f64) -> Result<f64> {
        match &self.law {
            Law::Regular(r) if self.options.circular() => Ok(r.value_circular(i)),
            Law::Regular(r) => Ok(r.value(i)),
            Law::Variable(v) => Ok(v.value(i)),
            Law::Integer(n) => Ok(n.value(i)),
            Law::Category(_) => Err(Error::capability("category axes have no continuous values")),
        }
    }

    /// Bin `i`. Continuous axes accept any index and report infinite edges
    /// past the flow bins; category axes require `0 <= i < size`.
    pub fn bin(&self, i: i64) -> Result<Bin> {
        if let Law::Category(c) = &self.law {
            if !(0..self.size() as i64).contains(&i) {
                return Err(Error::index(format!(
                    "bin {i} out of range for category axis of size {}",
                    self.size()
                )));
            }
            return Ok(Bin::Category(c.label(i as usize)));
        }
        Ok(Bin::Interval(Interval {
            lower: self.value(i as f64)?,
            upper: self.value(i as f64 + 1.0)?,
        }))
    }

    /// In-range bin edges, `size + 1` values.
    pub fn edges(&self) -> Result<Vec<f64>> {
        (0..=self.size()).map(|i| self.value(i as f64)).collect()
    }

    /// In-range bin centers.
    pub fn centers(&self) -> Result<Vec<f64>> {
        (0..self.size()).map(|i| self.value(i as f64 + 0.5)).collect()
    }

    /// In-range bin widths.
    pub fn widths(&self) -> Result<Vec<f64>> {
        let edges = self.edges()?;
        Ok(edges.windows(2).map(|w| w[1] - w[0]).collect())
    }

    /// Edges for a dense export. Category axes use their bin numbers; with
    /// `flow`, present flow bins add an edge on their side.
    pub fn dense_edges(&self, flow: bool) -> Vec<f64> {
        let lo = if flow && self.options.underflow() { -1 } else { 0 };
        let hi = self.size() as i64 + i64::from(flow && self.options.overflow());
        (lo..=hi)
            .map(|i| self.value(i as f64).unwrap_or(i as f64))
            .collect()
    }

    /// The sub-axis of bins `[begin, end)` merged by `merge`, with the same
    /// options.
    ///
    /// A regular axis merged by a non-divisor becomes a variable axis whose
    /// last bin is shorter.
    pub fn slice(&self, begin: usize, end: usize, merge: usize) -> Result<Self> {
        let size = self.size();
        if begin >= end || end > size || merge == 0 {
            return Err(Error::index(format!(
                "cannot take bins [{begin}, {end}) by {merge} of an axis of size {size}"
            )));
        }
        let law = match &self.law {
            Law::Regular(r) if self.options.circular() => {
                if begin != 0 || end != size || size % merge != 0 {
                    return Err(Error::capability(
                        "circular axes only support full-range slices with a dividing rebin",
                    ));
                }
                Law::Regular(r.slice(begin, end, merge))
            }
            Law::Regular(r) if (end - begin) % merge == 0 => {
                Law::Regular(r.slice(begin, end, merge))
            }
            Law::Regular(r) => {
                if r.value(0.0) > r.value(size as f64) {
                    return Err(Error::capability(
                        "a descending regular axis cannot be rebinned by a non-divisor",
                    ));
                }
                let mut edges: Vec<f64> = (begin..=end)
                    .step_by(merge)
                    .map(|i| r.value(i as f64))
                    .collect();
                edges.push(r.value(end as f64));
                Law::Variable(Variable::new(edges)?)
            }
            Law::Variable(v) => Law::Variable(v.slice(begin, end, merge)),
            Law::Integer(_) | Law::Category(_) if merge > 1 => {
                return Err(Error::capability(format!(
                    "{} axes cannot be rebinned",
                    self.native_type()
                )));
            }
            Law::Integer(i) => Law::Integer(i.slice(begin, end)),
            Law::Category(c) => Law::Category(c.slice(begin, end)),
        };
        Ok(Self {
            law,
            options: self.options,
            metadata: self.metadata.clone(),
        })
    }
}

impl fmt::Display for AxisVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut power = None;
        match &self.law {
            Law::Regular(r) => {
                let (lo, hi) = if self.options.circular() {
                    (r.value_circular(0.0), r.value_circular(r.size() as f64))
                } else {
                    (r.value(0.0), r.value(r.size() as f64))
                };
                if let Transform::Pow(p) = r.transform() {
                    power = Some(p);
                }
                write!(f, "regular{}({}, {lo}, {hi}", r.transform().suffix(), r.size())?;
            }
            Law::Variable(v) => {
                let edges: Vec<String> = v.edges().iter().map(f64::to_string).collect();
                write!(f, "variable({}", edges.join(", "))?;
            }
            Law::Integer(i) => write!(f, "integer({}, {}", i.start(), i.stop())?,
            Law::Category(c) => {
                let labels: Vec<String> = c.labels().iter().map(Coord::to_string).collect();
                write!(f, "category({}", labels.join(", "))?;
            }
        }
        if let Some(m) = &self.metadata {
            write!(f, ", metadata=\"{m}\"")?;
        }
        write!(f, ", options={}", self.options)?;
        if let Some(p) = power {
            write!(f, ", power={p}")?;
        }
        f.write_str(")")
    }
}
