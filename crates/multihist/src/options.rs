//! Structural axis options and the two ways of configuring them.
//!
//! [`AxisOptions`] is the typed path: every recognised flag is a field with a
//! default. [`Flags`] is the dynamic path: a keyword string such as
//! `"underflow=false, growth=true"` is parsed, the recognised names are
//! consumed, and [`Flags::finish`] rejects whatever is left over.

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::{Error, Result};

/// A single structural flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opt {
    /// A bin below the lowest edge.
    Underflow,
    /// A bin above the highest edge (or the wrap bin of a circular axis).
    Overflow,
    /// Coordinates wrap around the axis range.
    Circular,
    /// Out-of-range fills extend the axis.
    Growth,
}

impl Opt {
    /// All options in canonical display order.
    pub const ALL: [Self; 4] = [Self::Underflow, Self::Overflow, Self::Circular, Self::Growth];

    /// Keyword name of the option.
    pub fn name(self) -> &'static str {
        match self {
            Self::Underflow => "underflow",
            Self::Overflow => "overflow",
            Self::Circular => "circular",
            Self::Growth => "growth",
        }
    }

    /// Bit used in the packed representation.
    const fn bit(self) -> u8 {
        match self {
            Self::Underflow => 1,
            Self::Overflow => 2,
            Self::Circular => 4,
            Self::Growth => 8,
        }
    }
}

/// An immutable set of [`Opt`] flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Options(u8);

impl Options {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// `{underflow, overflow}`, the default for continuous axes.
    pub const UOFLOW: Self = Self(Opt::Underflow.bit() | Opt::Overflow.bit());

    /// Build a set from a list of flags.
    pub fn of(opts: &[Opt]) -> Self {
        Self(opts.iter().fold(0, |acc, o| acc | o.bit()))
    }

    /// Whether `opt` is a member.
    pub fn contains(self, opt: Opt) -> bool {
        self.0 & opt.bit() != 0
    }

    /// Copy of this set with `opt` added.
    #[must_use]
    pub fn with(self, opt: Opt) -> Self {
        Self(self.0 | opt.bit())
    }

    /// Copy of this set with `opt` removed.
    #[must_use]
    pub fn without(self, opt: Opt) -> Self {
        Self(self.0 & !opt.bit())
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether an underflow bin is present.
    pub fn underflow(self) -> bool {
        self.contains(Opt::Underflow)
    }

    /// Whether an overflow bin is present.
    pub fn overflow(self) -> bool {
        self.contains(Opt::Overflow)
    }

    /// Whether the axis wraps.
    pub fn circular(self) -> bool {
        self.contains(Opt::Circular)
    }

    /// Whether the axis grows.
    pub fn growth(self) -> bool {
        self.contains(Opt::Growth)
    }

    /// Number of flow bins (0, 1 or 2) implied by this set.
    pub fn flow_bins(self) -> usize {
        usize::from(self.underflow()) + usize::from(self.overflow())
    }

    /// Members in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Opt> {
        Opt::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(Opt::name).collect();
        f.write_str(&names.join(" | "))
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Options({self})")
    }
}

/// Typed axis configuration.
///
/// The defaults match the continuous axes: both flow bins, no growth, no
/// wrapping. Category axes only read `growth` and `circular`.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisOptions {
    /// Reserve an underflow bin.
    pub underflow: bool,
    /// Reserve an overflow bin.
    pub overflow: bool,
    /// Extend the axis on out-of-range fills.
    pub growth: bool,
    /// Wrap coordinates around the range.
    pub circular: bool,
    /// Opaque label carried by the axis.
    pub metadata: Option<String>,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            underflow: true,
            overflow: true,
            growth: false,
            circular: false,
            metadata: None,
        }
    }
}

impl AxisOptions {
    /// Configuration with no flow bins.
    pub fn no_flow() -> Self {
        Self {
            underflow: false,
            overflow: false,
            ..Self::default()
        }
    }

    /// Set `growth`.
    #[must_use]
    pub fn growth(mut self, on: bool) -> Self {
        self.growth = on;
        self
    }

    /// Set `underflow`.
    #[must_use]
    pub fn underflow(mut self, on: bool) -> Self {
        self.underflow = on;
        self
    }

    /// Set `overflow`.
    #[must_use]
    pub fn overflow(mut self, on: bool) -> Self {
        self.overflow = on;
        self
    }

    /// Set `circular`.
    #[must_use]
    pub fn circular(mut self, on: bool) -> Self {
        self.circular = on;
        self
    }

    /// Set the metadata label.
    #[must_use]
    pub fn metadata(mut self, label: impl Into<String>) -> Self {
        self.metadata = Some(label.into());
        self
    }

    /// The requested option set for continuous axes.
    pub(crate) fn requested(&self) -> Options {
        let mut opts = Options::NONE;
        for (flag, opt) in [
            (self.underflow, Opt::Underflow),
            (self.overflow, Opt::Overflow),
            (self.growth, Opt::Growth),
            (self.circular, Opt::Circular),
        ] {
            if flag {
                opts = opts.with(opt);
            }
        }
        opts
    }
}

/// Keyword flags parsed from a `name=value, ...` string.
///
/// Every keyword must be consumed by the constructor it is handed to;
/// [`Flags::finish`] reports the leftovers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Unconsumed keywords.
    pending: BTreeMap<String, String>,
}

impl Flags {
    /// Empty keyword set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a keyword.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl ToString) -> Self {
        self.pending.insert(name.to_string(), value.to_string());
        self
    }

    /// Remove and return a keyword value, or `None` if absent.
    pub fn optional(&mut self, name: &str) -> Option<String> {
        self.pending.remove(name)
    }

    /// Consume the declared options, each with its default, and return the
    /// resulting set.
    pub fn options(&mut self, declared: &[(Opt, bool)]) -> Result<Options> {
        let mut opts = Options::NONE;
        for &(opt, default) in declared {
            let on = match self.pending.remove(opt.name()) {
                Some(raw) => parse_bool(opt.name(), &raw)?,
                None => default,
            };
            if on {
                opts = opts.with(opt);
            }
        }
        Ok(opts)
    }

    /// Fail if any keyword was not consumed.
    pub fn finish(self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = self.pending.keys().map(String::as_str).collect();
        Err(Error::config(format!(
            "keyword(s) {} not expected",
            names.join(", ")
        )))
    }
}

impl FromStr for Flags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut pending = BTreeMap::new();
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (name, value) = item.split_once('=').ok_or_else(|| {
                Error::config(format!("keyword '{item}' must be in NAME=VALUE form"))
            })?;
            let name = name.trim();
            if pending
                .insert(name.to_string(), value.trim().to_string())
                .is_some()
            {
                return Err(Error::config(format!("keyword '{name}' given twice")));
            }
        }
        Ok(Self { pending })
    }
}

/// Parse a boolean keyword value.
fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(Error::config(format!(
            "keyword '{name}' expects a boolean, got '{raw}'"
        ))),
    }
}
