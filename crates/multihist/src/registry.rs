//! Class registry: maps native axis and storage types to public classes.
//!
//! A class belongs to one [`Family`] and claims a set of native types for
//! one [`Base`]. Casting a native type walks the classes in priority order
//! (most recently registered first), returns the first class of the
//! requested family and otherwise falls back to the first class of the main
//! family.
//!
//! The table is process-global. It is seeded with the built-in classes on
//! first use; [`register`] is meant for start-up and is not designed for
//! concurrent use with casts.

use std::{
    collections::BTreeSet,
    fmt,
    sync::{OnceLock, PoisonError, RwLock},
};

use crate::{
    axis::{AxisType, AxisVariant},
    error::{Error, Result},
    storage::StorageKind,
};

/// Name of a group of classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Family(&'static str);

impl Family {
    /// The default family.
    pub const MAIN: Self = Self("main");
    /// One class per native type, named after the type.
    pub const NATIVE: Self = Self("native");

    /// A custom family.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Family name.
    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Abstract base a class derives from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Base {
    /// Axis classes.
    Axis,
    /// Storage classes.
    Storage,
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Axis => "Axis",
            Self::Storage => "Storage",
        })
    }
}

/// A native type a class can claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeType {
    /// A native axis type.
    Axis(AxisType),
    /// A storage kind.
    Storage(StorageKind),
}

impl NativeType {
    /// Base that classes for this type derive from.
    pub fn base(self) -> Base {
        match self {
            Self::Axis(_) => Base::Axis,
            Self::Storage(_) => Base::Storage,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Axis(t) => fmt::Display::fmt(t, f),
            Self::Storage(k) => fmt::Display::fmt(k, f),
        }
    }
}

/// Hook run on a native axis when it is cast to a class.
pub type AxisConverter = fn(&mut AxisVariant);

/// Handle to a registered class.
#[derive(Clone, Copy, Debug)]
pub struct ClassRef {
    /// Position in registration order.
    id: usize,
    /// Class name.
    name: &'static str,
    /// Family tag.
    family: Family,
}

impl ClassRef {
    /// Class name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Family tag.
    pub fn family(&self) -> Family {
        self.family
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

/// Description of a class to register.
#[derive(Clone, Debug)]
pub struct ClassSpec {
    /// Class name, unique within its family.
    pub name: &'static str,
    /// Family tag.
    pub family: Family,
    /// Abstract base.
    pub base: Base,
    /// Claimed native types. Empty opts the class out of casting.
    pub types: Vec<NativeType>,
    /// Class in the same family whose types this one may take over.
    pub extends: Option<&'static str>,
    /// Hook applied to axes cast to this class.
    pub converter: Option<AxisConverter>,
}

impl ClassSpec {
    /// A class claiming `types`.
    pub fn new(name: &'static str, family: Family, base: Base, types: Vec<NativeType>) -> Self {
        Self {
            name,
            family,
            base,
            types,
            extends: None,
            converter: None,
        }
    }

    /// Allow taking over the types of `parent`.
    #[must_use]
    pub fn extends(mut self, parent: &'static str) -> Self {
        self.extends = Some(parent);
        self
    }

    /// Attach an axis conversion hook.
    #[must_use]
    pub fn converter(mut self, hook: AxisConverter) -> Self {
        self.converter = Some(hook);
        self
    }
}

/// A registered class.
#[derive(Clone, Debug)]
struct Entry {
    /// Handle returned to callers.
    class: ClassRef,
    /// Abstract base.
    base: Base,
    /// Claimed native types.
    types: BTreeSet<NativeType>,
    /// Conversion hook.
    converter: Option<AxisConverter>,
}

/// Class table in priority order.
#[derive(Debug, Default)]
struct Registry {
    /// Entries, highest priority first.
    entries: Vec<Entry>,
}

/// Main-family axis classes.
const MAIN_AXES: [(&str, &[AxisType]); 4] = [
    (
        "Regular",
        &[
            AxisType::RegularNone,
            AxisType::RegularUflow,
            AxisType::RegularOflow,
            AxisType::RegularUoflow,
            AxisType::RegularUoflowGrowth,
            AxisType::RegularCircular,
            AxisType::RegularLog,
            AxisType::RegularSqrt,
            AxisType::RegularPow,
        ],
    ),
    (
        "Variable",
        &[
            AxisType::VariableNone,
            AxisType::VariableUflow,
            AxisType::VariableOflow,
            AxisType::VariableUoflow,
            AxisType::VariableUoflowGrowth,
        ],
    ),
    (
        "Integer",
        &[
            AxisType::IntegerNone,
            AxisType::IntegerUflow,
            AxisType::IntegerOflow,
            AxisType::IntegerUoflow,
            AxisType::IntegerGrowth,
        ],
    ),
    (
        "Category",
        &[
            AxisType::CategoryInt,
            AxisType::CategoryIntGrowth,
            AxisType::CategoryStr,
            AxisType::CategoryStrGrowth,
        ],
    ),
];

/// Main-family storage classes.
const MAIN_STORAGES: [(&str, StorageKind); 7] = [
    ("Int", StorageKind::Int),
    ("Double", StorageKind::Double),
    ("AtomicInt", StorageKind::AtomicInt),
    ("Unlimited", StorageKind::Unlimited),
    ("Weight", StorageKind::Weight),
    ("Mean", StorageKind::Mean),
    ("WeightedMean", StorageKind::WeightedMean),
];

/// Renamed main-family classes that never take part in casting.
pub const DEPRECATED_CLASSES: [&str; 4] = ["regular", "variable", "integer", "category"];

impl Registry {
    /// Table holding the built-in classes.
    fn builtin() -> Self {
        let mut reg = Self::default();
        let mut specs = Vec::new();
        for (name, types) in MAIN_AXES {
            let types = types.iter().copied().map(NativeType::Axis).collect();
            specs.push(ClassSpec::new(name, Family::MAIN, Base::Axis, types));
        }
        for (name, kind) in MAIN_STORAGES {
            specs.push(ClassSpec::new(
                name,
                Family::MAIN,
                Base::Storage,
                vec![NativeType::Storage(kind)],
            ));
        }
        for name in DEPRECATED_CLASSES {
            specs.push(ClassSpec::new(name, Family::MAIN, Base::Axis, Vec::new()));
        }
        for t in AxisType::ALL {
            specs.push(ClassSpec::new(
                t.name(),
                Family::NATIVE,
                Base::Axis,
                vec![NativeType::Axis(t)],
            ));
        }
        for k in StorageKind::ALL {
            specs.push(ClassSpec::new(
                k.name(),
                Family::NATIVE,
                Base::Storage,
                vec![NativeType::Storage(k)],
            ));
        }
        for spec in specs {
            reg.push(spec);
        }
        reg
    }

    /// Append an entry at the lowest priority, without validation.
    fn push(&mut self, spec: ClassSpec) -> ClassRef {
        let entry = self.entry(spec);
        let class = entry.class;
        self.entries.push(entry);
        class
    }

    /// Build an entry with the next id.
    fn entry(&self, spec: ClassSpec) -> Entry {
        Entry {
            class: ClassRef {
                id: self.entries.len(),
                name: spec.name,
                family: spec.family,
            },
            base: spec.base,
            types: spec.types.into_iter().collect(),
            converter: spec.converter,
        }
    }

    /// Validate and insert an entry at the highest priority.
    fn register(&mut self, spec: ClassSpec) -> Result<ClassRef> {
        let unique: BTreeSet<NativeType> = spec.types.iter().copied().collect();
        if unique.len() != spec.types.len() {
            return Err(Error::config(format!(
                "class {} lists a native type twice",
                spec.name
            )));
        }
        if let Some(t) = spec.types.iter().find(|t| t.base() != spec.base) {
            return Err(Error::config(format!(
                "class {} derives from {} but claims {t}",
                spec.name, spec.base
            )));
        }
        if self
            .entries
            .iter()
            .any(|e| e.class.name == spec.name && e.class.family == spec.family)
        {
            return Err(Error::config(format!(
                "class {} is already registered in family {}",
                spec.name, spec.family
            )));
        }
        for e in &self.entries {
            if e.class.family != spec.family || e.base != spec.base {
                continue;
            }
            if Some(e.class.name) == spec.extends {
                continue;
            }
            if let Some(t) = e.types.intersection(&unique).next() {
                return Err(Error::config(format!(
                    "{t} is already claimed by {} in family {}",
                    e.class.name, spec.family
                )));
            }
        }
        let entry = self.entry(spec);
        let class = entry.class;
        tracing::debug!(class = class.name, family = %class.family, "registered class");
        self.entries.insert(0, entry);
        Ok(class)
    }

    /// Resolve the class for `native` under `base`.
    fn cast(&self, context: Option<Family>, native: NativeType, base: Base) -> Result<ClassRef> {
        let family = context.unwrap_or(Family::MAIN);
        let mut fallback = None;
        for e in &self.entries {
            if e.base != base || !e.types.contains(&native) {
                continue;
            }
            if e.class.family == family {
                return Ok(e.class);
            }
            if fallback.is_none() && e.class.family == Family::MAIN {
                fallback = Some(e.class);
            }
        }
        match fallback {
            Some(class) => {
                tracing::debug!(
                    %native,
                    requested = %family,
                    class = class.name,
                    "cast fell back to main family"
                );
                Ok(class)
            }
            None => Err(Error::NoConversion { base, native }),
        }
    }
}

/// The process-wide table.
fn table() -> &'static RwLock<Registry> {
    /// Lazily seeded registry.
    static TABLE: OnceLock<RwLock<Registry>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(Registry::builtin()))
}

/// Register a class at the highest priority.
///
/// Fails if the class lists a type twice, claims a type of the other base,
/// reuses a name within its family, or claims a type another class of its
/// family already holds (unless it `extends` that class).
pub fn register(spec: ClassSpec) -> Result<ClassRef> {
    table()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(spec)
}

/// Resolve the class a native type casts to. `None` context means the
/// main family.
pub fn cast_class(context: Option<Family>, native: NativeType, base: Base) -> Result<ClassRef> {
    table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .cast(context, native, base)
}

/// Cast a native axis, applying the selected class' converter.
pub(crate) fn cast_axis(
    context: Option<Family>,
    mut native: AxisVariant,
) -> Result<(ClassRef, AxisVariant)> {
    let (class, converter) = {
        let reg = table().read().unwrap_or_else(PoisonError::into_inner);
        let class = reg.cast(context, NativeType::Axis(native.native_type()), Base::Axis)?;
        let converter = reg
            .entries
            .iter()
            .find(|e| e.class == class)
            .and_then(|e| e.converter);
        (class, converter)
    };
    if let Some(hook) = converter {
        hook(&mut native);
    }
    Ok((class, native))
}

/// Look up a class by name and family.
pub fn lookup(name: &str, family: Family) -> Option<ClassRef> {
    table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .entries
        .iter()
        .find(|e| e.class.name == name && e.class.family == family)
        .map(|e| e.class)
}

/// Native types claimed by a class.
pub fn types_of(class: ClassRef) -> Vec<NativeType> {
    table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .entries
        .iter()
        .find(|e| e.class == class)
        .map(|e| e.types.iter().copied().collect())
        .unwrap_or_default()
}

/// All classes of a base, highest priority first.
pub fn classes(base: Base) -> Vec<ClassRef> {
    table()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .entries
        .iter()
        .filter(|e| e.base == base)
        .map(|e| e.class)
        .collect()
}
