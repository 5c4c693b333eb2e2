//! Family-aware casting through the process-wide class registry.
//!
//! Tests share one registry, so each registers its classes in a family of
//! its own.

#![allow(missing_docs, clippy::tests_outside_test_module)]

use multihist::{
    Axis, AxisOptions, AxisType, Family, Histogram, Index, StorageKind,
    axis::AxisVariant,
    error::{Error, Result},
    registry::{self, Base, ClassSpec, DEPRECATED_CLASSES, NativeType},
};

/// One axis of every kind.
fn every_kind() -> Result<Vec<Axis>> {
    Ok(vec![
        Axis::regular(3, -1.0, 1.0)?,
        Axis::regular_with(3, -1.0, 1.0, &AxisOptions::default().growth(true))?,
        Axis::circular(3, 0.0, 1.0, None)?,
        Axis::regular_log(3, 1.0, 1000.0, Some("log"))?,
        Axis::regular_pow(3, 1.0, 4.0, 2.0, None)?,
        Axis::variable_with(&[0.0, 0.1, 1.0], &AxisOptions::no_flow())?,
        Axis::integer(-3, 3)?,
        Axis::category(["u", "v"])?,
        Axis::category_with([4, 8], &AxisOptions::default().growth(true))?,
    ])
}

#[test]
fn casting_a_native_axis_round_trips() -> Result<()> {
    for axis in every_kind()? {
        let again = Axis::from_native(axis.native().clone())?;
        assert_eq!(again, axis);
        assert_eq!(again.class(), axis.class());
        assert_eq!(again.class().family(), Family::MAIN);
    }
    Ok(())
}

#[test]
fn native_family_has_one_class_per_type() -> Result<()> {
    for axis in every_kind()? {
        let native = axis.in_family(Family::NATIVE)?;
        assert_eq!(native.class().name(), axis.native_type().name());
        assert_eq!(native, axis);
    }
    for kind in StorageKind::ALL {
        let class = registry::cast_class(
            Some(Family::NATIVE),
            NativeType::Storage(kind),
            Base::Storage,
        )?;
        assert_eq!(class.name(), kind.name());
    }
    Ok(())
}

#[test]
fn custom_family_falls_back_to_main() -> Result<()> {
    let family = Family::new("fallback-test");
    let native = NativeType::Axis(AxisType::RegularUoflow);
    let custom = registry::register(ClassSpec::new(
        "CustomRegular",
        family,
        Base::Axis,
        vec![native],
    ))?;

    assert_eq!(registry::cast_class(None, native, Base::Axis)?.name(), "Regular");
    assert_eq!(registry::cast_class(Some(family), native, Base::Axis)?, custom);
    let other = NativeType::Axis(AxisType::IntegerUoflow);
    assert_eq!(registry::cast_class(Some(family), other, Base::Axis)?.name(), "Integer");

    let h = Histogram::with_family(
        vec![Axis::regular(4, 0.0, 1.0)?, Axis::integer(0, 2)?],
        StorageKind::Int,
        family,
    )?;
    assert_eq!(h.family(), family);
    assert_eq!(h.axis(0)?.class(), custom);
    assert_eq!(h.axis(1)?.class().name(), "Integer");
    assert_eq!(h.storage_type().class().name(), "Int");

    let sliced = h
        .index(&[(..2).into(), Index::Ellipsis])?
        .into_histogram()
        .ok_or_else(|| Error::Index("expected a histogram".into()))?;
    assert_eq!(sliced.family(), family);
    assert_eq!(sliced.axis(0)?.class(), custom);

    let plain = Histogram::new(vec![Axis::regular(4, 0.0, 1.0)?], StorageKind::Int)?;
    assert_eq!(plain.axis(0)?.class().name(), "Regular");
    Ok(())
}

/// Label unlabelled axes.
fn label_axis(native: &mut AxisVariant) {
    if native.metadata().is_none() {
        native.set_metadata(Some("converted".to_string()));
    }
}

#[test]
fn converter_runs_on_cast() -> Result<()> {
    let family = Family::new("converter-test");
    registry::register(
        ClassSpec::new(
            "LabelledVariable",
            family,
            Base::Axis,
            vec![NativeType::Axis(AxisType::VariableUoflow)],
        )
        .converter(label_axis),
    )?;
    let ax = Axis::variable(&[0.0, 1.0, 2.0])?;
    assert_eq!(ax.metadata(), None);
    let cast = ax.in_family(family)?;
    assert_eq!(cast.class().name(), "LabelledVariable");
    assert_eq!(cast.metadata(), Some("converted"));

    let mut named = Axis::variable(&[0.0, 1.0, 2.0])?;
    named.set_metadata(Some("kept"));
    assert_eq!(named.in_family(family)?.metadata(), Some("kept"));
    Ok(())
}

#[test]
fn registration_is_validated() -> Result<()> {
    let family = Family::new("validation-test");
    let t = NativeType::Axis(AxisType::IntegerNone);

    let twice = ClassSpec::new("Twice", family, Base::Axis, vec![t, t]);
    assert!(matches!(registry::register(twice), Err(Error::Config(_))));
    let wrong_base = ClassSpec::new("WrongBase", family, Base::Storage, vec![t]);
    assert!(matches!(registry::register(wrong_base), Err(Error::Config(_))));
    let taken = ClassSpec::new("Taken", Family::MAIN, Base::Axis, vec![t]);
    assert!(matches!(registry::register(taken), Err(Error::Config(_))));

    let parent = registry::register(ClassSpec::new("Parent", family, Base::Axis, vec![t]))?;
    let rival = ClassSpec::new("Rival", family, Base::Axis, vec![t]);
    assert!(matches!(registry::register(rival), Err(Error::Config(_))));
    let child = registry::register(
        ClassSpec::new("Child", family, Base::Axis, vec![t]).extends("Parent"),
    )?;
    assert_ne!(child, parent);
    assert_eq!(registry::cast_class(Some(family), t, Base::Axis)?, child);
    let reuse = ClassSpec::new("Parent", family, Base::Axis, Vec::new());
    assert!(matches!(registry::register(reuse), Err(Error::Config(_))));
    assert_eq!(registry::types_of(child), vec![t]);
    Ok(())
}

#[test]
fn storage_classes_are_unique_per_kind() -> Result<()> {
    let storages = registry::classes(Base::Storage);
    for kind in StorageKind::ALL {
        let main: Vec<_> = storages
            .iter()
            .filter(|c| c.family() == Family::MAIN)
            .filter(|c| registry::types_of(**c).contains(&NativeType::Storage(kind)))
            .collect();
        assert_eq!(main.len(), 1, "{kind}");
    }
    let mismatch = registry::cast_class(None, NativeType::Storage(StorageKind::Int), Base::Axis);
    let Err(err) = mismatch else {
        panic!("storage kinds do not cast to axes");
    };
    assert_eq!(err.to_string(), "no conversion to Axis from int found");
    Ok(())
}

#[test]
fn opt_out_classes_are_registered_but_never_chosen() -> Result<()> {
    for name in DEPRECATED_CLASSES {
        let class = registry::lookup(name, Family::MAIN)
            .ok_or_else(|| Error::Config(format!("{name} missing")))?;
        assert!(registry::types_of(class).is_empty());
    }
    for t in AxisType::ALL {
        let class = registry::cast_class(None, NativeType::Axis(t), Base::Axis)?;
        assert!(!DEPRECATED_CLASSES.contains(&class.name()), "{t}");
    }
    Ok(())
}
