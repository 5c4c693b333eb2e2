//! Filling, storage kinds, arithmetic and dense export of histograms.

#![allow(missing_docs, clippy::tests_outside_test_module)]

use std::thread;

use approx::assert_relative_eq;
use multihist::{
    Axis, AxisOptions, Cell, Coord, Histogram, StorageKind,
    error::{Error, Result},
};
use ndarray::IxDyn;
use proptest::prelude::*;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness; `RUST_LOG` selects the level.
fn init_logging() {
    // Only the first call in a test binary installs the subscriber.
    let _installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Whether a kind needs a sample with every fill.
fn takes_sample(kind: StorageKind) -> bool {
    matches!(kind, StorageKind::Mean | StorageKind::WeightedMean)
}

/// Fill `x` once, with sample `x * 10` where the storage needs one.
fn fill_one(h: &mut Histogram, x: f64) -> Result<()> {
    if takes_sample(h.storage_type().kind()) {
        h.fill_sample([x], x * 10.0)
    } else {
        h.fill([x])
    }
}

#[test]
fn one_dimensional_example() -> Result<()> {
    init_logging();
    let mut h = Histogram::new(vec![Axis::regular(10, 0.0, 1.0)?], StorageKind::Int)?;
    h.fill_1d([0.25, 0.25, 0.25, 0.15])?;
    assert_eq!(h.at(&[1])?, 1.0);
    assert_eq!(h.at(&[2])?, 3.0);
    for i in (-1..=10).filter(|i| ![1, 2].contains(i)) {
        assert_eq!(h.at(&[i])?, 0.0, "bin {i}");
    }
    assert_eq!(h.rank(), 1);
    assert_eq!(h.size(), 12);
    assert!(h.at(&[11]).is_err());
    Ok(())
}

#[test]
fn rank_zero_is_rejected() {
    assert!(matches!(
        Histogram::new(Vec::new(), StorageKind::Double),
        Err(Error::Config(_))
    ));
}

#[test]
fn multi_dimensional_fill() -> Result<()> {
    let mut h = Histogram::new(
        vec![Axis::regular(2, 0.0, 2.0)?, Axis::category(["a", "b"])?],
        StorageKind::Double,
    )?;
    h.fill([Coord::from(0.5), Coord::from("b")])?;
    h.fill_weighted([Coord::from(1.5), Coord::from("a")], 2.5)?;
    h.fill_all([
        [Coord::from(1.5), Coord::from("a")],
        [Coord::from(-3.0), Coord::from("a")],
    ])?;
    assert_eq!(h.at(&[0, 1])?, 1.0);
    assert_eq!(h.at(&[1, 0])?, 3.5);
    assert_eq!(h.at(&[-1, 0])?, 1.0);
    assert!(h.fill_1d([0.5]).is_err());
    assert!(h.fill([0.5]).is_err());
    Ok(())
}

#[test]
fn failed_fill_changes_nothing() -> Result<()> {
    let growth = AxisOptions::default().growth(true);
    let mut h = Histogram::new(
        vec![Axis::regular_with(2, 0.0, 1.0, &growth)?, Axis::category([1, 2])?],
        StorageKind::Int,
    )?;
    h.fill([Coord::from(0.2), Coord::from(1)])?;
    let before = h.clone();
    let unknown = h.fill([Coord::from(5.0), Coord::from(3)]);
    assert!(matches!(unknown, Err(Error::Index(_))));
    assert_eq!(h, before);
    assert_eq!(h.axis(0)?.size(), 2);
    let wrong_type = h.fill([Coord::from(0.2), Coord::from("x")]);
    assert!(wrong_type.is_err());
    assert_eq!(h, before);
    Ok(())
}

#[test]
fn growing_axes_extend() -> Result<()> {
    init_logging();
    let growth = AxisOptions::default().growth(true);
    let mut h = Histogram::new(
        vec![
            Axis::integer_with(0, 2, &growth)?,
            Axis::category_with(["x"], &growth)?,
        ],
        StorageKind::Int,
    )?;
    h.fill([Coord::from(1), Coord::from("x")])?;
    h.fill([Coord::from(-2), Coord::from("y")])?;
    h.fill([Coord::from(4), Coord::from("x")])?;
    let (ints, cats) = (h.axis(0)?, h.axis(1)?);
    assert_eq!(ints.to_string(), "integer(-2, 5, options=growth)");
    assert_eq!(cats.to_string(), "category(\"x\", \"y\", options=growth)");
    assert_eq!(h.size(), 7 * 2);
    assert_eq!(h.at(&[3, 0])?, 1.0);
    assert_eq!(h.at(&[0, 1])?, 1.0);
    assert_eq!(h.at(&[6, 0])?, 1.0);
    assert_eq!(h.sum(true), 3.0);
    Ok(())
}

#[test]
fn unreachable_growth_leaves_histogram_untouched() -> Result<()> {
    let growth = AxisOptions::default().growth(true);
    let mut h = Histogram::new(
        vec![Axis::regular_with(10, 0.0, 1.0, &growth)?],
        StorageKind::Double,
    )?;
    h.fill([0.5])?;
    let before = h.clone();
    assert!(matches!(h.fill([1e300]), Err(Error::Index(_))));
    assert!(matches!(h.fill([-1e300]), Err(Error::Index(_))));
    assert_eq!(h, before);
    assert_eq!(h.axis(0)?.size(), 10);
    Ok(())
}

#[test]
fn variable_growth_keeps_edges() -> Result<()> {
    let growth = AxisOptions::default().growth(true);
    let mut h = Histogram::new(
        vec![Axis::variable_with(&[0.0, 1.0, 3.0], &growth)?],
        StorageKind::Weight,
    )?;
    h.fill_weighted([0.5], 2.0)?;
    h.fill_weighted([10.0], 3.0)?;
    h.fill([-4.0])?;
    let edges = h.axis(0)?.edges()?;
    assert_eq!(edges.len(), 5);
    assert_eq!(&edges[1..4], &[0.0, 1.0, 3.0]);
    assert!(edges[0] <= -4.0);
    assert!(edges[4] > 10.0);
    let Cell::Weighted(w) = h.at(&[1])? else {
        panic!("weight storage holds weighted sums");
    };
    assert_relative_eq!(w.value, 2.0);
    assert_relative_eq!(w.variance, 4.0);
    Ok(())
}

#[test]
fn non_finite_values_land_in_flow() -> Result<()> {
    let growth = AxisOptions::default().growth(true);
    let mut h = Histogram::new(vec![Axis::regular_with(2, 0.0, 1.0, &growth)?], StorageKind::Int)?;
    h.fill_1d([f64::NAN, f64::INFINITY, f64::NEG_INFINITY])?;
    assert_eq!(h.axis(0)?.size(), 2);
    assert_eq!(h.at(&[2])?, 2.0);
    assert_eq!(h.at(&[-1])?, 1.0);

    let mut ints = Histogram::new(vec![Axis::integer_with(0, 2, &growth)?], StorageKind::Int)?;
    assert!(ints.fill([f64::NAN]).is_err());
    Ok(())
}

#[test]
fn weighted_storage() -> Result<()> {
    let mut h = Histogram::new(vec![Axis::regular(2, 0.0, 1.0)?], StorageKind::Weight)?;
    h.fill_weighted([0.1], 2.0)?;
    h.fill_weighted([0.2], 2.0)?;
    h.fill([0.9])?;
    let values = h.values(false)?;
    let variances = h.variances(false)?;
    assert_eq!(values.as_slice(), Some(&[4.0, 1.0][..]));
    assert_eq!(variances.as_slice(), Some(&[8.0, 1.0][..]));
    assert!(h.fill_sample([0.1], 1.0).is_err());
    assert!(h.to_string().ends_with("storage=Weight())"));
    Ok(())
}

#[test]
fn mean_storage() -> Result<()> {
    let mut h = Histogram::new(vec![Axis::integer(0, 2)?], StorageKind::Mean)?;
    for x in [1.0, 2.0, 3.0] {
        h.fill_sample([0], x)?;
    }
    h.fill_weighted_sample([1], 2.0, 5.0)?;
    let Cell::Mean(m) = h.at(&[0])? else {
        panic!("mean storage holds means");
    };
    assert_relative_eq!(m.count(), 3.0);
    assert_relative_eq!(m.value(), 2.0);
    assert_relative_eq!(m.variance(), 1.0);
    let Cell::Mean(w) = h.at(&[1])? else {
        panic!("mean storage holds means");
    };
    assert_relative_eq!(w.count(), 2.0);
    assert_relative_eq!(w.value(), 5.0);
    assert!(matches!(h.fill([0]), Err(Error::Capability(_))));

    h.scale(2.0)?;
    assert_relative_eq!(h.at(&[0])?.value(), 4.0);
    assert_relative_eq!(h.at(&[0])?.variance(), 4.0);
    Ok(())
}

#[test]
fn weighted_mean_storage() -> Result<()> {
    let mut h = Histogram::new(vec![Axis::regular(1, 0.0, 1.0)?], StorageKind::WeightedMean)?;
    h.fill_weighted_sample([0.5], 1.0, 2.0)?;
    h.fill_weighted_sample([0.5], 3.0, 4.0)?;
    let Cell::WeightedMean(m) = h.at(&[0])? else {
        panic!("weighted mean storage holds weighted means");
    };
    assert_relative_eq!(m.sum_of_weights(), 4.0);
    assert_relative_eq!(m.sum_of_weights_squared(), 10.0);
    assert_relative_eq!(m.value(), 3.5);
    // weighted deltas 1 * 1.5^2 + 3 * 0.5^2 = 3, over 4 - 10 / 4
    assert_relative_eq!(m.variance(), 2.0);
    Ok(())
}

#[test]
fn zero_weight_samples_leave_means_finite() -> Result<()> {
    for kind in [StorageKind::Mean, StorageKind::WeightedMean] {
        let mut h = Histogram::new(vec![Axis::regular(1, 0.0, 1.0)?], kind)?;
        h.fill_weighted_sample([0.25], 0.0, 3.0)?;
        h.fill_sample([0.25], 5.0)?;
        let cell = h.at(&[0])?;
        assert_relative_eq!(cell.value(), 5.0);
        match cell {
            Cell::Mean(m) => assert_relative_eq!(m.count(), 1.0),
            Cell::WeightedMean(m) => assert_relative_eq!(m.sum_of_weights(), 1.0),
            other => panic!("unexpected cell {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn integral_storages_reject_fractional_weights() -> Result<()> {
    for kind in [StorageKind::Int, StorageKind::AtomicInt] {
        let mut h = Histogram::new(vec![Axis::regular(2, 0.0, 1.0)?], kind)?;
        assert!(matches!(h.fill_weighted([0.5], 1.5), Err(Error::Capability(_))));
        assert!(matches!(h.fill_weighted([0.5], -1.0), Err(Error::Capability(_))));
        h.fill_weighted([0.5], 3.0)?;
        assert_eq!(h.at(&[1])?, Cell::Count(3));
        assert!(matches!(h.scale(2.0), Err(Error::Capability(_))));
    }
    Ok(())
}

#[test]
fn unlimited_storage_widens() -> Result<()> {
    let mut h = Histogram::new(vec![Axis::regular(2, 0.0, 1.0)?], StorageKind::Unlimited)?;
    for _ in 0..300 {
        h.fill([0.2])?;
    }
    h.fill_weighted([0.7], 70_000.0)?;
    assert_eq!(h.at(&[0])?, Cell::Count(300));
    assert_eq!(h.at(&[1])?, Cell::Count(70_000));
    h.fill_weighted([0.7], 0.5)?;
    assert_eq!(h.at(&[1])?, Cell::Real(70_000.5));
    assert_eq!(h.at(&[0])?, 300.0);
    Ok(())
}

#[test]
fn addition_and_scaling() -> Result<()> {
    let mut a = Histogram::new(vec![Axis::regular(4, 0.0, 1.0)?], StorageKind::Double)?;
    a.fill_1d([0.1, 0.6, 0.6])?;
    let sum = (&a + &a)?;
    assert_eq!(sum.at(&[2])?, 4.0);
    a.scale(0.5)?;
    assert_eq!(a.at(&[2])?, 1.0);

    let other_axis = Histogram::new(vec![Axis::regular(5, 0.0, 1.0)?], StorageKind::Double)?;
    assert!(matches!(&a + &other_axis, Err(Error::Capability(_))));
    let other_storage = Histogram::new(vec![Axis::regular(4, 0.0, 1.0)?], StorageKind::Int)?;
    assert!(matches!(&a + &other_storage, Err(Error::Capability(_))));

    a.reset();
    assert_eq!(a.sum(true), 0.0);
    assert_eq!(a.size(), 6);
    Ok(())
}

#[test]
fn dense_export() -> Result<()> {
    let mut h = Histogram::new(
        vec![Axis::regular(2, 0.0, 1.0)?, Axis::category([5, 7])?],
        StorageKind::Int,
    )?;
    h.fill([Coord::from(0.2), Coord::from(7)])?;
    h.fill([Coord::from(2.0), Coord::from(5)])?;

    let inner = h.view(false)?;
    assert_eq!(inner.shape(), &[2, 2]);
    assert_eq!(inner[IxDyn(&[0, 1])], Cell::Count(1));

    let full = h.view(true)?;
    assert_eq!(full.shape(), &[4, 3]);
    assert_eq!(full[IxDyn(&[3, 0])], Cell::Count(1));
    assert_eq!(full[IxDyn(&[1, 1])], Cell::Count(1));

    let (values, edges) = h.to_dense(false)?;
    assert_eq!(values.shape(), &[2, 2]);
    assert_eq!(edges[0].to_vec(), vec![0.0, 0.5, 1.0]);
    assert_eq!(edges[1].to_vec(), vec![0.0, 1.0, 2.0]);

    let (values, edges) = h.to_dense(true)?;
    assert_eq!(values.shape(), &[4, 3]);
    assert_eq!(
        edges[0].to_vec(),
        vec![f64::NEG_INFINITY, 0.0, 0.5, 1.0, f64::INFINITY]
    );
    assert_eq!(edges[1].to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn display_reports_totals() -> Result<()> {
    let mut h = Histogram::new(
        vec![Axis::regular(2, 0.0, 1.0)?, Axis::integer(0, 2)?],
        StorageKind::Double,
    )?;
    h.fill_weighted([0.5, 1.0], 1.5)?;
    assert_eq!(
        h.to_string(),
        "Histogram(\n  regular(2, 0, 1, options=underflow | overflow),\n  \
         integer(0, 2, options=underflow | overflow),\n  storage=Double()) # Sum: 1.5"
    );
    let m = Histogram::new(vec![Axis::regular(2, 0.0, 1.0)?], StorageKind::Mean)?;
    assert!(!m.to_string().contains("# Sum"));
    Ok(())
}

#[test]
fn concurrent_fills() -> Result<()> {
    let h = Histogram::new(
        vec![Axis::regular(10, 0.0, 1.0)?, Axis::integer(0, 4)?],
        StorageKind::AtomicInt,
    )?;
    thread::scope(|s| {
        for t in 0..4 {
            let h = &h;
            s.spawn(move || {
                for i in 0..1000 {
                    let x = f64::from(i % 10) / 10.0 + 0.05;
                    h.fill_concurrent([Coord::from(x), Coord::from(t)])
                        .expect("concurrent fill");
                }
            });
        }
    });
    assert_eq!(h.sum(true), Cell::Count(4000));
    assert_eq!(h.at(&[3, 2])?, Cell::Count(100));

    let plain = Histogram::new(vec![Axis::regular(2, 0.0, 1.0)?], StorageKind::Int)?;
    assert!(matches!(plain.fill_concurrent([0.5]), Err(Error::Capability(_))));
    let growth = AxisOptions::default().growth(true);
    let growing = Histogram::new(
        vec![Axis::regular_with(2, 0.0, 1.0, &growth)?],
        StorageKind::AtomicInt,
    )?;
    assert!(matches!(growing.fill_concurrent([0.5]), Err(Error::Capability(_))));
    Ok(())
}

macro_rules! storage_tests {
    ($(($name:ident, $kind:ident, $class:expr, $filled:expr, $doubled:expr)),* $(,)?) => {
        $(
            paste::paste! {
                #[test]
                fn [<$name _fill_and_total>]() -> Result<()> {
                    let axes = vec![Axis::regular(4, 0.0, 4.0)?];
                    let mut h = Histogram::new(axes, StorageKind::$kind)?;
                    assert_eq!(h.storage_type(), StorageKind::$kind);
                    assert_eq!(h.storage_type().to_string(), format!("{}()", $class));
                    for x in [0.5, 1.5, 2.5, 9.0] {
                        fill_one(&mut h, x)?;
                    }
                    assert_relative_eq!(h.sum(true).value(), $filled);
                    let overflow = if takes_sample(StorageKind::$kind) { 90.0 } else { 1.0 };
                    assert_relative_eq!(h.at(&[4])?.value(), overflow);
                    h.reset();
                    assert_relative_eq!(h.sum(true).value(), 0.0);
                    Ok(())
                }

                #[test]
                fn [<$name _addition_merges_bins>]() -> Result<()> {
                    let axes = vec![Axis::regular(4, 0.0, 4.0)?];
                    let mut h = Histogram::new(axes, StorageKind::$kind)?;
                    for x in [0.5, 1.5, 2.5, 9.0] {
                        fill_one(&mut h, x)?;
                    }
                    let sum = (&h + &h)?;
                    assert_relative_eq!(sum.sum(true).value(), $doubled);
                    assert_eq!(sum.storage_type(), h.storage_type());
                    let copy = h.clone();
                    fill_one(&mut h, 0.5)?;
                    assert_ne!(copy, h);
                    Ok(())
                }
            }
        )*
    };
}

storage_tests! {
    (int, Int, "Int", 4.0, 8.0),
    (double, Double, "Double", 4.0, 8.0),
    (atomic_int, AtomicInt, "AtomicInt", 4.0, 8.0),
    (unlimited, Unlimited, "Unlimited", 4.0, 8.0),
    (weight, Weight, "Weight", 4.0, 8.0),
    (mean, Mean, "Mean", 33.75, 33.75),
    (weighted_mean, WeightedMean, "WeightedMean", 33.75, 33.75),
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Growing never moves or alters contents recorded before.
    #[test]
    fn growth_preserves_contents(
        before in prop::collection::vec(0.0f64..4.0, 1..30),
        far in prop_oneof![-40.0f64..-0.01, 4.01f64..40.0],
    ) {
        let growth = AxisOptions::default().growth(true);
        let mut h = Histogram::new(
            vec![Axis::regular_with(4, 0.0, 4.0, &growth)?],
            StorageKind::Int,
        )?;
        h.fill_1d(before.iter().copied())?;
        let counts: Vec<(f64, Cell)> = (0..4)
            .map(|i| -> Result<(f64, Cell)> { Ok((f64::from(i) + 0.5, h.at(&[i64::from(i)])?)) })
            .collect::<Result<_>>()?;

        h.fill([far])?;
        let ax = h.axis(0)?.clone();
        prop_assert!(ax.size() > 4);
        for (center, count) in counts {
            let i = ax.index(center)?;
            prop_assert_eq!(h.at(&[i])?, count);
            let bin = ax.bin(i)?.interval();
            prop_assert!(bin.is_some_and(|b| b.contains(center)));
        }
        let landed = ax.index(far)?;
        prop_assert!((0..ax.size() as i64).contains(&landed));
        prop_assert_eq!(h.sum(true), Cell::Count(before.len() as u64 + 1));
    }
}
