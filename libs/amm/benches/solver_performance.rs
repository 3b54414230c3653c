//! Solver latency benchmarks
//!
//! Tracks the cost of the StableSwap Newton-Raphson solves against the
//! closed-form weighted price, across balanced and skewed pools where the
//! iteration counts differ most.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tandem_amm::{stable_math, stable_spot_price, AmpFactor, ScaledAmount, WeightedMath};

fn pools() -> Vec<(&'static str, [ScaledAmount; 2])> {
    vec![
        (
            "balanced",
            [
                ScaledAmount::from_units(1_000_000),
                ScaledAmount::from_units(1_000_000),
            ],
        ),
        (
            "skewed_4x",
            [
                ScaledAmount::from_units(1_600_000),
                ScaledAmount::from_units(400_000),
            ],
        ),
    ]
}

fn bench_invariant(c: &mut Criterion) {
    let mut group = c.benchmark_group("stable_invariant");

    for amp_whole in [10u64, 200, 5_000] {
        let amp = AmpFactor::from_whole(amp_whole).unwrap();
        for (label, balances) in pools() {
            group.bench_with_input(
                BenchmarkId::new(label, amp_whole),
                &balances,
                |b, balances| {
                    b.iter(|| stable_math::calc_invariant(black_box(amp), black_box(balances)));
                },
            );
        }
    }

    group.finish();
}

fn bench_swap_quote(c: &mut Criterion) {
    let mut group = c.benchmark_group("stable_swap_quote");
    let amp = AmpFactor::from_whole(200).unwrap();

    for (label, balances) in pools() {
        group.bench_with_input(BenchmarkId::from_parameter(label), &balances, |b, balances| {
            b.iter(|| {
                stable_math::calc_out_given_in(
                    amp,
                    black_box(balances),
                    0,
                    1,
                    black_box(ScaledAmount::from_units(1_000)),
                )
            });
        });
    }

    group.finish();
}

/// Solved stable price next to the closed-form weighted price
fn bench_spot_prices(c: &mut Criterion) {
    let mut group = c.benchmark_group("spot_price");
    let half = ScaledAmount(500_000_000);
    let amp = AmpFactor::from_whole(200).unwrap();
    let balance_in = ScaledAmount::from_units(1_000_000);
    let balance_out = ScaledAmount::from_units(950_000);

    group.bench_function("weighted_decimal", |b| {
        b.iter(|| {
            WeightedMath::spot_price(
                black_box(balance_in),
                half,
                black_box(balance_out),
                half,
            )
        });
    });

    group.bench_function("stable_solved", |b| {
        b.iter(|| stable_spot_price(black_box(balance_in), black_box(balance_out), amp));
    });

    group.finish();
}

criterion_group!(benches, bench_invariant, bench_swap_quote, bench_spot_prices);
criterion_main!(benches);
