//! Off-chain / on-chain price conformance
//!
//! The `Decimal` reporting form and the fixed-point form of every spot price
//! are evaluated on the same vectors and must agree to within one scaled unit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tandem_amm::{
    stable_spot_price, AmmPool, AmpFactor, PriceSource, Rounding, ScaledAmount, StablePoolState,
    WeightedMath, WeightedPoolState,
};

/// One scaled unit in `Decimal`
const ULP: Decimal = dec!(0.000000001);

struct WeightedVector {
    balance_in: u128,
    weight_in: u128,
    balance_out: u128,
    weight_out: u128,
    expected: Decimal,
}

const WEIGHTED_VECTORS: &[WeightedVector] = &[
    WeightedVector {
        balance_in: 100_000_000_000,
        weight_in: 500_000_000,
        balance_out: 400_000_000_000,
        weight_out: 500_000_000,
        expected: dec!(4),
    },
    WeightedVector {
        balance_in: 400_000_000_000,
        weight_in: 500_000_000,
        balance_out: 100_000_000_000,
        weight_out: 500_000_000,
        expected: dec!(0.25),
    },
    WeightedVector {
        balance_in: 1_000_000_000_000,
        weight_in: 800_000_000,
        balance_out: 1_000_000_000_000,
        weight_out: 200_000_000,
        expected: dec!(4),
    },
    WeightedVector {
        balance_in: 3_000_000_000,
        weight_in: 500_000_000,
        balance_out: 1_000_000_000,
        weight_out: 500_000_000,
        expected: dec!(0.333333333),
    },
    WeightedVector {
        balance_in: 2_500_000_000_000_000,
        weight_in: 600_000_000,
        balance_out: 1_700_000_000_000_000,
        weight_out: 400_000_000,
        expected: dec!(1.02),
    },
];

#[test]
fn weighted_forms_agree() {
    for (case, v) in WEIGHTED_VECTORS.iter().enumerate() {
        let args = (
            ScaledAmount::from_raw(v.balance_in),
            ScaledAmount::from_raw(v.weight_in),
            ScaledAmount::from_raw(v.balance_out),
            ScaledAmount::from_raw(v.weight_out),
        );

        let reported = WeightedMath::spot_price(args.0, args.1, args.2, args.3).unwrap();
        let down = WeightedMath::spot_price_scaled(args.0, args.1, args.2, args.3, Rounding::Down)
            .unwrap()
            .to_decimal()
            .unwrap();
        let up = WeightedMath::spot_price_scaled(args.0, args.1, args.2, args.3, Rounding::Up)
            .unwrap()
            .to_decimal()
            .unwrap();

        assert!(down <= reported && reported <= up, "case {case}: {down} <= {reported} <= {up}");
        assert!(up - down <= ULP, "case {case}: rounding spread {}", up - down);
        assert!(
            (reported - v.expected).abs() <= ULP,
            "case {case}: expected {}, got {reported}",
            v.expected
        );
    }
}

#[test]
fn weighted_pool_trait_matches_free_functions() {
    let pool = WeightedPoolState::new(
        vec![ScaledAmount::from_units(100), ScaledAmount::from_units(400)],
        vec![ScaledAmount(500_000_000), ScaledAmount(500_000_000)],
        ScaledAmount(3_000_000),
    )
    .unwrap();

    let spot = pool.spot_price(0, 1).unwrap();
    assert_eq!(spot.source, PriceSource::ClosedForm);
    assert_eq!(spot.price, dec!(4));
    assert_eq!(spot.scaled, ScaledAmount::from_units(4));

    let reverse = pool.spot_price(1, 0).unwrap();
    assert_eq!(reverse.price, dec!(0.25));
}

struct StableVector {
    balance_in: u64,
    balance_out: u64,
    amp: u64,
}

const STABLE_VECTORS: &[StableVector] = &[
    StableVector {
        balance_in: 100,
        balance_out: 100,
        amp: 100,
    },
    StableVector {
        balance_in: 1_000_000,
        balance_out: 1_000_000,
        amp: 2_000,
    },
    StableVector {
        balance_in: 1_200_000,
        balance_out: 800_000,
        amp: 200,
    },
    StableVector {
        balance_in: 800_000,
        balance_out: 1_200_000,
        amp: 200,
    },
    StableVector {
        balance_in: 50_000,
        balance_out: 150_000,
        amp: 10,
    },
];

#[test]
fn stable_forms_agree() {
    for (case, v) in STABLE_VECTORS.iter().enumerate() {
        let amp = AmpFactor::from_whole(v.amp).unwrap();
        let spot = stable_spot_price(
            ScaledAmount::from_units(v.balance_in),
            ScaledAmount::from_units(v.balance_out),
            amp,
        )
        .unwrap();

        assert_eq!(spot.source, PriceSource::Solved, "case {case}");
        assert_eq!(spot.price, spot.scaled.to_decimal().unwrap(), "case {case}");

        // A unit swap pays at least the constant-product output and at most
        // the better of parity and the balance ratio
        let balance_in = Decimal::from(v.balance_in);
        let balance_out = Decimal::from(v.balance_out);
        let low = balance_out / (balance_in + Decimal::ONE);
        let high = (balance_out / balance_in).max(Decimal::ONE);
        assert!(
            spot.price >= low - ULP * dec!(10) && spot.price <= high,
            "case {case}: {} outside [{low}, {high}]",
            spot.price
        );
    }
}

#[test]
fn stable_pool_trait_matches_free_function() {
    let balances = vec![
        ScaledAmount::from_units(1_200_000),
        ScaledAmount::from_units(800_000),
    ];
    let amp = AmpFactor::from_whole(200).unwrap();
    let pool = StablePoolState::new(balances.clone(), amp, ScaledAmount(3_000_000)).unwrap();

    let via_trait = pool.spot_price(0, 1).unwrap();
    let direct = stable_spot_price(balances[0], balances[1], amp).unwrap();
    assert_eq!(via_trait, direct);

    // Fees come out of the quote, not the spot price
    let quoted = pool.quote_out(0, 1, ScaledAmount::ONE).unwrap();
    assert!(quoted < via_trait.scaled);
}
