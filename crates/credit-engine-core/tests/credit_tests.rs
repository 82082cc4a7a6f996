use credit_engine_core::credit_derivatives::{
    analyze_cds, bootstrap_cds_curve, cds_fair_spread, CdsAnalysisInput, CdsContract, CdsQuote,
};
use credit_engine_core::credit_scoring::{
    assess_credit, black_cox_default_probability, forward_default_probability, kmv_distance_to_default,
    merton_distance_to_default, reduced_form_default_probability, BlackCoxInput, CreditAssessmentInput,
    DefaultCurve, KmvInput, MertonInput, MigrationMatrix, MigrationQuery,
};
use credit_engine_core::curves::{CurveMethod, YieldCurve, YieldCurvePoint};
use credit_engine_core::math::{cumulative_normal, decimal_exp};
use credit_engine_core::{BasisPoints, CreditEngineError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use statrs::distribution::{ContinuousCDF, Normal};

fn flat_curve(rate: Decimal) -> YieldCurve {
    YieldCurve::new(
        vec![
            YieldCurvePoint { maturity: dec!(0.25), rate },
            YieldCurvePoint { maturity: dec!(30), rate },
        ],
        CurveMethod::Linear,
    )
    .unwrap()
}

// ===========================================================================
// Default probabilities
// ===========================================================================

#[test]
fn test_reduced_form_five_year_scenario() {
    let pd = reduced_form_default_probability(dec!(0.02), dec!(5)).unwrap();
    let expected = Decimal::ONE - decimal_exp(dec!(-0.1));
    assert!((pd - expected).abs() < dec!(0.0000000001));
    assert!((pd - dec!(0.0952)).abs() < dec!(0.0001));
}

#[test]
fn test_structural_pds_within_unit_interval() {
    for (value, debt, sigma) in [
        (dec!(100), dec!(10), dec!(0.1)),
        (dec!(100), dec!(99), dec!(0.6)),
        (dec!(100), dec!(300), dec!(0.3)),
    ] {
        let m = merton_distance_to_default(&MertonInput {
            asset_value: value,
            debt,
            asset_volatility: sigma,
            asset_return: dec!(0.04),
            time_horizon: dec!(2),
        })
        .unwrap();
        assert!(m.default_probability >= Decimal::ZERO && m.default_probability <= Decimal::ONE);

        let k = kmv_distance_to_default(&KmvInput {
            asset_value: value,
            short_term_debt: debt / dec!(2),
            long_term_debt: debt,
            asset_volatility: sigma,
            asset_return: dec!(0.04),
            time_horizon: dec!(2),
        })
        .unwrap();
        assert!(k.default_probability >= Decimal::ZERO && k.default_probability <= Decimal::ONE);

        let bc = black_cox_default_probability(&BlackCoxInput {
            asset_value: value,
            barrier: debt,
            asset_volatility: sigma,
            asset_return: dec!(0.04),
            time_horizon: dec!(2),
        })
        .unwrap();
        assert!(bc >= Decimal::ZERO && bc <= Decimal::ONE);
    }
}

#[test]
fn test_forward_pd_requires_monotone_cumulative() {
    assert!(forward_default_probability(dec!(0.05), dec!(0.09)).is_ok());
    assert!(matches!(
        forward_default_probability(dec!(0.09), dec!(0.05)).unwrap_err(),
        CreditEngineError::InvalidInput { .. }
    ));
}

#[test]
fn test_cumulative_normal_matches_statrs() {
    let reference = Normal::new(0.0, 1.0).unwrap();
    for x in [dec!(-3.2), dec!(-1.5), dec!(-0.25), dec!(0), dec!(0.7), dec!(2.1), dec!(4)] {
        let ours = cumulative_normal(x).to_f64().unwrap();
        let theirs = reference.cdf(x.to_f64().unwrap());
        assert!((ours - theirs).abs() < 7.5e-8, "x={x}: {ours} vs {theirs}");
    }
}

// ===========================================================================
// Migration
// ===========================================================================

#[test]
fn test_migration_rows_sum_to_one() {
    let ratings: Vec<String> = ["AAA", "AA", "A", "BBB", "D"].iter().map(|s| s.to_string()).collect();
    let counts = vec![
        vec![91, 8, 1, 0, 0],
        vec![3, 87, 9, 1, 0],
        vec![0, 7, 3, 2, 1],
        vec![0, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 17],
    ];
    let m = MigrationMatrix::from_counts(ratings, &counts).unwrap();
    for periods in [1, 3, 10] {
        for row in &m.n_period(periods).transition_probabilities {
            let sum: Decimal = row.iter().sum();
            assert!((sum - Decimal::ONE).abs() <= dec!(0.000000001), "row sum {sum}");
        }
    }
    assert_eq!(m.transition_probabilities[3][3], Decimal::ONE);
}

#[test]
fn test_assessment_with_migration() {
    let ratings: Vec<String> = ["A", "B", "D"].iter().map(|s| s.to_string()).collect();
    let matrix = MigrationMatrix::from_counts(ratings, &[vec![8, 2, 0], vec![1, 7, 2], vec![0, 0, 1]]).unwrap();
    let result = assess_credit(&CreditAssessmentInput {
        migration: Some(MigrationQuery {
            matrix,
            current_rating: "B".into(),
            periods: 2,
        }),
        ..Default::default()
    })
    .unwrap();
    let summary = result.result.migration.unwrap();
    assert_eq!(summary.upgrade_probability, dec!(0.1));
    assert_eq!(summary.downgrade_probability, dec!(0.2));
    assert_eq!(summary.rating_drift, dec!(0.1));
    assert!(summary.cumulative_default_probability > dec!(0.2));
}

// ===========================================================================
// CDS
// ===========================================================================

#[test]
fn test_cds_spread_approximates_credit_triangle() {
    let tenors: Vec<Decimal> = (1..=5).map(Decimal::from).collect();
    for hazard in [dec!(0.005), dec!(0.01), dec!(0.02)] {
        let default_curve = DefaultCurve::from_hazard_rate(hazard, tenors.clone()).unwrap();
        let contract = CdsContract {
            notional: dec!(1000000),
            spread: BasisPoints::new(dec!(100)),
            maturity_years: dec!(5),
            recovery_rate: dec!(0.4),
            payment_frequency: 4,
        };
        let spread = cds_fair_spread(&contract, &default_curve, &flat_curve(dec!(0.03))).unwrap();
        let triangle = hazard * dec!(0.6) * dec!(10000);
        assert!(
            ((spread.value() - triangle) / triangle).abs() < dec!(0.01),
            "hazard {hazard}: {spread} vs {triangle}bp"
        );
    }
}

#[test]
fn test_bootstrapped_curve_reprices_quotes() {
    let quotes = [
        CdsQuote { tenor: dec!(1), spread: BasisPoints::new(dec!(60)) },
        CdsQuote { tenor: dec!(3), spread: BasisPoints::new(dec!(90)) },
        CdsQuote { tenor: dec!(5), spread: BasisPoints::new(dec!(120)) },
    ];
    let curve = bootstrap_cds_curve(&quotes, dec!(0.4)).unwrap();
    for w in curve.cumulative.windows(2) {
        assert!(w[1] >= w[0]);
    }
    let result = analyze_cds(&CdsAnalysisInput {
        contract: CdsContract {
            notional: dec!(10000000),
            spread: BasisPoints::new(dec!(120)),
            maturity_years: dec!(5),
            recovery_rate: dec!(0.4),
            payment_frequency: 4,
        },
        discount_curve: flat_curve(dec!(0.03)),
        default_curve: None,
        hazard_rate: None,
        quotes: quotes.to_vec(),
        running_spread: None,
    })
    .unwrap();
    let fair = result.result.valuation.fair_spread.value();
    // Triangle bootstrap is approximate but lands near the quoted 5y
    assert!((fair - dec!(120)).abs() < dec!(10), "got {fair}");
}
