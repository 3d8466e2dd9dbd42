use amarantos_common::{AggregationParams, NormalizerParams, OutcomeKind, RankOptions};
use amarantos_ranker::aggregate::aggregate;
use amarantos_ranker::normalise::NormalizedEffect;
use amarantos_ranker::pooling::{combine, pool_by_outcome};
use amarantos_ranker::{rank, Ranker};
use amarantos_test_utils::{choice, mortality, wellbeing, years};
use proptest::prelude::*;

fn p30_of(mean: f64, std: f64) -> f64 {
    let c = choice("Subject", "misc", [years(mean, std)]);
    Ranker::default().score_choice(&c, 0.30).unwrap().p30
}

fn outcome_kind() -> impl Strategy<Value = OutcomeKind> {
    prop_oneof![
        Just(OutcomeKind::RelativeMortalityRisk),
        Just(OutcomeKind::YearsOfDelayedAging),
        Just(OutcomeKind::SubjectiveWellbeing),
    ]
}

proptest! {
    #[test]
    fn monotone_in_mean(mean in -10.0f64..10.0, delta in 0.01f64..5.0, std in 0.0f64..5.0) {
        prop_assert!(p30_of(mean + delta, std) > p30_of(mean, std));
    }

    #[test]
    fn conservative_in_std(mean in -10.0f64..10.0, std in 0.0f64..5.0, delta in 0.01f64..5.0) {
        prop_assert!(p30_of(mean, std + delta) < p30_of(mean, std));
    }

    #[test]
    fn pooling_identical_records_halves_variance(mean in -5.0f64..5.0, std in 0.01f64..3.0) {
        let e = NormalizedEffect { outcome: OutcomeKind::YearsOfDelayedAging, years_mean: mean, years_std: std };
        let pooled = combine(&[e, e]).unwrap();
        prop_assert!((pooled.years_mean - mean).abs() < 1e-9);
        prop_assert!(pooled.years_std <= std);
        prop_assert!((pooled.years_std * pooled.years_std - std * std / 2.0).abs() < 1e-9);
    }

    #[test]
    fn pooled_std_never_exceeds_smallest_input(
        records in prop::collection::vec((-5.0f64..5.0, 0.01f64..3.0), 1..8)
    ) {
        let effects: Vec<_> = records
            .iter()
            .map(|&(m, s)| NormalizedEffect { outcome: OutcomeKind::YearsOfDelayedAging, years_mean: m, years_std: s })
            .collect();
        let pooled = combine(&effects).unwrap();
        let min_std = records.iter().map(|r| r.1).fold(f64::INFINITY, f64::min);
        prop_assert!(pooled.years_std <= min_std + 1e-12);
        let lo = records.iter().map(|r| r.0).fold(f64::INFINITY, f64::min);
        let hi = records.iter().map(|r| r.0).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(pooled.years_mean >= lo - 1e-9 && pooled.years_mean <= hi + 1e-9);
    }

    #[test]
    fn aggregate_mean_is_sum_of_pooled_means(
        records in prop::collection::vec((outcome_kind(), -3.0f64..3.0, 0.01f64..2.0), 1..10)
    ) {
        let effects: Vec<_> = records
            .iter()
            .map(|&(outcome, m, s)| NormalizedEffect { outcome, years_mean: m, years_std: s })
            .collect();
        let pooled = pool_by_outcome(&effects).unwrap();
        let c = choice("Subject", "misc", [years(0.0, 0.0)]);
        let impact = aggregate(&c, &pooled, &AggregationParams::default());
        let sum: f64 = pooled.iter().map(|p| p.years_mean).sum();
        prop_assert_eq!(impact.mean, sum);
        let var: f64 = pooled.iter().map(|p| p.years_std * p.years_std).sum();
        prop_assert!((impact.std - var.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_idempotent_and_sorted(
        specs in prop::collection::vec((0.5f64..1.5, 0.0f64..0.2, -1.0f64..3.0, 0.0f64..2.0, 0.0f64..500.0), 1..12)
    ) {
        let choices: Vec<_> = specs
            .iter()
            .enumerate()
            .map(|(i, &(ratio, rstd, wb, wstd, cost))| {
                choice(&format!("choice-{i}"), if i % 2 == 0 { "even" } else { "odd" },
                    [mortality(ratio, rstd), wellbeing(wb, wstd)])
                    .with_cost(cost, 0.0)
            })
            .collect();
        let opts = RankOptions::default();
        let first = rank(&choices, &opts).unwrap();
        let second = rank(&choices, &opts).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.entries.len(), choices.len());
        prop_assert!(first.entries.windows(2).all(|w| w[0].p30 >= w[1].p30));
    }

    #[test]
    fn hazard_rate_scales_mortality_years(ratio in 0.5f64..0.99, k in 0.05f64..0.2) {
        let params = NormalizerParams { hazard_growth_rate: k, ..Default::default() };
        let e = amarantos_ranker::normalise::normalise(&mortality(ratio, 0.01), &params).unwrap();
        prop_assert!((e.years_mean * k + ratio.ln()).abs() < 1e-9);
        prop_assert!(e.years_mean > 0.0);
    }
}
