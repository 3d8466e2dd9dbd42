//! End-to-end ranking scenarios over the public engine API.

use amarantos_common::{AmarantosError, RankOptions, SortKey};
use amarantos_ranker::normalise::normalise;
use amarantos_ranker::pooling::combine;
use amarantos_ranker::source::{ChoiceSource, InMemoryChoiceSource};
use amarantos_ranker::{rank, Ranker};
use amarantos_test_utils::pretty_assertions::assert_eq;
use amarantos_test_utils::{assert_close, choice, mortality, sample_dataset, years};

#[test]
fn scenario_a_single_mortality_effect() {
    let effect = mortality(0.90, 0.05);
    let normalised = normalise(&effect, &Default::default()).unwrap();
    assert_close(normalised.years_mean, 1.0, 1e-9);

    let choices = vec![choice("Fish", "diet", [effect])];
    let outcome = rank(&choices, &RankOptions::default()).unwrap();
    assert_eq!(outcome.entries.len(), 1);
    let entry = &outcome.entries[0];
    assert!(entry.p30 < 1.0, "p30 {} should sit below the mean", entry.p30);
    assert_close(entry.p30, 1.0 - 0.524_400_5 * normalised.years_std, 1e-6);
}

#[test]
fn scenario_b_precise_study_dominates_pool() {
    let params = Default::default();
    let a = normalise(&years(0.5, 1.0), &params).unwrap();
    let b = normalise(&years(0.3, 0.2), &params).unwrap();
    let pooled = combine(&[a, b]).unwrap();
    assert!((pooled.years_mean - 0.3).abs() < (pooled.years_mean - 0.5).abs());
    assert!(pooled.years_std < 0.2);

    // Same result through the full pipeline.
    let choices = vec![choice("Two studies", "misc", [years(0.5, 1.0), years(0.3, 0.2)])];
    let outcome = rank(&choices, &RankOptions::default()).unwrap();
    assert_close(outcome.entries[0].aggregate_mean, pooled.years_mean, 1e-12);
    assert_close(outcome.entries[0].aggregate_std, pooled.years_std, 1e-12);
}

#[test]
fn scenario_c_zero_cost_bound_keeps_free_choices() {
    let choices = vec![
        choice("Free", "misc", [years(0.2, 0.1)]).with_cost(0.0, 5.0),
        choice("Paid", "misc", [years(2.0, 0.1)]).with_cost(20.0, 0.0),
    ];
    let outcome = rank(&choices, &RankOptions::default().with_max_cost(0.0)).unwrap();
    let names: Vec<_> = outcome.entries.iter().map(|e| e.choice.name.as_str()).collect();
    assert_eq!(names, vec!["Free"]);
}

#[test]
fn scenario_d_top_one_per_domain() {
    let choices = vec![
        choice("Swim", "exercise", [years(1.0, 0.2)]),
        choice("Walk", "exercise", [years(0.6, 0.2)]),
        choice("Olive oil", "diet", [years(2.0, 0.2)]),
        choice("Nuts", "diet", [years(0.1, 0.2)]),
    ];
    let outcome = rank(&choices, &RankOptions::default().with_max_per_domain(1)).unwrap();
    let names: Vec<_> = outcome.entries.iter().map(|e| e.choice.name.as_str()).collect();
    assert_eq!(names, vec!["Olive oil", "Swim"]);
    assert!(outcome.entries[0].p30 >= outcome.entries[1].p30);
}

#[test]
fn per_domain_cap_applies_after_cost_efficiency_sort() {
    let choices = vec![
        choice("Gym", "exercise", [years(3.0, 0.1)]).with_cost(1000.0, 100.0),
        choice("Walk", "exercise", [years(0.5, 0.1)]).with_cost(1.0, 100.0),
        choice("Beans", "diet", [years(0.4, 0.1)]).with_cost(50.0, 0.0),
    ];
    let opts = RankOptions::default()
        .with_sort_key(SortKey::ByCostEfficiency)
        .with_max_per_domain(1);
    let outcome = rank(&choices, &opts).unwrap();
    let names: Vec<_> = outcome.entries.iter().map(|e| e.choice.name.as_str()).collect();
    assert_eq!(names, vec!["Walk", "Beans"]);
}

#[test]
fn ranking_is_byte_identical_across_runs() {
    let choices = sample_dataset();
    let opts = RankOptions::default();
    let first = serde_json::to_string(&rank(&choices, &opts).unwrap()).unwrap();
    let second = serde_json::to_string(&rank(&choices, &opts).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn sample_dataset_partial_failure() {
    let outcome = rank(&sample_dataset(), &RankOptions::default()).unwrap();
    assert_eq!(outcome.entries.len(), 6);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].name, "Broken ratio");
    assert!(outcome
        .entries
        .windows(2)
        .all(|w| w[0].p30 >= w[1].p30));
}

#[test]
fn source_feeds_ranker() {
    let source = InMemoryChoiceSource::from(sample_dataset());
    let diet = source.load_choices(Some("diet")).unwrap();
    let outcome = Ranker::default().rank(&diet, &RankOptions::default()).unwrap();
    assert!(outcome.entries.iter().all(|e| e.choice.domain == "diet"));
    assert_eq!(outcome.entries.len() + outcome.rejected.len(), diet.len());
}

#[test]
fn configuration_error_aborts_before_scoring() {
    let opts = RankOptions { percentile: 0.0, ..Default::default() };
    let err = rank(&sample_dataset(), &opts).unwrap_err();
    assert!(matches!(err, AmarantosError::Config(_)));
}

#[test]
fn lower_percentile_is_more_conservative() {
    let choices = vec![choice("Uncertain", "misc", [years(1.0, 1.0)])];
    let p10 = rank(&choices, &RankOptions { percentile: 0.10, ..Default::default() }).unwrap();
    let p30 = rank(&choices, &RankOptions::default()).unwrap();
    let p50 = rank(&choices, &RankOptions { percentile: 0.50, ..Default::default() }).unwrap();
    assert!(p10.entries[0].p30 < p30.entries[0].p30);
    assert!(p30.entries[0].p30 < p50.entries[0].p30);
    assert_close(p50.entries[0].p30, 1.0, 1e-9);
    assert_close(p10.entries[0].percentile, 0.10, 0.0);
}

#[test]
fn extreme_but_valid_stds_are_ranked() {
    let choices = vec![
        choice("Precise", "misc", [years(1.0, 1e-170), years(2.0, 0.1)]),
        choice("Vague", "misc", [years(1.0, 1e160), years(2.0, 1e160)]),
    ];
    let outcome = rank(&choices, &RankOptions::default()).unwrap();
    assert!(outcome.rejected.is_empty(), "rejected: {:?}", outcome.rejected);
    assert_eq!(outcome.entries.len(), 2);
    assert_eq!(outcome.entries[0].choice.name, "Precise");
    assert_close(outcome.entries[0].aggregate_mean, 1.0, 1e-12);
    assert!(outcome.entries.iter().all(|e| e.p30.is_finite()));
}
