//! Shared fixtures for Amarantos tests.

use amarantos_common::{Choice, EffectRecord, OutcomeKind};

pub use pretty_assertions;

/// Direct years-of-delayed-aging effect.
pub fn years(mean: f64, std: f64) -> EffectRecord {
    EffectRecord::new(OutcomeKind::YearsOfDelayedAging, mean, std)
}

/// Hazard-ratio effect.
pub fn mortality(ratio: f64, std: f64) -> EffectRecord {
    EffectRecord::new(OutcomeKind::RelativeMortalityRisk, ratio, std)
}

/// Wellbeing effect in just-noticeable differences.
pub fn wellbeing(mean: f64, std: f64) -> EffectRecord {
    EffectRecord::new(OutcomeKind::SubjectiveWellbeing, mean, std)
}

/// Choice with the given effects and no cost.
pub fn choice(name: &str, domain: &str, effects: impl IntoIterator<Item = EffectRecord>) -> Choice {
    effects
        .into_iter()
        .fold(Choice::new(name, domain), |c, e| c.with_effect(e))
}

/// A small mixed dataset across four domains, including one choice that
/// must be rejected (non-positive hazard ratio).
pub fn sample_dataset() -> Vec<Choice> {
    vec![
        choice("Running", "exercise", [years(1.5, 0.8), mortality(0.85, 0.05)])
            .with_cost(150.0, 150.0),
        choice("Strength training", "exercise", [mortality(0.9, 0.04)]).with_cost(300.0, 80.0),
        choice("Mediterranean diet", "diet", [mortality(0.91, 0.03), years(0.4, 0.5)])
            .with_cost(500.0, 20.0),
        choice("Fasting", "diet", [years(0.5, 1.5)]).with_cost(0.0, 0.0),
        choice("Seven hours sleep", "sleep", [mortality(0.95, 0.03), wellbeing(2.0, 1.0)])
            .with_cost(0.0, 0.0),
        choice("Gratitude journal", "mind", [wellbeing(1.0, 0.8)]).with_cost(0.0, 30.0),
        choice("Broken ratio", "diet", [mortality(0.0, 0.1)]),
    ]
}

/// Assert `|actual - expected| <= tol`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual}"
    );
}
