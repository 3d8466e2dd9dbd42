//! Net annual dollar value of a choice.
//!
//! benefit = Σ life-year outcomes × $/life-year + wellbeing units × $/unit
//! cost    = annual hours × $/hour + annual USD cost

use amarantos_common::error::Result;
use amarantos_common::{Choice, NormalizerParams, OutcomeKind, ValuationRates};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::normalise::years_to_wellbeing_units;
use crate::pooling::PooledEffect;
use crate::ranking::{Ranker, RejectedChoice};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedChoice {
    pub choice: Choice,
    pub benefit_usd: f64,
    pub cost_usd: f64,
    pub net_value_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationOutcome {
    pub entries: Vec<ValuedChoice>,
    pub rejected: Vec<RejectedChoice>,
}

/// Value one choice from its pooled effects. Uses pooled means only.
pub fn net_annual_value(
    choice: &Choice,
    pooled: &[PooledEffect],
    rates: &ValuationRates,
    params: &NormalizerParams,
) -> ValuedChoice {
    let benefit_usd: f64 = pooled
        .iter()
        .map(|p| match p.outcome {
            OutcomeKind::RelativeMortalityRisk | OutcomeKind::YearsOfDelayedAging => {
                p.years_mean * rates.dollars_per_life_year
            }
            OutcomeKind::SubjectiveWellbeing => {
                years_to_wellbeing_units(p.years_mean, params) * rates.dollars_per_wellbeing_unit
            }
        })
        .sum();
    let cost_usd = choice.annual_hours * rates.dollars_per_hour + choice.annual_cost_usd;

    ValuedChoice {
        choice: choice.clone(),
        benefit_usd,
        cost_usd,
        net_value_usd: benefit_usd - cost_usd,
    }
}

/// Value every choice and sort by net value descending, name ascending on
/// ties. Malformed choices are rejected as in `Ranker::rank`.
pub fn rank_by_net_value(
    ranker: &Ranker,
    choices: &[Choice],
    rates: &ValuationRates,
) -> Result<ValuationOutcome> {
    rates.validate()?;

    let mut outcome = ValuationOutcome::default();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for choice in choices {
        if !seen.insert((choice.domain.as_str(), choice.name.as_str())) {
            let rejected = RejectedChoice::duplicate(choice);
            warn!(choice = %choice.label(), "Rejected choice: {}", rejected.reason);
            outcome.rejected.push(rejected);
            continue;
        }
        match ranker.pooled_effects(choice) {
            Ok(pooled) => outcome
                .entries
                .push(net_annual_value(choice, &pooled, rates, ranker.normalizer())),
            Err(err) => {
                warn!(choice = %choice.label(), "Rejected choice: {err}");
                outcome.rejected.push(RejectedChoice::from_error(choice, &err));
            }
        }
    }

    outcome.entries.sort_by(|a, b| {
        b.net_value_usd
            .total_cmp(&a.net_value_usd)
            .then_with(|| a.choice.name.cmp(&b.choice.name))
            .then_with(|| a.choice.domain.cmp(&b.choice.domain))
    });

    info!(
        valued = outcome.entries.len(),
        rejected = outcome.rejected.len(),
        "Valuation complete"
    );
    Ok(outcome)
}
