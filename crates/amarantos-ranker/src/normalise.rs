//! Outcome normalisation.
//! Maps each native outcome scale onto years of healthy lifespan.

use amarantos_common::error::{AmarantosError, Result};
use amarantos_common::{EffectRecord, NormalizerParams, OutcomeKind};
use serde::{Deserialize, Serialize};

/// An effect expressed as a Gaussian in years of healthy lifespan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEffect {
    pub outcome: OutcomeKind,
    pub years_mean: f64,
    pub years_std: f64,
}

/// Convert one effect record to years.
///
/// - `YearsOfDelayedAging`: identity.
/// - `RelativeMortalityRisk`: linearised Gompertz, `-ln(ratio) / k`, with the
///   std propagated by the delta method, `std / ratio / k`. Large std relative
///   to the ratio yields a large propagated std; that is the intended
///   conservative behaviour.
/// - `SubjectiveWellbeing`: linear weight `w` per just-noticeable difference.
///
/// Fails with `Domain` if a mortality ratio is not strictly positive.
pub fn normalise(effect: &EffectRecord, params: &NormalizerParams) -> Result<NormalizedEffect> {
    let (years_mean, years_std) = match effect.outcome {
        OutcomeKind::YearsOfDelayedAging => (effect.mean, effect.std),
        OutcomeKind::RelativeMortalityRisk => {
            if effect.mean <= 0.0 || !effect.mean.is_finite() {
                return Err(AmarantosError::Domain(format!(
                    "mortality risk ratio must be > 0 (got {})",
                    effect.mean
                )));
            }
            let k = params.hazard_growth_rate;
            (-effect.mean.ln() / k, effect.std / effect.mean / k)
        }
        OutcomeKind::SubjectiveWellbeing => {
            let w = params.wellbeing_years_per_unit;
            (effect.mean * w, effect.std * w)
        }
    };

    Ok(NormalizedEffect {
        outcome: effect.outcome,
        years_mean,
        years_std,
    })
}

/// Normalise every effect of a choice, preserving input order.
pub fn normalise_all(effects: &[EffectRecord], params: &NormalizerParams) -> Result<Vec<NormalizedEffect>> {
    effects.iter().map(|e| normalise(e, params)).collect()
}

/// Inverse of the wellbeing weight: years back to just-noticeable differences.
pub fn years_to_wellbeing_units(years: f64, params: &NormalizerParams) -> f64 {
    years / params.wellbeing_years_per_unit
}
