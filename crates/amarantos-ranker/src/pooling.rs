//! Evidence pooling for a single outcome kind.
//!
//! Fixed-effect inverse-variance weighting: each estimate is weighted by
//! `1 / std²`, so precise studies dominate. Divergent means do NOT widen the
//! pooled std; `heterogeneity` reports disagreement without changing the pool.

use amarantos_common::error::{AmarantosError, Result};
use amarantos_common::OutcomeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::normalise::NormalizedEffect;

/// All evidence for one outcome of one choice, combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PooledEffect {
    pub outcome: OutcomeKind,
    pub years_mean: f64,
    pub years_std: f64,
}

/// Pool same-outcome estimates by inverse-variance weighting.
///
/// A zero-std record is treated as exact truth: it fixes the pooled mean and
/// the pooled std becomes 0. If several records are exact, their means are
/// averaged with equal weight so the result does not depend on input order.
/// A single record passes through unchanged.
pub fn combine(effects: &[NormalizedEffect]) -> Result<PooledEffect> {
    let first = effects.first().ok_or_else(|| {
        AmarantosError::Domain("cannot pool an empty set of effects".to_string())
    })?;
    let outcome = first.outcome;

    if let Some(other) = effects.iter().find(|e| e.outcome != outcome) {
        return Err(AmarantosError::Domain(format!(
            "cannot pool {} with {}",
            outcome, other.outcome
        )));
    }

    if effects.len() == 1 {
        return Ok(PooledEffect {
            outcome,
            years_mean: first.years_mean,
            years_std: first.years_std,
        });
    }

    let exact: Vec<f64> = effects
        .iter()
        .filter(|e| e.years_std == 0.0)
        .map(|e| e.years_mean)
        .collect();
    if !exact.is_empty() {
        return Ok(PooledEffect {
            outcome,
            years_mean: exact.iter().sum::<f64>() / exact.len() as f64,
            years_std: 0.0,
        });
    }

    // Weights relative to the most precise record: w_i = (s_min / s_i)².
    // Same result as 1/s², but never overflows or underflows to 0/0.
    let s_min = effects
        .iter()
        .map(|e| e.years_std)
        .fold(f64::INFINITY, f64::min);
    let mut weight_sum = 0.0;
    let mut weighted_mean_sum = 0.0;
    for e in effects {
        let ratio = s_min / e.years_std;
        let w = ratio * ratio;
        weight_sum += w;
        weighted_mean_sum += w * e.years_mean;
    }

    Ok(PooledEffect {
        outcome,
        years_mean: weighted_mean_sum / weight_sum,
        years_std: s_min / weight_sum.sqrt(),
    })
}

/// Split normalised effects by outcome, in canonical outcome order.
/// Input order is preserved within each group.
pub fn group_by_outcome(effects: &[NormalizedEffect]) -> BTreeMap<OutcomeKind, Vec<NormalizedEffect>> {
    let mut groups: BTreeMap<OutcomeKind, Vec<NormalizedEffect>> = BTreeMap::new();
    for e in effects {
        groups.entry(e.outcome).or_default().push(*e);
    }
    groups
}

/// Group then pool; one `PooledEffect` per outcome present.
pub fn pool_by_outcome(effects: &[NormalizedEffect]) -> Result<Vec<PooledEffect>> {
    group_by_outcome(effects)
        .values()
        .map(|group| combine(group))
        .collect()
}

// ── Heterogeneity ─────────────────────────────────────────────────────────────

/// Between-study disagreement for one pooled group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heterogeneity {
    pub outcome: OutcomeKind,
    /// Cochran's Q: weighted squared deviation from the pooled mean.
    pub q: f64,
    pub degrees_of_freedom: usize,
    /// Share of total variation due to heterogeneity, in [0, 1].
    pub i_squared: f64,
}

/// I² above this is reported as substantial disagreement.
pub const SUBSTANTIAL_I_SQUARED: f64 = 0.5;

impl Heterogeneity {
    pub fn is_substantial(&self) -> bool {
        self.i_squared > SUBSTANTIAL_I_SQUARED
    }
}

/// Cochran's Q and I² for a same-outcome group.
///
/// `None` for fewer than two records, or when any record is exact (std 0),
/// since the weights are then undefined.
pub fn heterogeneity(effects: &[NormalizedEffect]) -> Option<Heterogeneity> {
    if effects.len() < 2 || effects.iter().any(|e| e.years_std == 0.0) {
        return None;
    }
    let pooled = combine(effects).ok()?;

    let q: f64 = effects
        .iter()
        .map(|e| {
            let z = (e.years_mean - pooled.years_mean) / e.years_std;
            z * z
        })
        .sum();
    let df = effects.len() - 1;
    let i_squared = if q.is_infinite() {
        1.0
    } else if q > 0.0 {
        ((q - df as f64) / q).max(0.0)
    } else {
        0.0
    };

    Some(Heterogeneity {
        outcome: pooled.outcome,
        q,
        degrees_of_freedom: df,
        i_squared,
    })
}
