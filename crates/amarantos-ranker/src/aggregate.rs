//! Lifespan aggregation across outcome kinds.
//!
//! Pooled outcome Gaussians are summed into one total-impact Gaussian.
//! By default the outcomes are treated as independent, although in reality
//! e.g. mortality and biological-age effects of one intervention overlap.
//! A uniform pairwise correlation can be configured instead.

use amarantos_common::{AggregationParams, Choice};

use crate::pooling::PooledEffect;

/// Overall lifespan-impact distribution of one choice, in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateImpact<'a> {
    pub choice: &'a Choice,
    pub mean: f64,
    pub std: f64,
}

/// Sum pooled effects: `mean = Σ μ_i`, `var = Σ σ_i² + 2ρ Σ_{i<j} σ_i σ_j`.
/// With ρ = 0 this is `std = sqrt(Σ σ_i²)`.
pub fn aggregate<'a>(
    choice: &'a Choice,
    pooled: &[PooledEffect],
    params: &AggregationParams,
) -> AggregateImpact<'a> {
    let mean: f64 = pooled.iter().map(|p| p.years_mean).sum();

    // Work in units of the largest std so the squares cannot overflow.
    let scale = pooled.iter().map(|p| p.years_std).fold(0.0, f64::max);
    if scale == 0.0 {
        return AggregateImpact { choice, mean, std: 0.0 };
    }
    let scaled: Vec<f64> = pooled.iter().map(|p| p.years_std / scale).collect();

    let mut variance: f64 = scaled.iter().map(|s| s * s).sum();
    let rho = params.outcome_correlation;
    if rho != 0.0 {
        for (i, a) in scaled.iter().enumerate() {
            for b in &scaled[i + 1..] {
                variance += 2.0 * rho * a * b;
            }
        }
    }

    AggregateImpact {
        choice,
        mean,
        std: scale * variance.max(0.0).sqrt(),
    }
}
