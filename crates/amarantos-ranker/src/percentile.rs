//! Percentile summary of an aggregate impact.
//!
//! The ranking score is a low quantile (30th by default) of the impact
//! Gaussian: weak evidence, i.e. a wide distribution, pulls the score down
//! more than strong evidence does.
//! Quantiles use the `statrs` standard-normal inverse CDF.

use amarantos_common::error::{AmarantosError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::aggregate::AggregateImpact;

/// Default operating point.
pub const DEFAULT_PERCENTILE: f64 = 0.30;

/// Standard-normal quantile `z(p)`, for `p` in the open interval (0, 1).
pub fn z_score(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(AmarantosError::Config(format!(
            "percentile must lie strictly between 0 and 1 (got {p})"
        )));
    }
    let standard = Normal::new(0.0, 1.0).map_err(|e| AmarantosError::Config(e.to_string()))?;
    Ok(standard.inverse_cdf(p))
}

/// `mean + z(p) * std` of a Gaussian.
pub fn gaussian_percentile(mean: f64, std: f64, p: f64) -> Result<f64> {
    Ok(mean + z_score(p)? * std)
}

/// The `p`-th percentile of an aggregate impact, in years.
pub fn percentile(impact: &AggregateImpact<'_>, p: f64) -> Result<f64> {
    gaussian_percentile(impact.mean, impact.std, p)
}

// ── Verdict ───────────────────────────────────────────────────────────────────

/// Coarse direction of an impact, judged by its central 90% interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceVerdict {
    /// 5th percentile above zero.
    Beneficial,
    /// Interval straddles zero.
    Uncertain,
    /// 95th percentile below zero.
    Harmful,
}

impl EvidenceVerdict {
    pub fn classify(mean: f64, std: f64) -> Result<Self> {
        let low = gaussian_percentile(mean, std, 0.05)?;
        let high = gaussian_percentile(mean, std, 0.95)?;
        Ok(if low > 0.0 {
            EvidenceVerdict::Beneficial
        } else if high < 0.0 {
            EvidenceVerdict::Harmful
        } else {
            EvidenceVerdict::Uncertain
        })
    }

    pub fn marker(&self) -> &'static str {
        match self {
            EvidenceVerdict::Beneficial => "✓",
            EvidenceVerdict::Uncertain => "?",
            EvidenceVerdict::Harmful => "✗",
        }
    }
}
