//! Run configuration for the ranking engine.
//!
//! All tunable constants of the model live here as named, serializable
//! values so they can be inspected, overridden from a config file, and
//! tested independently of the pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{AmarantosError, Result};

/// Complete engine configuration, as read from `amarantos.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub normalizer: NormalizerParams,

    #[serde(default)]
    pub aggregation: AggregationParams,

    #[serde(default)]
    pub ranking: RankOptions,

    #[serde(default)]
    pub valuation: ValuationRates,
}

// ── Normalizer ────────────────────────────────────────────────────────────────

/// Constants that map native outcome scales onto years of healthy lifespan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerParams {
    /// Gompertz hazard growth rate `k` per year of age. The default is
    /// calibrated so that a 10% hazard reduction equals one year.
    #[serde(default = "default_hazard_growth_rate")]
    pub hazard_growth_rate: f64,

    /// Years of healthy lifespan per just-noticeable wellbeing difference.
    /// A judgement call, not fitted to data.
    #[serde(default = "default_wellbeing_years_per_unit")]
    pub wellbeing_years_per_unit: f64,
}

fn default_hazard_growth_rate() -> f64 { -(0.9f64.ln()) }
fn default_wellbeing_years_per_unit() -> f64 { 0.1 }

impl Default for NormalizerParams {
    fn default() -> Self {
        Self {
            hazard_growth_rate: default_hazard_growth_rate(),
            wellbeing_years_per_unit: default_wellbeing_years_per_unit(),
        }
    }
}

impl NormalizerParams {
    pub fn validate(&self) -> Result<()> {
        if !self.hazard_growth_rate.is_finite() || self.hazard_growth_rate <= 0.0 {
            return Err(AmarantosError::Config(format!(
                "hazard_growth_rate must be finite and > 0 (got {})",
                self.hazard_growth_rate
            )));
        }
        if !self.wellbeing_years_per_unit.is_finite() || self.wellbeing_years_per_unit <= 0.0 {
            return Err(AmarantosError::Config(format!(
                "wellbeing_years_per_unit must be finite and > 0 (got {})",
                self.wellbeing_years_per_unit
            )));
        }
        Ok(())
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// How pooled per-outcome estimates are summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationParams {
    /// Pairwise correlation between outcome kinds. 0.0 means independent.
    #[serde(default)]
    pub outcome_correlation: f64,
}

impl AggregationParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.outcome_correlation) {
            return Err(AmarantosError::Config(format!(
                "outcome_correlation must lie in [0, 1] (got {})",
                self.outcome_correlation
            )));
        }
        Ok(())
    }
}

// ── Ranking options ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Conservative percentile, descending.
    #[default]
    ByPercentile,
    /// Percentile per dollar, descending. Non-positive-cost entries go last.
    ByCostEfficiency,
}

/// Options recognised by `rank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOptions {
    /// Quantile of the aggregate impact used as the ranking score.
    #[serde(default = "default_percentile")]
    pub percentile: f64,

    /// Keep only choices in this domain.
    #[serde(default)]
    pub domain_filter: Option<String>,

    /// Inclusive upper bound on annual USD cost.
    #[serde(default)]
    pub max_cost_usd: Option<f64>,

    /// Inclusive upper bound on annual hours.
    #[serde(default)]
    pub max_hours: Option<f64>,

    #[serde(default)]
    pub sort_key: SortKey,

    /// Keep at most this many entries per domain.
    #[serde(default)]
    pub max_per_domain: Option<usize>,
}

fn default_percentile() -> f64 { 0.30 }

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            percentile: default_percentile(),
            domain_filter: None,
            max_cost_usd: None,
            max_hours: None,
            sort_key: SortKey::default(),
            max_per_domain: None,
        }
    }
}

impl RankOptions {
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain_filter = Some(domain.into());
        self
    }

    pub fn with_max_cost(mut self, max_cost_usd: f64) -> Self {
        self.max_cost_usd = Some(max_cost_usd);
        self
    }

    pub fn with_max_hours(mut self, max_hours: f64) -> Self {
        self.max_hours = Some(max_hours);
        self
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn with_max_per_domain(mut self, k: usize) -> Self {
        self.max_per_domain = Some(k);
        self
    }

    /// Reject options that would invalidate the whole run.
    pub fn validate(&self) -> Result<()> {
        if !(self.percentile > 0.0 && self.percentile < 1.0) {
            return Err(AmarantosError::Config(format!(
                "percentile must lie strictly between 0 and 1 (got {})",
                self.percentile
            )));
        }
        if let Some(max_cost) = self.max_cost_usd {
            if !max_cost.is_finite() || max_cost < 0.0 {
                return Err(AmarantosError::Config(format!(
                    "max_cost_usd must be finite and >= 0 (got {max_cost})"
                )));
            }
        }
        if let Some(max_hours) = self.max_hours {
            if !max_hours.is_finite() || max_hours < 0.0 {
                return Err(AmarantosError::Config(format!(
                    "max_hours must be finite and >= 0 (got {max_hours})"
                )));
            }
        }
        if self.max_per_domain == Some(0) {
            return Err(AmarantosError::Config(
                "max_per_domain must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Valuation ─────────────────────────────────────────────────────────────────

/// Dollar rates for the net annual value report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRates {
    #[serde(default = "default_dollars_per_hour")]
    pub dollars_per_hour: f64,

    #[serde(default = "default_dollars_per_wellbeing_unit")]
    pub dollars_per_wellbeing_unit: f64,

    #[serde(default = "default_dollars_per_life_year")]
    pub dollars_per_life_year: f64,
}

fn default_dollars_per_hour() -> f64 { 50.0 }
fn default_dollars_per_wellbeing_unit() -> f64 { 1_000.0 }
fn default_dollars_per_life_year() -> f64 { 100_000.0 }

impl Default for ValuationRates {
    fn default() -> Self {
        Self {
            dollars_per_hour: default_dollars_per_hour(),
            dollars_per_wellbeing_unit: default_dollars_per_wellbeing_unit(),
            dollars_per_life_year: default_dollars_per_life_year(),
        }
    }
}

impl ValuationRates {
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("dollars_per_hour", self.dollars_per_hour),
            ("dollars_per_wellbeing_unit", self.dollars_per_wellbeing_unit),
            ("dollars_per_life_year", self.dollars_per_life_year),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(AmarantosError::Config(format!(
                    "{name} must be finite and >= 0 (got {value})"
                )));
            }
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load from a TOML file.
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load by file extension: `.yaml`/`.yml` as YAML, anything else as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading engine config");
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            _ => Self::from_toml(path),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.normalizer.validate()?;
        self.aggregation.validate()?;
        self.ranking.validate()?;
        self.valuation.validate()?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_options_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.ranking.percentile - 0.30).abs() < 1e-12);
        assert_eq!(config.ranking.sort_key, SortKey::ByPercentile);
    }

    #[test]
    fn test_default_hazard_rate_matches_ten_percent_per_year() {
        let params = NormalizerParams::default();
        assert!((params.hazard_growth_rate - 0.105_360_5).abs() < 1e-6);
    }

    #[test]
    fn test_percentile_bounds_are_exclusive() {
        for p in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let opts = RankOptions { percentile: p, ..Default::default() };
            assert!(
                matches!(opts.validate(), Err(AmarantosError::Config(_))),
                "percentile {p} should be rejected"
            );
        }
        let opts = RankOptions { percentile: 0.05, ..Default::default() };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_negative_bounds_rejected() {
        assert!(RankOptions::default().with_max_cost(-1.0).validate().is_err());
        assert!(RankOptions::default().with_max_hours(-0.5).validate().is_err());
        assert!(RankOptions::default().with_max_cost(0.0).validate().is_ok());
    }

    #[test]
    fn test_zero_per_domain_rejected() {
        assert!(RankOptions::default().with_max_per_domain(0).validate().is_err());
        assert!(RankOptions::default().with_max_per_domain(1).validate().is_ok());
    }

    #[test]
    fn test_correlation_range() {
        assert!(AggregationParams { outcome_correlation: 1.2 }.validate().is_err());
        assert!(AggregationParams { outcome_correlation: 0.5 }.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[ranking]\npercentile = 0.2\nsort_key = \"by_cost_efficiency\"\n\n[normalizer]\nwellbeing_years_per_unit = 0.05\n"
        )
        .unwrap();

        let config = EngineConfig::from_path(file.path()).unwrap();
        assert!((config.ranking.percentile - 0.2).abs() < 1e-12);
        assert_eq!(config.ranking.sort_key, SortKey::ByCostEfficiency);
        assert!((config.normalizer.wellbeing_years_per_unit - 0.05).abs() < 1e-12);
        assert_eq!(config.normalizer.hazard_growth_rate, default_hazard_growth_rate());
        assert_eq!(config.valuation, ValuationRates::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig {
            ranking: RankOptions::default().with_domain("diet").with_max_per_domain(3),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
