/// Core entity types for interventions and their evidence.
/// Loaded once by a data source, read-only for the rest of a ranking run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AmarantosError, Result};

// ---------------------------------------------------------------------------
// Outcome kind
// ---------------------------------------------------------------------------

/// Scale an effect estimate is reported on.
///
/// The set is closed: adding a kind means extending the normalizer.
/// Declaration order is the canonical order used for per-outcome breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Hazard/risk ratio; 1.0 is neutral, < 1.0 is beneficial. Must be > 0.
    #[serde(alias = "mortality")]
    RelativeMortalityRisk,
    /// Direct delta in years; 0 is neutral.
    #[serde(alias = "delayed_aging")]
    YearsOfDelayedAging,
    /// Just-noticeable differences in life satisfaction; 0 is neutral.
    SubjectiveWellbeing,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [
        OutcomeKind::RelativeMortalityRisk,
        OutcomeKind::YearsOfDelayedAging,
        OutcomeKind::SubjectiveWellbeing,
    ];

    /// Value of `mean` that represents "no effect" on this scale.
    pub fn neutral_value(&self) -> f64 {
        match self {
            OutcomeKind::RelativeMortalityRisk => 1.0,
            OutcomeKind::YearsOfDelayedAging | OutcomeKind::SubjectiveWellbeing => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::RelativeMortalityRisk => "relative_mortality_risk",
            OutcomeKind::YearsOfDelayedAging => "years_of_delayed_aging",
            OutcomeKind::SubjectiveWellbeing => "subjective_wellbeing",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Effect record
// ---------------------------------------------------------------------------

/// One elicited Gaussian belief about one outcome of one intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub outcome: OutcomeKind,
    pub mean: f64,
    pub std: f64,
    /// Opaque reference identifiers; never resolved by the engine.
    #[serde(default, rename = "evidence", alias = "evidence_refs")]
    pub evidence_refs: BTreeSet<String>,
}

impl EffectRecord {
    pub fn new(outcome: OutcomeKind, mean: f64, std: f64) -> Self {
        Self {
            outcome,
            mean,
            std,
            evidence_refs: BTreeSet::new(),
        }
    }

    pub fn with_evidence(mut self, reference: impl Into<String>) -> Self {
        self.evidence_refs.insert(reference.into());
        self
    }

    /// Structural checks only. Outcome-specific domain checks (ratio > 0)
    /// belong to the normalizer.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.mean.is_finite() {
            return Err(format!("{} effect has non-finite mean", self.outcome));
        }
        if !self.std.is_finite() {
            return Err(format!("{} effect has non-finite std", self.outcome));
        }
        if self.std < 0.0 {
            return Err(format!(
                "{} effect has negative std ({})",
                self.outcome, self.std
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Choice
// ---------------------------------------------------------------------------

/// A candidate lifestyle intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Unique within its domain.
    pub name: String,
    pub domain: String,
    /// May contain several records for the same outcome (one per study).
    pub effects: Vec<EffectRecord>,
    pub annual_cost_usd: f64,
    pub annual_hours: f64,
}

impl Choice {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            effects: Vec::new(),
            annual_cost_usd: 0.0,
            annual_hours: 0.0,
        }
    }

    pub fn with_effect(mut self, effect: EffectRecord) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_cost(mut self, annual_cost_usd: f64, annual_hours: f64) -> Self {
        self.annual_cost_usd = annual_cost_usd;
        self.annual_hours = annual_hours;
        self
    }

    /// Distinct outcome kinds present, in canonical order.
    pub fn outcomes(&self) -> BTreeSet<OutcomeKind> {
        self.effects.iter().map(|e| e.outcome).collect()
    }

    /// Union of all evidence references cited by this choice.
    pub fn evidence_refs(&self) -> BTreeSet<&str> {
        self.effects
            .iter()
            .flat_map(|e| e.evidence_refs.iter().map(String::as_str))
            .collect()
    }

    /// Data-model boundary checks. Any failure rejects the whole choice.
    pub fn validate(&self) -> Result<()> {
        let label = self.label();

        if self.name.trim().is_empty() {
            return Err(AmarantosError::validation(label, "name is empty"));
        }
        if self.effects.is_empty() {
            return Err(AmarantosError::validation(
                label,
                "no effect records; an intervention without evidence cannot be ranked",
            ));
        }
        for effect in &self.effects {
            effect
                .validate()
                .map_err(|reason| AmarantosError::validation(label.clone(), reason))?;
        }
        if !self.annual_cost_usd.is_finite() {
            return Err(AmarantosError::validation(label, "annual cost is not finite"));
        }
        if !self.annual_hours.is_finite() || self.annual_hours < 0.0 {
            return Err(AmarantosError::validation(
                label,
                format!("annual hours must be finite and >= 0 (got {})", self.annual_hours),
            ));
        }
        Ok(())
    }

    /// `domain/name`, used in logs and error reports.
    pub fn label(&self) -> String {
        format!("{}/{}", self.domain, self.name)
    }
}
