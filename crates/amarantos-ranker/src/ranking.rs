//! Ranking and filtering of choices by conservative lifespan impact.
//!
//! Per choice: normalise → group by outcome → pool → aggregate → percentile.
//! Then filter by domain/cost/hours, sort, and optionally cap per domain.
//! A malformed choice is rejected and reported; it never aborts the run.

use amarantos_common::error::{AmarantosError, Result};
use amarantos_common::{AggregationParams, Choice, EngineConfig, NormalizerParams, RankOptions, SortKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::normalise::{normalise_all, NormalizedEffect};
use crate::percentile::{percentile, EvidenceVerdict};
use crate::pooling::{group_by_outcome, heterogeneity, pool_by_outcome, Heterogeneity, PooledEffect};

/// Final sortable unit handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub choice: Choice,
    /// Summary at the configured percentile (the 30th unless overridden).
    pub p30: f64,
    pub aggregate_mean: f64,
    pub aggregate_std: f64,
    /// Operating point `p30` was computed at.
    pub percentile: f64,
    /// Pooled per-outcome contributions, in canonical outcome order.
    pub breakdown: Vec<PooledEffect>,
    /// Only outcomes backed by two or more non-exact records appear here.
    pub heterogeneity: Vec<Heterogeneity>,
    pub verdict: EvidenceVerdict,
}

impl RankedEntry {
    /// Score per annual dollar. `None` when the choice costs nothing or
    /// less, where the ratio has no meaning.
    pub fn cost_efficiency(&self) -> Option<f64> {
        if self.choice.annual_cost_usd > 0.0 {
            Some(self.p30 / self.choice.annual_cost_usd)
        } else {
            None
        }
    }
}

/// A choice that could not be scored, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedChoice {
    pub name: String,
    pub domain: String,
    pub reason: String,
}

impl RejectedChoice {
    pub(crate) fn from_error(choice: &Choice, err: &AmarantosError) -> Self {
        let reason = match err {
            AmarantosError::Validation { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        Self {
            name: choice.name.clone(),
            domain: choice.domain.clone(),
            reason,
        }
    }

    pub(crate) fn duplicate(choice: &Choice) -> Self {
        Self {
            name: choice.name.clone(),
            domain: choice.domain.clone(),
            reason: DUPLICATE_NAME.to_string(),
        }
    }
}

const DUPLICATE_NAME: &str = "duplicate name within domain";

/// Result of a ranking run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub entries: Vec<RankedEntry>,
    pub rejected: Vec<RejectedChoice>,
}

// ── Ranker ────────────────────────────────────────────────────────────────────

/// The scoring pipeline with its model constants.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    normalizer: NormalizerParams,
    aggregation: AggregationParams,
}

impl Ranker {
    pub fn new(normalizer: NormalizerParams, aggregation: AggregationParams) -> Result<Self> {
        normalizer.validate()?;
        aggregation.validate()?;
        Ok(Self { normalizer, aggregation })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.normalizer.clone(), config.aggregation.clone())
    }

    pub fn normalizer(&self) -> &NormalizerParams {
        &self.normalizer
    }

    /// Validated, normalised effects of one choice. Shared first step of
    /// scoring and valuation.
    fn normalised_effects(&self, choice: &Choice) -> Result<Vec<NormalizedEffect>> {
        choice.validate()?;
        normalise_all(&choice.effects, &self.normalizer).map_err(|e| attribute(choice, e))
    }

    /// Per-outcome pooled effects of one choice.
    pub fn pooled_effects(&self, choice: &Choice) -> Result<Vec<PooledEffect>> {
        let normalised = self.normalised_effects(choice)?;
        pool_by_outcome(&normalised).map_err(|e| attribute(choice, e))
    }

    /// Run the full per-choice pipeline at percentile `p`.
    pub fn score_choice(&self, choice: &Choice, p: f64) -> Result<RankedEntry> {
        let normalised = self.normalised_effects(choice)?;

        let disagreement: Vec<Heterogeneity> = group_by_outcome(&normalised)
            .values()
            .filter_map(|group| heterogeneity(group))
            .collect();
        for h in disagreement.iter().filter(|h| h.is_substantial()) {
            warn!(
                choice = %choice.label(),
                outcome = %h.outcome,
                i_squared = h.i_squared,
                "Evidence disagrees substantially; pooled std does not reflect it"
            );
        }

        let breakdown = pool_by_outcome(&normalised).map_err(|e| attribute(choice, e))?;
        let impact = aggregate(choice, &breakdown, &self.aggregation);
        let score = percentile(&impact, p)?;
        if !score.is_finite() || !impact.std.is_finite() {
            return Err(AmarantosError::validation(
                choice.label(),
                "aggregate impact is not finite",
            ));
        }
        let verdict = EvidenceVerdict::classify(impact.mean, impact.std)?;

        debug!(
            choice = %choice.label(),
            mean = impact.mean,
            std = impact.std,
            score,
            "Scored choice"
        );

        Ok(RankedEntry {
            choice: choice.clone(),
            p30: score,
            aggregate_mean: impact.mean,
            aggregate_std: impact.std,
            percentile: p,
            breakdown,
            heterogeneity: disagreement,
            verdict,
        })
    }

    /// Score every choice, separating failures. Later duplicates of a
    /// `(domain, name)` pair are rejected.
    pub fn score_all(&self, choices: &[Choice], p: f64) -> RankingOutcome {
        self.score_each(choices, p)
    }

    fn score_each<'a>(&self, choices: impl IntoIterator<Item = &'a Choice>, p: f64) -> RankingOutcome {
        let mut outcome = RankingOutcome::default();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for choice in choices {
            if !seen.insert((choice.domain.as_str(), choice.name.as_str())) {
                warn!(choice = %choice.label(), "Rejected choice: {DUPLICATE_NAME}");
                outcome.rejected.push(RejectedChoice::duplicate(choice));
                continue;
            }
            match self.score_choice(choice, p) {
                Ok(entry) => outcome.entries.push(entry),
                Err(err) => {
                    warn!(choice = %choice.label(), "Rejected choice: {err}");
                    outcome.rejected.push(RejectedChoice::from_error(choice, &err));
                }
            }
        }
        outcome
    }

    /// Score, filter, sort and group. Invalid options fail before any
    /// choice is scored.
    ///
    /// Choices outside `domain_filter` are never scored, so `rejected` only
    /// lists failures within the requested domain.
    pub fn rank(&self, choices: &[Choice], options: &RankOptions) -> Result<RankingOutcome> {
        options.validate()?;

        let in_scope = choices.iter().filter(|c| {
            options
                .domain_filter
                .as_deref()
                .map_or(true, |d| c.domain == d)
        });
        let RankingOutcome { entries, rejected } = self.score_each(in_scope, options.percentile);
        let scored = entries.len();

        let mut entries: Vec<RankedEntry> = entries
            .into_iter()
            .filter(|e| passes_filters(&e.choice, options))
            .collect();
        let filtered = entries.len();

        entries.sort_by(|a, b| compare_entries(a, b, options.sort_key));

        if let Some(k) = options.max_per_domain {
            entries = cap_per_domain(entries, k);
        }

        info!(
            input = choices.len(),
            scored,
            rejected = rejected.len(),
            after_filters = filtered,
            returned = entries.len(),
            "Ranking complete"
        );

        Ok(RankingOutcome { entries, rejected })
    }
}

/// Rank with the default model constants.
pub fn rank(choices: &[Choice], options: &RankOptions) -> Result<RankingOutcome> {
    Ranker::default().rank(choices, options)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Attach the owning choice to a domain error.
fn attribute(choice: &Choice, err: AmarantosError) -> AmarantosError {
    match err {
        AmarantosError::Domain(reason) => AmarantosError::validation(choice.label(), reason),
        other => other,
    }
}

/// Inclusive bounds; an absent filter passes everything.
pub fn passes_filters(choice: &Choice, options: &RankOptions) -> bool {
    if let Some(ref domain) = options.domain_filter {
        if &choice.domain != domain {
            return false;
        }
    }
    if let Some(max_cost) = options.max_cost_usd {
        if choice.annual_cost_usd > max_cost {
            return false;
        }
    }
    if let Some(max_hours) = options.max_hours {
        if choice.annual_hours > max_hours {
            return false;
        }
    }
    true
}

/// Descending by sort key, then name ascending, then domain ascending.
///
/// Under `ByCostEfficiency`, entries without a positive cost are placed
/// after all positive-cost entries and ordered among themselves by score.
pub fn compare_entries(a: &RankedEntry, b: &RankedEntry, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::ByPercentile => b.p30.total_cmp(&a.p30),
        SortKey::ByCostEfficiency => match (a.cost_efficiency(), b.cost_efficiency()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.p30.total_cmp(&a.p30),
        },
    };
    primary
        .then_with(|| a.choice.name.cmp(&b.choice.name))
        .then_with(|| a.choice.domain.cmp(&b.choice.domain))
}

/// Keep the first `k` entries of each domain from an already sorted list.
/// The overall order is preserved.
fn cap_per_domain(entries: Vec<RankedEntry>, k: usize) -> Vec<RankedEntry> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    entries
        .into_iter()
        .filter(|e| {
            let count = counts.entry(e.choice.domain.clone()).or_insert(0);
            *count += 1;
            *count <= k
        })
        .collect()
}
