//! Trait for choice data access.
//!
//! The engine never reads files. A data loader implements this trait and
//! hands back validated-shape `Choice` records; the ranker takes it from there.

use amarantos_common::error::Result;
use amarantos_common::Choice;

/// Source of intervention records.
///
/// Implementations can use:
/// - a directory of YAML files (the CLI)
/// - in-memory data (testing)
pub trait ChoiceSource: Send + Sync {
    /// Load all choices, or only those in `domain`.
    fn load_choices(&self, domain: Option<&str>) -> Result<Vec<Choice>>;

    /// Distinct domains present, sorted.
    fn domains(&self) -> Result<Vec<String>> {
        let mut domains: Vec<String> = self
            .load_choices(None)?
            .into_iter()
            .map(|c| c.domain)
            .collect();
        domains.sort();
        domains.dedup();
        Ok(domains)
    }
}

// ── In-memory implementation ──────────────────────────────────────────────────

/// Source backed by a fixed list, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChoiceSource {
    choices: Vec<Choice>,
}

impl InMemoryChoiceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

impl From<Vec<Choice>> for InMemoryChoiceSource {
    fn from(choices: Vec<Choice>) -> Self {
        Self { choices }
    }
}

impl ChoiceSource for InMemoryChoiceSource {
    fn load_choices(&self, domain: Option<&str>) -> Result<Vec<Choice>> {
        Ok(self
            .choices
            .iter()
            .filter(|c| domain.map_or(true, |d| c.domain == d))
            .cloned()
            .collect())
    }
}
