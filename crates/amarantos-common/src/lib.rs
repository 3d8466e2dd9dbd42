//! amarantos-common — Shared data model, errors, and run configuration
//! used across all Amarantos crates.

pub mod error;
pub mod entities;
pub mod rank_config;

// Re-export commonly used types
pub use entities::{Choice, EffectRecord, OutcomeKind};
pub use error::{AmarantosError, Result};
pub use rank_config::{
    AggregationParams, EngineConfig, NormalizerParams, RankOptions, SortKey, ValuationRates,
};
