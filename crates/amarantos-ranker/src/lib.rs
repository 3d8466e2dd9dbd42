//! amarantos-ranker — Effect aggregation and ranking engine.
//!
//! Data flows one way: normalise → pool → aggregate → percentile → rank.
//! Every stage is a pure function of its inputs.

pub mod normalise;
pub mod pooling;
pub mod aggregate;
pub mod percentile;
pub mod ranking;
pub mod value;
pub mod source;

pub use ranking::{rank, RankedEntry, Ranker, RankingOutcome, RejectedChoice};
