//! amarantos-cli — Data loading and presentation around the ranking engine.

pub mod config;
pub mod loader;
pub mod render;
