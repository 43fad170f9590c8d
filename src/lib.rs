//! Build stat calculator: resolves a toon's final stats from its equipped
//! trinkets, items and abilities, and predicts machine completion times.

pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod machine;

pub use config::EngineConfig;
