//! Error types for the genetic-algorithm core.
//!
//! Configuration problems are fatal at construction. Numeric degeneracy
//! (zero fitness sums, all-negative populations) is recovered locally by the
//! evolution engine and never shows up here.

use thiserror::Error;

/// Result type for evolution operations
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Rejected `GaConfig` values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("top_units must satisfy 0 < top_units <= max_units (top_units={top_units}, max_units={max_units})")]
    TopUnitsOutOfRange { top_units: usize, max_units: usize },

    #[error("top_winners_count + crossover_winner_count ({requested}) exceeds max_units - top_units ({available})")]
    ReproductionOverflow { requested: usize, available: usize },

    #[error("top_winners_count > 0 crosses winner[0] with winner[1], so top_units must be at least 2")]
    CrossoverNeedsTwoWinners,

    #[error("reduced_mutation_rate must lie in [0, 1], got {0}")]
    InvalidMutationRate(f64),

    #[error("output layer must have 4 neurons (thrust left, right, up, idle), got {0}")]
    OutputSize(usize),

    #[error("topology layer {0} has no neurons")]
    EmptyLayer(usize),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the population store, codec and evolution engine
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Two genomes that must share a topology do not. This means a genome
    /// was corrupted somewhere outside the engine.
    #[error("genome topology mismatch: {left} vs {right}")]
    TopologyMismatch { left: String, right: String },

    #[error("genome codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("population size mismatch: expected {expected}, got {actual}")]
    PopulationSize { expected: usize, actual: usize },
}
