//! Evolution Layer
//!
//! Genetic-algorithm core for populations of neural controllers:
//! 1. Generation Controller detects boundaries and publishes statistics
//! 2. Evolution Engine ranks, keeps winners and breeds the rest
//! 3. Operators and selection implement crossover, mutation and roulette picks

pub mod controller;
pub mod engine;
pub mod operators;
pub mod report;
pub mod selection;


use serde::{Deserialize, Serialize};

pub use controller::{GenerationController, GenerationStats, TickOutcome};
pub use engine::{Evolution, EvolutionEngine, Lineage};
pub use report::{MemorySink, ReportSink, TracingSink};
pub use selection::Candidate;

/// Per-gene mutation probability used before any useful winner exists
pub const FULL_MUTATION_RATE: f64 = 1.0;

/// One-way mutation ratchet: `FullRandom` until the first boundary whose best
/// fitness is non-negative, `Reduced` forever after.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationPhase {
    FullRandom,
    Reduced,
}

impl MutationPhase {
    pub fn rate(self, reduced_rate: f64) -> f64 {
        match self {
            MutationPhase::FullRandom => FULL_MUTATION_RATE,
            MutationPhase::Reduced => reduced_rate,
        }
    }

    /// Never moves back from `Reduced`
    pub fn ratchet(self, next: MutationPhase) -> MutationPhase {
        match (self, next) {
            (MutationPhase::Reduced, _) => MutationPhase::Reduced,
            (MutationPhase::FullRandom, next) => next,
        }
    }
}

/// Generation counter, mutation phase and last published fittest score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Starts at 1
    pub generation: u64,
    pub phase: MutationPhase,
    /// `None` until the first boundary
    pub fittest: Option<f64>,
}

impl GenerationRecord {
    pub fn new() -> Self {
        GenerationRecord {
            generation: 1,
            phase: MutationPhase::FullRandom,
            fittest: None,
        }
    }

    pub fn mutation_rate(&self, reduced_rate: f64) -> f64 {
        self.phase.rate(reduced_rate)
    }

    /// Fold an evolution result in and move to the next generation.
    /// Returns true when the fittest score changed.
    pub fn advance(&mut self, evolution: &Evolution) -> bool {
        self.phase = self.phase.ratchet(evolution.phase);
        self.generation += 1;
        let changed = self.fittest != Some(evolution.fittest);
        self.fittest = Some(evolution.fittest);
        changed
    }
}

impl Default for GenerationRecord {
    fn default() -> Self {
        Self::new()
    }
}
