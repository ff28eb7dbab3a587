//! LanderSwarm Core - Genetic Algorithm for Neural Controllers
//!
//! Evolves a fixed-size population of feed-forward "brains" across discrete
//! generations. An external simulation steps the agents and scores them;
//! this crate detects generation boundaries, ranks the population, keeps
//! the winners and breeds the remaining slots with crossover and mutation.
//!
//! The core is single-threaded and tick-driven. Agents may optionally be
//! stepped on the rayon pool, which acts as the per-tick barrier.

pub mod core;
pub mod evolution;
pub mod genome;
pub mod population;

#[cfg(feature = "python")]
pub mod py_api;

pub use crate::core::agent::{Agent, AgentState};
pub use crate::core::config::{GaConfig, SpawnConfig, Topology};
pub use crate::core::error::{ConfigError, EvolutionError, Result};
pub use evolution::{
    Evolution, EvolutionEngine, GenerationController, GenerationRecord, GenerationStats, Lineage,
    MemorySink, MutationPhase, ReportSink, TickOutcome, TracingSink,
};
pub use genome::{Genome, GenomeCodec, LayeredNetwork, PerceptronCodec};
pub use population::Population;

/// Initialize tracing for the library.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module initialization
#[cfg(feature = "python")]
#[pymodule]
fn landerswarm_core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<py_api::PyGeneticAlgorithm>()?;
    m.add_function(wrap_pyfunction!(py_api::py_setup_logging, m)?)?;
    Ok(())
}
