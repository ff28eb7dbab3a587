//! Core contracts: configuration, errors, and the agent interface.

pub mod agent;
pub mod config;
pub mod error;

pub use agent::{Agent, AgentState};
pub use config::{GaConfig, SpawnConfig, Topology, OUTPUT_SIZE};
pub use error::{ConfigError, EvolutionError, Result};
