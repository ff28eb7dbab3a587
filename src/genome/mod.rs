//! Genome value types
//!
//! A genome is the flat, serializable form of a brain: one bias per neuron
//! and one weight per connection. Crossover and mutation operate on genomes
//! only, so no operator ever aliases a brain an agent is still using.

pub mod codec;

use crate::core::error::{EvolutionError, Result};
use serde::{Deserialize, Serialize};

pub use codec::{GenomeCodec, LayeredNetwork, PerceptronCodec};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub bias: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub weight: f64,
}

/// Flat genome: `{"neurons":[{"bias":..}],"connections":[{"weight":..}]}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub neurons: Vec<Neuron>,
    pub connections: Vec<Connection>,
}

impl Genome {
    pub fn new(biases: Vec<f64>, weights: Vec<f64>) -> Self {
        Genome {
            neurons: biases.into_iter().map(|bias| Neuron { bias }).collect(),
            connections: weights.into_iter().map(|weight| Connection { weight }).collect(),
        }
    }

    pub fn biases(&self) -> Vec<f64> {
        self.neurons.iter().map(|n| n.bias).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.connections.iter().map(|c| c.weight).collect()
    }

    /// (neurons, connections)
    pub fn shape(&self) -> (usize, usize) {
        (self.neurons.len(), self.connections.len())
    }

    /// Fails when the two genomes cannot be combined index-for-index.
    pub fn ensure_same_shape(&self, other: &Genome) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(EvolutionError::TopologyMismatch {
                left: format!("{:?}", self.shape()),
                right: format!("{:?}", other.shape()),
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
