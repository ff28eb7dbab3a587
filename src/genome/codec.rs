//! Genome codec
//!
//! Converts between evaluable brains and flat genomes. The forward pass of a
//! brain is out of scope for this crate; agents own that.

use super::{Connection, Genome, Neuron};
use crate::core::config::Topology;
use crate::core::error::{EvolutionError, Result};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Initial bias and weight magnitude for fresh brains
pub const INIT_SPREAD: f64 = 0.1;

/// Brain <-> genome conversion plus fresh random brains
pub trait GenomeCodec {
    type Brain;

    fn to_genome(&self, brain: &Self::Brain) -> Genome;

    fn from_genome(&self, topology: &Topology, genome: &Genome) -> Result<Self::Brain>;

    fn new_random_brain<R: Rng + ?Sized>(&self, topology: &Topology, rng: &mut R) -> Self::Brain;
}

/// One layer of a fully connected network.
/// `weights[i][j]` connects neuron `i` of this layer to neuron `j` of the next.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub biases: Vec<f64>,
    pub weights: Vec<Vec<f64>>,
}

/// Layered perceptron parameters, input layer first
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayeredNetwork {
    pub topology: Topology,
    pub layers: Vec<Layer>,
}

impl LayeredNetwork {
    fn build<F: FnMut() -> f64>(topology: &Topology, mut next: F) -> Self {
        let sizes = topology.layers();
        let layers = sizes
            .iter()
            .enumerate()
            .map(|(idx, &size)| {
                let fan_out = sizes.get(idx + 1).copied().unwrap_or(0);
                Layer {
                    biases: (0..size).map(|_| next()).collect(),
                    weights: (0..size)
                        .map(|_| (0..fan_out).map(|_| next()).collect())
                        .collect(),
                }
            })
            .collect();

        LayeredNetwork {
            topology: topology.clone(),
            layers,
        }
    }
}

/// Default codec for `LayeredNetwork` brains
#[derive(Clone, Copy, Debug, Default)]
pub struct PerceptronCodec;

impl GenomeCodec for PerceptronCodec {
    type Brain = LayeredNetwork;

    fn to_genome(&self, brain: &LayeredNetwork) -> Genome {
        let neurons = brain
            .layers
            .iter()
            .flat_map(|layer| layer.biases.iter())
            .map(|&bias| Neuron { bias })
            .collect();
        let connections = brain
            .layers
            .iter()
            .flat_map(|layer| layer.weights.iter().flatten())
            .map(|&weight| Connection { weight })
            .collect();
        Genome {
            neurons,
            connections,
        }
    }

    fn from_genome(&self, topology: &Topology, genome: &Genome) -> Result<LayeredNetwork> {
        let expected = (topology.neuron_count(), topology.connection_count());
        if genome.shape() != expected {
            return Err(EvolutionError::TopologyMismatch {
                left: format!("{:?}", genome.shape()),
                right: format!("{:?}", expected),
            });
        }

        // Neurons layer by layer, connections source-major within each layer pair
        let mut biases = genome.neurons.iter().map(|n| n.bias);
        let mut weights = genome.connections.iter().map(|c| c.weight);
        let sizes = topology.layers();
        let layers = sizes
            .iter()
            .enumerate()
            .map(|(idx, &size)| {
                let fan_out = sizes.get(idx + 1).copied().unwrap_or(0);
                Layer {
                    biases: biases.by_ref().take(size).collect(),
                    weights: (0..size)
                        .map(|_| weights.by_ref().take(fan_out).collect())
                        .collect(),
                }
            })
            .collect();

        Ok(LayeredNetwork {
            topology: topology.clone(),
            layers,
        })
    }

    fn new_random_brain<R: Rng + ?Sized>(&self, topology: &Topology, rng: &mut R) -> LayeredNetwork {
        let spread = Uniform::new(-INIT_SPREAD, INIT_SPREAD);
        LayeredNetwork::build(topology, || spread.sample(&mut *rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_brain_matches_topology() {
        let topology = Topology::new(3, vec![5, 2], 4);
        let mut rng = StdRng::seed_from_u64(7);
        let brain = PerceptronCodec.new_random_brain(&topology, &mut rng);
        let genome = PerceptronCodec.to_genome(&brain);

        assert_eq!(genome.shape(), (topology.neuron_count(), topology.connection_count()));
        assert!(genome
            .biases()
            .iter()
            .chain(genome.weights().iter())
            .all(|v| v.abs() <= INIT_SPREAD));
    }

    #[test]
    fn flattening_is_layer_then_source_major() {
        let topology = Topology::new(2, vec![], 2);
        let genome = Genome::new(vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 11.0, 20.0, 21.0]);
        let brain = PerceptronCodec.from_genome(&topology, &genome).unwrap();

        assert_eq!(brain.layers[0].biases, vec![1.0, 2.0]);
        assert_eq!(brain.layers[0].weights, vec![vec![10.0, 11.0], vec![20.0, 21.0]]);
        assert_eq!(brain.layers[1].biases, vec![3.0, 4.0]);
        assert!(brain.layers[1].weights.iter().all(|w| w.is_empty()));
        assert_eq!(PerceptronCodec.to_genome(&brain), genome);
    }

    #[test]
    fn rejects_genome_of_wrong_length() {
        let topology = Topology::new(2, vec![3], 4);
        let genome = Genome::new(vec![0.0; 9], vec![0.0; 5]);
        assert!(matches!(
            PerceptronCodec.from_genome(&topology, &genome),
            Err(EvolutionError::TopologyMismatch { .. })
        ));
    }
}
