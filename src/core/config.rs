use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Number of output neurons every brain carries (thrust left/right/up, idle)
pub const OUTPUT_SIZE: usize = 4;

/// Layer sizes shared by every genome in a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub input: usize,
    pub hidden: Vec<usize>,
    pub output: usize,
}

impl Topology {
    pub fn new(input: usize, hidden: Vec<usize>, output: usize) -> Self {
        Topology {
            input,
            hidden,
            output,
        }
    }

    /// All layer sizes, input first
    pub fn layers(&self) -> Vec<usize> {
        let mut layers = Vec::with_capacity(self.hidden.len() + 2);
        layers.push(self.input);
        layers.extend(self.hidden.iter().copied());
        layers.push(self.output);
        layers
    }

    pub fn neuron_count(&self) -> usize {
        self.layers().iter().sum()
    }

    /// Fully connected between consecutive layers
    pub fn connection_count(&self) -> usize {
        self.layers().windows(2).map(|w| w[0] * w[1]).sum()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Topology::new(6, vec![8], OUTPUT_SIZE)
    }
}

/// Transient state every agent returns to on reset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            x: 200.0,
            y: 80.0,
            rotation: 0.0,
            velocity_x: 2.0,
            velocity_y: 0.0,
        }
    }
}

/// Hyperparameters for a genetic-algorithm run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Fixed population size
    pub max_units: usize,
    /// Minimum number of winners kept each generation
    pub top_units: usize,
    /// Slots right after the elites bred from the two fittest winners
    pub top_winners_count: usize,
    /// Final slots filled by fitness-proportionate cloning
    pub crossover_winner_count: usize,
    /// Per-gene mutation probability once the population stops being hopeless
    pub reduced_mutation_rate: f64,
    pub topology: Topology,
    pub spawn: SpawnConfig,
    /// Step active agents on the rayon pool instead of sequentially
    pub parallel_step: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        GaConfig {
            max_units: 30,
            top_units: 5,
            top_winners_count: 3,
            crossover_winner_count: 5,
            reduced_mutation_rate: 0.2,
            topology: Topology::default(),
            spawn: SpawnConfig::default(),
            parallel_step: false,
        }
    }
}

impl GaConfig {
    pub fn new(max_units: usize, top_units: usize) -> Self {
        GaConfig {
            max_units,
            top_units,
            ..Self::default()
        }
    }

    pub fn with_reproduction(mut self, top_winners_count: usize, crossover_winner_count: usize) -> Self {
        self.top_winners_count = top_winners_count;
        self.crossover_winner_count = crossover_winner_count;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GaConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_units == 0 || self.top_units > self.max_units {
            return Err(ConfigError::TopUnitsOutOfRange {
                top_units: self.top_units,
                max_units: self.max_units,
            });
        }

        let requested = self.top_winners_count + self.crossover_winner_count;
        let available = self.max_units - self.top_units;
        if requested > available {
            return Err(ConfigError::ReproductionOverflow {
                requested,
                available,
            });
        }

        if self.top_winners_count > 0 && self.top_units < 2 {
            return Err(ConfigError::CrossoverNeedsTwoWinners);
        }

        if !(0.0..=1.0).contains(&self.reduced_mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.reduced_mutation_rate));
        }

        if self.topology.output != OUTPUT_SIZE {
            return Err(ConfigError::OutputSize(self.topology.output));
        }

        if let Some(layer) = self.topology.layers().iter().position(|&n| n == 0) {
            return Err(ConfigError::EmptyLayer(layer));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_or_oversized_top_units() {
        assert!(matches!(
            GaConfig::new(10, 0).validate(),
            Err(ConfigError::TopUnitsOutOfRange { .. })
        ));
        assert!(matches!(
            GaConfig::new(10, 11).with_reproduction(0, 0).validate(),
            Err(ConfigError::TopUnitsOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_reproduction_overflow() {
        let config = GaConfig::new(10, 4).with_reproduction(4, 3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ReproductionOverflow { requested: 7, available: 6 })
        ));
        assert!(GaConfig::new(10, 4).with_reproduction(3, 3).validate().is_ok());
    }

    #[test]
    fn top_crossover_needs_two_winners() {
        let config = GaConfig::new(10, 1).with_reproduction(1, 0);
        assert!(matches!(config.validate(), Err(ConfigError::CrossoverNeedsTwoWinners)));
        assert!(GaConfig::new(10, 1).with_reproduction(0, 2).validate().is_ok());
    }

    #[test]
    fn rejects_empty_hidden_layer() {
        let config = GaConfig::default().with_topology(Topology::new(3, vec![4, 0], 4));
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLayer(2))));
    }

    #[test]
    fn rejects_output_layer_other_than_four() {
        let config = GaConfig::default().with_topology(Topology::new(6, vec![8], 2));
        assert!(matches!(config.validate(), Err(ConfigError::OutputSize(2))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = GaConfig::from_json_str(r#"{"max_units": 12, "top_units": 3}"#).unwrap();
        assert_eq!(config.max_units, 12);
        assert_eq!(config.top_units, 3);
        assert_eq!(config.topology, Topology::default());

        let err = GaConfig::from_json_str(r#"{"max_units": 2, "top_units": 3}"#).unwrap_err();
        assert!(matches!(err, ConfigError::TopUnitsOutOfRange { .. }));
    }

    #[test]
    fn topology_counts() {
        let topology = Topology::new(3, vec![5], 4);
        assert_eq!(topology.neuron_count(), 12);
        assert_eq!(topology.connection_count(), 3 * 5 + 5 * 4);
    }
}
