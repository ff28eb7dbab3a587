use crate::core::agent::AgentState;
use crate::core::config::GaConfig;
use crate::core::error::EvolutionError;
use crate::evolution::selection::Candidate;
use crate::evolution::{EvolutionEngine, GenerationRecord};
use crate::genome::{Genome, GenomeCodec, PerceptronCodec};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn to_py_err(err: EvolutionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Evolution engine for Python-side simulations.
///
/// Genomes cross the boundary as JSON strings in slot order; the Python
/// driver owns the simulation and the forward pass.
#[pyclass]
pub struct PyGeneticAlgorithm {
    engine: EvolutionEngine,
    record: GenerationRecord,
    rng: StdRng,
}

#[pymethods]
impl PyGeneticAlgorithm {
    #[new]
    #[pyo3(signature = (config_json = None, seed = None))]
    pub fn new(config_json: Option<String>, seed: Option<u64>) -> PyResult<Self> {
        let config = match config_json {
            Some(raw) => GaConfig::from_json_str(&raw).map_err(|e| to_py_err(e.into()))?,
            None => GaConfig::default(),
        };
        let engine = EvolutionEngine::new(config).map_err(to_py_err)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(PyGeneticAlgorithm {
            engine,
            record: GenerationRecord::new(),
            rng,
        })
    }

    /// One fresh random genome per slot
    pub fn random_genomes(&mut self) -> PyResult<Vec<String>> {
        let topology = self.engine.config().topology.clone();
        (0..self.engine.config().max_units)
            .map(|_| {
                let brain = PerceptronCodec.new_random_brain(&topology, &mut self.rng);
                PerceptronCodec.to_genome(&brain).to_json().map_err(to_py_err)
            })
            .collect()
    }

    /// Evolve one scored generation; returns the next genomes in slot order.
    pub fn evolve(&mut self, genomes: Vec<String>, fitness: Vec<f64>, landed: Vec<bool>) -> PyResult<Vec<String>> {
        if genomes.len() != fitness.len() || genomes.len() != landed.len() {
            return Err(PyValueError::new_err("genomes, fitness and landed must have equal length"));
        }

        let candidates = genomes
            .iter()
            .zip(fitness.iter().zip(landed.iter()))
            .enumerate()
            .map(|(slot, (raw, (&fitness, &landed)))| {
                Ok(Candidate {
                    slot,
                    fitness,
                    state: if landed {
                        AgentState::TerminalSuccess
                    } else {
                        AgentState::TerminalFailure
                    },
                    genome: Genome::from_json(raw)?,
                })
            })
            .collect::<Result<Vec<_>, EvolutionError>>()
            .map_err(to_py_err)?;

        let evolution = self
            .engine
            .evolve_generation(candidates, self.record.phase, &PerceptronCodec, &mut self.rng)
            .map_err(to_py_err)?;
        self.record.advance(&evolution);

        evolution
            .genomes
            .iter()
            .map(|g| g.to_json().map_err(to_py_err))
            .collect()
    }

    #[getter]
    pub fn generation(&self) -> u64 {
        self.record.generation
    }

    #[getter]
    pub fn mutation_rate(&self) -> f64 {
        self.record.mutation_rate(self.engine.config().reduced_mutation_rate)
    }

    #[getter]
    pub fn fittest(&self) -> Option<f64> {
        self.record.fittest
    }

    pub fn __repr__(&self) -> String {
        format!(
            "GeneticAlgorithm(gen={}, mutation_rate={:.2})",
            self.record.generation,
            self.mutation_rate()
        )
    }
}

/// Initialize tracing from Python.
#[pyfunction]
#[pyo3(name = "setup_logging", signature = (level = None))]
pub fn py_setup_logging(level: Option<String>) {
    crate::setup_logging(level);
}
