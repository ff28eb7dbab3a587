//! Population Store
//!
//! Fixed-size, slot-addressed arena of agents and the genomes their brains
//! were built from. Agents are created once and never replaced; only their
//! brains change between generations.

use crate::core::agent::Agent;
use crate::core::config::{GaConfig, SpawnConfig, Topology};
use crate::core::error::{EvolutionError, Result};
use crate::evolution::selection::Candidate;
use crate::genome::{Genome, GenomeCodec};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

pub struct Population<A: Agent> {
    agents: Vec<A>,
    /// Genome behind each slot's current brain
    genomes: Vec<Genome>,
}

impl<A: Agent> Population<A> {
    /// Build `max_units` agents at the configured spawn point.
    /// Slots hold empty genomes until `seed_random` or `install` runs.
    pub fn spawn<F>(config: &GaConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut(usize, &SpawnConfig) -> A,
    {
        config.validate()?;
        let agents: Vec<A> = (0..config.max_units)
            .map(|slot| factory(slot, &config.spawn))
            .collect();
        info!("🌱 [Population] Spawned {} agents", agents.len());

        Ok(Population {
            genomes: vec![Genome::default(); agents.len()],
            agents,
        })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// All agents in slot order
    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    pub fn agent(&self, slot: usize) -> Option<&A> {
        self.agents.get(slot)
    }

    pub fn agent_mut(&mut self, slot: usize) -> Option<&mut A> {
        self.agents.get_mut(slot)
    }

    pub fn genome(&self, slot: usize) -> Option<&Genome> {
        self.genomes.get(slot)
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Give every slot a fresh random brain and reset its agent.
    pub fn seed_random<C, R>(&mut self, codec: &C, topology: &Topology, rng: &mut R)
    where
        C: GenomeCodec<Brain = A::Brain>,
        R: Rng + ?Sized,
    {
        for (agent, genome) in self.agents.iter_mut().zip(self.genomes.iter_mut()) {
            let brain = codec.new_random_brain(topology, &mut *rng);
            *genome = codec.to_genome(&brain);
            agent.reset();
            agent.register_brain(brain);
        }
        debug!("🎲 [Population] Seeded {} random brains", self.agents.len());
    }

    /// Replace every slot's brain with one built from `genomes[slot]`.
    ///
    /// All brains are decoded before any agent is touched, so a bad genome
    /// leaves the population as it was.
    pub fn install<C>(&mut self, codec: &C, topology: &Topology, genomes: Vec<Genome>) -> Result<()>
    where
        C: GenomeCodec<Brain = A::Brain>,
    {
        if genomes.len() != self.agents.len() {
            return Err(EvolutionError::PopulationSize {
                expected: self.agents.len(),
                actual: genomes.len(),
            });
        }

        let brains = genomes
            .iter()
            .map(|genome| codec.from_genome(topology, genome))
            .collect::<Result<Vec<_>>>()?;

        for (agent, brain) in self.agents.iter_mut().zip(brains) {
            agent.register_brain(brain);
        }
        self.genomes = genomes;
        Ok(())
    }

    /// Return every agent to its spawn state; brains are kept.
    pub fn reset_all(&mut self) {
        self.agents.iter_mut().for_each(|agent| agent.reset());
    }

    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.state().is_active()).count()
    }

    pub fn landed_count(&self) -> usize {
        self.agents.iter().filter(|a| a.state().is_success()).count()
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.agents.iter().map(|a| a.fitness()).sum::<f64>() / self.agents.len() as f64
    }

    /// Index of the fittest agent; the first maximum wins ties.
    /// Terminal agents are scanned too, so a landed agent can stay highlighted.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (slot, agent) in self.agents.iter().enumerate() {
            let fitness = agent.fitness();
            let better = match best {
                None => !fitness.is_nan(),
                Some((_, top)) => fitness > top,
            };
            if better {
                best = Some((slot, fitness));
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// Snapshot of every slot for the evolution engine. Genomes are copied.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.agents
            .iter()
            .zip(self.genomes.iter())
            .enumerate()
            .map(|(slot, (agent, genome))| Candidate {
                slot,
                fitness: agent.fitness(),
                state: agent.state(),
                genome: genome.clone(),
            })
            .collect()
    }

    /// Step every active agent once. The parallel path returns only after
    /// every agent has been updated.
    pub fn step_active(&mut self, delta: f64, parallel: bool) {
        if parallel {
            self.agents
                .par_iter_mut()
                .filter(|agent| agent.state().is_active())
                .for_each(|agent| agent.update(delta));
        } else {
            self.agents
                .iter_mut()
                .filter(|agent| agent.state().is_active())
                .for_each(|agent| agent.update(delta));
        }
    }
}
