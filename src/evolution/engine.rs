//! Evolution Engine
//!
//! Turns one scored generation into the next one's genomes: rank, keep the
//! winners, breed the remaining slots, mutate every offspring, and write the
//! result back in slot order.

use super::operators::{crossover, mutate, random_int};
use super::selection::{landed_prefix, rank, rank_key, roulette, winner_count, Candidate};
use super::MutationPhase;
use crate::core::config::GaConfig;
use crate::core::error::{EvolutionError, Result};
use crate::genome::{Genome, GenomeCodec};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How a slot's new genome was produced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lineage {
    /// Winner carried over unchanged
    Elite,
    /// Crossover of the two fittest winners, then mutation
    TopCrossover,
    /// Crossover of two uniformly drawn winners, then mutation
    RandomCrossover,
    /// Fitness-proportionate clone of one winner, then mutation
    Clone,
    /// Brand-new random genome from a population reset
    Fresh,
}

/// Result of evolving one generation
#[derive(Clone, Debug)]
pub struct Evolution {
    /// New genomes, indexed by slot
    pub genomes: Vec<Genome>,
    /// Provenance of each slot's genome, indexed by slot
    pub lineage: Vec<Lineage>,
    /// `ranking[i]` is the slot that ranked `i`-th by fitness
    pub ranking: Vec<usize>,
    pub winners: usize,
    /// Unbroken run of landed agents at the head of the ranking
    pub landed_prefix: usize,
    /// Best fitness of the generation that was just scored
    pub fittest: f64,
    /// Mutation phase the next boundary should use
    pub phase: MutationPhase,
    /// True when the whole population was replaced by fresh genomes
    pub reinitialized: bool,
}

/// Selection, elitism, crossover and mutation over a fixed-size population
#[derive(Clone, Debug)]
pub struct EvolutionEngine {
    config: GaConfig,
}

impl EvolutionEngine {
    pub fn new(config: GaConfig) -> Result<Self> {
        config.validate()?;
        Ok(EvolutionEngine { config })
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Produce the next generation's genomes from scored candidates.
    ///
    /// `candidates` must hold exactly one entry per slot. Elites are cloned
    /// out of the candidates, so nothing returned aliases the input.
    pub fn evolve_generation<C, R>(
        &self,
        mut candidates: Vec<Candidate>,
        phase: MutationPhase,
        codec: &C,
        rng: &mut R,
    ) -> Result<Evolution>
    where
        C: GenomeCodec,
        R: Rng + ?Sized,
    {
        let max_units = self.config.max_units;
        if candidates.len() != max_units {
            return Err(EvolutionError::PopulationSize {
                expected: max_units,
                actual: candidates.len(),
            });
        }

        rank(&mut candidates);
        let ranking: Vec<usize> = candidates.iter().map(|c| c.slot).collect();
        let landed = landed_prefix(&candidates);
        let winners = winner_count(&candidates, self.config.top_units);
        // an all-NaN generation reads as -inf so the degenerate guard still sees it
        let fittest = rank_key(candidates[0].fitness);

        if phase == MutationPhase::FullRandom && fittest < 0.0 {
            warn!(
                "🧟 [Evolution] Brains too weak to evolve (best={:.3}), reinitialising {} genomes",
                fittest, max_units
            );
            let genomes = (0..max_units)
                .map(|_| {
                    let brain = codec.new_random_brain(&self.config.topology, &mut *rng);
                    codec.to_genome(&brain)
                })
                .collect();
            return Ok(Evolution {
                genomes,
                lineage: vec![Lineage::Fresh; max_units],
                ranking,
                winners,
                landed_prefix: landed,
                fittest,
                phase,
                reinitialized: true,
            });
        }

        let phase = MutationPhase::Reduced;
        let rate = phase.rate(self.config.reduced_mutation_rate);
        let pool = &candidates[..winners];
        let pool_fitness: Vec<f64> = pool.iter().map(|c| c.fitness).collect();

        // Offspring in ranked order; position i later lands in slot ranking[i]
        let mut produced: Vec<(Genome, Lineage)> = Vec::with_capacity(max_units);
        produced.extend(pool.iter().map(|c| (c.genome.clone(), Lineage::Elite)));

        let top_end = winners + self.config.top_winners_count;
        let clone_start = max_units.saturating_sub(self.config.crossover_winner_count);
        for i in winners..max_units {
            let (mut offspring, lineage) = if i < top_end {
                (crossover(&pool[0].genome, &pool[1].genome, rng)?, Lineage::TopCrossover)
            } else if i < clone_start {
                let a = random_int(rng, 0, winners - 1);
                let b = random_int(rng, 0, winners - 1);
                (crossover(&pool[a].genome, &pool[b].genome, rng)?, Lineage::RandomCrossover)
            } else {
                let pick = roulette(&pool_fitness, rng).unwrap_or(0);
                (pool[pick].genome.clone(), Lineage::Clone)
            };
            mutate(&mut offspring, rate, rng);
            debug!("🧪 [Evolution] Position {} -> slot {} via {:?}", i, ranking[i], lineage);
            produced.push((offspring, lineage));
        }

        let mut genomes = vec![Genome::default(); max_units];
        let mut lineage = vec![Lineage::Elite; max_units];
        for (position, (genome, origin)) in produced.into_iter().enumerate() {
            let slot = ranking[position];
            genomes[slot] = genome;
            lineage[slot] = origin;
        }

        info!(
            "🏆 [Evolution] Generation best={:.3}, winners={}, landed prefix={}, mutation rate={:.2}",
            fittest, winners, landed, rate
        );

        Ok(Evolution {
            genomes,
            lineage,
            ranking,
            winners,
            landed_prefix: landed,
            fittest,
            phase,
            reinitialized: false,
        })
    }
}
