//! Generation Controller
//!
//! Tick-driven loop over a population. While any agent is active the tick
//! just steps agents; on the tick where none are, the controller reports
//! statistics, evolves, resets every agent and advances the generation
//! before stepping the new generation.

use super::engine::{Evolution, EvolutionEngine};
use super::report::ReportSink;
use super::GenerationRecord;
use crate::core::agent::Agent;
use crate::core::config::{GaConfig, SpawnConfig};
use crate::core::error::Result;
use crate::genome::GenomeCodec;
use crate::population::Population;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fittest score published by a restart
pub const RESTART_FITTEST: f64 = -1.0;

/// Statistics for a finished generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// The generation that just finished
    pub generation: u64,
    pub average_fitness: f64,
    pub landed: usize,
    /// `landed / population size`
    pub success_rate: f64,
    pub fittest: f64,
    pub reinitialized: bool,
    /// Mutation rate the next boundary will use
    pub next_mutation_rate: f64,
}

/// What one tick did
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// Generation being simulated after this tick
    pub generation: u64,
    /// Set when this tick crossed a generation boundary
    pub boundary: Option<GenerationStats>,
    /// Slot flagged as best-of-tick
    pub best: Option<usize>,
}

pub struct GenerationController<A, C, R>
where
    A: Agent,
    C: GenomeCodec<Brain = A::Brain>,
    R: Rng,
{
    population: Population<A>,
    engine: EvolutionEngine,
    codec: C,
    rng: R,
    record: GenerationRecord,
    sinks: Vec<Box<dyn ReportSink>>,
}

impl<A, C, R> GenerationController<A, C, R>
where
    A: Agent,
    C: GenomeCodec<Brain = A::Brain>,
    R: Rng,
{
    /// Spawn the population and give every agent a random brain.
    pub fn new<F>(config: GaConfig, codec: C, mut rng: R, factory: F) -> Result<Self>
    where
        F: FnMut(usize, &SpawnConfig) -> A,
    {
        let engine = EvolutionEngine::new(config)?;
        let mut population = Population::spawn(engine.config(), factory)?;
        population.seed_random(&codec, &engine.config().topology, &mut rng);

        info!(
            "🧬 [Generation] Controller ready (max_units={}, top_units={})",
            engine.config().max_units,
            engine.config().top_units
        );

        Ok(GenerationController {
            population,
            engine,
            codec,
            rng,
            record: GenerationRecord::new(),
            sinks: Vec::new(),
        })
    }

    pub fn add_sink(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn population(&self) -> &Population<A> {
        &self.population
    }

    /// Mutable access for the simulation driver (collisions, scoring)
    pub fn population_mut(&mut self) -> &mut Population<A> {
        &mut self.population
    }

    pub fn record(&self) -> &GenerationRecord {
        &self.record
    }

    pub fn generation(&self) -> u64 {
        self.record.generation
    }

    pub fn mutation_rate(&self) -> f64 {
        self.record.mutation_rate(self.engine.config().reduced_mutation_rate)
    }

    pub fn config(&self) -> &GaConfig {
        self.engine.config()
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, delta: f64) -> Result<TickOutcome> {
        let boundary = if self.population.active_count() == 0 {
            Some(self.finish_generation()?)
        } else {
            None
        };

        self.population
            .step_active(delta, self.engine.config().parallel_step);

        let best = self.population.best_index();
        if let Some(agent) = best.and_then(|slot| self.population.agent_mut(slot)) {
            agent.notify_as_best();
        }

        Ok(TickOutcome {
            generation: self.record.generation,
            boundary,
            best,
        })
    }

    /// Start over: generation 1, full-random mutation, fresh brains.
    pub fn restart(&mut self) {
        self.record = GenerationRecord::new();
        self.population.reset_all();
        self.population
            .seed_random(&self.codec, &self.engine.config().topology, &mut self.rng);

        for sink in self.sinks.iter_mut() {
            sink.on_fittest(RESTART_FITTEST);
            sink.on_generation(self.record.generation);
        }
        info!("🔄 [Generation] Restarted at generation 1");
    }

    fn finish_generation(&mut self) -> Result<GenerationStats> {
        let generation = self.record.generation;
        let average_fitness = self.population.mean_fitness();
        let landed = self.population.landed_count();
        let success_rate = landed as f64 / self.population.len() as f64;

        for sink in self.sinks.iter_mut() {
            sink.on_average_fitness(generation, average_fitness);
            sink.on_landed(landed, success_rate);
        }

        let mut evolution: Evolution = self.engine.evolve_generation(
            self.population.candidates(),
            self.record.phase,
            &self.codec,
            &mut self.rng,
        )?;
        let genomes = std::mem::take(&mut evolution.genomes);
        self.population
            .install(&self.codec, &self.engine.config().topology, genomes)?;
        self.population.reset_all();

        let fittest_changed = self.record.advance(&evolution);
        for sink in self.sinks.iter_mut() {
            if fittest_changed {
                sink.on_fittest(evolution.fittest);
            }
            sink.on_generation(self.record.generation);
        }

        info!(
            "🏁 [Generation] {} finished: avg={:.3}, landed={}/{}, fittest={:.3}",
            generation,
            average_fitness,
            landed,
            self.population.len(),
            evolution.fittest
        );

        Ok(GenerationStats {
            generation,
            average_fitness,
            landed,
            success_rate,
            fittest: evolution.fittest,
            reinitialized: evolution.reinitialized,
            next_mutation_rate: self.mutation_rate(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::AgentState;
    use crate::core::config::Topology;
    use crate::evolution::report::{MemorySink, ReportEvent};
    use crate::evolution::MutationPhase;
    use crate::genome::{LayeredNetwork, PerceptronCodec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Lives for `lifetime` ticks and scores a fixed fitness
    struct Scripted {
        lifetime: u32,
        age: u32,
        score: f64,
        land: bool,
        fitness: f64,
        state: AgentState,
        highlighted: u32,
    }

    impl Agent for Scripted {
        type Brain = LayeredNetwork;

        fn reset(&mut self) {
            self.age = 0;
            self.fitness = 0.0;
            self.state = AgentState::Active;
        }

        fn state(&self) -> AgentState {
            self.state
        }

        fn fitness(&self) -> f64 {
            self.fitness
        }

        fn register_brain(&mut self, _brain: LayeredNetwork) {}

        fn update(&mut self, _delta: f64) {
            self.age += 1;
            if self.age >= self.lifetime {
                self.fitness = self.score;
                self.state = if self.land {
                    AgentState::TerminalSuccess
                } else {
                    AgentState::TerminalFailure
                };
            }
        }

        fn notify_as_best(&mut self) {
            self.highlighted += 1;
        }
    }

    fn controller(scores: Vec<f64>, landed: usize) -> GenerationController<Scripted, PerceptronCodec, StdRng> {
        let config = GaConfig::new(scores.len(), 2)
            .with_reproduction(1, 1)
            .with_topology(Topology::new(2, vec![3], 4));
        GenerationController::new(config, PerceptronCodec, StdRng::seed_from_u64(21), |slot, _| Scripted {
            lifetime: 2,
            age: 0,
            score: scores[slot],
            land: slot < landed,
            fitness: 0.0,
            state: AgentState::Active,
            highlighted: 0,
        })
        .unwrap()
    }

    #[test]
    fn boundary_is_detected_once_every_agent_is_terminal() {
        let mut ctl = controller(vec![4.0, 2.0, 6.0, 1.0, 3.0], 1);
        let sink = MemorySink::new();
        ctl.add_sink(Box::new(sink.clone()));

        assert!(ctl.tick(1.0).unwrap().boundary.is_none());
        assert!(ctl.tick(1.0).unwrap().boundary.is_none());
        assert_eq!(ctl.population().active_count(), 0);
        assert_eq!(ctl.generation(), 1);

        let outcome = ctl.tick(1.0).unwrap();
        let stats = outcome.boundary.expect("third tick crosses the boundary");
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.average_fitness, 16.0 / 5.0);
        assert_eq!(stats.landed, 1);
        assert_eq!(stats.success_rate, 0.2);
        assert_eq!(stats.fittest, 6.0);
        assert!(!stats.reinitialized);
        assert_eq!(stats.next_mutation_rate, 0.2);
        assert_eq!(outcome.generation, 2);
        assert_eq!(ctl.generation(), 2);

        // the new generation was reset and stepped once on the same tick
        assert_eq!(ctl.population().active_count(), 5);

        assert_eq!(
            sink.events(),
            vec![
                ReportEvent::AverageFitness { generation: 1, average: 3.2 },
                ReportEvent::Landed { landed: 1, success_rate: 0.2 },
                ReportEvent::Fittest(6.0),
                ReportEvent::Generation(2),
            ]
        );
    }

    #[test]
    fn fittest_is_published_only_when_it_changes() {
        let mut ctl = controller(vec![4.0, 2.0, 6.0, 1.0, 3.0], 0);
        let sink = MemorySink::new();
        ctl.add_sink(Box::new(sink.clone()));

        // two full generations: ticks 1-2 run, tick 3 boundary, tick 4 runs, tick 5 boundary
        for _ in 0..5 {
            ctl.tick(1.0).unwrap();
        }
        assert_eq!(ctl.generation(), 3);
        assert_eq!(sink.fittest(), vec![6.0]);
        assert_eq!(sink.average_fitness().len(), 2);
    }

    #[test]
    fn weak_first_generation_keeps_full_mutation() {
        let mut ctl = controller(vec![-4.0, -2.0, -6.0, -1.0, -3.0], 0);
        for _ in 0..3 {
            ctl.tick(1.0).unwrap();
        }
        assert_eq!(ctl.record().phase, MutationPhase::FullRandom);
        assert_eq!(ctl.mutation_rate(), 1.0);
        assert_eq!(ctl.record().fittest, Some(-1.0));
    }

    #[test]
    fn best_of_tick_is_highlighted() {
        let mut ctl = controller(vec![4.0, 2.0, 6.0, 1.0, 6.0], 0);
        ctl.tick(1.0).unwrap();
        let outcome = ctl.tick(1.0).unwrap();
        // slots 2 and 4 tie; the first one wins
        assert_eq!(outcome.best, Some(2));
        assert_eq!(ctl.population().agent(2).unwrap().highlighted, 1);
    }

    #[test]
    fn restart_resets_the_record() {
        let mut ctl = controller(vec![4.0, 2.0, 6.0, 1.0, 3.0], 0);
        let sink = MemorySink::new();
        ctl.add_sink(Box::new(sink.clone()));
        for _ in 0..3 {
            ctl.tick(1.0).unwrap();
        }
        assert_eq!(ctl.generation(), 2);

        ctl.restart();
        assert_eq!(ctl.generation(), 1);
        assert_eq!(ctl.record().phase, MutationPhase::FullRandom);
        assert!(ctl.record().fittest.is_none());
        assert_eq!(ctl.population().active_count(), 5);
        assert_eq!(sink.fittest(), vec![6.0, RESTART_FITTEST]);
    }
}
