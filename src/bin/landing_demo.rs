//! Landing demo: evolves brains for a toy one-dimensional lander.
//!
//! Usage: `landing_demo [config.json] [generations] [seed]`
//!
//! Each lander starts at the configured spawn altitude and falls under
//! gravity. The brain sees altitude, vertical speed and remaining fuel and
//! decides whether to fire the main engine. Touching down slowly lands;
//! anything else crashes.

use anyhow::Context;
use landerswarm_core::{
    setup_logging, Agent, AgentState, GaConfig, GenerationController, LayeredNetwork, MemorySink,
    PerceptronCodec, SpawnConfig, TracingSink,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

const DELTA: f64 = 0.1;
const GRAVITY: f64 = 1.6;
const THRUST: f64 = 4.0;
const FUEL: f64 = 20.0;
const SAFE_SPEED: f64 = 2.0;
const MAX_TICKS: u32 = 2_000;
const DEFAULT_GENERATIONS: u64 = 20;

/// Output neuron that fires the main engine
const THRUST_OUTPUT: usize = 2;

struct Lander {
    spawn: SpawnConfig,
    brain: Option<LayeredNetwork>,
    altitude: f64,
    velocity: f64,
    fuel: f64,
    ticks: u32,
    fitness: f64,
    state: AgentState,
}

impl Lander {
    fn new(spawn: SpawnConfig) -> Self {
        let mut lander = Lander {
            spawn,
            brain: None,
            altitude: 0.0,
            velocity: 0.0,
            fuel: 0.0,
            ticks: 0,
            fitness: 0.0,
            state: AgentState::Active,
        };
        lander.reset();
        lander
    }

    fn sensors(&self, width: usize) -> Vec<f64> {
        let mut inputs = vec![
            self.altitude / self.spawn.y.max(1.0),
            self.velocity / 10.0,
            self.fuel / FUEL,
        ];
        inputs.resize(width, 0.0);
        inputs
    }

    fn fire_engine(&self) -> bool {
        let Some(brain) = self.brain.as_ref() else {
            return false;
        };
        let outputs = forward(brain, &self.sensors(brain.topology.input));
        outputs.get(THRUST_OUTPUT).is_some_and(|&o| o > 0.5)
    }

    fn touch_down(&mut self) {
        let impact = self.velocity.abs();
        if impact <= SAFE_SPEED {
            self.state = AgentState::TerminalSuccess;
            self.fitness = 100.0 + self.fuel;
        } else {
            self.state = AgentState::TerminalFailure;
            self.fitness = -impact;
        }
    }
}

impl Agent for Lander {
    type Brain = LayeredNetwork;

    fn reset(&mut self) {
        self.altitude = self.spawn.y;
        self.velocity = self.spawn.velocity_y;
        self.fuel = FUEL;
        self.ticks = 0;
        self.fitness = 0.0;
        self.state = AgentState::Active;
    }

    fn state(&self) -> AgentState {
        self.state
    }

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn register_brain(&mut self, brain: LayeredNetwork) {
        self.brain = Some(brain);
    }

    fn update(&mut self, delta: f64) {
        let mut acceleration = -GRAVITY;
        if self.fuel > 0.0 && self.fire_engine() {
            acceleration += THRUST;
            self.fuel = (self.fuel - delta).max(0.0);
        }
        self.velocity += acceleration * delta;
        self.altitude += self.velocity * delta;
        self.ticks += 1;

        if self.altitude <= 0.0 {
            self.touch_down();
        } else if self.ticks >= MAX_TICKS || self.altitude > self.spawn.y * 4.0 {
            // hovering forever or flying off counts as a failure
            self.state = AgentState::TerminalFailure;
            self.fitness = -self.altitude;
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Input layer passes through; every later neuron is `sigmoid(bias + sum)`.
fn forward(brain: &LayeredNetwork, inputs: &[f64]) -> Vec<f64> {
    let mut activations = inputs.to_vec();
    for pair in brain.layers.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        activations = to
            .biases
            .iter()
            .enumerate()
            .map(|(j, bias)| {
                let sum: f64 = activations
                    .iter()
                    .zip(from.weights.iter())
                    .map(|(a, w)| a * w[j])
                    .sum();
                sigmoid(bias + sum)
            })
            .collect();
    }
    activations
}

fn main() -> anyhow::Result<()> {
    setup_logging(std::env::var("RUST_LOG").ok());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
            GaConfig::from_json_str(&raw).with_context(|| format!("parsing config {}", path))?
        }
        None => GaConfig::default(),
    };
    let generations: u64 = match args.get(1) {
        Some(raw) => raw.parse().context("generation count")?,
        None => DEFAULT_GENERATIONS,
    };
    let rng = match args.get(2) {
        Some(raw) => StdRng::seed_from_u64(raw.parse().context("seed")?),
        None => StdRng::from_entropy(),
    };

    let memory = MemorySink::new();
    let mut controller = GenerationController::new(config, PerceptronCodec, rng, |_, spawn| {
        Lander::new(spawn.clone())
    })?
    .with_sink(Box::new(TracingSink))
    .with_sink(Box::new(memory.clone()));

    info!("🛰️ [Demo] Running {} generations", generations);
    while controller.generation() <= generations {
        let outcome = controller.tick(DELTA)?;
        if let Some(stats) = outcome.boundary {
            info!(
                "🛬 [Demo] Generation {}: landed {}, best {:.2}, next mutation rate {:.2}",
                stats.generation, stats.landed, stats.fittest, stats.next_mutation_rate
            );
        }
    }

    println!("{}", memory.to_json());
    Ok(())
}
