//! Selection: ranking, winner cut-off, and fitness-proportionate picks.

use crate::core::agent::AgentState;
use crate::genome::Genome;
use rand::Rng;
use tracing::debug;

/// A slot's genome together with the outcome of its last run
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Original slot index in the population store
    pub slot: usize,
    pub fitness: f64,
    pub state: AgentState,
    pub genome: Genome,
}

/// Fitness used for ordering: NaN ranks below every real score.
pub fn rank_key(fitness: f64) -> f64 {
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}

/// Sort by descending fitness, NaN last. Equal fitness keeps no particular order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| rank_key(b.fitness).total_cmp(&rank_key(a.fitness)));
}

/// Length of the unbroken run of landed candidates at the head of a ranking
pub fn landed_prefix(ranked: &[Candidate]) -> usize {
    ranked.iter().take_while(|c| c.state.is_success()).count()
}

/// `max(landed_prefix, top_units)`, capped at the population size
pub fn winner_count(ranked: &[Candidate], top_units: usize) -> usize {
    landed_prefix(ranked).max(top_units).min(ranked.len())
}

/// Fitness-proportionate pick for a fixed draw `r` (normally in `[0, 1)`).
///
/// Each fitness is normalised by the sum of all of them and the running
/// total is walked in the given order; the first index whose running total
/// exceeds `r` wins. When nothing exceeds `r` the first index is returned.
///
/// Negative fitness is not filtered: it produces negative or >1 "probabilities"
/// and can push the walk onto the fallback. A zero or non-finite sum goes
/// straight to the fallback. Returns `None` only for an empty slice.
pub fn fitness_proportionate(fitness: &[f64], r: f64) -> Option<usize> {
    if fitness.is_empty() {
        return None;
    }

    let total: f64 = fitness.iter().sum();
    if total == 0.0 || !total.is_finite() {
        debug!("🎲 [Selection] Degenerate fitness sum {}, falling back to first winner", total);
        return Some(0);
    }

    let mut threshold = 0.0;
    for (idx, f) in fitness.iter().enumerate() {
        threshold += f / total;
        if threshold > r {
            return Some(idx);
        }
    }

    debug!("🎲 [Selection] Cumulative mass never exceeded {:.4}, falling back to first winner", r);
    Some(0)
}

/// Fitness-proportionate pick with a fresh draw
pub fn roulette<R: Rng + ?Sized>(fitness: &[f64], rng: &mut R) -> Option<usize> {
    let r: f64 = rng.gen();
    fitness_proportionate(fitness, r)
}
