//! Genetic operators: single-point bias crossover and multiplicative mutation.
//!
//! Every random integer is derived from one unit-float draw, so a run is
//! fully determined by the sequence of `f64` draws from the rng.

use crate::core::error::Result;
use crate::genome::Genome;
use rand::Rng;

/// Uniform integer in `[min, max]` (inclusive) from a single draw
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    debug_assert!(min <= max);
    let span = max - min;
    let offset = (rng.gen::<f64>() * (span + 1) as f64) as usize;
    min + offset.min(span)
}

/// Swap every bias at index `>= cut` between the two parents.
/// Connection weights are left alone.
pub fn crossover_at(parent_a: &mut Genome, parent_b: &mut Genome, cut: usize) -> Result<()> {
    parent_a.ensure_same_shape(parent_b)?;
    let tail_a = parent_a.neurons.iter_mut().skip(cut);
    let tail_b = parent_b.neurons.iter_mut().skip(cut);
    for (a, b) in tail_a.zip(tail_b) {
        std::mem::swap(&mut a.bias, &mut b.bias);
    }
    Ok(())
}

/// Single-point crossover on copies of the parents.
///
/// The cut is uniform in `[0, neurons - 1]`; a coin flip then picks which
/// of the two post-swap genomes is returned.
pub fn crossover<R: Rng + ?Sized>(parent_a: &Genome, parent_b: &Genome, rng: &mut R) -> Result<Genome> {
    let mut a = parent_a.clone();
    let mut b = parent_b.clone();
    a.ensure_same_shape(&b)?;

    let cut = match a.neurons.len() {
        0 => 0,
        n => random_int(rng, 0, n - 1),
    };
    crossover_at(&mut a, &mut b, cut)?;

    Ok(if random_int(rng, 0, 1) == 1 { a } else { b })
}

/// With probability `rate`, scale the gene by `1 + ((u1 - 0.5) * 3 + u2 - 0.5)`.
pub fn mutate_gene<R: Rng + ?Sized>(gene: f64, rate: f64, rng: &mut R) -> f64 {
    if rng.gen::<f64>() < rate {
        let u1: f64 = rng.gen();
        let u2: f64 = rng.gen();
        gene * (1.0 + ((u1 - 0.5) * 3.0 + u2 - 0.5))
    } else {
        gene
    }
}

/// Mutate every bias, then every weight, independently.
pub fn mutate<R: Rng + ?Sized>(genome: &mut Genome, rate: f64, rng: &mut R) {
    for neuron in genome.neurons.iter_mut() {
        neuron.bias = mutate_gene(neuron.bias, rate, rng);
    }
    for connection in genome.connections.iter_mut() {
        connection.weight = mutate_gene(connection.weight, rate, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EvolutionError;
    use crate::evolution::scenario_test::ScriptedRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parents() -> (Genome, Genome) {
        (
            Genome::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![0.1, 0.2]),
            Genome::new(vec![-1.0, -2.0, -3.0, -4.0, -5.0], vec![-0.1, -0.2]),
        )
    }

    #[test]
    fn random_int_covers_inclusive_range() {
        let mut rng = ScriptedRng::new(&[0.0, 0.49, 0.5, 0.999_999]);
        assert_eq!(random_int(&mut rng, 0, 1), 0);
        assert_eq!(random_int(&mut rng, 0, 1), 0);
        assert_eq!(random_int(&mut rng, 0, 1), 1);
        assert_eq!(random_int(&mut rng, 3, 7), 7);
    }

    #[test]
    fn crossover_at_swaps_tail_biases_only() {
        let (mut a, mut b) = parents();
        crossover_at(&mut a, &mut b, 2).unwrap();

        assert_eq!(a.biases(), vec![1.0, 2.0, -3.0, -4.0, -5.0]);
        assert_eq!(b.biases(), vec![-1.0, -2.0, 3.0, 4.0, 5.0]);
        assert_eq!(a.weights(), vec![0.1, 0.2]);
        assert_eq!(b.weights(), vec![-0.1, -0.2]);
    }

    #[test]
    fn crossover_with_fixed_draws() {
        let (a, b) = parents();
        // cut = floor(0.7 * 5) = 3, coin 0.7 -> first parent's post-swap genome
        let mut rng = ScriptedRng::new(&[0.7, 0.7]);
        let child = crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(child.biases(), vec![1.0, 2.0, 3.0, -4.0, -5.0]);

        // cut = 3, coin 0.2 -> second parent's post-swap genome
        let mut rng = ScriptedRng::new(&[0.7, 0.2]);
        let child = crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(child.biases(), vec![-1.0, -2.0, -3.0, 4.0, 5.0]);
        assert_eq!(child.weights(), b.weights());
    }

    #[test]
    fn crossover_at_zero_swaps_every_bias() {
        let (a, b) = parents();
        let mut rng = ScriptedRng::new(&[0.0, 0.9]);
        let child = crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(child.biases(), b.biases());
        assert_eq!(child.weights(), a.weights());
    }

    #[test]
    fn crossover_leaves_parents_untouched() {
        let (a, b) = parents();
        let mut rng = StdRng::seed_from_u64(3);
        let _ = crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(a, parents().0);
        assert_eq!(b, parents().1);
    }

    #[test]
    fn crossover_rejects_mismatched_parents() {
        let (a, _) = parents();
        let short = Genome::new(vec![0.0; 4], vec![0.0; 2]);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            crossover(&a, &short, &mut rng),
            Err(EvolutionError::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn mutate_gene_applies_multiplicative_factor() {
        // hit (0.1 < 0.5), factor = 1 + ((0.75 - 0.5) * 3 + 0.25 - 0.5) = 1.5
        let mut rng = ScriptedRng::new(&[0.1, 0.75, 0.25]);
        assert_eq!(mutate_gene(2.0, 0.5, &mut rng), 3.0);

        // miss: only one draw consumed
        let mut rng = ScriptedRng::new(&[0.9]);
        assert_eq!(mutate_gene(2.0, 0.5, &mut rng), 2.0);
    }

    #[test]
    fn mutation_can_flip_sign() {
        // factor = 1 + ((0.0 - 0.5) * 3 + 0.0 - 0.5) = -1
        let mut rng = ScriptedRng::new(&[0.0, 0.0, 0.0]);
        assert_eq!(mutate_gene(4.0, 1.0, &mut rng), -4.0);
    }

    #[test]
    fn zero_rate_never_mutates() {
        let (mut a, _) = parents();
        let mut rng = StdRng::seed_from_u64(11);
        mutate(&mut a, 0.0, &mut rng);
        assert_eq!(a, parents().0);
    }

    #[test]
    fn full_rate_touches_every_gene() {
        let (mut a, _) = parents();
        let original = a.clone();
        let mut rng = StdRng::seed_from_u64(11);
        mutate(&mut a, 1.0, &mut rng);
        let changed = a
            .biases()
            .iter()
            .zip(original.biases().iter())
            .filter(|(x, y)| x != y)
            .count();
        assert_eq!(changed, original.neurons.len());
    }
}
