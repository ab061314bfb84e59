use crate::error::{ConfigError, Result};
use crate::genome::{Crossover, Genome};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Crossover plus the two probabilistic fallbacks that produce one offspring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreedingStrategy {
    pub crossover: Crossover,
    /// Chance to ignore both parents and draw a fresh random genome
    pub reroll_probability: f32,
    /// Chance to apply one point mutation after the genome is built
    pub mutation_probability: f32,
}

impl BreedingStrategy {
    /// Both probabilities must lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("reroll", self.reroll_probability)?;
        check_probability("mutation", self.mutation_probability)
    }

    /// Write one offspring of `parent_a` x `parent_b` into `child`.
    /// Both probability draws are independent.
    ///
    /// Fails with `ConfigError::ProbabilityOutOfRange` if either probability
    /// is outside `[0, 1]`, leaving `child` untouched.
    pub fn breed_into<R: Rng + ?Sized>(
        &self,
        child: &mut Genome,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut R,
    ) -> Result<()> {
        self.validate()?;
        if rng.gen_bool(self.reroll_probability as f64) {
            child.randomize(rng);
        } else {
            child.combine(parent_a, parent_b, self.crossover, rng)?;
        }

        if rng.gen_bool(self.mutation_probability as f64) {
            child.mutate(rng);
        }
        Ok(())
    }

    /// Breed into a fresh genome shaped like `parent_a`
    pub fn breed<R: Rng + ?Sized>(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut R,
    ) -> Result<Genome> {
        let mut child = parent_a.clone();
        self.breed_into(&mut child, parent_a, parent_b, rng)?;
        Ok(child)
    }
}

fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

/// Where the pairing window starts in a ranked population of `n`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowStart {
    /// `floor(n / 2) - 1`
    Half,
    /// `floor(fraction * n)`
    TopFraction(f32),
}

/// Which neighbouring pairs of the ranked population get bred, and how often.
/// Each index `i` in the window breeds `(i, i + 1)` and `(i + 1, i)`,
/// `repeats` times over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairingWindow {
    pub start: WindowStart,
    pub repeats: usize,
}

impl PairingWindow {
    pub fn half() -> Self {
        Self {
            start: WindowStart::Half,
            repeats: 1,
        }
    }

    /// Indices `i` that get paired with `i + 1`, ending at `n - 2` inclusive
    pub fn indices(&self, n: usize) -> Range<usize> {
        if n < 2 {
            return 0..0;
        }
        let start = match self.start {
            WindowStart::Half => (n / 2).saturating_sub(1),
            WindowStart::TopFraction(fraction) => (n as f32 * fraction) as usize,
        };
        let end = n - 1;
        start.min(end)..end
    }

    /// Offspring one pass over the window produces for a population of `n`
    pub fn offspring_count(&self, n: usize) -> usize {
        self.indices(n)
            .len()
            .saturating_mul(self.repeats)
            .saturating_mul(2)
    }
}

/// What happens when the window does not produce exactly the population size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftPolicy {
    /// Keep however many offspring the window produced
    Preserve,
    /// Truncate surplus, or keep cycling the window until the population is refilled
    Resize,
}

impl DriftPolicy {
    pub fn next_size(&self, window: &PairingWindow, current: usize, target: usize) -> usize {
        match self {
            DriftPolicy::Preserve => window.offspring_count(current),
            DriftPolicy::Resize => {
                if window.offspring_count(current) == 0 {
                    0
                } else {
                    target
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parents() -> (Genome, Genome) {
        (
            Genome::from_genes(vec![1, 2, 3, 4], 100).unwrap(),
            Genome::from_genes(vec![5, 6, 7, 8], 100).unwrap(),
        )
    }

    #[test]
    fn plain_split_breeding_is_deterministic() {
        let (a, b) = parents();
        let strategy = BreedingStrategy {
            crossover: Crossover::Split,
            reroll_probability: 0.0,
            mutation_probability: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(strategy.breed(&a, &b, &mut rng).unwrap().genes(), &[1, 2, 7, 8]);
        assert_eq!(strategy.breed(&b, &a, &mut rng).unwrap().genes(), &[5, 6, 3, 4]);
    }

    #[test]
    fn certain_reroll_ignores_parents_but_respects_bounds() {
        let a = Genome::from_genes(vec![0; 64], 3).unwrap();
        let strategy = BreedingStrategy {
            crossover: Crossover::Split,
            reroll_probability: 1.0,
            mutation_probability: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(9);
        let child = strategy.breed(&a, &a, &mut rng).unwrap();
        assert!(child.genes().iter().all(|&g| g <= 3));
        assert!(child.genes().iter().any(|&g| g != 0));
    }

    #[test]
    fn certain_mutation_changes_one_gene() {
        let (a, b) = parents();
        let strategy = BreedingStrategy {
            crossover: Crossover::Split,
            reroll_probability: 0.0,
            mutation_probability: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut mutated = 0;
        for _ in 0..20 {
            let child = strategy.breed(&a, &b, &mut rng).unwrap();
            let differing = child
                .genes()
                .iter()
                .zip([1, 2, 7, 8])
                .filter(|(g, expected)| **g != *expected)
                .count();
            assert!(differing <= 1);
            mutated += differing;
        }
        // a rewrite only lands on the old value 1 time in 101
        assert!(mutated > 0, "mutation never changed a gene");
    }

    #[test]
    fn out_of_range_probabilities_are_errors_not_panics() {
        let (a, b) = parents();
        let mut child = a.clone();
        let mut rng = StdRng::seed_from_u64(0);
        for (reroll, mutation) in [(1.5, 0.0), (0.0, -0.1), (f32::NAN, 0.0)] {
            let strategy = BreedingStrategy {
                crossover: Crossover::Split,
                reroll_probability: reroll,
                mutation_probability: mutation,
            };
            let result = strategy.breed_into(&mut child, &a, &b, &mut rng);
            assert!(matches!(
                result,
                Err(crate::error::EngineError::Configuration(
                    ConfigError::ProbabilityOutOfRange { .. }
                ))
            ));
            assert_eq!(child, a);
        }
    }

    #[test]
    fn breeding_propagates_shape_errors() {
        let a = Genome::from_genes(vec![1, 2, 3], 10).unwrap();
        let b = Genome::from_genes(vec![1, 2], 10).unwrap();
        let strategy = BreedingStrategy {
            crossover: Crossover::Uniform,
            reroll_probability: 0.0,
            mutation_probability: 0.0,
        };
        assert!(strategy.breed(&a, &b, &mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn half_window_on_ten_agents_breeds_five_pairs() {
        let window = PairingWindow::half();
        assert_eq!(window.indices(10), 4..9);
        assert_eq!(window.offspring_count(10), 10);
    }

    #[test]
    fn half_window_drifts_on_odd_populations() {
        let window = PairingWindow::half();
        assert_eq!(window.indices(5), 1..4);
        assert_eq!(window.offspring_count(5), 6);
        assert_eq!(window.offspring_count(6), 6);
        assert_eq!(window.offspring_count(2), 2);
    }

    #[test]
    fn top_fraction_window_with_repeats() {
        let window = PairingWindow {
            start: WindowStart::TopFraction(0.9),
            repeats: 5,
        };
        assert_eq!(window.indices(50), 45..49);
        assert_eq!(window.offspring_count(50), 40);
        assert_eq!(window.offspring_count(10), 0);
    }

    #[test]
    fn resize_refills_only_a_productive_window() {
        let window = PairingWindow {
            start: WindowStart::TopFraction(0.9),
            repeats: 5,
        };
        assert_eq!(DriftPolicy::Resize.next_size(&window, 50, 50), 50);
        assert_eq!(DriftPolicy::Resize.next_size(&window, 10, 10), 0);
        assert_eq!(DriftPolicy::Preserve.next_size(&window, 50, 50), 40);
    }
}
