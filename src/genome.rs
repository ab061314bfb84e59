use crate::error::{EngineError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How two parents are mixed into one offspring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    /// First `len / 2` genes from parent A, the rest from parent B
    Split,
    /// Fair coin flip per gene
    Uniform,
}

/// A genome is a fixed-length sequence of integer genes, each in `[0, max_value]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    genes: Vec<u32>,
    max_value: u32,
}

impl Genome {
    /// Create a new random genome
    pub fn random<R: Rng + ?Sized>(length: usize, max_value: u32, rng: &mut R) -> Result<Self> {
        if length == 0 {
            return Err(crate::error::ConfigError::EmptyGenome.into());
        }
        let mut genome = Self {
            genes: vec![0; length],
            max_value,
        };
        genome.randomize(rng);
        Ok(genome)
    }

    /// Build a genome from explicit gene values
    pub fn from_genes(genes: Vec<u32>, max_value: u32) -> Result<Self> {
        if genes.is_empty() {
            return Err(crate::error::ConfigError::EmptyGenome.into());
        }
        if let Some(&value) = genes.iter().find(|&&g| g > max_value) {
            return Err(EngineError::GeneOutOfRange { value, max: max_value });
        }
        Ok(Self { genes, max_value })
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    pub fn genes(&self) -> &[u32] {
        &self.genes
    }

    pub fn get(&self, index: usize) -> Result<u32> {
        self.genes
            .get(index)
            .copied()
            .ok_or(EngineError::IndexOutOfRange { index, len: self.genes.len() })
    }

    pub fn set(&mut self, index: usize, value: u32) -> Result<()> {
        if value > self.max_value {
            return Err(EngineError::GeneOutOfRange { value, max: self.max_value });
        }
        let len = self.genes.len();
        let gene = self
            .genes
            .get_mut(index)
            .ok_or(EngineError::IndexOutOfRange { index, len })?;
        *gene = value;
        Ok(())
    }

    /// Overwrite every gene with a fresh uniform value
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let max = self.max_value;
        for gene in &mut self.genes {
            *gene = rng.gen_range(0..=max);
        }
    }

    /// Rewrite exactly one randomly chosen gene.
    /// With `max_value == 0` the value necessarily stays 0.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let index = rng.gen_range(0..self.genes.len());
        self.genes[index] = rng.gen_range(0..=self.max_value);
    }

    /// Fill this genome from two parents of identical shape
    pub fn combine<R: Rng + ?Sized>(
        &mut self,
        parent_a: &Genome,
        parent_b: &Genome,
        crossover: Crossover,
        rng: &mut R,
    ) -> Result<()> {
        for parent in [parent_a, parent_b] {
            if parent.len() != self.len() {
                return Err(EngineError::GenomeLengthMismatch {
                    expected: self.len(),
                    actual: parent.len(),
                });
            }
            if parent.max_value != self.max_value {
                return Err(EngineError::GeneBoundMismatch {
                    expected: self.max_value,
                    actual: parent.max_value,
                });
            }
        }

        match crossover {
            Crossover::Split => {
                let half = self.genes.len() / 2;
                self.genes[..half].copy_from_slice(&parent_a.genes[..half]);
                self.genes[half..].copy_from_slice(&parent_b.genes[half..]);
            }
            Crossover::Uniform => {
                for (i, gene) in self.genes.iter_mut().enumerate() {
                    *gene = if rng.gen_bool(0.5) {
                        parent_a.genes[i]
                    } else {
                        parent_b.genes[i]
                    };
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", gene)?;
        }
        write!(f, "]")
    }
}
