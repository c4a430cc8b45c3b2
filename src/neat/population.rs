//! The generation loop.

use super::config::NeatConfig;
use super::genome::Genome;
use super::reporter::Reporter;
use super::reproduction::Reproduction;
use super::species::SpeciesSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::io;

/// Returned by the fitness callback after each evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalControl {
    Continue,
    /// Stop the run right after this evaluation (user quit).
    Stop,
}

/// Why `Population::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The fitness criterion reached the configured threshold.
    Solved,
    GenerationLimit,
    Quit,
    /// Every species went stagnant and `reset_on_extinction` is off.
    Extinct,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Fittest genome seen over the whole run.
    pub best: Option<Genome>,
    /// Generations evaluated by this call.
    pub generations: u32,
    pub stop: StopReason,
}

pub struct Population {
    config: NeatConfig,
    genomes: Vec<Genome>,
    species: SpeciesSet,
    reproduction: Reproduction,
    rng: ChaCha8Rng,
    generation: u32,
    best_genome: Option<Genome>,
}

impl Population {
    /// Create and speciate a random initial population. `seed` makes the
    /// whole run reproducible.
    pub fn new(config: NeatConfig, seed: Option<u64>) -> io::Result<Self> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut reproduction = Reproduction::new(&config);
        let genomes = reproduction.create_new(&config, config.pop_size, &mut rng);
        let mut species = SpeciesSet::new();
        species.speciate(&config, &genomes, 0);

        Ok(Self {
            config,
            genomes,
            species,
            reproduction,
            rng,
            generation: 0,
            best_genome: None,
        })
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn species(&self) -> &SpeciesSet {
        &self.species
    }

    /// Index of the next generation to be evaluated.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Run evolution for up to `generations` generations (forever if `None`).
    ///
    /// `fitness` is called once per generation with the whole population and
    /// must set `Genome::fitness` on every genome.
    pub fn run<F>(
        &mut self,
        mut fitness: F,
        generations: Option<u32>,
        reporters: &mut [&mut dyn Reporter],
    ) -> RunOutcome
    where
        F: FnMut(&mut [Genome], &NeatConfig, u32) -> EvalControl,
    {
        let mut completed = 0;
        loop {
            if generations.is_some_and(|limit| completed >= limit) {
                return self.outcome(completed, StopReason::GenerationLimit);
            }

            let generation = self.generation;
            for r in reporters.iter_mut() {
                r.start_generation(generation);
            }

            let control = fitness(&mut self.genomes, &self.config, generation);
            completed += 1;

            let Some(best) = first_fittest(&self.genomes).cloned() else {
                // Nothing to evaluate; treat as extinction.
                for r in reporters.iter_mut() {
                    r.complete_extinction();
                }
                return self.outcome(completed, StopReason::Extinct);
            };
            for r in reporters.iter_mut() {
                r.post_evaluate(&self.config, &self.genomes, &self.species, &best);
            }
            if self
                .best_genome
                .as_ref()
                .map_or(true, |b| best.fitness > b.fitness)
            {
                self.best_genome = Some(best.clone());
            }

            if control == EvalControl::Stop {
                return self.outcome(completed, StopReason::Quit);
            }

            if !self.config.no_fitness_termination {
                let fitnesses: Vec<f64> = self.genomes.iter().map(|g| g.fitness).collect();
                if self.config.fitness_criterion.reduce(&fitnesses) >= self.config.fitness_threshold {
                    for r in reporters.iter_mut() {
                        r.found_solution(generation, &best);
                    }
                    return self.outcome(completed, StopReason::Solved);
                }
            }

            let (next, summary) = self.reproduction.reproduce(
                &self.config,
                &mut self.species,
                &self.genomes,
                generation,
                &mut self.rng,
            );
            for &(sid, size) in &summary.stagnant {
                for r in reporters.iter_mut() {
                    r.species_stagnant(sid, size);
                }
            }
            self.genomes = next;

            if summary.extinct {
                for r in reporters.iter_mut() {
                    r.complete_extinction();
                }
                if !self.config.reset_on_extinction {
                    self.generation += 1;
                    return self.outcome(completed, StopReason::Extinct);
                }
                self.genomes =
                    self.reproduction
                        .create_new(&self.config, self.config.pop_size, &mut self.rng);
            }

            self.generation += 1;
            self.species
                .speciate(&self.config, &self.genomes, self.generation);
            for r in reporters.iter_mut() {
                r.end_generation(&self.config, &self.genomes, &self.species);
            }
        }
    }

    fn outcome(&self, generations: u32, stop: StopReason) -> RunOutcome {
        RunOutcome {
            best: self.best_genome.clone(),
            generations,
            stop,
        }
    }
}

/// Highest fitness, first one wins on ties.
fn first_fittest(genomes: &[Genome]) -> Option<&Genome> {
    genomes.iter().fold(None, |best: Option<&Genome>, g| match best {
        Some(b) if b.fitness >= g.fitness => Some(b),
        _ => Some(g),
    })
}
