//! Progress reporting hooks for a running population.

use super::config::NeatConfig;
use super::genome::Genome;
use super::species::{SpeciesId, SpeciesSet};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Callbacks invoked by `Population::run`. Every hook has an empty default.
pub trait Reporter {
    fn start_generation(&mut self, _generation: u32) {}

    fn post_evaluate(
        &mut self,
        _config: &NeatConfig,
        _population: &[Genome],
        _species: &SpeciesSet,
        _best: &Genome,
    ) {
    }

    fn species_stagnant(&mut self, _species: SpeciesId, _size: usize) {}

    fn complete_extinction(&mut self) {}

    fn found_solution(&mut self, _generation: u32, _best: &Genome) {}

    fn end_generation(&mut self, _config: &NeatConfig, _population: &[Genome], _species: &SpeciesSet) {}
}

/// Writes a per-generation summary through the `log` facade.
pub struct LogReporter {
    show_species_detail: bool,
    generation: u32,
    generation_start: Option<Instant>,
    generation_times: Vec<Duration>,
}

impl LogReporter {
    pub fn new(show_species_detail: bool) -> Self {
        Self {
            show_species_detail,
            generation: 0,
            generation_start: None,
            generation_times: Vec::new(),
        }
    }
}

impl Reporter for LogReporter {
    fn start_generation(&mut self, generation: u32) {
        self.generation = generation;
        self.generation_start = Some(Instant::now());
        log::info!("****** Running generation {} ******", generation);
    }

    fn post_evaluate(
        &mut self,
        _config: &NeatConfig,
        population: &[Genome],
        species: &SpeciesSet,
        best: &Genome,
    ) {
        let fitnesses: Vec<f64> = population.iter().map(|g| g.fitness).collect();
        let (mean, stdev) = mean_stdev(&fitnesses);
        log::info!(
            "Population's average fitness: {:.5} stdev: {:.5}",
            mean,
            stdev
        );
        let species_label = species
            .species_of(best.key)
            .map(|sid| sid.to_string())
            .unwrap_or_else(|| "-".to_string());
        log::info!(
            "Best fitness: {:.5} - size: {:?} - species {} - id {}",
            best.fitness,
            best.size(),
            species_label,
            best.key
        );
    }

    fn species_stagnant(&mut self, species: SpeciesId, size: usize) {
        log::info!(
            "Species {} with {} members is stagnated: removing it",
            species,
            size
        );
    }

    fn complete_extinction(&mut self) {
        log::warn!("All species extinct.");
    }

    fn found_solution(&mut self, generation: u32, best: &Genome) {
        log::info!(
            "Best individual in generation {} meets fitness threshold - complexity: {:?}",
            generation,
            best.size()
        );
    }

    fn end_generation(&mut self, _config: &NeatConfig, population: &[Genome], species: &SpeciesSet) {
        log::info!(
            "Population of {} members in {} species",
            population.len(),
            species.len()
        );
        if self.show_species_detail {
            log::info!("   ID   age  size   fitness   adj fit  stag");
            for s in species.species.values() {
                let age = self.generation.saturating_sub(s.created);
                let stagnation = self.generation.saturating_sub(s.last_improved);
                let fitness = s
                    .fitness
                    .map(|f| format!("{:.1}", f))
                    .unwrap_or_else(|| "--".to_string());
                let adjusted = s
                    .adjusted_fitness
                    .map(|f| format!("{:.3}", f))
                    .unwrap_or_else(|| "--".to_string());
                log::info!(
                    "{:>5} {:>5} {:>5} {:>9} {:>9} {:>5}",
                    s.key,
                    age,
                    s.members.len(),
                    fitness,
                    adjusted,
                    stagnation
                );
            }
        }

        if let Some(start) = self.generation_start.take() {
            let elapsed = start.elapsed();
            self.generation_times.push(elapsed);
            let recent = &self.generation_times[self.generation_times.len().saturating_sub(10)..];
            let average = recent.iter().sum::<Duration>() / recent.len() as u32;
            log::info!(
                "Generation time: {:.3} sec ({:.3} average)",
                elapsed.as_secs_f64(),
                average.as_secs_f64()
            );
        }
    }
}

/// Fitness summary of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub stdev_fitness: f64,
    pub population_size: usize,
    pub species_count: usize,
}

/// Keeps one `GenerationStats` entry per evaluated generation.
#[derive(Debug, Clone, Default)]
pub struct StatisticsReporter {
    pub generations: Vec<GenerationStats>,
}

impl StatisticsReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for StatisticsReporter {
    fn post_evaluate(
        &mut self,
        _config: &NeatConfig,
        population: &[Genome],
        species: &SpeciesSet,
        best: &Genome,
    ) {
        let fitnesses: Vec<f64> = population.iter().map(|g| g.fitness).collect();
        let (mean, stdev) = mean_stdev(&fitnesses);
        self.generations.push(GenerationStats {
            generation: self.generations.len() as u32,
            best_fitness: best.fitness,
            mean_fitness: mean,
            stdev_fitness: stdev,
            population_size: population.len(),
            species_count: species.len(),
        });
    }
}

/// Population mean and standard deviation; (0, 0) for an empty slice.
pub fn mean_stdev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
