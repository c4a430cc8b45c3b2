//! Episodes as a fitness function.

use super::episode::{Episode, EpisodeSettings, EpisodeStatus};
use super::frontend::Frontend;
use crate::constants::BEST_GENOME_FILE;
use crate::controller::Controller;
use crate::neat::{FeedForwardNetwork, Genome, NeatConfig};
use crate::persistence::GenomeStore;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;

/// How one generation's episode went.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub generation: u32,
    pub status: EpisodeStatus,
    pub score: u32,
    pub ticks: u64,
    /// Highest fitness written back this generation.
    pub best_fitness: Option<f64>,
    /// Where the best genome went, if it was saved.
    pub saved: Option<PathBuf>,
}

/// Drive an episode to its end: poll quit, tick, draw, repeat.
///
/// `generation` is only used for the overlay. Frontend errors are logged and
/// otherwise ignored.
pub fn run_episode<C, F>(episode: &mut Episode<C>, frontend: &mut F, generation: u32) -> EpisodeStatus
where
    C: Controller,
    F: Frontend + ?Sized,
{
    while !episode.status().is_over() {
        match frontend.poll_quit() {
            Ok(true) => {
                episode.quit();
                break;
            }
            Ok(false) => {}
            Err(e) => log::warn!("Failed to poll for input: {}", e),
        }

        if episode.tick().status.is_over() {
            break;
        }

        if let Err(e) = frontend.draw(&episode.scene(generation)) {
            log::warn!("Failed to draw frame: {}", e);
        }
    }
    episode.status()
}

/// Evaluates whole generations, one bird per genome.
pub struct Harness<F> {
    frontend: F,
    store: GenomeStore,
    settings: EpisodeSettings,
    rng: ChaCha8Rng,
    history: Vec<EpisodeSummary>,
}

impl<F: Frontend> Harness<F> {
    /// `seed` drives the pipe layout of every episode.
    pub fn new(frontend: F, store: GenomeStore, settings: EpisodeSettings, seed: u64) -> Self {
        Self {
            frontend,
            store,
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: Vec::new(),
        }
    }

    /// Run one episode and write every genome's fitness.
    ///
    /// On quit or when the score cap is passed, the fittest genome still
    /// flying is saved as `best.genome`.
    pub fn evaluate(&mut self, genomes: &mut [Genome], config: &NeatConfig, generation: u32) -> EpisodeSummary {
        for genome in genomes.iter_mut() {
            genome.fitness = 0.0;
        }
        let networks: Vec<FeedForwardNetwork> = genomes
            .iter()
            .map(|g| FeedForwardNetwork::create(g, config))
            .collect();

        let mut episode = Episode::new(networks, self.settings, self.rng.gen());
        let status = run_episode(&mut episode, &mut self.frontend, generation + 1);

        for (id, fitness) in episode.fitness() {
            if let Some(genome) = genomes.get_mut(id) {
                genome.fitness = fitness;
            }
        }

        let saved = match status {
            EpisodeStatus::Quit | EpisodeStatus::Solved => {
                if status == EpisodeStatus::Solved {
                    log::info!("Score limit reached! Saving winner.");
                } else {
                    log::info!("User requested quit.");
                }
                self.save_best(&episode, genomes)
            }
            _ => None,
        };

        let summary = EpisodeSummary {
            generation,
            status,
            score: episode.score(),
            ticks: episode.ticks(),
            best_fitness: genomes.iter().map(|g| g.fitness).reduce(f64::max),
            saved,
        };
        log::debug!(
            "Generation {} episode ended {:?} after {} ticks with score {}",
            generation,
            status,
            summary.ticks,
            summary.score
        );
        self.history.push(summary.clone());
        summary
    }

    fn save_best<C>(&self, episode: &Episode<C>, genomes: &[Genome]) -> Option<PathBuf> {
        let best = episode.best_live()?;
        let genome = genomes.get(best.id)?;
        log::info!(
            "Saving best genome (Fitness: {:.1}) to '{}'",
            genome.fitness,
            BEST_GENOME_FILE
        );
        match self.store.save(BEST_GENOME_FILE, genome) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Failed to save {}: {}", BEST_GENOME_FILE, e);
                None
            }
        }
    }

    pub fn history(&self) -> &[EpisodeSummary] {
        &self.history
    }
}
