//! Wires the population, the harness and the reporters together.

use super::config::TrainConfig;
use super::report::TrainReport;
use crate::constants::WINNER_GENOME_FILE;
use crate::harness::{run_episode, Episode, EpisodeSettings, EpisodeStatus, Frontend, Harness};
use crate::neat::{
    EvalControl, FeedForwardNetwork, Genome, LogReporter, NeatConfig, Population, Reporter,
    StatisticsReporter, StopReason,
};
use crate::persistence::GenomeStore;
use std::io;

#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub report: TrainReport,
    /// Best genome over the whole run.
    pub winner: Option<Genome>,
}

/// Evolve birds for up to `config.generations` generations.
///
/// When the run ends on its own (threshold or generation limit) the overall
/// winner is saved as `best_model.genome`. A quit saves only what the
/// harness saved at the moment of quitting.
pub fn run_training<F: Frontend>(config: &TrainConfig, frontend: F) -> io::Result<TrainOutcome> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!(
        "Training {} genomes for up to {} generations (seed {})",
        config.neat.pop_size,
        config.generations,
        seed
    );

    let mut population = Population::new(config.neat.clone(), Some(seed))?;
    let store = GenomeStore::new(&config.output_dir);
    let mut harness = Harness::new(
        frontend,
        store.clone(),
        config.episode_settings(),
        seed.wrapping_add(1),
    );

    let mut stats = StatisticsReporter::new();
    let mut log_reporter = LogReporter::new(config.verbosity >= 2);
    let outcome = {
        let mut reporters: Vec<&mut dyn Reporter> = vec![&mut stats];
        if config.verbosity >= 1 {
            reporters.push(&mut log_reporter);
        }
        population.run(
            |genomes, neat, generation| {
                let summary = harness.evaluate(genomes, neat, generation);
                if summary.status == EpisodeStatus::Quit {
                    EvalControl::Stop
                } else {
                    EvalControl::Continue
                }
            },
            Some(config.generations),
            &mut reporters,
        )
    };

    let finished = matches!(outcome.stop, StopReason::Solved | StopReason::GenerationLimit);
    let winner_path = match (&outcome.best, finished) {
        (Some(best), true) => {
            log::info!("Best genome found! Saving to '{}'", WINNER_GENOME_FILE);
            match store.save(WINNER_GENOME_FILE, best) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("Failed to save {}: {}", WINNER_GENOME_FILE, e);
                    None
                }
            }
        }
        _ => None,
    };

    let report = TrainReport::new(
        seed,
        outcome.stop,
        outcome.best.as_ref(),
        harness.history(),
        stats.generations,
        winner_path,
    );
    Ok(TrainOutcome {
        report,
        winner: outcome.best,
    })
}

/// How a replay went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub status: EpisodeStatus,
    pub score: u32,
    pub ticks: u64,
}

/// Fly one bird with a saved genome. Nothing is written.
pub fn replay<F: Frontend + ?Sized>(
    genome: &Genome,
    neat: &NeatConfig,
    settings: EpisodeSettings,
    frontend: &mut F,
    seed: u64,
) -> ReplaySummary {
    let network = FeedForwardNetwork::create(genome, neat);
    let mut episode = Episode::new(vec![network], settings, seed);
    let status = run_episode(&mut episode, frontend, 0);
    ReplaySummary {
        status,
        score: episode.score(),
        ticks: episode.ticks(),
    }
}
