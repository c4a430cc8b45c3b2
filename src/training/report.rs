//! Training report generation.

use crate::harness::{EpisodeStatus, EpisodeSummary};
use crate::neat::{GenerationStats, Genome, StopReason};
use std::path::PathBuf;

/// Results of one training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub seed: u64,
    pub generations_run: u32,
    pub stop: StopReason,

    // Best genome over the whole run
    pub best_fitness: Option<f64>,
    pub best_genome_key: Option<u64>,
    /// (nodes, enabled connections)
    pub best_genome_size: Option<(usize, usize)>,

    // Episodes
    pub max_score: u32,
    pub episodes_solved: u32,
    pub episodes: Vec<EpisodeSummary>,
    pub generation_stats: Vec<GenerationStats>,

    // Files written
    pub winner_path: Option<PathBuf>,
    pub best_path: Option<PathBuf>,
}

impl TrainReport {
    pub fn new(
        seed: u64,
        stop: StopReason,
        best: Option<&Genome>,
        episodes: &[EpisodeSummary],
        generation_stats: Vec<GenerationStats>,
        winner_path: Option<PathBuf>,
    ) -> Self {
        Self {
            seed,
            generations_run: episodes.len() as u32,
            stop,
            best_fitness: best.map(|g| g.fitness),
            best_genome_key: best.map(|g| g.key),
            best_genome_size: best.map(|g| g.size()),
            max_score: episodes.iter().map(|e| e.score).max().unwrap_or(0),
            episodes_solved: episodes
                .iter()
                .filter(|e| e.status == EpisodeStatus::Solved)
                .count() as u32,
            episodes: episodes.to_vec(),
            generation_stats,
            winner_path,
            best_path: episodes.iter().rev().find_map(|e| e.saved.clone()),
        }
    }

    pub fn quit(&self) -> bool {
        self.stop == StopReason::Quit
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                      TRAINING REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Generations: {} run, stopped: {}\n",
            self.generations_run,
            stop_label(self.stop)
        ));
        report.push_str(&format!("Seed: {}\n\n", self.seed));

        report.push_str("── BEST GENOME ──────────────────────────────────────────────────\n");
        match (self.best_fitness, self.best_genome_key, self.best_genome_size) {
            (Some(fitness), Some(key), Some((nodes, connections))) => {
                report.push_str(&format!("  Fitness:     {:.1}\n", fitness));
                report.push_str(&format!("  Genome:      #{}\n", key));
                report.push_str(&format!(
                    "  Size:        {} nodes, {} connections\n\n",
                    nodes, connections
                ));
            }
            _ => report.push_str("  (none)\n\n"),
        }

        report.push_str("── EPISODES ─────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Max Score:        {}\n", self.max_score));
        report.push_str(&format!("  Episodes Solved:  {}\n\n", self.episodes_solved));

        if !self.generation_stats.is_empty() {
            report.push_str("── FITNESS BY GENERATION ────────────────────────────────────────\n");
            let top = self
                .generation_stats
                .iter()
                .map(|s| s.best_fitness)
                .fold(0.0_f64, f64::max);
            for (stats, episode) in self.generation_stats.iter().zip(&self.episodes) {
                let bar_len = if top > 0.0 {
                    ((stats.best_fitness.max(0.0) / top) * 30.0) as usize
                } else {
                    0
                };
                report.push_str(&format!(
                    "  Gen {:3}: best {:>8.1}  mean {:>7.1}  species {:>2}  score {:>3} {}\n",
                    stats.generation + 1,
                    stats.best_fitness,
                    stats.mean_fitness,
                    stats.species_count,
                    episode.score,
                    "█".repeat(bar_len)
                ));
            }
            report.push('\n');
        }

        report.push_str("── FILES ────────────────────────────────────────────────────────\n");
        if let Some(path) = &self.winner_path {
            report.push_str(&format!("  Winner:  {}\n", path.display()));
        }
        if let Some(path) = &self.best_path {
            report.push_str(&format!("  Best:    {}\n", path.display()));
        }
        if self.winner_path.is_none() && self.best_path.is_none() {
            report.push_str("  (nothing saved)\n");
        }

        report
    }
}

fn stop_label(stop: StopReason) -> &'static str {
    match stop {
        StopReason::Solved => "fitness threshold reached",
        StopReason::GenerationLimit => "generation limit",
        StopReason::Quit => "user quit",
        StopReason::Extinct => "complete extinction",
    }
}

impl serde::Serialize for TrainReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("TrainReport", 12)?;
        state.serialize_field("seed", &self.seed)?;
        state.serialize_field("generations_run", &self.generations_run)?;
        state.serialize_field("stop", &self.stop)?;
        state.serialize_field("best_fitness", &self.best_fitness)?;
        state.serialize_field("best_genome_key", &self.best_genome_key)?;
        state.serialize_field("best_genome_size", &self.best_genome_size)?;
        state.serialize_field("max_score", &self.max_score)?;
        state.serialize_field("episodes_solved", &self.episodes_solved)?;
        state.serialize_field("generations", &self.generation_stats)?;
        state.serialize_field("episodes", &self.episodes)?;
        state.serialize_field("winner_path", &self.winner_path)?;
        state.serialize_field("best_path", &self.best_path)?;
        state.end()
    }
}
