//! Training configuration.

use crate::constants::{FRAMES_PER_SECOND, NUM_OBSERVATIONS, SCORE_CAP};
use crate::harness::EpisodeSettings;
use crate::neat::NeatConfig;
use crate::persistence::load_json;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Configuration for a training run. Every field can be omitted from a JSON
/// config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Maximum number of generations to evolve
    pub generations: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// An episode ends once the score goes past this
    pub score_cap: u32,

    /// Optional tick limit per episode (None = until the flock dies)
    pub max_ticks: Option<u64>,

    /// Where genome files are written
    pub output_dir: PathBuf,

    /// Frame rate of the terminal view (0 = unpaced)
    pub fps: u32,

    /// Log verbosity (0 = silent, 1 = per-generation summary, 2 = species table)
    pub verbosity: u8,

    pub neat: NeatConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            seed: None,
            score_cap: SCORE_CAP,
            max_ticks: None,
            output_dir: PathBuf::from("."),
            fps: FRAMES_PER_SECOND,
            verbosity: 1,
            neat: NeatConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Small, bounded run for smoke tests and CI.
    pub fn quick() -> Self {
        Self {
            generations: 5,
            max_ticks: Some(2_000),
            neat: NeatConfig {
                pop_size: 20,
                ..NeatConfig::default()
            },
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        load_json(path)
    }

    pub fn episode_settings(&self) -> EpisodeSettings {
        EpisodeSettings {
            score_cap: self.score_cap,
            max_ticks: self.max_ticks,
        }
    }

    pub fn validate(&self) -> io::Result<()> {
        self.neat.validate()?;
        if self.neat.num_inputs != NUM_OBSERVATIONS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "birds observe {} values but num_inputs is {}",
                    NUM_OBSERVATIONS, self.neat.num_inputs
                ),
            ));
        }
        if self.generations == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "generations must be at least 1",
            ));
        }
        Ok(())
    }
}
