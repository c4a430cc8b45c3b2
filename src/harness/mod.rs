//! The evaluation harness: episodes, the frontends they are shown on, and
//! the per-generation fitness function built from them.

pub mod episode;
pub mod evaluator;
pub mod frontend;

pub use episode::{BirdRecord, Episode, EpisodeSettings, EpisodeStatus, TickResult};
pub use evaluator::{run_episode, EpisodeSummary, Harness};
pub use frontend::{Frontend, HeadlessFrontend, Scene};
