//! NeuroEvolution of Augmenting Topologies.
//!
//! A population of genomes is evaluated once per generation through a
//! fitness callback, split into species by genetic distance, and bred into
//! the next generation. Genomes become `FeedForwardNetwork`s for evaluation.

pub mod config;
pub mod genome;
pub mod network;
pub mod population;
pub mod reporter;
pub mod reproduction;
pub mod species;

pub use config::{FitnessCriterion, InitialConnection, NeatConfig};
pub use genome::{ActivationFunction, Genome, GenomeId};
pub use network::FeedForwardNetwork;
pub use population::{EvalControl, Population, RunOutcome, StopReason};
pub use reporter::{GenerationStats, LogReporter, Reporter, StatisticsReporter};
pub use species::SpeciesSet;
