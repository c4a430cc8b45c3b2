//! Evolution parameters.

use super::genome::{ActivationFunction, NodeKey};
use serde::{Deserialize, Serialize};
use std::io;

/// How a population's fitness values are reduced to one number for the
/// termination check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessCriterion {
    Max,
    Min,
    Mean,
}

impl FitnessCriterion {
    pub fn reduce(&self, fitnesses: &[f64]) -> f64 {
        match self {
            Self::Max => fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min => fitnesses.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Mean => {
                if fitnesses.is_empty() {
                    0.0
                } else {
                    fitnesses.iter().sum::<f64>() / fitnesses.len() as f64
                }
            }
        }
    }
}

/// Connections present in a freshly created genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialConnection {
    /// No connections at all; structure must be grown by mutation.
    Unconnected,
    /// Every input feeds every hidden node and every hidden node feeds every
    /// output. Without hidden nodes, inputs connect straight to outputs.
    Full,
}

/// Configuration for population generation and evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeatConfig {
    /// Number of genomes in each generation.
    pub pop_size: usize,
    pub fitness_criterion: FitnessCriterion,
    /// The run stops once the criterion reaches this value.
    pub fitness_threshold: f64,
    /// Ignore the threshold and always run the full generation count.
    pub no_fitness_termination: bool,
    /// Start over with a fresh random population if every species goes
    /// stagnant at once. When false the run ends instead.
    pub reset_on_extinction: bool,

    pub num_inputs: usize,
    pub num_outputs: usize,
    pub num_hidden: usize,
    pub initial_connection: InitialConnection,
    pub activation: ActivationFunction,

    /// Genetic distance below which two genomes share a species.
    pub compatibility_threshold: f64,
    pub compatibility_disjoint_coefficient: f64,
    pub compatibility_weight_coefficient: f64,

    pub conn_add_prob: f64,
    pub conn_delete_prob: f64,
    pub node_add_prob: f64,
    pub node_delete_prob: f64,
    /// Chance per connection that `enabled` is re-rolled.
    pub enabled_mutate_rate: f64,

    pub weight_mutate_rate: f64,
    pub weight_replace_rate: f64,
    pub weight_mutate_power: f64,
    pub weight_max_value: f64,

    pub bias_mutate_rate: f64,
    pub bias_replace_rate: f64,
    pub bias_mutate_power: f64,
    pub bias_max_value: f64,

    /// Generations without improvement before a species is stagnant.
    pub max_stagnation: u32,
    /// Number of best species protected from stagnation.
    pub species_elitism: usize,

    /// Best members of each species copied unchanged into the next generation.
    pub elitism: usize,
    /// Fraction of each species allowed to reproduce.
    pub survival_threshold: f64,
    pub min_species_size: usize,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            pop_size: 50,
            fitness_criterion: FitnessCriterion::Max,
            fitness_threshold: 100.0,
            no_fitness_termination: false,
            reset_on_extinction: true,

            num_inputs: 3,
            num_outputs: 1,
            num_hidden: 0,
            initial_connection: InitialConnection::Full,
            activation: ActivationFunction::Tanh,

            compatibility_threshold: 3.0,
            compatibility_disjoint_coefficient: 1.0,
            compatibility_weight_coefficient: 0.5,

            conn_add_prob: 0.5,
            conn_delete_prob: 0.5,
            node_add_prob: 0.2,
            node_delete_prob: 0.2,
            enabled_mutate_rate: 0.01,

            weight_mutate_rate: 0.8,
            weight_replace_rate: 0.1,
            weight_mutate_power: 0.5,
            weight_max_value: 30.0,

            bias_mutate_rate: 0.7,
            bias_replace_rate: 0.1,
            bias_mutate_power: 0.5,
            bias_max_value: 30.0,

            max_stagnation: 20,
            species_elitism: 2,

            elitism: 2,
            survival_threshold: 0.2,
            min_species_size: 2,
        }
    }
}

impl NeatConfig {
    /// Input node keys: -1, -2, ... so they never clash with output/hidden keys.
    pub fn input_keys(&self) -> Vec<NodeKey> {
        (1..=self.num_inputs as NodeKey).map(|i| -i).collect()
    }

    /// Output node keys: 0, 1, ...
    pub fn output_keys(&self) -> Vec<NodeKey> {
        (0..self.num_outputs as NodeKey).collect()
    }

    /// Reject settings the algorithm can't run with.
    pub fn validate(&self) -> io::Result<()> {
        let problem = if self.pop_size == 0 {
            Some("pop_size must be at least 1".to_string())
        } else if self.num_inputs == 0 || self.num_outputs == 0 {
            Some("networks need at least one input and one output".to_string())
        } else if self.compatibility_threshold <= 0.0 {
            Some("compatibility_threshold must be positive".to_string())
        } else if self.weight_max_value <= 0.0 || self.bias_max_value <= 0.0 {
            Some("weight/bias max values must be positive".to_string())
        } else if let Some(name) = self.negative_power() {
            Some(format!("{} must not be negative", name))
        } else {
            self.probability_out_of_range()
                .map(|name| format!("{} must be within 0..=1", name))
        };

        match problem {
            Some(msg) => Err(io::Error::new(io::ErrorKind::InvalidInput, msg)),
            None => Ok(()),
        }
    }

    fn negative_power(&self) -> Option<&'static str> {
        [
            ("weight_mutate_power", self.weight_mutate_power),
            ("bias_mutate_power", self.bias_mutate_power),
        ]
        .into_iter()
        .find(|(_, power)| !(*power >= 0.0))
        .map(|(name, _)| name)
    }

    fn probability_out_of_range(&self) -> Option<&'static str> {
        [
            ("survival_threshold", self.survival_threshold),
            ("conn_add_prob", self.conn_add_prob),
            ("conn_delete_prob", self.conn_delete_prob),
            ("node_add_prob", self.node_add_prob),
            ("node_delete_prob", self.node_delete_prob),
            ("enabled_mutate_rate", self.enabled_mutate_rate),
            ("weight_mutate_rate", self.weight_mutate_rate),
            ("weight_replace_rate", self.weight_replace_rate),
            ("bias_mutate_rate", self.bias_mutate_rate),
            ("bias_replace_rate", self.bias_replace_rate),
        ]
        .into_iter()
        .find(|(_, p)| !(0.0..=1.0).contains(p))
        .map(|(name, _)| name)
    }
}
