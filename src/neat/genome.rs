//! NEAT genome representation.
//!
//! A genome is a set of node genes (bias + activation) and connection genes
//! keyed by `(from, to)` node pair. Matching connection keys between two
//! genomes mark homologous genes for crossover and compatibility distance.

use super::config::{InitialConnection, NeatConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type NodeKey = i64;
pub type ConnectionKey = (NodeKey, NodeKey);
pub type GenomeId = u64;

/// Activation functions for hidden and output nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    Relu,
    Identity,
}

impl ActivationFunction {
    /// Steepened sigmoid, so its useful range matches typical weight magnitudes.
    const SIGMOID_SCALE: f64 = 4.9;

    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-Self::SIGMOID_SCALE * x).exp()),
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
            Self::Identity => x,
        }
    }
}

/// Hands out keys for new hidden nodes.
///
/// Shared across the whole population so that independently added nodes
/// never collide.
#[derive(Debug, Clone)]
pub struct NodeIndexer {
    next: NodeKey,
}

impl NodeIndexer {
    pub fn new(config: &NeatConfig) -> Self {
        Self {
            next: config.num_outputs as NodeKey,
        }
    }

    pub fn next_key(&mut self) -> NodeKey {
        let key = self.next;
        self.next += 1;
        key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub key: NodeKey,
    pub bias: f64,
    pub activation: ActivationFunction,
}

impl NodeGene {
    fn distance(&self, other: &NodeGene, config: &NeatConfig) -> f64 {
        let mut d = (self.bias - other.bias).abs();
        if self.activation != other.activation {
            d += 1.0;
        }
        d * config.compatibility_weight_coefficient
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub key: ConnectionKey,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    fn distance(&self, other: &ConnectionGene, config: &NeatConfig) -> f64 {
        let mut d = (self.weight - other.weight).abs();
        if self.enabled != other.enabled {
            d += 1.0;
        }
        d * config.compatibility_weight_coefficient
    }
}

/// A candidate controller's genes plus its last evaluated fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub key: GenomeId,
    /// Output and hidden nodes. Inputs are implied by the config.
    pub nodes: BTreeMap<NodeKey, NodeGene>,
    pub connections: BTreeMap<ConnectionKey, ConnectionGene>,
    pub fitness: f64,
}

impl Genome {
    /// A genome with no genes at all.
    pub fn empty(key: GenomeId) -> Self {
        Self {
            key,
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            fitness: 0.0,
        }
    }

    /// A fresh random genome laid out according to the config.
    pub fn new<R: Rng>(
        key: GenomeId,
        config: &NeatConfig,
        indexer: &mut NodeIndexer,
        rng: &mut R,
    ) -> Self {
        let mut genome = Self::empty(key);

        for output in config.output_keys() {
            genome.add_node_gene(output, config, rng);
        }
        let hidden: Vec<NodeKey> = (0..config.num_hidden)
            .map(|_| {
                let key = indexer.next_key();
                genome.add_node_gene(key, config, rng);
                key
            })
            .collect();

        if config.initial_connection == InitialConnection::Full {
            let inputs = config.input_keys();
            let outputs = config.output_keys();
            if hidden.is_empty() {
                for &i in &inputs {
                    for &o in &outputs {
                        genome.add_connection_gene((i, o), random_value(rng), true);
                    }
                }
            } else {
                for &i in &inputs {
                    for &h in &hidden {
                        genome.add_connection_gene((i, h), random_value(rng), true);
                    }
                }
                for &h in &hidden {
                    for &o in &outputs {
                        genome.add_connection_gene((h, o), random_value(rng), true);
                    }
                }
            }
        }

        genome
    }

    fn add_node_gene<R: Rng>(&mut self, key: NodeKey, config: &NeatConfig, rng: &mut R) {
        self.nodes.insert(
            key,
            NodeGene {
                key,
                bias: random_value(rng),
                activation: config.activation,
            },
        );
    }

    fn add_connection_gene(&mut self, key: ConnectionKey, weight: f64, enabled: bool) {
        self.connections.insert(
            key,
            ConnectionGene {
                key,
                weight,
                enabled,
            },
        );
    }

    /// Number of (hidden + output) nodes and enabled connections.
    pub fn size(&self) -> (usize, usize) {
        let enabled = self.connections.values().filter(|c| c.enabled).count();
        (self.nodes.len(), enabled)
    }

    // ===== Mutation =====

    /// Apply structural and parametric mutations with the configured odds.
    pub fn mutate<R: Rng>(&mut self, config: &NeatConfig, indexer: &mut NodeIndexer, rng: &mut R) {
        if rng.gen::<f64>() < config.node_add_prob {
            self.mutate_add_node(config, indexer, rng);
        }
        if rng.gen::<f64>() < config.node_delete_prob {
            self.mutate_delete_node(config, rng);
        }
        if rng.gen::<f64>() < config.conn_add_prob {
            self.mutate_add_connection(config, rng);
        }
        if rng.gen::<f64>() < config.conn_delete_prob {
            self.mutate_delete_connection(rng);
        }

        for conn in self.connections.values_mut() {
            conn.weight = mutate_value(
                conn.weight,
                config.weight_mutate_rate,
                config.weight_replace_rate,
                config.weight_mutate_power,
                config.weight_max_value,
                rng,
            );
            if rng.gen::<f64>() < config.enabled_mutate_rate {
                conn.enabled = rng.gen::<bool>();
            }
        }
        for node in self.nodes.values_mut() {
            node.bias = mutate_value(
                node.bias,
                config.bias_mutate_rate,
                config.bias_replace_rate,
                config.bias_mutate_power,
                config.bias_max_value,
                rng,
            );
        }
    }

    /// Split a random connection with a new node.
    /// The old connection is disabled; the incoming half gets weight 1.0 and
    /// the outgoing half keeps the old weight so the signal is preserved.
    /// Returns true if a node was added.
    pub fn mutate_add_node<R: Rng>(
        &mut self,
        config: &NeatConfig,
        indexer: &mut NodeIndexer,
        rng: &mut R,
    ) -> bool {
        let keys: Vec<ConnectionKey> = self.connections.keys().copied().collect();
        let Some(&(from, to)) = keys.choose(rng) else {
            return false;
        };

        let old_weight = match self.connections.get_mut(&(from, to)) {
            Some(conn) => {
                conn.enabled = false;
                conn.weight
            }
            None => return false,
        };

        let new_key = indexer.next_key();
        self.nodes.insert(
            new_key,
            NodeGene {
                key: new_key,
                bias: 0.0,
                activation: config.activation,
            },
        );
        self.add_connection_gene((from, new_key), 1.0, true);
        self.add_connection_gene((new_key, to), old_weight, true);
        true
    }

    /// Remove a random hidden node and every connection touching it.
    /// Returns true if a node was removed.
    pub fn mutate_delete_node<R: Rng>(&mut self, config: &NeatConfig, rng: &mut R) -> bool {
        let outputs = config.output_keys();
        let hidden: Vec<NodeKey> = self
            .nodes
            .keys()
            .copied()
            .filter(|k| !outputs.contains(k))
            .collect();
        let Some(&victim) = hidden.choose(rng) else {
            return false;
        };

        self.connections
            .retain(|&(from, to), _| from != victim && to != victim);
        self.nodes.remove(&victim);
        true
    }

    /// Connect two random nodes, keeping the network acyclic.
    /// Re-enables the connection if it already exists.
    /// Returns true if the genome changed.
    pub fn mutate_add_connection<R: Rng>(&mut self, config: &NeatConfig, rng: &mut R) -> bool {
        let outputs = config.output_keys();
        let targets: Vec<NodeKey> = self.nodes.keys().copied().collect();
        let mut sources = targets.clone();
        sources.extend(config.input_keys());

        let (Some(&from), Some(&to)) = (sources.choose(rng), targets.choose(rng)) else {
            return false;
        };

        if let Some(existing) = self.connections.get_mut(&(from, to)) {
            let changed = !existing.enabled;
            existing.enabled = true;
            return changed;
        }

        // Output-to-output links and cycles are not allowed.
        if outputs.contains(&from) && outputs.contains(&to) {
            return false;
        }
        if creates_cycle(self.connections.keys(), (from, to)) {
            return false;
        }

        self.add_connection_gene((from, to), random_value(rng), true);
        true
    }

    /// Remove a random connection. Returns true if one was removed.
    pub fn mutate_delete_connection<R: Rng>(&mut self, rng: &mut R) -> bool {
        let keys: Vec<ConnectionKey> = self.connections.keys().copied().collect();
        match keys.choose(rng) {
            Some(key) => self.connections.remove(key).is_some(),
            None => false,
        }
    }

    // ===== Crossover =====

    /// Build a child from two parents.
    ///
    /// Homologous genes take each attribute from either parent at random;
    /// disjoint and excess genes come from the fitter parent only. On equal
    /// fitness `parent1` counts as the fitter one.
    pub fn crossover<R: Rng>(key: GenomeId, parent1: &Genome, parent2: &Genome, rng: &mut R) -> Self {
        let (fit, other) = if parent1.fitness >= parent2.fitness {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };

        let mut child = Self::empty(key);

        for (k, conn) in &fit.connections {
            let gene = match other.connections.get(k) {
                Some(homolog) => ConnectionGene {
                    key: *k,
                    weight: pick(rng, conn.weight, homolog.weight),
                    enabled: pick(rng, conn.enabled, homolog.enabled),
                },
                None => conn.clone(),
            };
            child.connections.insert(*k, gene);
        }

        for (k, node) in &fit.nodes {
            let gene = match other.nodes.get(k) {
                Some(homolog) => NodeGene {
                    key: *k,
                    bias: pick(rng, node.bias, homolog.bias),
                    activation: pick(rng, node.activation, homolog.activation),
                },
                None => node.clone(),
            };
            child.nodes.insert(*k, gene);
        }

        child
    }

    // ===== Speciation =====

    /// Compatibility distance: disjoint genes plus attribute differences of
    /// homologous genes, normalised by the larger genome, summed over nodes
    /// and connections.
    pub fn distance(&self, other: &Genome, config: &NeatConfig) -> f64 {
        let node_distance = gene_distance(&self.nodes, &other.nodes, config, |a, b| {
            a.distance(b, config)
        });
        let connection_distance = gene_distance(
            &self.connections,
            &other.connections,
            config,
            |a, b| a.distance(b, config),
        );
        node_distance + connection_distance
    }
}

fn gene_distance<K: Ord, G>(
    a: &BTreeMap<K, G>,
    b: &BTreeMap<K, G>,
    config: &NeatConfig,
    homologous: impl Fn(&G, &G) -> f64,
) -> f64 {
    let max_genes = a.len().max(b.len());
    if max_genes == 0 {
        return 0.0;
    }

    let mut disjoint = 0usize;
    let mut total = 0.0;
    for (k, gene) in a {
        match b.get(k) {
            Some(other) => total += homologous(gene, other),
            None => disjoint += 1,
        }
    }
    disjoint += b.keys().filter(|k| !a.contains_key(k)).count();

    (total + config.compatibility_disjoint_coefficient * disjoint as f64) / max_genes as f64
}

/// Would adding `test` to `connections` create a cycle?
///
/// Walks forward from the new connection's target; reaching its source means
/// a loop. Self-connections always count as cycles.
pub fn creates_cycle<'a>(
    connections: impl Iterator<Item = &'a ConnectionKey> + Clone,
    test: ConnectionKey,
) -> bool {
    let (from, to) = test;
    if from == to {
        return true;
    }

    let mut visited = BTreeSet::from([to]);
    loop {
        let mut added = 0;
        for &(a, b) in connections.clone() {
            if visited.contains(&a) && !visited.contains(&b) {
                if b == from {
                    return true;
                }
                visited.insert(b);
                added += 1;
            }
        }
        if added == 0 {
            return false;
        }
    }
}

fn random_value<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}

fn pick<T, R: Rng>(rng: &mut R, a: T, b: T) -> T {
    if rng.gen::<bool>() {
        a
    } else {
        b
    }
}

/// Perturb with probability `mutate_rate`, otherwise replace with probability
/// `replace_rate`, otherwise keep. Always clamped to ±`max_value`.
fn mutate_value<R: Rng>(
    value: f64,
    mutate_rate: f64,
    replace_rate: f64,
    power: f64,
    max_value: f64,
    rng: &mut R,
) -> f64 {
    let r = rng.gen::<f64>();
    let next = if r < mutate_rate {
        value + rng.gen_range(-power..=power)
    } else if r < mutate_rate + replace_rate {
        random_value(rng)
    } else {
        value
    };
    next.clamp(-max_value, max_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (NeatConfig, NodeIndexer, ChaCha8Rng) {
        let config = NeatConfig::default();
        let indexer = NodeIndexer::new(&config);
        (config, indexer, ChaCha8Rng::seed_from_u64(42))
    }

    #[test]
    fn test_new_genome_fully_connected() {
        let (config, mut indexer, mut rng) = setup();
        let genome = Genome::new(1, &config, &mut indexer, &mut rng);

        assert_eq!(genome.nodes.len(), 1);
        assert_eq!(genome.connections.len(), 3);
        for input in config.input_keys() {
            assert!(genome.connections.contains_key(&(input, 0)));
        }
        assert!(genome.connections.values().all(|c| c.enabled));
        assert_eq!(genome.fitness, 0.0);
    }

    #[test]
    fn test_new_genome_with_hidden_layer() {
        let (mut config, _, mut rng) = setup();
        config.num_hidden = 2;
        let mut indexer = NodeIndexer::new(&config);
        let genome = Genome::new(1, &config, &mut indexer, &mut rng);

        // 1 output + 2 hidden; 3x2 input->hidden + 2x1 hidden->output
        assert_eq!(genome.nodes.len(), 3);
        assert_eq!(genome.connections.len(), 8);
        assert!(!genome.connections.contains_key(&(-1, 0)));
    }

    #[test]
    fn test_unconnected_genome() {
        let (mut config, mut indexer, mut rng) = setup();
        config.initial_connection = InitialConnection::Unconnected;
        let genome = Genome::new(1, &config, &mut indexer, &mut rng);
        assert!(genome.connections.is_empty());
        assert_eq!(genome.nodes.len(), 1);
    }

    #[test]
    fn test_add_node_splits_connection() {
        let (config, mut indexer, mut rng) = setup();
        let mut genome = Genome::new(1, &config, &mut indexer, &mut rng);

        assert!(genome.mutate_add_node(&config, &mut indexer, &mut rng));
        assert_eq!(genome.nodes.len(), 2);
        assert_eq!(genome.connections.len(), 5);

        let disabled: Vec<_> = genome.connections.values().filter(|c| !c.enabled).collect();
        assert_eq!(disabled.len(), 1);
        let (from, to) = disabled[0].key;
        let new_key = *genome.nodes.keys().max().unwrap();
        assert_eq!(genome.connections[&(from, new_key)].weight, 1.0);
        assert_eq!(genome.connections[&(new_key, to)].weight, disabled[0].weight);
    }

    #[test]
    fn test_add_node_on_empty_genome() {
        let (config, mut indexer, mut rng) = setup();
        let mut genome = Genome::empty(1);
        assert!(!genome.mutate_add_node(&config, &mut indexer, &mut rng));
    }

    #[test]
    fn test_delete_node_keeps_outputs() {
        let (config, mut indexer, mut rng) = setup();
        let mut genome = Genome::new(1, &config, &mut indexer, &mut rng);
        // No hidden nodes yet
        assert!(!genome.mutate_delete_node(&config, &mut rng));

        genome.mutate_add_node(&config, &mut indexer, &mut rng);
        assert!(genome.mutate_delete_node(&config, &mut rng));
        assert_eq!(genome.nodes.len(), 1);
        assert!(genome.nodes.contains_key(&0));
        assert!(genome.connections.keys().all(|&(a, b)| a <= 0 && b <= 0));
    }

    #[test]
    fn test_mutations_never_create_cycles() {
        let (mut config, mut indexer, mut rng) = setup();
        config.node_add_prob = 0.5;
        config.conn_add_prob = 1.0;
        config.conn_delete_prob = 0.1;
        let mut genome = Genome::new(1, &config, &mut indexer, &mut rng);

        for _ in 0..300 {
            genome.mutate(&config, &mut indexer, &mut rng);
            let keys: Vec<ConnectionKey> = genome.connections.keys().copied().collect();
            for (i, key) in keys.iter().enumerate() {
                let others: Vec<ConnectionKey> = keys
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, k)| *k)
                    .collect();
                assert!(!creates_cycle(others.iter(), *key), "cycle via {:?}", key);
            }
        }
    }

    #[test]
    fn test_creates_cycle() {
        let conns = [(-1, 1), (1, 2), (2, 0)];
        assert!(creates_cycle(conns.iter(), (2, 1)));
        assert!(creates_cycle(conns.iter(), (0, 1)));
        assert!(creates_cycle(conns.iter(), (1, 1)));
        assert!(!creates_cycle(conns.iter(), (-1, 2)));
        assert!(!creates_cycle(conns.iter(), (1, 0)));
    }

    #[test]
    fn test_weights_stay_clamped() {
        let (mut config, mut indexer, mut rng) = setup();
        config.weight_mutate_power = 50.0;
        config.weight_max_value = 2.0;
        let mut genome = Genome::new(1, &config, &mut indexer, &mut rng);
        for _ in 0..50 {
            genome.mutate(&config, &mut indexer, &mut rng);
        }
        assert!(genome.connections.values().all(|c| c.weight.abs() <= 2.0));
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let (config, mut indexer, mut rng) = setup();
        let genome = Genome::new(1, &config, &mut indexer, &mut rng);
        assert_eq!(genome.distance(&genome, &config), 0.0);
    }

    #[test]
    fn test_distance_counts_disjoint_genes() {
        let (config, mut indexer, mut rng) = setup();
        let a = Genome::new(1, &config, &mut indexer, &mut rng);
        let mut b = a.clone();
        b.mutate_add_node(&config, &mut indexer, &mut rng);

        let d = a.distance(&b, &config);
        assert!(d > 0.0);
        assert!((d - b.distance(&a, &config)).abs() < 1e-12);
    }

    #[test]
    fn test_crossover_inherits_structure_from_fitter_parent() {
        let (config, mut indexer, mut rng) = setup();
        let mut fit = Genome::new(1, &config, &mut indexer, &mut rng);
        fit.mutate_add_node(&config, &mut indexer, &mut rng);
        fit.fitness = 10.0;
        let mut weak = Genome::new(2, &config, &mut indexer, &mut rng);
        weak.fitness = 1.0;

        let child = Genome::crossover(3, &weak, &fit, &mut rng);
        assert_eq!(child.key, 3);
        assert_eq!(
            child.connections.keys().collect::<Vec<_>>(),
            fit.connections.keys().collect::<Vec<_>>()
        );
        assert_eq!(
            child.nodes.keys().collect::<Vec<_>>(),
            fit.nodes.keys().collect::<Vec<_>>()
        );
        assert_eq!(child.fitness, 0.0);
    }

    #[test]
    fn test_activation_functions() {
        assert!((ActivationFunction::Sigmoid.activate(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(ActivationFunction::Tanh.activate(0.0), 0.0);
        assert_eq!(ActivationFunction::Relu.activate(-3.0), 0.0);
        assert_eq!(ActivationFunction::Identity.activate(-3.0), -3.0);
    }
}
