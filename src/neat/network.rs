//! Feed-forward network built from a genome's enabled connections.

use super::config::NeatConfig;
use super::genome::{ActivationFunction, ConnectionKey, Genome, NodeKey};
use crate::controller::Controller;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct NodeEval {
    node: NodeKey,
    activation: ActivationFunction,
    bias: f64,
    links: Vec<(NodeKey, f64)>,
}

/// Phenotype of a genome. Evaluation is stateless: every call starts from
/// zeroed node values.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    input_nodes: Vec<NodeKey>,
    output_nodes: Vec<NodeKey>,
    node_evals: Vec<NodeEval>,
}

impl FeedForwardNetwork {
    pub fn create(genome: &Genome, config: &NeatConfig) -> Self {
        let input_nodes = config.input_keys();
        let output_nodes = config.output_keys();
        let connections: Vec<ConnectionKey> = genome
            .connections
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.key)
            .collect();

        let mut node_evals = Vec::new();
        for layer in feed_forward_layers(&input_nodes, &output_nodes, &connections) {
            for node in layer {
                let links = genome
                    .connections
                    .values()
                    .filter(|c| c.enabled && c.key.1 == node)
                    .map(|c| (c.key.0, c.weight))
                    .collect();
                let (bias, activation) = match genome.nodes.get(&node) {
                    Some(gene) => (gene.bias, gene.activation),
                    None => (0.0, config.activation),
                };
                node_evals.push(NodeEval {
                    node,
                    activation,
                    bias,
                    links,
                });
            }
        }

        Self {
            input_nodes,
            output_nodes,
            node_evals,
        }
    }

    /// Evaluate the network. Missing inputs read as 0.0; extra inputs are ignored.
    pub fn activate(&self, inputs: &[f64]) -> Vec<f64> {
        let mut values: BTreeMap<NodeKey, f64> = BTreeMap::new();
        for (i, key) in self.input_nodes.iter().enumerate() {
            values.insert(*key, inputs.get(i).copied().unwrap_or(0.0));
        }

        for eval in &self.node_evals {
            let sum: f64 = eval
                .links
                .iter()
                .map(|(from, weight)| values.get(from).copied().unwrap_or(0.0) * weight)
                .sum();
            values.insert(eval.node, eval.activation.activate(eval.bias + sum));
        }

        self.output_nodes
            .iter()
            .map(|key| values.get(key).copied().unwrap_or(0.0))
            .collect()
    }
}

impl Controller for FeedForwardNetwork {
    fn activate(&self, inputs: &[f64]) -> Vec<f64> {
        FeedForwardNetwork::activate(self, inputs)
    }
}

/// Nodes whose values can reach an output, walking backwards from the outputs.
/// Inputs are never included; outputs always are.
pub fn required_for_output(
    inputs: &[NodeKey],
    outputs: &[NodeKey],
    connections: &[ConnectionKey],
) -> BTreeSet<NodeKey> {
    let mut required: BTreeSet<NodeKey> = outputs.iter().copied().collect();
    let mut seen = required.clone();
    loop {
        let frontier: BTreeSet<NodeKey> = connections
            .iter()
            .filter(|(a, b)| seen.contains(b) && !seen.contains(a))
            .map(|(a, _)| *a)
            .collect();
        if frontier.is_empty() {
            break;
        }

        let layer: BTreeSet<NodeKey> = frontier
            .iter()
            .copied()
            .filter(|n| !inputs.contains(n))
            .collect();
        if layer.is_empty() {
            break;
        }

        required.extend(layer);
        seen.extend(frontier);
    }
    required
}

/// Group required nodes into layers that can be evaluated in order: every
/// node's inputs are available once all earlier layers are done.
pub fn feed_forward_layers(
    inputs: &[NodeKey],
    outputs: &[NodeKey],
    connections: &[ConnectionKey],
) -> Vec<Vec<NodeKey>> {
    let required = required_for_output(inputs, outputs, connections);

    let mut layers = Vec::new();
    let mut ready: BTreeSet<NodeKey> = inputs.iter().copied().collect();
    loop {
        let candidates: BTreeSet<NodeKey> = connections
            .iter()
            .filter(|(a, b)| ready.contains(a) && !ready.contains(b))
            .map(|(_, b)| *b)
            .collect();

        let layer: Vec<NodeKey> = candidates
            .into_iter()
            .filter(|n| {
                required.contains(n)
                    && connections
                        .iter()
                        .filter(|(_, b)| b == n)
                        .all(|(a, _)| ready.contains(a))
            })
            .collect();
        if layer.is_empty() {
            break;
        }

        ready.extend(layer.iter().copied());
        layers.push(layer);
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neat::genome::{ConnectionGene, NodeGene};

    fn genome_with(nodes: &[(NodeKey, f64)], conns: &[(ConnectionKey, f64, bool)]) -> Genome {
        let mut genome = Genome::empty(1);
        for &(key, bias) in nodes {
            genome.nodes.insert(
                key,
                NodeGene {
                    key,
                    bias,
                    activation: ActivationFunction::Identity,
                },
            );
        }
        for &(key, weight, enabled) in conns {
            genome.connections.insert(
                key,
                ConnectionGene {
                    key,
                    weight,
                    enabled,
                },
            );
        }
        genome
    }

    #[test]
    fn test_direct_weighted_sum() {
        let config = NeatConfig::default();
        let genome = genome_with(
            &[(0, 0.5)],
            &[((-1, 0), 1.0, true), ((-2, 0), 2.0, true), ((-3, 0), -1.0, true)],
        );
        let net = FeedForwardNetwork::create(&genome, &config);
        let out = net.activate(&[1.0, 2.0, 3.0]);
        // 0.5 + 1*1 + 2*2 - 1*3
        assert_eq!(out, vec![2.5]);
    }

    #[test]
    fn test_disabled_connections_ignored() {
        let config = NeatConfig::default();
        let genome = genome_with(&[(0, 0.0)], &[((-1, 0), 1.0, true), ((-2, 0), 5.0, false)]);
        let net = FeedForwardNetwork::create(&genome, &config);
        assert_eq!(net.activate(&[1.0, 1.0, 1.0]), vec![1.0]);
    }

    #[test]
    fn test_hidden_layer_order() {
        let config = NeatConfig::default();
        let genome = genome_with(
            &[(0, 0.0), (1, 1.0)],
            &[((-1, 1), 2.0, true), ((1, 0), 3.0, true)],
        );
        let net = FeedForwardNetwork::create(&genome, &config);
        // hidden = 1 + 2*2 = 5; out = 3*5
        assert_eq!(net.activate(&[2.0, 0.0, 0.0]), vec![15.0]);
    }

    #[test]
    fn test_unreachable_output_reads_zero() {
        let config = NeatConfig::default();
        let genome = genome_with(&[(0, 0.7)], &[]);
        let net = FeedForwardNetwork::create(&genome, &config);
        assert_eq!(net.activate(&[1.0, 1.0, 1.0]), vec![0.0]);
    }

    #[test]
    fn test_dangling_hidden_node_not_required() {
        let conns = [(-1, 0), (-2, 5)];
        let required = required_for_output(&[-1, -2], &[0], &conns);
        assert!(required.contains(&0));
        assert!(!required.contains(&5));

        let layers = feed_forward_layers(&[-1, -2], &[0], &conns);
        assert_eq!(layers, vec![vec![0]]);
    }

    #[test]
    fn test_layers_respect_dependencies() {
        let conns = [(-1, 2), (-1, 3), (2, 3), (3, 0), (2, 0)];
        let layers = feed_forward_layers(&[-1], &[0], &conns);
        assert_eq!(layers, vec![vec![2], vec![3], vec![0]]);
    }

    #[test]
    fn test_network_as_controller() {
        let config = NeatConfig::default();
        let genome = genome_with(&[(0, 1.0)], &[]);
        let net = FeedForwardNetwork::create(&genome, &config);
        let controller: &dyn Controller = &net;
        assert_eq!(controller.activate(&[0.0, 0.0, 0.0]), vec![0.0]);
    }
}
