//! Building the next generation from the current one.

use super::config::NeatConfig;
use super::genome::{Genome, GenomeId, NodeIndexer};
use super::species::{find_genome, SpeciesId, SpeciesSet};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Creates genomes and hands out their keys.
#[derive(Debug, Clone)]
pub struct Reproduction {
    next_genome: GenomeId,
    pub node_indexer: NodeIndexer,
}

/// What happened during one reproduction step, for reporting.
#[derive(Debug, Clone, Default)]
pub struct ReproductionSummary {
    /// Species removed as stagnant, with their member counts.
    pub stagnant: Vec<(SpeciesId, usize)>,
    /// Every species was stagnant; no children were produced.
    pub extinct: bool,
}

impl Reproduction {
    pub fn new(config: &NeatConfig) -> Self {
        Self {
            next_genome: 1,
            node_indexer: NodeIndexer::new(config),
        }
    }

    fn next_key(&mut self) -> GenomeId {
        let key = self.next_genome;
        self.next_genome += 1;
        key
    }

    /// A brand new random population, sorted by key.
    pub fn create_new<R: Rng>(&mut self, config: &NeatConfig, count: usize, rng: &mut R) -> Vec<Genome> {
        (0..count)
            .map(|_| {
                let key = self.next_key();
                Genome::new(key, config, &mut self.node_indexer, rng)
            })
            .collect()
    }

    /// Produce the next generation.
    ///
    /// Stagnant species are dropped. The rest get offspring slots in
    /// proportion to their adjusted fitness; each keeps its `elitism` best
    /// members unchanged and fills the remaining slots with mutated children
    /// of parents drawn from its top `survival_threshold` fraction.
    ///
    /// On extinction the species set is emptied and an empty population is
    /// returned.
    pub fn reproduce<R: Rng>(
        &mut self,
        config: &NeatConfig,
        species: &mut SpeciesSet,
        population: &[Genome],
        generation: u32,
        rng: &mut R,
    ) -> (Vec<Genome>, ReproductionSummary) {
        let mut summary = ReproductionSummary::default();

        let mut all_fitnesses = Vec::new();
        let mut remaining: Vec<SpeciesId> = Vec::new();
        for (sid, stagnant) in species.update_stagnation(config, population, generation) {
            let Some(s) = species.species.get(&sid) else {
                continue;
            };
            if stagnant {
                summary.stagnant.push((sid, s.members.len()));
            } else {
                all_fitnesses.extend(s.member_fitnesses(population));
                remaining.push(sid);
            }
        }

        if remaining.is_empty() {
            species.species.clear();
            summary.extinct = true;
            return (Vec::new(), summary);
        }

        let min_fitness = all_fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
        let max_fitness = all_fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let fitness_range = (max_fitness - min_fitness).max(1.0);

        let mut adjusted = Vec::with_capacity(remaining.len());
        let mut previous_sizes = Vec::with_capacity(remaining.len());
        for sid in &remaining {
            if let Some(s) = species.species.get_mut(sid) {
                let fitnesses = s.member_fitnesses(population);
                let mean = mean(&fitnesses);
                let af = (mean - min_fitness) / fitness_range;
                s.adjusted_fitness = Some(af);
                adjusted.push(af);
                previous_sizes.push(s.members.len());
            }
        }

        let min_species_size = config.min_species_size.max(config.elitism);
        let spawn_amounts =
            compute_spawn(&adjusted, &previous_sizes, config.pop_size, min_species_size);

        let mut kept = BTreeMap::new();
        let mut next_population = Vec::with_capacity(config.pop_size);
        for (sid, spawn) in remaining.iter().zip(spawn_amounts) {
            let Some(mut s) = species.species.remove(sid) else {
                continue;
            };
            let mut spawn = spawn.max(config.elitism);

            let mut old_members: Vec<&Genome> = s
                .members
                .iter()
                .filter_map(|id| find_genome(population, *id))
                .collect();
            s.members.clear();
            kept.insert(*sid, s);

            // Stable sort: among equal fitness the earlier member stays ahead.
            old_members.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

            for elite in old_members.iter().take(config.elitism) {
                next_population.push((*elite).clone());
                spawn = spawn.saturating_sub(1);
            }
            if spawn == 0 {
                continue;
            }

            let cutoff = ((config.survival_threshold * old_members.len() as f64).ceil() as usize)
                .max(2)
                .min(old_members.len());
            let parents = &old_members[..cutoff];
            if parents.is_empty() {
                continue;
            }

            for _ in 0..spawn {
                let (Some(p1), Some(p2)) = (parents.choose(rng), parents.choose(rng)) else {
                    break;
                };
                let key = self.next_key();
                let mut child = Genome::crossover(key, p1, p2, rng);
                child.mutate(config, &mut self.node_indexer, rng);
                next_population.push(child);
            }
        }
        species.species = kept;

        next_population.sort_by_key(|g| g.key);
        (next_population, summary)
    }
}

/// Offspring counts per species.
///
/// Each species moves halfway from its previous size towards its
/// fitness-proportional share, then all counts are scaled so they add up to
/// `pop_size` (as far as the minimum species size allows).
pub fn compute_spawn(
    adjusted_fitness: &[f64],
    previous_sizes: &[usize],
    pop_size: usize,
    min_species_size: usize,
) -> Vec<usize> {
    let af_sum: f64 = adjusted_fitness.iter().sum();

    let mut amounts: Vec<f64> = adjusted_fitness
        .iter()
        .zip(previous_sizes)
        .map(|(af, &ps)| {
            let target = if af_sum > 0.0 {
                (af / af_sum * pop_size as f64).max(min_species_size as f64)
            } else {
                min_species_size as f64
            };
            let d = (target - ps as f64) * 0.5;
            let c = d.round();
            let mut spawn = ps as f64;
            if c.abs() > 0.0 {
                spawn += c;
            } else if d > 0.0 {
                spawn += 1.0;
            } else if d < 0.0 {
                spawn -= 1.0;
            }
            spawn
        })
        .collect();

    let total: f64 = amounts.iter().sum();
    if total > 0.0 {
        let norm = pop_size as f64 / total;
        for n in amounts.iter_mut() {
            *n *= norm;
        }
    }

    let mut spawn: Vec<usize> = amounts
        .iter()
        .map(|n| (n.round() as usize).max(min_species_size))
        .collect();

    // Rounding can leave the total a few genomes off; settle the difference
    // on the largest species.
    let total: usize = spawn.iter().sum();
    if let Some(largest) = (0..spawn.len()).max_by_key(|&i| spawn[i]) {
        if total < pop_size {
            spawn[largest] += pop_size - total;
        } else if total > pop_size {
            let excess = total - pop_size;
            let room = spawn[largest].saturating_sub(min_species_size);
            spawn[largest] -= excess.min(room);
        }
    }
    spawn
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
