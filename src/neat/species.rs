//! Speciation and stagnation tracking.

use super::config::NeatConfig;
use super::genome::{Genome, GenomeId};
use std::collections::{BTreeMap, BTreeSet};

pub type SpeciesId = u64;

/// A group of genetically similar genomes.
#[derive(Debug, Clone)]
pub struct Species {
    pub key: SpeciesId,
    /// Generation the species first appeared in.
    pub created: u32,
    /// Last generation its best fitness went up.
    pub last_improved: u32,
    pub representative: Genome,
    pub members: Vec<GenomeId>,
    /// Best member fitness from the latest evaluation.
    pub fitness: Option<f64>,
    /// Mean member fitness, normalised against the whole population.
    pub adjusted_fitness: Option<f64>,
    pub fitness_history: Vec<f64>,
}

impl Species {
    fn new(key: SpeciesId, generation: u32, representative: Genome) -> Self {
        Self {
            key,
            created: generation,
            last_improved: generation,
            members: vec![representative.key],
            representative,
            fitness: None,
            adjusted_fitness: None,
            fitness_history: Vec::new(),
        }
    }

    /// Fitness values of the members, looked up in `population`.
    pub fn member_fitnesses(&self, population: &[Genome]) -> Vec<f64> {
        self.members
            .iter()
            .filter_map(|id| find_genome(population, *id))
            .map(|g| g.fitness)
            .collect()
    }
}

/// All species alive in the current generation.
#[derive(Debug, Clone, Default)]
pub struct SpeciesSet {
    pub species: BTreeMap<SpeciesId, Species>,
    next_key: SpeciesId,
}

impl SpeciesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn species_of(&self, genome: GenomeId) -> Option<SpeciesId> {
        self.species
            .values()
            .find(|s| s.members.contains(&genome))
            .map(|s| s.key)
    }

    /// Partition `population` into species.
    ///
    /// Each existing species first claims the genome closest to its old
    /// representative as the new representative. Remaining genomes join the
    /// closest representative under the compatibility threshold, or found a
    /// new species. Species that claim nobody disappear.
    pub fn speciate(&mut self, config: &NeatConfig, population: &[Genome], generation: u32) {
        let mut unspeciated: BTreeSet<GenomeId> = population.iter().map(|g| g.key).collect();
        let mut representatives: BTreeMap<SpeciesId, GenomeId> = BTreeMap::new();
        let mut members: BTreeMap<SpeciesId, Vec<GenomeId>> = BTreeMap::new();

        for (sid, species) in &self.species {
            let closest = unspeciated
                .iter()
                .filter_map(|id| find_genome(population, *id))
                .map(|g| (species.representative.distance(g, config), g.key))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            if let Some((_, gid)) = closest {
                representatives.insert(*sid, gid);
                members.insert(*sid, vec![gid]);
                unspeciated.remove(&gid);
            }
        }

        while let Some(gid) = unspeciated.pop_first() {
            let Some(genome) = find_genome(population, gid) else {
                continue;
            };

            let closest = representatives
                .iter()
                .filter_map(|(sid, rid)| {
                    let rep = find_genome(population, *rid)?;
                    let d = rep.distance(genome, config);
                    (d < config.compatibility_threshold).then_some((d, *sid))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0));

            match closest {
                Some((_, sid)) => members.entry(sid).or_default().push(gid),
                None => {
                    let sid = self.next_key;
                    self.next_key += 1;
                    representatives.insert(sid, gid);
                    members.insert(sid, vec![gid]);
                }
            }
        }

        let mut next = BTreeMap::new();
        for (sid, rid) in representatives {
            let Some(rep) = find_genome(population, rid) else {
                continue;
            };
            let mut species = self
                .species
                .remove(&sid)
                .unwrap_or_else(|| Species::new(sid, generation, rep.clone()));
            species.representative = rep.clone();
            species.members = members.remove(&sid).unwrap_or_default();
            next.insert(sid, species);
        }
        self.species = next;
    }

    /// Refresh species fitness and decide which species are stagnant.
    ///
    /// Returns species keys in ascending order of fitness, each paired with
    /// its stagnation verdict. The `species_elitism` best species are never
    /// stagnant, and at least that many species are always kept.
    pub fn update_stagnation(
        &mut self,
        config: &NeatConfig,
        population: &[Genome],
        generation: u32,
    ) -> Vec<(SpeciesId, bool)> {
        let mut ranked: Vec<(SpeciesId, f64)> = Vec::with_capacity(self.species.len());
        for species in self.species.values_mut() {
            let previous_best = species
                .fitness_history
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let fitness = species
                .member_fitnesses(population)
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max);

            species.fitness = Some(fitness);
            species.fitness_history.push(fitness);
            species.adjusted_fitness = None;
            if fitness > previous_best {
                species.last_improved = generation;
            }
            ranked.push((species.key, fitness));
        }
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let total = ranked.len();
        let mut non_stagnant = total;
        let mut result = Vec::with_capacity(total);
        for (idx, (sid, _)) in ranked.into_iter().enumerate() {
            let stagnant_time = self
                .species
                .get(&sid)
                .map(|s| generation.saturating_sub(s.last_improved))
                .unwrap_or(0);

            let mut is_stagnant = false;
            if non_stagnant > config.species_elitism {
                is_stagnant = stagnant_time >= config.max_stagnation;
            }
            if total - idx <= config.species_elitism {
                is_stagnant = false;
            }
            if is_stagnant {
                non_stagnant -= 1;
            }
            result.push((sid, is_stagnant));
        }
        result
    }
}

/// Binary search by key; `population` is kept sorted by genome key.
pub fn find_genome(population: &[Genome], key: GenomeId) -> Option<&Genome> {
    population
        .binary_search_by_key(&key, |g| g.key)
        .ok()
        .map(|idx| &population[idx])
}
