//! One run of the world with a flock of controlled birds.

use super::frontend::Scene;
use crate::constants::*;
use crate::controller::{decide, Controller, Observation};
use crate::game::{
    collides, has_passed, jump, move_base, move_bird, move_pipe, out_of_bounds, Base, Bird, Pipe,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// A candidate's bird, its controller and its running fitness, kept together
/// so removal can never pair the wrong entries.
#[derive(Debug, Clone)]
pub struct BirdRecord<C> {
    /// Index of the candidate in the evaluated population.
    pub id: usize,
    pub bird: Bird,
    pub controller: C,
    pub fitness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EpisodeStatus {
    #[default]
    Running,
    /// No birds left.
    Extinct,
    /// The score went past the cap.
    Solved,
    /// The tick limit was reached.
    TimedOut,
    /// The user asked to stop. Set by the episode driver, never by `tick`.
    Quit,
}

impl EpisodeStatus {
    pub fn is_over(&self) -> bool {
        *self != EpisodeStatus::Running
    }
}

/// Limits for one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSettings {
    /// The episode ends once the score exceeds this.
    pub score_cap: u32,
    pub max_ticks: Option<u64>,
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self {
            score_cap: SCORE_CAP,
            max_ticks: None,
        }
    }
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// Candidates that flapped.
    pub jumped: Vec<usize>,
    /// Candidates removed after hitting a pipe.
    pub crashed: Vec<usize>,
    /// Candidates removed for leaving the play area.
    pub out_of_bounds: Vec<usize>,
    /// A pipe was passed and the score went up.
    pub scored: bool,
    pub status: EpisodeStatus,
}

pub struct Episode<C> {
    records: Vec<BirdRecord<C>>,
    retired: Vec<BirdRecord<C>>,
    pipes: Vec<Pipe>,
    base: Base,
    score: u32,
    ticks: u64,
    settings: EpisodeSettings,
    status: EpisodeStatus,
    rng: ChaCha8Rng,
}

impl<C: Controller> Episode<C> {
    /// One bird per controller, all at the spawn point, with a single pipe
    /// waiting off to the right. Without controllers the episode is over
    /// before it starts.
    pub fn new(controllers: Vec<C>, settings: EpisodeSettings, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let records: Vec<BirdRecord<C>> = controllers
            .into_iter()
            .enumerate()
            .map(|(id, controller)| BirdRecord {
                id,
                bird: Bird::spawn(),
                controller,
                fitness: 0.0,
            })
            .collect();
        let status = if records.is_empty() {
            EpisodeStatus::Extinct
        } else {
            EpisodeStatus::Running
        };

        Self {
            records,
            retired: Vec::new(),
            pipes: vec![Pipe::random(PIPE_SPAWN_X, &mut rng)],
            base: Base::new(FLOOR_Y),
            score: 0,
            ticks: 0,
            settings,
            status,
            rng,
        }
    }

    /// Advance the world by one frame.
    pub fn tick(&mut self) -> TickResult {
        let mut result = TickResult {
            status: self.status,
            ..Default::default()
        };
        if self.status.is_over() {
            return result;
        }
        self.ticks += 1;

        // Fly
        for record in self.records.iter_mut() {
            move_bird(&mut record.bird);
            record.fitness += SURVIVAL_REWARD;

            let Some(pipe) = next_pipe(&self.pipes, &record.bird) else {
                continue;
            };
            let observation = Observation::new(&record.bird, pipe);
            if decide(&record.controller, &observation) {
                jump(&mut record.bird);
                result.jumped.push(record.id);
            }
        }

        // Pipes
        move_base(&mut self.base);
        let mut add_pipe = false;
        for pipe in self.pipes.iter_mut() {
            let (crashed, alive): (Vec<_>, Vec<_>) = self
                .records
                .drain(..)
                .partition(|r| collides(pipe, &r.bird));
            self.records = alive;
            for mut record in crashed {
                record.fitness -= CRASH_PENALTY;
                result.crashed.push(record.id);
                self.retired.push(record);
            }

            if !pipe.passed && self.records.iter().any(|r| has_passed(pipe, &r.bird)) {
                pipe.passed = true;
                add_pipe = true;
            }
            move_pipe(pipe);
        }

        if add_pipe {
            self.score += 1;
            for record in self.records.iter_mut() {
                record.fitness += PASS_BONUS;
            }
            self.pipes.push(Pipe::random(PIPE_SPAWN_X, &mut self.rng));
            result.scored = true;
        }
        self.pipes.retain(|p| !p.is_off_screen());

        // Ground and ceiling
        let (gone, alive): (Vec<_>, Vec<_>) =
            self.records.drain(..).partition(|r| out_of_bounds(&r.bird));
        self.records = alive;
        for record in gone {
            result.out_of_bounds.push(record.id);
            self.retired.push(record);
        }

        self.status = if self.score > self.settings.score_cap {
            EpisodeStatus::Solved
        } else if self.records.is_empty() {
            EpisodeStatus::Extinct
        } else if self
            .settings
            .max_ticks
            .is_some_and(|limit| self.ticks >= limit)
        {
            EpisodeStatus::TimedOut
        } else {
            EpisodeStatus::Running
        };
        result.status = self.status;
        result
    }

    /// Mark the episode as stopped by the user.
    pub fn quit(&mut self) {
        self.status = EpisodeStatus::Quit;
    }
}

impl<C> Episode<C> {
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn alive(&self) -> usize {
        self.records.len()
    }

    pub fn live_records(&self) -> &[BirdRecord<C>] {
        &self.records
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Fittest bird still flying; the earliest candidate wins a tie.
    pub fn best_live(&self) -> Option<&BirdRecord<C>> {
        self.records
            .iter()
            .fold(None, |best: Option<&BirdRecord<C>>, r| match best {
                Some(b) if b.fitness >= r.fitness => Some(b),
                _ => Some(r),
            })
    }

    /// Fitness of every candidate, dead or alive, ordered by candidate id.
    pub fn fitness(&self) -> Vec<(usize, f64)> {
        let mut all: Vec<(usize, f64)> = self
            .records
            .iter()
            .chain(self.retired.iter())
            .map(|r| (r.id, r.fitness))
            .collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    pub fn scene(&self, generation: u32) -> Scene<'_> {
        Scene {
            pipes: &self.pipes,
            base: &self.base,
            birds: self.records.iter().map(|r| &r.bird).collect(),
            score: self.score,
            generation,
            alive: self.records.len(),
        }
    }
}

/// The first pipe the bird has not yet flown past, or the last one if it has
/// passed them all.
fn next_pipe<'a>(pipes: &'a [Pipe], bird: &Bird) -> Option<&'a Pipe> {
    pipes
        .iter()
        .find(|p| !has_passed(p, bird))
        .or_else(|| pipes.last())
}
