//! Integration test: Episode mechanics
//!
//! Drives whole episodes through the public API with hand-written
//! controllers: physics, scoring, removal and termination.

use flappy_evolve::constants::*;
use flappy_evolve::harness::{
    run_episode, Episode, EpisodeSettings, EpisodeStatus, HeadlessFrontend,
};

type Brain = fn(&[f64]) -> Vec<f64>;

/// Never flaps.
fn rock(_: &[f64]) -> Vec<f64> {
    vec![0.0]
}

/// Flaps whenever the bird is closer to the lower gap edge than the upper
/// one. Good enough to clear a few pipes.
fn glider(inputs: &[f64]) -> Vec<f64> {
    let (to_top, to_bottom) = (inputs[1], inputs[2]);
    vec![if to_bottom < to_top + 40.0 { 1.0 } else { 0.0 }]
}

/// Returns no outputs at all.
fn mute(_: &[f64]) -> Vec<f64> {
    Vec::new()
}

fn settings(score_cap: u32, max_ticks: Option<u64>) -> EpisodeSettings {
    EpisodeSettings {
        score_cap,
        max_ticks,
    }
}

// =============================================================================
// Physics
// =============================================================================

#[test]
fn test_falling_bird_follows_gravity() {
    let mut episode: Episode<Brain> = Episode::new(vec![rock as Brain], EpisodeSettings::default(), 1);
    let mut y = BIRD_START_Y;
    let mut v = 0.0_f64;

    for _ in 0..10 {
        episode.tick();
        v = (v + GRAVITY).min(TERMINAL_VELOCITY);
        y += v;
        let bird = &episode.live_records()[0].bird;
        assert!((bird.velocity - v).abs() < 1e-9);
        assert!((bird.y - y).abs() < 1e-9);
    }
}

#[test]
fn test_velocity_never_exceeds_terminal() {
    let mut episode: Episode<Brain> = Episode::new(vec![rock as Brain], EpisodeSettings::default(), 1);
    while !episode.status().is_over() {
        episode.tick();
        if let Some(record) = episode.live_records().first() {
            assert!(record.bird.velocity <= TERMINAL_VELOCITY);
        }
    }
}

// =============================================================================
// Removal and fitness
// =============================================================================

#[test]
fn test_never_jumping_bird_dies_with_zero_score() {
    let mut episode: Episode<Brain> = Episode::new(vec![rock as Brain; 3], EpisodeSettings::default(), 7);
    let mut ticks = 0;
    while !episode.status().is_over() {
        episode.tick();
        ticks += 1;
        assert!(ticks < 100);
    }

    assert_eq!(episode.status(), EpisodeStatus::Extinct);
    assert_eq!(episode.score(), 0);
    assert_eq!(episode.alive(), 0);
    // Dead birds keep their fitness, one entry per candidate
    let fitness = episode.fitness();
    assert_eq!(fitness.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(fitness.iter().all(|(_, f)| *f > 0.0));
}

#[test]
fn test_controller_without_outputs_never_flaps() {
    let mut episode: Episode<Brain> = Episode::new(vec![mute as Brain], EpisodeSettings::default(), 3);
    let mut jumps = 0;
    while !episode.status().is_over() {
        jumps += episode.tick().jumped.len();
    }
    assert_eq!(jumps, 0);
    assert_eq!(episode.status(), EpisodeStatus::Extinct);
}

#[test]
fn test_removed_records_keep_their_own_fitness() {
    // The glider outlives the rocks, so its fitness must end up higher
    let brains: Vec<Brain> = vec![rock, glider, rock];
    let mut episode = Episode::new(brains, settings(SCORE_CAP, Some(400)), 11);
    while !episode.status().is_over() {
        episode.tick();
    }
    let fitness = episode.fitness();
    assert_eq!(fitness.len(), 3);
    assert!(fitness[1].1 > fitness[0].1);
    assert!((fitness[0].1 - fitness[2].1).abs() < 1e-9);
}

// =============================================================================
// Scoring and termination
// =============================================================================

#[test]
fn test_each_pass_scores_exactly_once() {
    let mut episode: Episode<Brain> =
        Episode::new(vec![glider as Brain; 4], settings(SCORE_CAP, Some(3_000)), 21);
    let mut scored_ticks = 0;
    let mut last_score = 0;
    while !episode.status().is_over() {
        let result = episode.tick();
        if result.scored {
            scored_ticks += 1;
        }
        assert!(episode.score() >= last_score);
        assert!(episode.score() <= last_score + 1);
        last_score = episode.score();
    }
    assert_eq!(scored_ticks, episode.score());
}

#[test]
fn test_episode_always_terminates() {
    for seed in 0..5 {
        let mut episode: Episode<Brain> =
            Episode::new(vec![glider as Brain, rock as Brain], settings(1, Some(5_000)), seed);
        let mut ticks = 0u64;
        while !episode.status().is_over() {
            episode.tick();
            ticks += 1;
            assert!(ticks <= 5_000);
        }
        assert!(matches!(
            episode.status(),
            EpisodeStatus::Solved | EpisodeStatus::Extinct | EpisodeStatus::TimedOut
        ));
        if episode.status() == EpisodeStatus::Solved {
            assert!(episode.score() > 1);
        }
    }
}

#[test]
fn test_zero_candidates_end_without_ticking() {
    let mut episode: Episode<Brain> = Episode::new(Vec::new(), EpisodeSettings::default(), 1);
    let mut frontend = HeadlessFrontend::new();
    let status = run_episode(&mut episode, &mut frontend, 1);
    assert_eq!(status, EpisodeStatus::Extinct);
    assert_eq!(episode.ticks(), 0);
    assert_eq!(frontend.frames(), 0);
}

#[test]
fn test_quit_stops_the_episode() {
    let mut episode: Episode<Brain> = Episode::new(vec![glider as Brain], EpisodeSettings::default(), 1);
    let mut frontend = HeadlessFrontend::quit_after(4);
    let status = run_episode(&mut episode, &mut frontend, 1);
    assert_eq!(status, EpisodeStatus::Quit);
    assert_eq!(episode.ticks(), 3);
    assert_eq!(episode.alive(), 1);
}

#[test]
fn test_same_seed_same_episode() {
    let run = |seed| {
        let mut episode: Episode<Brain> =
            Episode::new(vec![glider as Brain; 2], settings(SCORE_CAP, Some(1_000)), seed);
        while !episode.status().is_over() {
            episode.tick();
        }
        (episode.ticks(), episode.score(), episode.fitness())
    };
    assert_eq!(run(99), run(99));
}
