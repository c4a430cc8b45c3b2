//! flappy-evolve - Flappy Bird as a fitness function for neuroevolution.
//!
//! Every generation, each genome flies its own bird through the same stream
//! of pipes. Survival time and pipes passed become the genome's fitness.
//! The library exposes the world, the evolution driver and the training
//! runner for the binaries and for testing.

pub mod constants;
pub mod controller;
pub mod game;
pub mod harness;
pub mod neat;
pub mod persistence;
pub mod training;
pub mod ui;
