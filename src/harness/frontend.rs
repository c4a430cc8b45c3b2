//! Where episodes are shown and where the quit signal comes from.

use crate::game::{Base, Bird, Pipe};
use std::io;

/// A snapshot of the world for drawing.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub pipes: &'a [Pipe],
    pub base: &'a Base,
    pub birds: Vec<&'a Bird>,
    pub score: u32,
    pub generation: u32,
    pub alive: usize,
}

pub trait Frontend {
    /// Polled once per tick before anything moves. Implementations that pace
    /// the loop do their waiting here.
    fn poll_quit(&mut self) -> io::Result<bool>;

    fn draw(&mut self, scene: &Scene) -> io::Result<()>;
}

/// Draws nothing and runs as fast as possible.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFrontend {
    quit_after: Option<u64>,
    polls: u64,
    frames: u64,
}

impl HeadlessFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a quit on the `polls`-th poll (1-based), as if the user pressed
    /// q at that moment.
    pub fn quit_after(polls: u64) -> Self {
        Self {
            quit_after: Some(polls),
            ..Self::default()
        }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Frontend for HeadlessFrontend {
    fn poll_quit(&mut self) -> io::Result<bool> {
        self.polls += 1;
        Ok(self.quit_after.is_some_and(|n| self.polls >= n))
    }

    fn draw(&mut self, _scene: &Scene) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
