//! The flappy world.
//!
//! A bird at a fixed column falls under gravity and flaps upward on demand,
//! while pipe pairs scroll in from the right. Touching a pipe, the ground or
//! the top of the screen kills the bird.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
