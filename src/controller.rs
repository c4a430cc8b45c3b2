//! Decision contract between the simulation and whatever flies a bird.

use crate::constants::{JUMP_THRESHOLD, NUM_OBSERVATIONS};
use crate::game::{Bird, Pipe};

/// Anything that maps observations to output values.
///
/// Controllers are stateless from the simulation's point of view: the same
/// observation always gets the same answer.
pub trait Controller {
    fn activate(&self, inputs: &[f64]) -> Vec<f64>;
}

impl<F> Controller for F
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    fn activate(&self, inputs: &[f64]) -> Vec<f64> {
        self(inputs)
    }
}

/// What a bird sees each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub bird_y: f64,
    /// Vertical distance to the upper edge of the next gap.
    pub gap_top_distance: f64,
    /// Vertical distance to the lower edge of the next gap.
    pub gap_bottom_distance: f64,
}

impl Observation {
    pub fn new(bird: &Bird, pipe: &Pipe) -> Self {
        Self {
            bird_y: bird.y,
            gap_top_distance: (bird.y - pipe.height).abs(),
            gap_bottom_distance: (bird.y - pipe.bottom()).abs(),
        }
    }

    pub fn as_inputs(&self) -> [f64; NUM_OBSERVATIONS] {
        [self.bird_y, self.gap_top_distance, self.gap_bottom_distance]
    }
}

/// Ask the controller whether to flap. Only the first output is read; a
/// controller with no outputs never flaps.
pub fn decide<C: Controller + ?Sized>(controller: &C, observation: &Observation) -> bool {
    controller
        .activate(&observation.as_inputs())
        .first()
        .is_some_and(|output| *output > JUMP_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_distances() {
        let bird = Bird::new(230.0, 300.0);
        let pipe = Pipe::new(400.0, 250.0);
        let obs = Observation::new(&bird, &pipe);
        assert_eq!(obs.bird_y, 300.0);
        assert_eq!(obs.gap_top_distance, 50.0);
        assert_eq!(obs.gap_bottom_distance, 150.0);
        assert_eq!(obs.as_inputs(), [300.0, 50.0, 150.0]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let obs = Observation::new(&Bird::spawn(), &Pipe::new(400.0, 250.0));
        let at_threshold = |_: &[f64]| vec![0.5];
        let above = |_: &[f64]| vec![0.51];
        assert!(!decide(&at_threshold, &obs));
        assert!(decide(&above, &obs));
    }

    #[test]
    fn test_empty_output_never_jumps() {
        let obs = Observation::new(&Bird::spawn(), &Pipe::new(400.0, 250.0));
        let silent = |_: &[f64]| Vec::new();
        assert!(!decide(&silent, &obs));
    }
}
