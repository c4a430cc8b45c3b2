//! Per-tick physics and collision rules for the flappy world.

use super::types::{Base, Bird, Pipe};
use crate::constants::*;

/// Advance a bird by one tick: gravity, integration, tilt and wing animation.
pub fn move_bird(bird: &mut Bird) {
    bird.ticks_since_jump = bird.ticks_since_jump.saturating_add(1);

    bird.velocity = (bird.velocity + GRAVITY).min(TERMINAL_VELOCITY);
    bird.y += bird.velocity;

    if bird.velocity < 0.0 || bird.y < bird.jump_y + TILT_HOLD_DISTANCE {
        bird.tilt = MAX_TILT;
    } else if bird.tilt > MIN_TILT {
        bird.tilt = (bird.tilt - TILT_STEP).max(MIN_TILT);
    }

    let cycle = ANIMATION_TICKS * 2 * (WING_FRAMES - 1);
    bird.anim_ticks = (bird.anim_ticks + 1) % cycle;
    if bird.tilt <= DIVE_TILT {
        // Wings level while diving; the next flap resumes on the downstroke.
        bird.anim_ticks = ANIMATION_TICKS;
    }
}

/// Flap: velocity is overridden, not added to.
pub fn jump(bird: &mut Bird) {
    bird.velocity = JUMP_VELOCITY;
    bird.ticks_since_jump = 0;
    bird.jump_y = bird.y;
}

pub fn move_pipe(pipe: &mut Pipe) {
    pipe.x -= PIPE_SPEED;
}

/// Scroll the ground, wrapping each segment behind the other once it leaves
/// the screen.
pub fn move_base(base: &mut Base) {
    base.x1 -= BASE_SPEED;
    base.x2 -= BASE_SPEED;

    if base.x1 + BASE_WIDTH < 0.0 {
        base.x1 = base.x2 + BASE_WIDTH;
    }
    if base.x2 + BASE_WIDTH < 0.0 {
        base.x2 = base.x1 + BASE_WIDTH;
    }
}

/// Bounding-box test against both halves of a pipe pair.
pub fn collides(pipe: &Pipe, bird: &Bird) -> bool {
    let bird_rect = bird.rect();
    bird_rect.overlaps(&pipe.top_rect()) || bird_rect.overlaps(&pipe.bottom_rect())
}

/// The bird touched the ground or flew above the top of the screen.
pub fn out_of_bounds(bird: &Bird) -> bool {
    bird.y + BIRD_HEIGHT >= FLOOR_Y || bird.y < 0.0
}

/// The bird is past the pipe's right edge.
pub fn has_passed(pipe: &Pipe, bird: &Bird) -> bool {
    bird.x > pipe.right()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_integrates_velocity() {
        let mut bird = Bird::spawn();
        let mut prev_y = bird.y;
        let mut prev_vel = bird.velocity;
        for _ in 0..40 {
            move_bird(&mut bird);
            let expected_vel = (prev_vel + GRAVITY).min(TERMINAL_VELOCITY);
            assert!((bird.velocity - expected_vel).abs() < 1e-9);
            assert!((bird.y - (prev_y + expected_vel)).abs() < 1e-9);
            prev_y = bird.y;
            prev_vel = bird.velocity;
        }
    }

    #[test]
    fn test_velocity_capped_at_terminal() {
        let mut bird = Bird::spawn();
        bird.velocity = 100.0;
        move_bird(&mut bird);
        assert_eq!(bird.velocity, TERMINAL_VELOCITY);
    }

    #[test]
    fn test_jump_overrides_velocity() {
        let mut bird = Bird::spawn();
        bird.velocity = 12.0;
        bird.ticks_since_jump = 9;
        jump(&mut bird);
        assert_eq!(bird.velocity, JUMP_VELOCITY);
        assert_eq!(bird.ticks_since_jump, 0);
        assert_eq!(bird.jump_y, bird.y);

        let y = bird.y;
        move_bird(&mut bird);
        assert!(bird.y < y); // Rising after a jump
        assert_eq!(bird.tilt, MAX_TILT);
    }

    #[test]
    fn test_tilt_drops_while_falling() {
        let mut bird = Bird::spawn();
        bird.jump_y = 0.0; // Well above, so the hold window is over
        bird.velocity = 5.0;
        bird.tilt = 0.0;
        move_bird(&mut bird);
        assert_eq!(bird.tilt, -TILT_STEP);

        for _ in 0..20 {
            move_bird(&mut bird);
        }
        assert_eq!(bird.tilt, MIN_TILT);
    }

    #[test]
    fn test_wings_level_when_diving() {
        let mut bird = Bird::spawn();
        bird.jump_y = 0.0;
        bird.velocity = 5.0;
        bird.tilt = MIN_TILT;
        move_bird(&mut bird);
        assert_eq!(bird.wing_frame(), 1);
    }

    #[test]
    fn test_wing_cycle() {
        let mut bird = Bird::spawn();
        // Keep the bird rising so it never dives
        let mut frames = Vec::new();
        for _ in 0..(ANIMATION_TICKS * 4) {
            jump(&mut bird);
            move_bird(&mut bird);
            frames.push(bird.wing_frame());
        }
        assert!(frames.contains(&0));
        assert!(frames.contains(&1));
        assert!(frames.contains(&2));
    }

    #[test]
    fn test_pipe_moves_left() {
        let mut pipe = Pipe::new(PIPE_SPAWN_X, 200.0);
        move_pipe(&mut pipe);
        assert_eq!(pipe.x, PIPE_SPAWN_X - PIPE_SPEED);
    }

    #[test]
    fn test_base_wraps() {
        let mut base = Base::new(FLOOR_Y);
        let ticks = (BASE_WIDTH / BASE_SPEED) as usize + 2;
        for _ in 0..ticks {
            move_base(&mut base);
        }
        // First segment wrapped behind the second
        assert!(base.x1 > base.x2);
        assert!((base.x1 - base.x2 - BASE_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn test_collision_with_top_pipe() {
        let bird = Bird::new(BIRD_START_X, 100.0);
        let pipe = Pipe::new(BIRD_START_X - 10.0, 300.0);
        assert!(collides(&pipe, &bird));
    }

    #[test]
    fn test_collision_with_bottom_pipe() {
        let bird = Bird::new(BIRD_START_X, 480.0);
        let pipe = Pipe::new(BIRD_START_X, 200.0);
        assert!(collides(&pipe, &bird));
    }

    #[test]
    fn test_no_collision_in_gap() {
        // Gap spans 200..400, bird spans 250..298
        let bird = Bird::new(BIRD_START_X, 250.0);
        let pipe = Pipe::new(BIRD_START_X, 200.0);
        assert!(!collides(&pipe, &bird));
    }

    #[test]
    fn test_no_collision_when_horizontally_clear() {
        let bird = Bird::new(BIRD_START_X, 50.0);
        let pipe = Pipe::new(BIRD_START_X + BIRD_WIDTH + 1.0, 300.0);
        assert!(!collides(&pipe, &bird));
    }

    #[test]
    fn test_out_of_bounds() {
        assert!(!out_of_bounds(&Bird::spawn()));
        assert!(out_of_bounds(&Bird::new(BIRD_START_X, -1.0)));
        assert!(out_of_bounds(&Bird::new(BIRD_START_X, FLOOR_Y - BIRD_HEIGHT)));
        assert!(!out_of_bounds(&Bird::new(BIRD_START_X, 0.0)));
    }

    #[test]
    fn test_has_passed_uses_right_edge() {
        let bird = Bird::spawn();
        let mut pipe = Pipe::new(bird.x - PIPE_WIDTH, 200.0);
        assert!(!has_passed(&pipe, &bird)); // Right edge exactly at bird.x
        pipe.x -= 1.0;
        assert!(has_passed(&pipe, &bird));
    }
}
