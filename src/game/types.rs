//! Flappy world entities: the bird, pipe pairs and the scrolling ground.
//!
//! All coordinates are world pixels with the origin at the top-left corner
//! and y growing downward, so a negative velocity moves the bird up.

use crate::constants::*;
use rand::Rng;

/// Axis-aligned bounding box used for collision tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict overlap: rectangles that only touch along an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A bird flying at a fixed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    /// Horizontal position (never changes).
    pub x: f64,
    /// Top edge of the sprite.
    pub y: f64,
    /// Vertical velocity in px/tick (positive = falling).
    pub velocity: f64,
    /// Render-only rotation in degrees (positive = nose up).
    pub tilt: f64,
    /// Ticks elapsed since the last jump.
    pub ticks_since_jump: u32,
    /// Height at which the last jump happened.
    pub jump_y: f64,
    /// Wing animation counter.
    pub anim_ticks: u32,
}

impl Bird {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            tilt: 0.0,
            ticks_since_jump: 0,
            jump_y: y,
            anim_ticks: 0,
        }
    }

    /// Bird at the standard spawn point.
    pub fn spawn() -> Self {
        Self::new(BIRD_START_X, BIRD_START_Y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, BIRD_WIDTH, BIRD_HEIGHT)
    }

    /// Current wing frame: 0 = up, 1 = level, 2 = down.
    ///
    /// The cycle runs up, level, down, level so the flap looks continuous.
    pub fn wing_frame(&self) -> u32 {
        match self.anim_ticks / ANIMATION_TICKS {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 1,
        }
    }
}

/// A top/bottom pipe pair with a gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Left edge.
    pub x: f64,
    /// y of the gap's upper edge (bottom of the top pipe).
    pub height: f64,
    /// Set once a bird has flown past the right edge.
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: f64, height: f64) -> Self {
        Self {
            x,
            height,
            passed: false,
        }
    }

    /// Spawn a pipe at `x` with a random gap position.
    pub fn random<R: Rng>(x: f64, rng: &mut R) -> Self {
        let height = rng.gen_range(PIPE_MIN_HEIGHT..=PIPE_MAX_HEIGHT);
        Self::new(x, height as f64)
    }

    /// y of the top pipe's sprite (usually negative, off-screen).
    pub fn top(&self) -> f64 {
        self.height - PIPE_HEIGHT
    }

    /// y of the gap's lower edge (top of the bottom pipe).
    pub fn bottom(&self) -> f64 {
        self.height + PIPE_GAP
    }

    pub fn right(&self) -> f64 {
        self.x + PIPE_WIDTH
    }

    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, self.top(), PIPE_WIDTH, PIPE_HEIGHT)
    }

    pub fn bottom_rect(&self) -> Rect {
        Rect::new(self.x, self.bottom(), PIPE_WIDTH, PIPE_HEIGHT)
    }

    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// The ground strip: two copies of the texture leapfrogging each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
}

impl Base {
    pub fn new(y: f64) -> Self {
        Self {
            y,
            x1: 0.0,
            x2: BASE_WIDTH,
        }
    }
}
