// World geometry (pixels)
pub const WIN_WIDTH: f64 = 500.0;
pub const WIN_HEIGHT: f64 = 800.0;
pub const FLOOR_Y: f64 = 730.0;

// Bird
pub const BIRD_START_X: f64 = 230.0;
pub const BIRD_START_Y: f64 = 350.0;
pub const BIRD_WIDTH: f64 = 68.0;
pub const BIRD_HEIGHT: f64 = 48.0;
pub const GRAVITY: f64 = 1.5;
pub const TERMINAL_VELOCITY: f64 = 16.0;
pub const JUMP_VELOCITY: f64 = -10.5;
pub const MAX_TILT: f64 = 25.0;
pub const TILT_STEP: f64 = 20.0;
pub const MIN_TILT: f64 = -90.0;
/// Past this tilt the bird is diving and the wings are held level.
pub const DIVE_TILT: f64 = -80.0;
/// Tilt stays up while the bird is less than this far below its jump height.
pub const TILT_HOLD_DISTANCE: f64 = 50.0;
pub const ANIMATION_TICKS: u32 = 5;
pub const WING_FRAMES: u32 = 3;

// Pipes
pub const PIPE_WIDTH: f64 = 104.0;
pub const PIPE_HEIGHT: f64 = 640.0;
pub const PIPE_GAP: f64 = 200.0;
pub const PIPE_SPEED: f64 = 5.0;
pub const PIPE_MIN_HEIGHT: u32 = 50;
pub const PIPE_MAX_HEIGHT: u32 = 450;
pub const PIPE_SPAWN_X: f64 = 600.0;

// Ground
pub const BASE_WIDTH: f64 = 672.0;
pub const BASE_SPEED: f64 = 5.0;

// Fitness shaping
pub const SURVIVAL_REWARD: f64 = 0.1;
pub const PASS_BONUS: f64 = 5.0;
pub const CRASH_PENALTY: f64 = 1.0;
pub const SCORE_CAP: u32 = 50;

// Controller contract
pub const NUM_OBSERVATIONS: usize = 3;
pub const JUMP_THRESHOLD: f64 = 0.5;

// Frame pacing for the terminal frontend
pub const FRAMES_PER_SECOND: u32 = 30;

// Persisted artifacts
pub const BEST_GENOME_FILE: &str = "best.genome";
pub const WINNER_GENOME_FILE: &str = "best_model.genome";
pub const LOG_FILE: &str = "flappy-evolve.log";
