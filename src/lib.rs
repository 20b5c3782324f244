//! Reaction Speed - hit the target before the bar empties
//!
//! Core modules:
//! - `sim`: Round/timing state machine, round clock and target placement
//! - `game`: Command entry point owning the state and its collaborators
//! - `persistence`: Key-value storage and the best-score record
//! - `cue`: Symbolic audio cues (`audio` plays them through Web Audio)
//! - `headless`: Virtual-time driver for running a game without a browser

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod cue;
pub mod game;
pub mod headless;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use cue::{CueKind, CuePlayer};
pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Time budget of round 1 (ms)
    pub const BASE_ROUND_MS: u32 = 1300;
    /// Difficulty floor (ms)
    pub const MIN_ROUND_MS: u32 = 450;
    /// Linear reduction per round (ms)
    pub const DECAY_PER_ROUND: u32 = 55;

    /// Countdown starts here: 3..2..1..Go
    pub const COUNTDOWN_FROM: u32 = 3;
    /// Delay between countdown ticks (ms)
    pub const COUNTDOWN_TICK_MS: u32 = 650;

    /// Target footprint (px)
    pub const TARGET_SIZE: f32 = 72.0;
    /// Padding kept between the target and the board edge (px)
    pub const BOARD_PADDING: f32 = 16.0;

    /// Board size assumed until the first resize arrives
    pub const DEFAULT_BOARD_WIDTH: f32 = 320.0;
    pub const DEFAULT_BOARD_HEIGHT: f32 = 400.0;

    /// Clock sampling interval when there is no display refresh (ms)
    pub const HEADLESS_SAMPLE_MS: f64 = 1000.0 / 60.0;
}
