//! Target placement
//!
//! Targets are placed uniformly inside the board while keeping the whole
//! footprint plus padding on screen. Boards smaller than the footprint pin the
//! target to the padded origin instead of failing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};
use crate::tuning::Tuning;

/// Target shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Square,
    Diamond,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Circle, Shape::Square, Shape::Diamond];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Diamond => "diamond",
        }
    }
}

/// Board dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardSize {
    pub width: f32,
    pub height: f32,
}

impl Default for BoardSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
        }
    }
}

impl BoardSize {
    /// Create a board size; non-finite or negative dimensions become 0
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// A placed target (top-left corner of its footprint)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    pub shape: Shape,
}

/// Pick a random target that fits the board
pub fn random_target<R: Rng + ?Sized>(board: BoardSize, tuning: &Tuning, rng: &mut R) -> Target {
    let board = BoardSize::new(board.width, board.height);
    let reserved = tuning.target_size + tuning.board_padding * 2.0;
    let max_x = (board.width - reserved).max(0.0);
    let max_y = (board.height - reserved).max(0.0);

    let x = (rng.random::<f32>() * max_x).floor() + tuning.board_padding;
    let y = (rng.random::<f32>() * max_y).floor() + tuning.board_padding;
    let shape = Shape::ALL[rng.random_range(0..Shape::ALL.len())];

    Target { x, y, shape }
}
