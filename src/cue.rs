//! Audio cues
//!
//! The state machine only names the cue it wants; a `CuePlayer` decides how
//! (and whether) it is heard.

use std::cell::RefCell;
use std::rc::Rc;

/// Cue kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueKind {
    /// Countdown beat
    StartTick,
    /// Target hit
    Success,
    /// Round missed
    Fail,
}

impl CueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueKind::StartTick => "start-tick",
            CueKind::Success => "success",
            CueKind::Fail => "fail",
        }
    }
}

/// Plays cues. Failures must be swallowed by the implementation.
pub trait CuePlayer {
    fn play(&mut self, cue: CueKind);

    /// Apply a volume in `[0, 1]`
    fn set_volume(&mut self, _volume: f32) {}
}

/// Records cues instead of playing them, for asserting on what a game
/// asked to hear without a browser. Clones share one log, so keep a clone
/// after boxing one into a [`Game`](crate::Game).
#[derive(Debug, Default, Clone)]
pub struct RecordingCuePlayer {
    played: Rc<RefCell<Vec<CueKind>>>,
}

impl RecordingCuePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<CueKind> {
        self.played.borrow().clone()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl CuePlayer for RecordingCuePlayer {
    fn play(&mut self, cue: CueKind) {
        self.played.borrow_mut().push(cue);
    }
}
