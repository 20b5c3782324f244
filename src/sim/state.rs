//! Game state and core types
//!
//! `GamePhase` carries the data that only exists in a phase: the countdown
//! value during Countdown, the target and round clock during Running. Pause
//! is a flag on the Running clock, never a phase of its own.

use serde::{Deserialize, Serialize};

use super::clock::RoundClock;
use super::target::{BoardSize, Target};
use crate::cue::CueKind;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    Idle,
    /// 3..2..1 before round 1
    Countdown { value: u32 },
    /// A round is live (possibly paused)
    Running { target: Target, clock: RoundClock },
    /// Run ended by a miss
    GameOver,
}

impl GamePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Running { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Countdown { .. } => "countdown",
            GamePhase::Running { .. } => "running",
            GamePhase::GameOver => "gameover",
        }
    }
}

/// Token minted for a scheduled callback.
///
/// Only the ticket matching the current epoch is acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket(pub u64);

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Cue(CueKind),
    RoundStarted { round: u32, duration_ms: u32 },
    GameOver { score: u32, best: u32, new_best: bool },
}

/// Timer bar colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Safe,
    Warning,
    Critical,
}

impl ProgressBand {
    pub fn from_progress(progress: f32) -> Self {
        if progress > 0.5 {
            ProgressBand::Safe
        } else if progress > 0.25 {
            ProgressBand::Warning
        } else {
            ProgressBand::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressBand::Safe => "safe",
            ProgressBand::Warning => "warning",
            ProgressBand::Critical => "critical",
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Current round (1-based)
    pub round: u32,
    pub score: u32,
    /// Best score seen by this process, seeded from storage
    pub best: u32,
    /// Budget of the current round
    pub round_duration_ms: u32,
    /// Last sampled time left, within `[0, round_duration_ms]`
    pub time_remaining_ms: f64,
    pub board: BoardSize,
    pub tuning: Tuning,
    /// Bumped by every transition; see [`Ticket`]
    pub(crate) epoch: u64,
}

impl GameState {
    pub fn new(best: u32, tuning: Tuning) -> Self {
        let round_duration_ms = tuning.round_duration_ms(1);
        Self {
            phase: GamePhase::Idle,
            round: 1,
            score: 0,
            best,
            round_duration_ms,
            time_remaining_ms: round_duration_ms as f64,
            board: BoardSize::default(),
            tuning,
            epoch: 0,
        }
    }

    /// Ticket for callbacks scheduled against the current state
    pub fn ticket(&self) -> Ticket {
        Ticket(self.epoch)
    }

    pub(crate) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.epoch
    }

    pub fn is_paused(&self) -> bool {
        match &self.phase {
            GamePhase::Running { clock, .. } => clock.is_paused(),
            _ => false,
        }
    }

    /// Countdown value; outside Countdown it reads as the start value
    pub fn countdown_value(&self) -> u32 {
        match self.phase {
            GamePhase::Countdown { value } => value,
            _ => self.tuning.countdown_from,
        }
    }

    /// The live target, whether or not it is currently shown
    pub fn target(&self) -> Option<&Target> {
        match &self.phase {
            GamePhase::Running { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Target to draw: hidden while paused
    pub fn visible_target(&self) -> Option<&Target> {
        match &self.phase {
            GamePhase::Running { target, clock } if !clock.is_paused() => Some(target),
            _ => None,
        }
    }

    /// Fraction of the round budget left, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.round_duration_ms == 0 {
            return 0.0;
        }
        (self.time_remaining_ms / self.round_duration_ms as f64).clamp(0.0, 1.0) as f32
    }

    pub fn progress_band(&self) -> ProgressBand {
        ProgressBand::from_progress(self.progress())
    }

    /// Short status line for the HUD
    pub fn status_label(&self) -> &'static str {
        match &self.phase {
            GamePhase::Idle => "Ready",
            GamePhase::Countdown { .. } => "Get Ready",
            GamePhase::Running { clock, .. } if clock.is_paused() => "Paused",
            GamePhase::Running { .. } => "Go!",
            GamePhase::GameOver => "Game Over",
        }
    }
}
