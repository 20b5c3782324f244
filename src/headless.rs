//! Headless driver
//!
//! Runs a [`Game`] against a virtual clock. Countdown ticks fire after their
//! delay, clock samples fire every `sample_ms`. Only one wakeup is armed at a
//! time and it is replaced whenever the game asks for a different one, which
//! is the same cancellation rule the browser shell follows.

use crate::game::Game;
use crate::sim::{Command, Wakeup};

#[derive(Debug, Clone, Copy)]
struct Armed {
    due_ms: f64,
    wakeup: Wakeup,
}

pub struct HeadlessRunner {
    game: Game,
    now_ms: f64,
    sample_ms: f64,
    armed: Option<Armed>,
}

impl HeadlessRunner {
    pub fn new(game: Game, sample_ms: f64) -> Self {
        let mut runner = Self {
            game,
            now_ms: 0.0,
            sample_ms: sample_ms.max(f64::EPSILON),
            armed: None,
        };
        runner.rearm();
        runner
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Apply a user command at the current virtual time
    pub fn dispatch(&mut self, command: Command) {
        self.game.dispatch(command, self.now_ms);
        self.rearm();
    }

    /// Move virtual time forward, firing every wakeup that falls due
    pub fn advance(&mut self, ms: f64) {
        let until = self.now_ms + ms.max(0.0);
        while let Some(armed) = self.armed.filter(|a| a.due_ms <= until) {
            self.now_ms = armed.due_ms;
            self.armed = None;
            self.game.dispatch(armed.wakeup.command(), self.now_ms);
            self.rearm();
        }
        self.now_ms = until;
    }

    /// Advance until no wakeup is pending or `limit_ms` has passed
    pub fn run_until_idle(&mut self, limit_ms: f64) {
        let until = self.now_ms + limit_ms;
        while let Some(armed) = self.armed {
            if armed.due_ms > until {
                break;
            }
            self.advance(armed.due_ms - self.now_ms);
        }
    }

    fn rearm(&mut self) {
        let next = self.game.next_wakeup();
        if self.armed.map(|a| a.wakeup) == next {
            return;
        }
        self.armed = next.map(|wakeup| {
            let delay_ms = match wakeup {
                Wakeup::CountdownTick { delay_ms, .. } => delay_ms as f64,
                Wakeup::ClockSample { .. } => self.sample_ms,
            };
            Armed {
                due_ms: self.now_ms + delay_ms,
                wakeup,
            }
        });
    }
}
