//! Game session
//!
//! `Game` is the single entry point for commands. It owns the state, the RNG
//! and the injected collaborators, and turns the events produced by
//! [`step`](crate::sim::step) into side effects: cues (when sfx is on) and
//! best-score writes. Taking `&mut self` for every command is what keeps
//! transitions from overlapping.

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::cue::CuePlayer;
use crate::persistence::{BestScoreStore, KeyValueStore};
use crate::settings::Settings;
use crate::sim::{self, Command, GameEvent, GameState, Wakeup};
use crate::tuning::Tuning;

pub struct Game {
    state: GameState,
    rng: Pcg32,
    best_store: BestScoreStore,
    store: Rc<dyn KeyValueStore>,
    cues: Box<dyn CuePlayer>,
    settings: Settings,
}

impl Game {
    /// Create an idle game, reading the best score and settings from `store`
    pub fn new(
        tuning: Tuning,
        store: Rc<dyn KeyValueStore>,
        mut cues: Box<dyn CuePlayer>,
        seed: u64,
    ) -> Self {
        let best_store = BestScoreStore::new(store.clone());
        let settings = Settings::load(store.as_ref());
        cues.set_volume(settings.sfx_volume);
        Self {
            state: GameState::new(best_store.load(), tuning),
            rng: Pcg32::seed_from_u64(seed),
            best_store,
            store,
            cues,
            settings,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a command at `now_ms`
    pub fn dispatch(&mut self, command: Command, now_ms: f64) {
        let events = sim::step(&mut self.state, command, now_ms, &mut self.rng);
        for event in events {
            self.handle_event(event);
        }
    }

    /// Timer the host should arm next
    pub fn next_wakeup(&self) -> Option<Wakeup> {
        sim::next_wakeup(&self.state)
    }

    pub fn start(&mut self, now_ms: f64) {
        self.dispatch(Command::Start, now_ms);
    }

    pub fn hit(&mut self, now_ms: f64) {
        self.dispatch(Command::Hit, now_ms);
    }

    pub fn pause(&mut self, now_ms: f64) {
        self.dispatch(Command::Pause, now_ms);
    }

    pub fn resume(&mut self, now_ms: f64) {
        self.dispatch(Command::Resume, now_ms);
    }

    pub fn restart(&mut self, now_ms: f64) {
        self.dispatch(Command::Restart, now_ms);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.dispatch(Command::Resize { width, height }, 0.0);
    }

    pub fn set_sfx_enabled(&mut self, enabled: bool) {
        if self.settings.sfx_enabled == enabled {
            return;
        }
        self.settings.sfx_enabled = enabled;
        self.save_settings();
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.settings.sfx_volume = volume.clamp(0.0, 1.0);
        self.cues.set_volume(self.settings.sfx_volume);
        self.save_settings();
    }

    pub fn set_auto_pause(&mut self, enabled: bool) {
        self.settings.auto_pause = enabled;
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(self.store.as_ref()) {
            log::warn!("Could not save settings: {}", e);
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Cue(cue) => {
                if self.settings.sfx_enabled {
                    self.cues.play(cue);
                }
            }
            GameEvent::RoundStarted { round: 1, .. } => {
                log::info!("Go!");
            }
            GameEvent::RoundStarted { .. } => {}
            GameEvent::GameOver {
                score,
                best,
                new_best,
            } => {
                if new_best {
                    log::info!("Game over: new best score {}", best);
                } else {
                    log::info!("Game over: scored {} (best {})", score, best);
                }
                self.best_store.save(best);
            }
        }
    }
}
