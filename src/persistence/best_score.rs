//! Best score record
//!
//! One integer under one fixed key. The store does not merge: `save` writes
//! exactly what it is given, callers apply `max`.

use std::rc::Rc;

use super::KeyValueStore;

pub struct BestScoreStore {
    store: Rc<dyn KeyValueStore>,
}

impl BestScoreStore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "reaction_speed_best";

    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved best score, or 0 if missing or unreadable
    pub fn load(&self) -> u32 {
        match self.store.get_item(Self::STORAGE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u32>() {
                Ok(best) => {
                    log::info!("Loaded best score {}", best);
                    best
                }
                Err(_) => {
                    log::warn!("Ignoring unreadable best score {:?}", raw);
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Could not read best score: {}", e);
                0
            }
        }
    }

    /// Overwrite the saved best score
    pub fn save(&self, best: u32) {
        match self.store.set_item(Self::STORAGE_KEY, &best.to_string()) {
            Ok(()) => log::info!("Best score saved ({})", best),
            Err(e) => log::warn!("Could not save best score: {}", e),
        }
    }
}
