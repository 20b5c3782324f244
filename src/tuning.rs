//! Game balance
//!
//! Bundles the difficulty curve and board geometry so the state machine never
//! reaches for globals. `Default` is the shipped curve.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Time budget of round 1 (ms)
    pub base_round_ms: u32,
    /// Floor of the round budget (ms)
    pub min_round_ms: u32,
    /// Budget lost per round (ms)
    pub decay_per_round: u32,
    /// First countdown value
    pub countdown_from: u32,
    /// Delay between countdown ticks (ms)
    pub countdown_tick_ms: u32,
    /// Target footprint (px)
    pub target_size: f32,
    /// Board padding around the target (px)
    pub board_padding: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_round_ms: BASE_ROUND_MS,
            min_round_ms: MIN_ROUND_MS,
            decay_per_round: DECAY_PER_ROUND,
            countdown_from: COUNTDOWN_FROM,
            countdown_tick_ms: COUNTDOWN_TICK_MS,
            target_size: TARGET_SIZE,
            board_padding: BOARD_PADDING,
        }
    }
}

impl Tuning {
    /// Time budget for a round: linear decay from the base, floored at the minimum.
    ///
    /// Rounds are numbered from 1; round 0 is treated as round 1.
    pub fn round_duration_ms(&self, round: u32) -> u32 {
        let decay = round
            .saturating_sub(1)
            .saturating_mul(self.decay_per_round);
        self.base_round_ms
            .saturating_sub(decay)
            .max(self.min_round_ms)
    }

    /// First round whose budget sits on the floor
    pub fn floor_round(&self) -> u32 {
        if self.decay_per_round == 0 || self.base_round_ms <= self.min_round_ms {
            return 1;
        }
        let span = self.base_round_ms - self.min_round_ms;
        span.div_ceil(self.decay_per_round) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_one_uses_base() {
        let tuning = Tuning::default();
        assert_eq!(tuning.round_duration_ms(1), 1300);
        assert_eq!(tuning.round_duration_ms(0), 1300);
    }

    #[test]
    fn test_decay_reaches_floor() {
        let tuning = Tuning::default();
        assert_eq!(tuning.round_duration_ms(2), 1245);
        assert_eq!(tuning.round_duration_ms(16), 475);
        // 1300 - 16 * 55 = 420, below the floor
        assert_eq!(tuning.round_duration_ms(17), 450);
        assert_eq!(tuning.round_duration_ms(500), 450);
        assert_eq!(tuning.round_duration_ms(u32::MAX), 450);
        assert_eq!(tuning.floor_round(), 17);
    }

    #[test]
    fn test_base_below_floor_is_constant() {
        let tuning = Tuning {
            base_round_ms: 300,
            ..Default::default()
        };
        assert_eq!(tuning.round_duration_ms(1), 450);
        assert_eq!(tuning.round_duration_ms(40), 450);
        assert_eq!(tuning.floor_round(), 1);
    }

    proptest! {
        #[test]
        fn test_duration_is_non_increasing(round in 1u32..10_000) {
            let tuning = Tuning::default();
            let here = tuning.round_duration_ms(round);
            let next = tuning.round_duration_ms(round + 1);
            prop_assert!(next <= here);
            prop_assert!(here >= tuning.min_round_ms);
            prop_assert!(here <= tuning.base_round_ms);
        }
    }
}
