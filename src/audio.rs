//! Audio cues using Web Audio API
//!
//! Short procedurally generated beeps - no external files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::cue::{CueKind, CuePlayer};

/// Beep length (seconds)
const BEEP_SECS: f64 = 0.08;
/// Peak gain at full volume
const BEEP_GAIN: f32 = 0.15;

/// Web Audio cue player
pub struct AudioManager {
    /// Created on first use; browsers only allow it after a user gesture
    ctx: Option<AudioContext>,
    volume: f32,
    unavailable: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            ctx: None,
            volume: 1.0,
            unavailable: false,
        }
    }

    fn ensure_context(&mut self) -> Option<&AudioContext> {
        if self.ctx.is_none() && !self.unavailable {
            match AudioContext::new() {
                Ok(ctx) => self.ctx = Some(ctx),
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    self.unavailable = true;
                }
            }
        }
        let ctx = self.ctx.as_ref()?;
        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    /// Create an oscillator with gain envelope
    fn create_osc(ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn beep(ctx: &AudioContext, cue: CueKind, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 660.0) else {
            return;
        };
        let t = ctx.current_time();

        match cue {
            // Rising chirp
            CueKind::Success => {
                osc.frequency().set_value_at_time(880.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(1320.0, t + BEEP_SECS)
                    .ok();
            }
            // Falling buzz
            CueKind::Fail => {
                osc.frequency().set_value_at_time(220.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(110.0, t + BEEP_SECS)
                    .ok();
            }
            CueKind::StartTick => {
                osc.frequency().set_value_at_time(660.0, t).ok();
            }
        }

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time((BEEP_GAIN * vol).max(0.0001), t + 0.01)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + BEEP_SECS)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + BEEP_SECS + 0.02).ok();
    }
}

impl CuePlayer for AudioManager {
    fn play(&mut self, cue: CueKind) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.ensure_context() else {
            return;
        };
        Self::beep(ctx, cue, vol);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
