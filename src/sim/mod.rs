//! Game simulation module
//!
//! All gameplay logic lives here. No rendering, no platform calls:
//! - Time arrives as explicit millisecond timestamps
//! - Randomness arrives as an injected RNG
//! - Timers are requested as [`Wakeup`]s and delivered back as commands

pub mod clock;
pub mod state;
pub mod step;
pub mod target;

pub use clock::{ClockReading, RoundClock};
pub use state::{GameEvent, GamePhase, GameState, ProgressBand, Ticket};
pub use step::{Command, Wakeup, next_wakeup, step};
pub use target::{BoardSize, Shape, Target, random_target};
