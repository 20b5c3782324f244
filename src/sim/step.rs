//! State transitions
//!
//! Every user command and every scheduled callback goes through [`step`].
//! Callers serialize the calls; `step` itself never schedules anything, it
//! only reports what should be scheduled next via [`next_wakeup`].

use rand::Rng;

use super::clock::RoundClock;
use super::state::{GameEvent, GamePhase, GameState, Ticket};
use super::target::{BoardSize, random_target};
use crate::cue::CueKind;

/// Commands accepted by the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Begin the countdown (Idle or GameOver)
    Start,
    /// Target activated
    Hit,
    /// Round lost without waiting for the deadline
    Miss,
    Pause,
    Resume,
    TogglePause,
    /// Re-enter the countdown from any phase
    Restart,
    /// Board area changed
    Resize { width: f32, height: f32 },
    /// Countdown timer fired
    CountdownTick(Ticket),
    /// Round clock sample
    Sample(Ticket),
}

/// What the host must schedule to keep the game moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// Deliver `Command::CountdownTick(ticket)` after `delay_ms`
    CountdownTick { ticket: Ticket, delay_ms: u32 },
    /// Deliver `Command::Sample(ticket)` on the next frame
    ClockSample { ticket: Ticket },
}

impl Wakeup {
    /// Command to deliver when this wakeup fires
    pub fn command(&self) -> Command {
        match *self {
            Wakeup::CountdownTick { ticket, .. } => Command::CountdownTick(ticket),
            Wakeup::ClockSample { ticket } => Command::Sample(ticket),
        }
    }
}

/// Timer the current state needs, if any
pub fn next_wakeup(state: &GameState) -> Option<Wakeup> {
    match &state.phase {
        GamePhase::Countdown { value } if *value > 0 => Some(Wakeup::CountdownTick {
            ticket: state.ticket(),
            delay_ms: state.tuning.countdown_tick_ms,
        }),
        GamePhase::Running { clock, .. } if !clock.is_paused() && !clock.has_expired() => {
            Some(Wakeup::ClockSample {
                ticket: state.ticket(),
            })
        }
        _ => None,
    }
}

/// Apply one command at time `now_ms`, returning the side effects it requests
pub fn step<R: Rng + ?Sized>(
    state: &mut GameState,
    command: Command,
    now_ms: f64,
    rng: &mut R,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match command {
        Command::Start => match state.phase {
            GamePhase::Idle | GamePhase::GameOver => {
                enter_countdown(state, now_ms, rng, &mut events)
            }
            _ => ignored(state, command),
        },

        Command::Restart => enter_countdown(state, now_ms, rng, &mut events),

        Command::Resize { width, height } => {
            state.board = BoardSize::new(width, height);
        }

        Command::CountdownTick(ticket) => {
            if !state.is_current(ticket) {
                return events;
            }
            let GamePhase::Countdown { value } = state.phase else {
                return events;
            };
            let value = value.saturating_sub(1);
            events.push(GameEvent::Cue(CueKind::StartTick));
            if value == 0 {
                start_round(state, 1, now_ms, rng, &mut events);
            } else {
                state.phase = GamePhase::Countdown { value };
                state.bump_epoch();
            }
        }

        Command::Sample(ticket) => {
            if !state.is_current(ticket) {
                return events;
            }
            let GamePhase::Running { clock, .. } = &mut state.phase else {
                return events;
            };
            if clock.is_paused() {
                return events;
            }
            let reading = clock.sample(now_ms);
            state.time_remaining_ms = reading.remaining_ms;
            if reading.expired {
                end_run(state, &mut events);
            }
        }

        Command::Hit => {
            if !accepts_play(state) {
                ignored(state, command);
                return events;
            }
            state.score += 1;
            let next_round = state.round + 1;
            events.push(GameEvent::Cue(CueKind::Success));
            start_round(state, next_round, now_ms, rng, &mut events);
        }

        Command::Miss => {
            if !accepts_play(state) {
                ignored(state, command);
                return events;
            }
            if let GamePhase::Running { clock, .. } = &state.phase {
                state.time_remaining_ms = clock.remaining_ms(now_ms);
            }
            end_run(state, &mut events);
        }

        Command::Pause => set_paused(state, true, now_ms, command),
        Command::Resume => set_paused(state, false, now_ms, command),
        Command::TogglePause => {
            let paused = state.is_paused();
            set_paused(state, !paused, now_ms, command);
        }
    }

    events
}

/// Running and not paused
fn accepts_play(state: &GameState) -> bool {
    matches!(&state.phase, GamePhase::Running { clock, .. } if !clock.is_paused() && !clock.has_expired())
}

fn ignored(state: &GameState, command: Command) {
    log::debug!("Ignoring {:?} in phase {}", command, state.phase.name());
}

fn enter_countdown<R: Rng + ?Sized>(
    state: &mut GameState,
    now_ms: f64,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    state.score = 0;
    state.round = 1;
    state.round_duration_ms = state.tuning.round_duration_ms(1);
    state.time_remaining_ms = state.round_duration_ms as f64;
    state.phase = GamePhase::Countdown {
        value: state.tuning.countdown_from,
    };
    state.bump_epoch();
    events.push(GameEvent::Cue(CueKind::StartTick));
    // Nothing to count down from
    if state.tuning.countdown_from == 0 {
        start_round(state, 1, now_ms, rng, events);
    }
}

fn start_round<R: Rng + ?Sized>(
    state: &mut GameState,
    round: u32,
    now_ms: f64,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    let duration_ms = state.tuning.round_duration_ms(round);
    state.round = round;
    state.round_duration_ms = duration_ms;
    state.time_remaining_ms = duration_ms as f64;
    state.phase = GamePhase::Running {
        target: random_target(state.board, &state.tuning, rng),
        clock: RoundClock::start(duration_ms, now_ms),
    };
    state.bump_epoch();
    log::debug!("Round {} started ({} ms)", round, duration_ms);
    events.push(GameEvent::RoundStarted { round, duration_ms });
}

fn end_run(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let new_best = state.score > state.best;
    state.best = state.best.max(state.score);
    state.phase = GamePhase::GameOver;
    state.bump_epoch();
    events.push(GameEvent::Cue(CueKind::Fail));
    events.push(GameEvent::GameOver {
        score: state.score,
        best: state.best,
        new_best,
    });
}

fn set_paused(state: &mut GameState, paused: bool, now_ms: f64, command: Command) {
    let GamePhase::Running { clock, .. } = &mut state.phase else {
        ignored(state, command);
        return;
    };
    if clock.is_paused() == paused || clock.has_expired() {
        return;
    }
    if paused {
        clock.pause(now_ms);
    } else {
        clock.resume(now_ms);
    }
    state.time_remaining_ms = clock.remaining_ms(now_ms);
    state.bump_epoch();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::target::Target;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn new_state() -> (GameState, Pcg32) {
        (
            GameState::new(0, Tuning::default()),
            Pcg32::seed_from_u64(12345),
        )
    }

    /// Drive the countdown to completion at `now_ms`
    fn finish_countdown(state: &mut GameState, rng: &mut Pcg32, now_ms: f64) {
        while let Some(Wakeup::CountdownTick { ticket, .. }) = next_wakeup(state) {
            step(state, Command::CountdownTick(ticket), now_ms, rng);
        }
    }

    fn running(state: &mut GameState, rng: &mut Pcg32) {
        step(state, Command::Start, 0.0, rng);
        finish_countdown(state, rng, 0.0);
        assert!(state.phase.is_running());
    }

    #[test]
    fn test_start_enters_countdown() {
        let (mut state, mut rng) = new_state();
        let events = step(&mut state, Command::Start, 0.0, &mut rng);
        assert_eq!(state.phase, GamePhase::Countdown { value: 3 });
        assert_eq!(state.round, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.round_duration_ms, 1300);
        assert_eq!(events, vec![GameEvent::Cue(CueKind::StartTick)]);
        assert_eq!(
            next_wakeup(&state),
            Some(Wakeup::CountdownTick {
                ticket: state.ticket(),
                delay_ms: 650
            })
        );
    }

    #[test]
    fn test_countdown_to_running() {
        let (mut state, mut rng) = new_state();
        step(&mut state, Command::Start, 0.0, &mut rng);

        let mut cues = 0;
        for expected in [2, 1] {
            let ticket = state.ticket();
            let events = step(&mut state, Command::CountdownTick(ticket), 0.0, &mut rng);
            cues += events.len();
            assert_eq!(state.countdown_value(), expected);
        }
        let ticket = state.ticket();
        let events = step(&mut state, Command::CountdownTick(ticket), 1950.0, &mut rng);
        assert_eq!(
            events,
            vec![
                GameEvent::Cue(CueKind::StartTick),
                GameEvent::RoundStarted {
                    round: 1,
                    duration_ms: 1300
                },
            ]
        );
        assert_eq!(cues, 2);
        assert!(state.phase.is_running());
        assert!(state.target().is_some());
        assert_eq!(state.time_remaining_ms, 1300.0);
        // Reads as the start value again for the next game
        assert_eq!(state.countdown_value(), 3);
    }

    #[test]
    fn test_stale_countdown_tick_is_ignored() {
        let (mut state, mut rng) = new_state();
        step(&mut state, Command::Start, 0.0, &mut rng);
        let stale = state.ticket();
        step(&mut state, Command::CountdownTick(stale), 650.0, &mut rng);
        assert_eq!(state.countdown_value(), 2);

        // Same ticket delivered twice
        let events = step(&mut state, Command::CountdownTick(stale), 700.0, &mut rng);
        assert!(events.is_empty());
        assert_eq!(state.countdown_value(), 2);

        // Restart mid-countdown invalidates the pending tick
        let pending = state.ticket();
        step(&mut state, Command::Restart, 800.0, &mut rng);
        step(&mut state, Command::CountdownTick(pending), 1300.0, &mut rng);
        assert_eq!(state.phase, GamePhase::Countdown { value: 3 });
    }

    #[test]
    fn test_hit_advances_round() {
        let (mut state, mut rng) = new_state();
        running(&mut state, &mut rng);
        let first = *state.target().unwrap();

        let events = step(&mut state, Command::Hit, 400.0, &mut rng);
        assert_eq!(state.score, 1);
        assert_eq!(state.round, 2);
        assert_eq!(state.round_duration_ms, 1245);
        assert_eq!(state.time_remaining_ms, 1245.0);
        assert_eq!(
            events,
            vec![
                GameEvent::Cue(CueKind::Success),
                GameEvent::RoundStarted {
                    round: 2,
                    duration_ms: 1245
                },
            ]
        );
        let GamePhase::Running { clock, .. } = state.phase else {
            panic!("expected running");
        };
        // New round clock starts at the hit
        assert_eq!(clock.remaining_ms(400.0), 1245.0);

        // Targets are re-rolled; a few hits should move it
        let mut moved = false;
        for i in 0..5 {
            step(&mut state, Command::Hit, 500.0 + i as f64, &mut rng);
            moved |= state.target() != Some(&first);
        }
        assert!(moved);
        assert_eq!(state.score, 6);
        assert_eq!(state.round, 7);
    }

    #[test]
    fn test_expiry_ends_run_once() {
        let (mut state, mut rng) = new_state();
        state.best = 1;
        running(&mut state, &mut rng);
        step(&mut state, Command::Hit, 0.0, &mut rng);
        step(&mut state, Command::Hit, 0.0, &mut rng);
        assert_eq!(state.round_duration_ms, 1190);

        let ticket = state.ticket();
        assert!(step(&mut state, Command::Sample(ticket), 1000.0, &mut rng).is_empty());
        assert_eq!(state.time_remaining_ms, 190.0);

        let events = step(&mut state, Command::Sample(ticket), 1190.0, &mut rng);
        assert_eq!(
            events,
            vec![
                GameEvent::Cue(CueKind::Fail),
                GameEvent::GameOver {
                    score: 2,
                    best: 2,
                    new_best: true
                },
            ]
        );
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.time_remaining_ms, 0.0);
        assert!(state.target().is_none());
        assert!(next_wakeup(&state).is_none());

        // A late sample from the finished round does nothing
        assert!(step(&mut state, Command::Sample(ticket), 1300.0, &mut rng).is_empty());
    }

    #[test]
    fn test_best_never_decreases() {
        let (mut state, mut rng) = new_state();
        state.best = 10;
        running(&mut state, &mut rng);
        let events = step(&mut state, Command::Miss, 5.0, &mut rng);
        assert_eq!(state.best, 10);
        assert!(events.contains(&GameEvent::GameOver {
            score: 0,
            best: 10,
            new_best: false
        }));
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let (mut state, mut rng) = new_state();
        running(&mut state, &mut rng);

        let ticket = state.ticket();
        step(&mut state, Command::Sample(ticket), 300.0, &mut rng);
        step(&mut state, Command::Pause, 400.0, &mut rng);
        assert!(state.is_paused());
        assert_eq!(state.time_remaining_ms, 900.0);
        assert!(next_wakeup(&state).is_none());
        assert!(state.visible_target().is_none());

        // Samples scheduled before the pause are stale
        assert!(step(&mut state, Command::Sample(ticket), 50_000.0, &mut rng).is_empty());
        assert_eq!(state.time_remaining_ms, 900.0);

        // Hits are not accepted while paused
        step(&mut state, Command::Hit, 50_000.0, &mut rng);
        assert_eq!(state.score, 0);

        step(&mut state, Command::Resume, 60_000.0, &mut rng);
        assert!(!state.is_paused());
        assert_eq!(state.time_remaining_ms, 900.0);

        let ticket = state.ticket();
        step(&mut state, Command::Sample(ticket), 60_100.0, &mut rng);
        assert_eq!(state.time_remaining_ms, 800.0);
        let events = step(&mut state, Command::Sample(ticket), 60_900.0, &mut rng);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_toggle_pause() {
        let (mut state, mut rng) = new_state();
        running(&mut state, &mut rng);
        step(&mut state, Command::TogglePause, 10.0, &mut rng);
        assert!(state.is_paused());
        step(&mut state, Command::TogglePause, 20.0, &mut rng);
        assert!(!state.is_paused());
    }

    #[test]
    fn test_commands_outside_phase_are_ignored() {
        let (mut state, mut rng) = new_state();
        for command in [Command::Hit, Command::Miss, Command::Pause, Command::Resume] {
            assert!(step(&mut state, command, 0.0, &mut rng).is_empty());
            assert_eq!(state.phase, GamePhase::Idle);
        }

        step(&mut state, Command::Start, 0.0, &mut rng);
        let before = state.ticket();
        for command in [Command::Start, Command::Hit, Command::Pause] {
            assert!(step(&mut state, command, 10.0, &mut rng).is_empty());
        }
        assert_eq!(state.phase, GamePhase::Countdown { value: 3 });
        assert!(state.is_current(before));

        running(&mut state, &mut rng);
        assert!(step(&mut state, Command::Start, 10.0, &mut rng).is_empty());
        assert!(state.phase.is_running());
    }

    #[test]
    fn test_restart_from_every_phase() {
        let (mut state, mut rng) = new_state();
        step(&mut state, Command::Restart, 0.0, &mut rng);
        assert_eq!(state.phase, GamePhase::Countdown { value: 3 });

        running(&mut state, &mut rng);
        step(&mut state, Command::Hit, 5.0, &mut rng);
        step(&mut state, Command::Pause, 6.0, &mut rng);
        step(&mut state, Command::Restart, 7.0, &mut rng);
        assert_eq!(state.phase, GamePhase::Countdown { value: 3 });
        assert!(!state.is_paused());
        assert_eq!(state.score, 0);
        assert_eq!(state.round, 1);

        finish_countdown(&mut state, &mut rng, 8.0);
        step(&mut state, Command::Miss, 9.0, &mut rng);
        assert_eq!(state.phase, GamePhase::GameOver);
        step(&mut state, Command::Start, 10.0, &mut rng);
        assert_eq!(state.phase, GamePhase::Countdown { value: 3 });
    }

    #[test]
    fn test_hit_wins_when_processed_before_expiry_sample() {
        let (mut state, mut rng) = new_state();
        running(&mut state, &mut rng);
        let ticket = state.ticket();
        // The deadline has passed but no sample has observed it yet
        step(&mut state, Command::Hit, 5000.0, &mut rng);
        assert_eq!(state.score, 1);
        // The sample queued for the old round is stale
        assert!(step(&mut state, Command::Sample(ticket), 5000.0, &mut rng).is_empty());
        assert!(state.phase.is_running());
    }

    #[test]
    fn test_resize_drives_placement() {
        let (mut state, mut rng) = new_state();
        step(
            &mut state,
            Command::Resize {
                width: 10.0,
                height: -3.0,
            },
            0.0,
            &mut rng,
        );
        assert_eq!(state.board, BoardSize::new(10.0, 0.0));
        running(&mut state, &mut rng);
        let Some(Target { x, y, .. }) = state.target().copied() else {
            panic!("expected target");
        };
        assert_eq!((x, y), (16.0, 16.0));
    }

    #[test]
    fn test_zero_countdown_starts_immediately() {
        let tuning = Tuning {
            countdown_from: 0,
            ..Tuning::default()
        };
        let mut state = GameState::new(0, tuning);
        let mut rng = Pcg32::seed_from_u64(1);

        let events = step(&mut state, Command::Start, 100.0, &mut rng);
        assert!(state.phase.is_running());
        assert!(state.target().is_some());
        assert_eq!(
            events,
            vec![
                GameEvent::Cue(CueKind::StartTick),
                GameEvent::RoundStarted {
                    round: 1,
                    duration_ms: 1300
                },
            ]
        );
        assert!(matches!(
            next_wakeup(&state),
            Some(Wakeup::ClockSample { .. })
        ));

        // Restart takes the same path
        step(&mut state, Command::Miss, 200.0, &mut rng);
        step(&mut state, Command::Restart, 300.0, &mut rng);
        assert!(state.phase.is_running());
    }

    #[test]
    fn test_miss_while_paused_is_ignored() {
        let (mut state, mut rng) = new_state();
        running(&mut state, &mut rng);
        step(&mut state, Command::Pause, 100.0, &mut rng);

        assert!(step(&mut state, Command::Miss, 200.0, &mut rng).is_empty());
        assert!(state.phase.is_running());
        assert!(state.is_paused());
        assert_eq!(state.time_remaining_ms, 1200.0);

        step(&mut state, Command::Resume, 300.0, &mut rng);
        let events = step(&mut state, Command::Miss, 400.0, &mut rng);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_resize_keeps_current_target() {
        let (mut state, mut rng) = new_state();
        running(&mut state, &mut rng);
        let before = *state.target().unwrap();
        let ticket = state.ticket();

        step(
            &mut state,
            Command::Resize {
                width: 100.0,
                height: 100.0,
            },
            50.0,
            &mut rng,
        );
        assert_eq!(state.target(), Some(&before));
        assert!(state.is_current(ticket));

        // The next round uses the new board, which pins to the padded origin
        step(&mut state, Command::Hit, 60.0, &mut rng);
        let Some(Target { x, y, .. }) = state.target().copied() else {
            panic!("expected target");
        };
        assert_eq!((x, y), (16.0, 16.0));
    }

    #[test]
    fn test_determinism() {
        // Two games with the same seed place the same targets
        let play = || {
            let (mut state, mut rng) = new_state();
            running(&mut state, &mut rng);
            for i in 0..4 {
                step(&mut state, Command::Hit, i as f64 * 100.0, &mut rng);
            }
            state
        };
        let a = play();
        let b = play();
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.round, b.round);
        assert_eq!(a.target(), b.target());
    }
}
