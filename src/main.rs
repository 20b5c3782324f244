//! Reaction Speed entry point
//!
//! Web: wires the DOM to the game and schedules its timers.
//! Native: plays one headless session with a simulated player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, MouseEvent};

    use reaction_speed::audio::AudioManager;
    use reaction_speed::persistence::LocalStorage;
    use reaction_speed::platform::{entropy_seed, now_ms};
    use reaction_speed::sim::{Command, GamePhase, Ticket, Wakeup};
    use reaction_speed::{Game, Tuning};

    struct App {
        game: Game,
        /// A requestAnimationFrame callback is outstanding
        raf_pending: bool,
        /// Outstanding countdown timeout
        countdown_timer: Option<CountdownTimer>,
        /// Watches the board element for layout changes
        resize_observer: Option<web_sys::ResizeObserver>,
    }

    /// A scheduled countdown tick. Owning the callback frees it when the
    /// timeout is cleared before it runs.
    struct CountdownTimer {
        ticket: Ticket,
        handle: i32,
        _callback: Closure<dyn FnMut()>,
    }

    type SharedApp = Rc<RefCell<App>>;

    /// Run one command through the game, refresh the HUD, re-arm timers
    fn deliver(app: &SharedApp, command: Command) {
        {
            let mut a = app.borrow_mut();
            if let Command::CountdownTick(ticket) = command {
                if a.countdown_timer.as_ref().map(|t| t.ticket) == Some(ticket) {
                    a.countdown_timer = None;
                }
            }
            a.game.dispatch(command, now_ms());
            update_hud(&a.game);
        }
        pump(app);
    }

    /// Arm whatever timer the game needs and cancel the one it no longer wants
    fn pump(app: &SharedApp) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut a = app.borrow_mut();
        let wakeup = a.game.next_wakeup();

        let stale = a.countdown_timer.as_ref().and_then(|timer| {
            let wanted = matches!(wakeup, Some(Wakeup::CountdownTick { ticket, .. }) if ticket == timer.ticket);
            (!wanted).then_some(timer.handle)
        });
        if let Some(handle) = stale {
            window.clear_timeout_with_handle(handle);
            a.countdown_timer = None;
        }

        match wakeup {
            Some(Wakeup::CountdownTick { ticket, delay_ms }) if a.countdown_timer.is_none() => {
                let app = app.clone();
                let callback = Closure::once(move || {
                    deliver(&app, Command::CountdownTick(ticket));
                });
                match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    delay_ms as i32,
                ) {
                    Ok(handle) => {
                        a.countdown_timer = Some(CountdownTimer {
                            ticket,
                            handle,
                            _callback: callback,
                        })
                    }
                    Err(e) => log::error!("Failed to schedule countdown: {:?}", e),
                }
            }
            Some(Wakeup::ClockSample { ticket }) if !a.raf_pending => {
                let app = app.clone();
                let callback = Closure::once_into_js(move |_time: f64| {
                    app.borrow_mut().raf_pending = false;
                    deliver(&app, Command::Sample(ticket));
                });
                match window.request_animation_frame(callback.unchecked_ref()) {
                    Ok(_) => a.raf_pending = true,
                    Err(e) => log::error!("Failed to request animation frame: {:?}", e),
                }
            }
            _ => {}
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(game: &Game) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let state = game.state();

        set_text(&document, "stat-round", &state.round.to_string());
        set_text(&document, "stat-score", &state.score.to_string());
        set_text(&document, "stat-best", &state.best.to_string());
        set_text(&document, "stat-state", state.status_label());

        // Timer bar
        if let Some(el) = document.get_element_by_id("timer-fill") {
            let _ = el.set_attribute("style", &format!("width: {:.1}%", state.progress() * 100.0));
            let _ = el.set_attribute("class", state.progress_band().as_str());
        }

        // Target
        if let Some(el) = document.get_element_by_id("target") {
            match state.visible_target() {
                Some(target) => {
                    let size = state.tuning.target_size;
                    let _ = el.set_attribute("class", &format!("target {}", target.shape.as_str()));
                    let _ = el.set_attribute(
                        "style",
                        &format!(
                            "left: {}px; top: {}px; width: {}px; height: {}px",
                            target.x, target.y, size, size
                        ),
                    );
                }
                None => {
                    let _ = el.set_attribute("class", "target hidden");
                }
            }
        }

        // Overlays
        show(&document, "start-btn", state.phase == GamePhase::Idle);
        match state.phase {
            GamePhase::Countdown { value } => {
                show(&document, "countdown", true);
                let text = if value > 0 { value.to_string() } else { "Go!".to_string() };
                set_text(&document, "countdown", &text);
            }
            _ => show(&document, "countdown", false),
        }
        show(&document, "game-over", state.phase == GamePhase::GameOver);
        if state.phase == GamePhase::GameOver {
            set_text(&document, "final-score", &state.score.to_string());
            set_text(&document, "final-best", &state.best.to_string());
        }
        show(&document, "paused-card", state.is_paused());
        show(&document, "pause-btn", state.phase.is_running());
        set_text(
            &document,
            "pause-btn",
            if state.is_paused() { "Resume" } else { "Pause" },
        );
        set_text(
            &document,
            "sfx-btn",
            if game.settings().sfx_enabled { "SFX On" } else { "SFX Off" },
        );
    }

    /// Read the board's size from the DOM and hand it to the game
    fn sync_board_size(app: &SharedApp) {
        let Some(board) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("board"))
        else {
            return;
        };
        let width = board.client_width() as f32;
        let height = board.client_height() as f32;
        deliver(app, Command::Resize { width, height });
    }

    fn bind_click(document: &Document, id: &str, app: &SharedApp, command: Command) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            deliver(&app, command);
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: &SharedApp) {
        bind_click(document, "start-btn", app, Command::Start);
        bind_click(document, "restart-btn", app, Command::Restart);
        bind_click(document, "game-over-restart-btn", app, Command::Restart);
        bind_click(document, "paused-restart-btn", app, Command::Restart);
        bind_click(document, "resume-btn", app, Command::Resume);
        bind_click(document, "pause-btn", app, Command::TogglePause);
        bind_click(document, "target", app, Command::Hit);

        // SFX toggle
        if let Some(el) = document.get_element_by_id("sfx-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                let enabled = !a.game.settings().sfx_enabled;
                a.game.set_sfx_enabled(enabled);
                update_hud(&a.game);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn input_by_id(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    /// Volume slider and auto-pause checkbox, seeded from saved settings
    fn setup_settings_controls(document: &Document, app: &SharedApp) {
        let settings = app.borrow().game.settings().clone();

        if let Some(input) = input_by_id(document, "sfx-volume") {
            input.set_value_as_number(settings.sfx_volume as f64);
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let volume = input_clone.value_as_number();
                if volume.is_finite() {
                    app.borrow_mut().game.set_sfx_volume(volume as f32);
                }
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(input) = input_by_id(document, "auto-pause") {
            input.set_checked(settings.auto_pause);
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().game.set_auto_pause(input_clone.checked());
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: &SharedApp) {
        let window = web_sys::window().expect("no window");
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let phase = app.borrow().game.state().phase;
            let command = match event.key().as_str() {
                "Enter" => match phase {
                    GamePhase::Idle => Some(Command::Start),
                    GamePhase::GameOver => Some(Command::Restart),
                    _ => None,
                },
                "Escape" | "p" | "P" => Some(Command::TogglePause),
                _ => None,
            };
            if let Some(command) = command {
                // Keep Enter from also clicking a focused button
                event.prevent_default();
                deliver(&app, command);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Track the board element itself; fall back to window resizes
    fn setup_resize(document: &Document, app: &SharedApp) {
        if let Some(board) = document.get_element_by_id("board") {
            let observed = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_entries: js_sys::Array| {
                sync_board_size(&observed);
            });
            match web_sys::ResizeObserver::new(closure.as_ref().unchecked_ref()) {
                Ok(observer) => {
                    observer.observe(&board);
                    app.borrow_mut().resize_observer = Some(observer);
                    closure.forget();
                    return;
                }
                Err(e) => log::warn!("ResizeObserver unavailable, using window resize: {:?}", e),
            }
        }

        let window = web_sys::window().expect("no window");
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            sync_board_size(&app);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn auto_pause(app: &SharedApp, reason: &str) {
        let wants_pause = {
            let a = app.borrow();
            let state = a.game.state();
            a.game.settings().auto_pause && state.phase.is_running() && !state.is_paused()
        };
        if wants_pause {
            deliver(app, Command::Pause);
            log::info!("Auto-paused ({})", reason);
        }
    }

    fn setup_auto_pause(app: &SharedApp) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&app, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&app, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Reaction Speed starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = entropy_seed();
        let game = Game::new(
            Tuning::default(),
            Rc::new(LocalStorage),
            Box::new(AudioManager::new()),
            seed,
        );
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            raf_pending: false,
            countdown_timer: None,
            resize_observer: None,
        }));

        setup_buttons(&document, &app);
        setup_settings_controls(&document, &app);
        setup_keyboard(&app);
        setup_resize(&document, &app);
        setup_auto_pause(&app);
        sync_board_size(&app);

        // Hide loading indicator
        show(&document, "loading", false);

        log::info!("Reaction Speed running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reaction Speed (native) starting...");
    log::info!("Native mode plays a headless demo - run with `trunk serve` for the web version");

    let summary = demo::play(reaction_speed::platform::entropy_seed());
    println!(
        "\nSimulated player reached round {} with score {} ({:.0} ms elapsed)",
        summary.round, summary.score, summary.elapsed_ms
    );
    println!(
        "Round budget bottoms out at round {}",
        reaction_speed::Tuning::default().floor_round()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use reaction_speed::consts::HEADLESS_SAMPLE_MS;
    use reaction_speed::cue::{CueKind, CuePlayer};
    use reaction_speed::headless::HeadlessRunner;
    use reaction_speed::persistence::MemoryStore;
    use reaction_speed::sim::{Command, GamePhase};
    use reaction_speed::{Game, Tuning};

    /// Simulated reaction times (ms)
    const REACTION_MIN_MS: f64 = 200.0;
    const REACTION_MAX_MS: f64 = 650.0;

    /// Writes cues to the log instead of a speaker
    struct LogCues;

    impl CuePlayer for LogCues {
        fn play(&mut self, cue: CueKind) {
            log::debug!("cue: {}", cue.as_str());
        }
    }

    pub struct Summary {
        pub round: u32,
        pub score: u32,
        pub elapsed_ms: f64,
    }

    pub fn play(seed: u64) -> Summary {
        let tuning = Tuning::default();
        let game = Game::new(tuning, Rc::new(MemoryStore::new()), Box::new(LogCues), seed);
        let mut runner = HeadlessRunner::new(game, HEADLESS_SAMPLE_MS);
        let mut player = Pcg32::seed_from_u64(seed.wrapping_add(1));

        runner.dispatch(Command::Resize {
            width: 960.0,
            height: 540.0,
        });
        runner.dispatch(Command::Start);
        while matches!(runner.game().state().phase, GamePhase::Countdown { .. }) {
            runner.advance(tuning.countdown_tick_ms as f64);
        }

        while runner.game().state().phase.is_running() {
            let reaction = player.random_range(REACTION_MIN_MS..REACTION_MAX_MS);
            runner.advance(reaction);
            if runner.game().state().phase.is_running() {
                let state = runner.game().state();
                log::info!(
                    "Round {}: hit after {:.0} ms of {} ms",
                    state.round,
                    reaction,
                    state.round_duration_ms
                );
                runner.dispatch(Command::Hit);
            }
        }

        let state = runner.game().state();
        Summary {
            round: state.round,
            score: state.score,
            elapsed_ms: runner.now_ms(),
        }
    }
}
