//! polysynth - play the engine from the computer keyboard
//!
//! Run with: cargo run --release

mod keymap;

use std::{
    collections::HashMap,
    io::{self, Write},
    time::{Duration, Instant},
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode},
};
use tracing::{debug, info, warn};

use keymap::{Action, KeyMap};
use polysynth::{
    synth::settings::{
        EffectUpdate, EffectsUpdate, FilterUpdate, LfoTarget, LfoUpdate, ModulationKind, ModulationSettings,
        OscillatorUpdate,
    },
    Engine, EngineConfig,
};

/// Without key release events, a note stops this long after its last press.
const AUTO_RELEASE: Duration = Duration::from_millis(350);
const POLL_INTERVAL: Duration = Duration::from_millis(15);
const CUTOFF_STEP: f32 = 1.25;
const DEPTH_STEP: f32 = 0.1;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut engine = Engine::new(EngineConfig::default());
    engine.initialize_audio().wrap_err("failed to start audio")?;

    let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
    info!(release_events, "keyboard ready");
    print_help();

    enable_raw_mode().wrap_err("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    execute!(stdout, EnableFocusChange)?;

    let mut session = Session::new(engine, release_events);
    let result = session.run();

    if release_events {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout, DisableFocusChange);
    let _ = disable_raw_mode();

    session.engine.dispose();
    result
}

fn print_help() {
    println!("=== polysynth ===");
    println!("  a w s e d f t g y h u j k o l p ;   play C..E");
    println!("  z / x   octave down / up");
    println!("  1 2 3   subtractive / FM / AM");
    println!("  [ / ]   filter cutoff");
    println!("  v       cycle LFO target    - / =   LFO depth");
    println!("  r q c   toggle reverb / delay / distortion");
    println!("  space   panic               esc     quit");
    println!();
}

struct Session {
    engine: Engine,
    keys: KeyMap,
    /// Piano key → (note name, last press)
    held: HashMap<char, (String, Instant)>,
    release_events: bool,
    should_quit: bool,
}

impl Session {
    fn new(engine: Engine, release_events: bool) -> Self {
        Self {
            engine,
            keys: KeyMap::default(),
            held: HashMap::new(),
            release_events,
            should_quit: false,
        }
    }

    fn run(&mut self) -> EyreResult<()> {
        while !self.should_quit {
            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => self.on_key(key),
                    // Losing focus means losing key releases too.
                    Event::FocusLost => self.panic(),
                    _ => {}
                }
            }
            if !self.release_events {
                self.release_expired();
            }
        }
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        let Some(action) = keymap::action(key.code) else {
            return;
        };

        match (action, key.kind) {
            (Action::Note(c), KeyEventKind::Release) => self.release(c),
            (Action::Note(c), KeyEventKind::Press) => self.press(c),
            (Action::Note(c), KeyEventKind::Repeat) => self.touch(c),
            (_, KeyEventKind::Release | KeyEventKind::Repeat) => {}
            (action, KeyEventKind::Press) => self.command(action),
        }
    }

    fn press(&mut self, key: char) {
        if self.held.contains_key(&key) {
            // Terminal auto-repeat without enhancement arrives as presses.
            self.touch(key);
            return;
        }
        let Some(name) = self.keys.note_name(key) else {
            return;
        };
        if self.engine.note_on(&name, 0.8).is_ok() {
            self.held.insert(key, (name, Instant::now()));
        }
    }

    fn touch(&mut self, key: char) {
        if let Some((_, pressed)) = self.held.get_mut(&key) {
            *pressed = Instant::now();
        }
    }

    fn release(&mut self, key: char) {
        if let Some((name, _)) = self.held.remove(&key) {
            if let Err(err) = self.engine.note_off(&name) {
                warn!(%err, note = %name, "note off not delivered");
            }
        }
    }

    fn release_expired(&mut self) {
        let expired: Vec<char> = self
            .held
            .iter()
            .filter(|(_, (_, pressed))| pressed.elapsed() >= AUTO_RELEASE)
            .map(|(&key, _)| key)
            .collect();
        for key in expired {
            self.release(key);
        }
    }

    fn panic(&mut self) {
        self.held.clear();
        if let Err(err) = self.engine.panic() {
            warn!(%err, "panic not delivered");
        }
    }

    fn command(&mut self, action: Action) {
        let settings = *self.engine.settings();
        let result = match action {
            Action::Quit => {
                self.should_quit = true;
                Ok(())
            }
            Action::Panic => {
                self.panic();
                Ok(())
            }
            Action::OctaveDown | Action::OctaveUp => {
                // Held notes would lose their names; stop them first.
                self.panic();
                self.keys
                    .shift(if action == Action::OctaveUp { 1 } else { -1 });
                Ok(())
            }
            Action::Mode(mode) => {
                let modulation = match mode {
                    1 => Some(ModulationSettings { kind: ModulationKind::Fm, amount: 3.0 }),
                    2 => Some(ModulationSettings { kind: ModulationKind::Am, amount: 1.0 }),
                    _ => None,
                };
                self.held.clear();
                self.engine.update_oscillator(OscillatorUpdate {
                    modulation: Some(modulation),
                    ..Default::default()
                })
            }
            Action::CutoffDown | Action::CutoffUp => {
                let factor = if action == Action::CutoffUp { CUTOFF_STEP } else { 1.0 / CUTOFF_STEP };
                self.engine.update_filter(FilterUpdate {
                    frequency: Some((settings.filter.frequency * factor).clamp(40.0, 18_000.0)),
                    ..Default::default()
                })
            }
            Action::CycleLfoTarget => {
                let target = match settings.lfo.target {
                    LfoTarget::Filter => LfoTarget::Pitch,
                    LfoTarget::Pitch => LfoTarget::Volume,
                    LfoTarget::Volume => LfoTarget::Filter,
                };
                self.engine.update_lfo(LfoUpdate {
                    target: Some(target),
                    ..Default::default()
                })
            }
            Action::DepthDown | Action::DepthUp => {
                let step = if action == Action::DepthUp { DEPTH_STEP } else { -DEPTH_STEP };
                self.engine.update_lfo(LfoUpdate {
                    depth: Some((settings.lfo.depth + step).clamp(0.0, 1.0)),
                    ..Default::default()
                })
            }
            Action::ToggleReverb => self.engine.update_effects(EffectsUpdate {
                reverb: Some(toggle(settings.effects.reverb.enabled)),
                ..Default::default()
            }),
            Action::ToggleDelay => self.engine.update_effects(EffectsUpdate {
                delay: Some(toggle(settings.effects.delay.enabled)),
                ..Default::default()
            }),
            Action::ToggleDistortion => self.engine.update_effects(EffectsUpdate {
                distortion: Some(toggle(settings.effects.distortion.enabled)),
                ..Default::default()
            }),
            Action::Note(_) => Ok(()),
        };

        if let Err(err) = result {
            debug!(%err, ?action, "command rejected");
        }
        self.status();
    }

    fn status(&self) {
        let s = self.engine.settings();
        let mode = match s.oscillator.modulation.map(|m| m.kind) {
            Some(ModulationKind::Fm) => "fm",
            Some(ModulationKind::Am) => "am",
            _ => "sub",
        };
        let mut stdout = io::stdout();
        let _ = write!(
            stdout,
            "\r\x1b[2Koct {:+} | {} | cutoff {:>5.0} Hz | lfo {:?} {:.1} | rev {} dly {} dist {}",
            self.keys.octave(),
            mode,
            s.filter.frequency,
            s.lfo.target,
            s.lfo.depth,
            on_off(s.effects.reverb.enabled),
            on_off(s.effects.delay.enabled),
            on_off(s.effects.distortion.enabled),
        );
        let _ = stdout.flush();
    }
}

fn toggle(enabled: bool) -> EffectUpdate {
    EffectUpdate {
        enabled: Some(!enabled),
        wet: None,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
