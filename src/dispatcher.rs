//! Top-level mode selection.
//!
//! On its first tick the dispatcher looks at the button: held down means
//! configuration, otherwise the stored mode starts. Every finished show and
//! the finished configuration lead to the lock reminder, which lasts until
//! power-off.
//!
//! Random draws happen when a show starts; the advanced seed is written
//! back to the store right away so the next power cycle does not repeat
//! them.
//!
//! Brightness is taken from the store every tick, so a new level shows up
//! immediately. The strip is flushed at most once per tick, and only when
//! the buffer or the brightness changed.

use crate::button::ButtonInput;
use crate::config::{ConfigRecord, ConfigStore, Mode};
use crate::editor::ConfigEditor;
use crate::log::{log_info, log_warn};
use crate::modes::{Lock, ShowMode};
use crate::phase::Cx;
use crate::power::{Battery, battery_color};
use crate::random::Random;
use crate::strip::LedSurface;

/// The collaborators the dispatcher drives.
///
/// # Type Parameters
/// * `L` - LED output surface
/// * `C` - Configuration store
/// * `R` - Random source
/// * `V` - Battery voltage input
#[derive(Debug)]
pub struct Board<L, C, R, V> {
    pub leds: L,
    pub store: C,
    pub rng: R,
    pub battery: V,
}

impl<L, C, R, V> Board<L, C, R, V>
where
    L: LedSurface,
    C: ConfigStore,
    R: Random,
    V: Battery,
{
    pub fn new(leds: L, store: C, rng: R, battery: V) -> Self {
        Self {
            leds,
            store,
            rng,
            battery,
        }
    }
}

/// Coarse dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatcherState {
    /// Nothing decided yet.
    Idle,
    /// Editing the configuration.
    Config,
    /// Running a show mode.
    Show(Mode),
    /// Terminal reminder.
    Lock,
}

#[derive(Debug, Clone)]
enum Active {
    Idle,
    Config(ConfigEditor),
    Show(ShowMode),
    Lock(Lock),
}

/// The top-level state machine, ticked every 100 ms.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    active: Active,
    brightness: Option<u8>,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self {
            active: Active::Idle,
            brightness: None,
        }
    }

    pub fn state(&self) -> DispatcherState {
        match &self.active {
            Active::Idle => DispatcherState::Idle,
            Active::Config(_) => DispatcherState::Config,
            Active::Show(show) => DispatcherState::Show(show.mode()),
            Active::Lock(_) => DispatcherState::Lock,
        }
    }

    /// The running configuration editor, if any.
    pub fn editor(&self) -> Option<&ConfigEditor> {
        match &self.active {
            Active::Config(editor) => Some(editor),
            _ => None,
        }
    }

    /// The running show mode, if any.
    pub fn show(&self) -> Option<&ShowMode> {
        match &self.active {
            Active::Show(show) => Some(show),
            _ => None,
        }
    }

    /// Runs one tick. Returns true if the strip was flushed.
    ///
    /// `now` must not decrease between calls.
    pub fn tick<L, C, R, V, B>(&mut self, now: u32, board: &mut Board<L, C, R, V>, button: &B) -> bool
    where
        L: LedSurface,
        C: ConfigStore,
        R: Random,
        V: Battery,
        B: ButtonInput,
    {
        let record = board.store.load();
        let battery = battery_color(board.battery.millivolts());

        if matches!(self.active, Active::Idle) {
            self.active = if button.is_pressed() {
                log_info!("button held, entering config");
                Active::Config(ConfigEditor::new(record))
            } else {
                Self::enter_show(&record, &mut board.rng, &mut board.store)
            };
        }

        let mut changed = false;
        let mut finished = false;
        match &mut self.active {
            Active::Idle => {}
            Active::Config(editor) => {
                changed = editor.step(now, button, &mut board.leds, &mut board.store);
                finished = editor.is_done();
            }
            Active::Show(show) => {
                let progress = show.run(&mut Cx::new(now, &mut board.leds, battery));
                changed = progress.changed;
                finished = progress.ended;
            }
            Active::Lock(lock) => {
                changed = lock.run(&mut Cx::new(now, &mut board.leds, battery));
            }
        }

        let brightness = match &self.active {
            Active::Config(editor) => editor.brightness(),
            _ => record.brightness,
        };
        if finished {
            log_info!("{} finished, locking", self.state());
            self.active = Active::Lock(Lock::new());
        }

        if self.brightness != Some(brightness) {
            self.brightness = Some(brightness);
            board.leds.set_brightness(brightness);
            changed = true;
        }
        if changed {
            board.leds.flush();
        }
        changed
    }

    fn enter_show<R, C>(record: &ConfigRecord, rng: &mut R, store: &mut C) -> Active
    where
        R: Random,
        C: ConfigStore,
    {
        let Some(mode) = record.show_mode() else {
            log_warn!("mode {=u8} unknown, locking", record.mode);
            return Active::Lock(Lock::new());
        };
        match ShowMode::enter(mode, record, rng) {
            Ok(show) => {
                log_info!("starting {}", mode);
                if let Some(seed) = rng.seed().filter(|&seed| seed != store.load_seed()) {
                    store.save_seed(seed);
                }
                Active::Show(show)
            }
            Err(_err) => {
                log_warn!("{} could not start: {}", mode, _err);
                Active::Lock(Lock::new())
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
