//! The fixed task table that drives the stick.
//!
//! One scheduling pass runs per new millisecond. A task runs in a pass when
//! the clock reading modulo its period equals its phase, so tasks sharing a
//! period never land in the same pass. The watchdog is fed on every call,
//! whether or not a pass ran.

use crate::button::{ButtonInput, Debouncer};
use crate::config::ConfigStore;
use crate::dispatcher::{Board, Dispatcher, DispatcherState};
use crate::power::Battery;
use crate::random::Random;
use crate::strip::LedSurface;
use crate::time::TimeSource;

/// Trait for the board services the control loop needs besides the board itself.
pub trait Housekeeping {
    /// Raw, undebounced button level.
    fn button_raw(&mut self) -> bool;

    /// Flips the heartbeat LED.
    fn toggle_heartbeat(&mut self);

    /// Services the hardware watchdog.
    fn feed_watchdog(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Task {
    Button,
    Heartbeat,
    Engine,
}

/// (period ms, phase ms, task), in run order.
const TASKS: [(u32, u32, Task); 3] = [
    (10, 2, Task::Button),
    (500, 3, Task::Heartbeat),
    (100, 1, Task::Engine),
];

/// Owns the board, the button debouncer and the dispatcher.
pub struct ControlLoop<L, C, R, V, H> {
    board: Board<L, C, R, V>,
    housekeeping: H,
    button: Debouncer,
    dispatcher: Dispatcher,
    last_tick: Option<u32>,
    origin: Option<u32>,
}

impl<L, C, R, V, H> ControlLoop<L, C, R, V, H>
where
    L: LedSurface,
    C: ConfigStore,
    R: Random,
    V: Battery,
    H: Housekeeping,
{
    /// Creates the loop, sampling the button once for its power-on level.
    pub fn new(board: Board<L, C, R, V>, mut housekeeping: H) -> Self {
        let button = Debouncer::new(housekeeping.button_raw());
        Self {
            board,
            housekeeping,
            button,
            dispatcher: Dispatcher::new(),
            last_tick: None,
            origin: None,
        }
    }

    /// One main-loop iteration. Returns true if a scheduling pass ran.
    pub fn poll(&mut self, now: u32) -> bool {
        self.housekeeping.feed_watchdog();
        if self.last_tick == Some(now) {
            return false;
        }
        self.last_tick = Some(now);

        for (period, phase, task) in TASKS {
            if now % period != phase {
                continue;
            }
            match task {
                Task::Button => {
                    let raw = self.housekeeping.button_raw();
                    self.button.update(raw);
                }
                Task::Heartbeat => self.housekeeping.toggle_heartbeat(),
                Task::Engine => {
                    let origin = *self.origin.get_or_insert(now);
                    self.dispatcher
                        .tick(now.wrapping_sub(origin), &mut self.board, &self.button);
                }
            }
        }
        true
    }

    /// One main-loop iteration at the clock's current reading.
    pub fn run_once<T: TimeSource>(&mut self, clock: &T) -> bool {
        self.poll(clock.now_ms())
    }

    pub fn state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn board(&self) -> &Board<L, C, R, V> {
        &self.board
    }

    pub fn housekeeping(&self) -> &H {
        &self.housekeeping
    }

    /// Debounced button state as the dispatcher sees it.
    pub fn button_pressed(&self) -> bool {
        self.button.is_pressed()
    }
}
