//! The configuration button: debounced pressed and long-pressed state.

/// Samples a raw level must hold before it counts as pressed or released.
pub const DEBOUNCE_SAMPLES: u16 = 5;

/// Samples a press must hold before it counts as a long press.
pub const LONG_PRESS_SAMPLES: u16 = 100;

/// Trait for reading the one logical button.
pub trait ButtonInput {
    /// Returns true while the button is held down (debounced).
    fn is_pressed(&self) -> bool;

    /// Returns true once the button has been held past the long-press threshold.
    fn is_long_pressed(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Level {
    Pressed,
    Released,
    SteadyPressed,
    SteadyReleased,
    LongPressed,
    LongReleased,
}

/// Debounces raw button samples taken at a fixed rate.
///
/// Feed it one sample per poll period (10 ms on the stick). A level change
/// restarts counting, so contact bounce never reaches the steady states.
#[derive(Debug, Clone)]
pub struct Debouncer {
    level: Level,
    count: u16,
}

impl Debouncer {
    /// Creates a debouncer that takes the power-on level as settled.
    ///
    /// The first engine pass runs before the first poll, and a button held
    /// at power-on must already count as pressed there.
    pub fn new(initially_pressed: bool) -> Self {
        Self {
            level: if initially_pressed {
                Level::SteadyPressed
            } else {
                Level::SteadyReleased
            },
            count: 0,
        }
    }

    /// Processes one raw sample.
    pub fn update(&mut self, raw_pressed: bool) {
        let (settling, steady, long, long_done) = if raw_pressed {
            (
                Level::Pressed,
                Level::SteadyPressed,
                Level::LongPressed,
                self.level == Level::LongPressed,
            )
        } else {
            (
                Level::Released,
                Level::SteadyReleased,
                Level::LongReleased,
                self.level == Level::LongReleased,
            )
        };

        if long_done {
            return;
        }
        if self.level == steady {
            self.count += 1;
            if self.count >= LONG_PRESS_SAMPLES {
                self.count = LONG_PRESS_SAMPLES;
                self.level = long;
            }
        } else if self.level == settling {
            self.count += 1;
            if self.count >= DEBOUNCE_SAMPLES {
                self.count = DEBOUNCE_SAMPLES;
                self.level = steady;
            }
        } else {
            self.count = 0;
            self.level = settling;
        }
    }
}

impl ButtonInput for Debouncer {
    fn is_pressed(&self) -> bool {
        matches!(self.level, Level::SteadyPressed | Level::LongPressed)
    }

    fn is_long_pressed(&self) -> bool {
        self.level == Level::LongPressed
    }
}
