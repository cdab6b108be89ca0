//! Phase building blocks shared by several show modes.
//!
//! Each pattern owns the timers and counters it needs, resets them when run
//! with `init = true`, and reports a change only when it actually redrew.

use crate::colors::Color;
use crate::phase::{Cx, Phase};
use crate::strip::LedSurface;
use crate::time::Timer;

/// Step length of blinks and strip ramps.
pub const BLINK_STEP_MS: u32 = 500;

/// Toggle length of the 0.5 Hz blinks.
pub const SLOW_BLINK_MS: u32 = 1000;

/// Step length of strip countdowns.
pub const STRIP_STEP_MS: u32 = 1000;

/// Fills the whole stick with one color on entry, then holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solid {
    color: Color,
}

impl Solid {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Phase for Solid {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            cx.leds.fill(self.color);
        }
        init
    }
}

/// Shows only the battery indicator on entry, then holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShowPower;

impl Phase for ShowPower {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            cx.leds.show_battery_only(cx.battery);
        }
        init
    }
}

/// Draws a fixed subset of the five bars on entry, then holds.
///
/// Bit `n` of the mask selects bar `n`, counted from the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSet {
    color: Color,
    mask: u8,
}

impl StripSet {
    pub const fn new(color: Color, mask: u8) -> Self {
        Self { color, mask }
    }

    /// Bars selected by the mask.
    pub fn strips(&self) -> impl Iterator<Item = u8> {
        let mask = self.mask;
        (0..5u8).filter(move |strip| mask & (1 << strip) != 0)
    }
}

impl Phase for StripSet {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            cx.leds.fill(Color::Black);
            for strip in self.strips() {
                cx.leds.show_strip(self.color, strip);
            }
        }
        init
    }
}

/// Toggles between the battery indicator and a dark stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryBlink {
    on_ms: u32,
    off_ms: u32,
    lit: bool,
    timer: Timer,
}

impl BatteryBlink {
    /// Creates a blink holding the indicator for `on_ms` and darkness for `off_ms`.
    pub const fn new(on_ms: u32, off_ms: u32) -> Self {
        Self {
            on_ms,
            off_ms,
            lit: false,
            timer: Timer::started_at(0),
        }
    }

    /// Restarts the blink in the given half and draws it.
    pub fn begin<S: LedSurface>(&mut self, lit: bool, cx: &mut Cx<'_, S>) {
        self.lit = lit;
        self.timer.reset(cx.now);
        self.draw(cx);
    }

    /// Flips to the other half once the current one has been held long enough.
    pub fn tick<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> bool {
        let hold = if self.lit { self.on_ms } else { self.off_ms };
        if !self.timer.is_expired(cx.now, hold) {
            return false;
        }
        self.timer.reset(cx.now);
        self.lit = !self.lit;
        self.draw(cx);
        true
    }

    /// Returns true while the indicator half is showing.
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn draw<S: LedSurface>(&self, cx: &mut Cx<'_, S>) {
        if self.lit {
            cx.leds.show_battery_only(cx.battery);
        } else {
            cx.leds.fill(Color::Black);
        }
    }
}

impl Phase for BatteryBlink {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.begin(true, cx);
            return true;
        }
        self.tick(cx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlinkState {
    Blink,
    Off,
}

/// Two full-stick blinks of one color, then a slow battery blink.
///
/// Color, dark, color, dark in [`BLINK_STEP_MS`] steps; from then on the
/// battery indicator toggles every step until the phase is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleBlink {
    color: Color,
    state: BlinkState,
    steps_left: u8,
    timer: Timer,
    after: BatteryBlink,
}

impl DoubleBlink {
    const STEPS: u8 = 4;

    pub const fn new(color: Color) -> Self {
        Self {
            color,
            state: BlinkState::Blink,
            steps_left: Self::STEPS,
            timer: Timer::started_at(0),
            after: BatteryBlink::new(BLINK_STEP_MS, BLINK_STEP_MS),
        }
    }
}

impl Phase for DoubleBlink {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.timer.reset(cx.now);
            self.steps_left = Self::STEPS;
            self.state = BlinkState::Blink;
            cx.leds.fill(self.color);
            return true;
        }

        match self.state {
            BlinkState::Blink => {
                if !self.timer.is_expired(cx.now, BLINK_STEP_MS) {
                    return false;
                }
                self.timer.reset(cx.now);
                self.steps_left = self.steps_left.saturating_sub(1);
                if self.steps_left > 0 {
                    let color = if self.steps_left % 2 == 1 {
                        Color::Black
                    } else {
                        self.color
                    };
                    cx.leds.fill(color);
                    true
                } else {
                    // Already dark from the last blink step.
                    self.state = BlinkState::Off;
                    self.after.begin(false, cx);
                    false
                }
            }
            BlinkState::Off => self.after.tick(cx),
        }
    }
}

/// Counts lit bars from `from` towards `to`, one bar per second.
///
/// Redraws only when the count moves, so the bar display holds still once
/// the target is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSteps {
    color: Color,
    from: u8,
    to: u8,
    count: u8,
    timer: Timer,
}

impl StripSteps {
    pub const fn new(color: Color, from: u8, to: u8) -> Self {
        Self {
            color,
            from,
            to,
            count: from,
            timer: Timer::started_at(0),
        }
    }

    /// Number of bars currently lit.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Returns true once the target count is showing.
    pub fn is_done(&self) -> bool {
        self.count == self.to
    }
}

impl Phase for StripSteps {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.count = self.from;
            self.timer.reset(cx.now);
            cx.leds.show_strips(self.color, self.count);
            return true;
        }
        if !self.timer.is_expired(cx.now, STRIP_STEP_MS) {
            return false;
        }
        self.timer.reset(cx.now);
        if self.is_done() {
            return false;
        }
        self.count = if self.to > self.count {
            self.count + 1
        } else {
            self.count - 1
        };
        cx.leds.show_strips(self.color, self.count);
        true
    }
}
