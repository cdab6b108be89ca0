//! Two-hour endurance phase indicator.
//!
//! The race is split into five cycles. Each cycle is a long dark stretch
//! with only a dim battery blink, followed by a ten-minute window in which
//! the stick shows how much of the window is left: a green blink, a green
//! pixel walking towards a blue marker, a blue pixel walking towards a red
//! marker, and a red blink when the window closes.

use crate::colors::Color;
use crate::log::log_info;
use crate::patterns::{BatteryBlink, SLOW_BLINK_MS};
use crate::phase::{Cx, Phase, PhaseTable, Session};
use crate::strip::{BATTERY_POS, LedSurface};
use crate::time::Timer;
use crate::types::{Progress, TableError};

const MINUTE_MS: u32 = 60_000;

/// Number of cycles in a race.
pub const CYCLES: u32 = 5;
/// Dark stretch of the first cycle.
pub const FIRST_DARK_MS: u32 = 11 * MINUTE_MS + 30_000;
/// Dark stretch of every later cycle.
pub const DARK_MS: u32 = 11 * MINUTE_MS;

const DARK_ON_MS: u32 = 300;
const DARK_OFF_MS: u32 = 1_700;
const WINDOW_BLINK_MS: u32 = 8_000;
const GREEN_STEPS: u8 = 58;
const GREEN_STEP_MS: u32 = 8_000;
const BLUE_STEPS: u8 = 12;
const BLUE_STEP_MS: u32 = 10_000;
const GREEN_FIRST: u8 = 1;
const BLUE_FIRST: u8 = GREEN_FIRST + GREEN_STEPS;

/// Length of the indicator window closing every cycle.
pub const WINDOW_MS: u32 = 2 * WINDOW_BLINK_MS
    + GREEN_STEPS as u32 * GREEN_STEP_MS
    + BLUE_STEPS as u32 * BLUE_STEP_MS;

/// Total running time; the mode ends here.
pub const RACE_MS: u32 = FIRST_DARK_MS + WINDOW_MS + (CYCLES - 1) * (DARK_MS + WINDOW_MS);

const PHASES: usize = 5 * CYCLES as usize;

/// All five bars blinking in one color at 0.5 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarsBlink {
    color: Color,
    lit: bool,
    timer: Timer,
}

impl BarsBlink {
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            lit: false,
            timer: Timer::started_at(0),
        }
    }

    fn draw<S: LedSurface>(&self, cx: &mut Cx<'_, S>) {
        if self.lit {
            cx.leds.show_strips(self.color, 5);
        } else {
            cx.leds.fill(Color::Black);
        }
    }
}

impl Phase for BarsBlink {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.lit = true;
        } else if self.timer.is_expired(cx.now, SLOW_BLINK_MS) {
            self.lit = !self.lit;
        } else {
            return false;
        }
        self.timer.reset(cx.now);
        self.draw(cx);
        true
    }
}

/// One pixel stepping towards a fixed marker pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWalk {
    color: Color,
    first: u8,
    steps: u8,
    step_ms: u32,
    marker: Color,
    index: u8,
    timer: Timer,
}

impl PixelWalk {
    /// Walks `steps` positions from `first`; the marker sits right after the last one.
    pub const fn new(color: Color, first: u8, steps: u8, step_ms: u32, marker: Color) -> Self {
        Self {
            color,
            first,
            steps,
            step_ms,
            marker,
            index: 0,
            timer: Timer::started_at(0),
        }
    }

    /// Current walker position.
    pub fn position(&self) -> u8 {
        self.first + self.index
    }

    fn draw<S: LedSurface>(&self, cx: &mut Cx<'_, S>) {
        cx.leds.fill(Color::Black);
        cx.leds.put_pair(BATTERY_POS, cx.battery);
        cx.leds.put_pair(self.position(), self.color);
        cx.leds.put_pair(self.first + self.steps, self.marker);
    }
}

impl Phase for PixelWalk {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.index = 0;
        } else if self.timer.is_expired(cx.now, self.step_ms) && self.index + 1 < self.steps {
            self.index += 1;
        } else {
            return false;
        }
        self.timer.reset(cx.now);
        self.draw(cx);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndurancePhase {
    Dark(BatteryBlink),
    Blink(BarsBlink),
    Walk(PixelWalk),
}

impl Phase for EndurancePhase {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        match self {
            EndurancePhase::Dark(phase) => phase.run(init, cx),
            EndurancePhase::Blink(phase) => phase.run(init, cx),
            EndurancePhase::Walk(phase) => phase.run(init, cx),
        }
    }
}

/// Endurance show mode.
#[derive(Debug, Clone)]
pub struct Endurance {
    table: PhaseTable<EndurancePhase, PHASES>,
    session: Session,
}

impl Endurance {
    pub fn new() -> Result<Self, TableError> {
        let mut builder = PhaseTable::builder();
        let mut at = 0;
        for cycle in 0..CYCLES {
            builder = builder.phase(
                at,
                EndurancePhase::Dark(BatteryBlink::new(DARK_ON_MS, DARK_OFF_MS)),
            )?;
            at += if cycle == 0 { FIRST_DARK_MS } else { DARK_MS };

            builder = builder.phase(at, EndurancePhase::Blink(BarsBlink::new(Color::Green)))?;
            at += WINDOW_BLINK_MS;
            builder = builder.phase(
                at,
                EndurancePhase::Walk(PixelWalk::new(
                    Color::Green,
                    GREEN_FIRST,
                    GREEN_STEPS,
                    GREEN_STEP_MS,
                    Color::Blue,
                )),
            )?;
            at += u32::from(GREEN_STEPS) * GREEN_STEP_MS;
            builder = builder.phase(
                at,
                EndurancePhase::Walk(PixelWalk::new(
                    Color::Blue,
                    BLUE_FIRST,
                    BLUE_STEPS,
                    BLUE_STEP_MS,
                    Color::Red,
                )),
            )?;
            at += u32::from(BLUE_STEPS) * BLUE_STEP_MS;
            builder = builder.phase(at, EndurancePhase::Blink(BarsBlink::new(Color::Red)))?;
            at += WINDOW_BLINK_MS;
        }
        log_info!("endurance: ends at {=u32} ms", at);

        Ok(Self {
            table: builder.end(at),
            session: Session::new(),
        })
    }

    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        self.session.advance(&mut self.table, cx)
    }

    /// The timeline.
    pub fn table(&self) -> &PhaseTable<EndurancePhase, PHASES> {
        &self.table
    }
}
