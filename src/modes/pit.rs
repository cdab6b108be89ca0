//! Pit-stop sequencing.
//!
//! The stick is switched on when the car stops in the pit box. It counts the
//! stop down in green, calls the car out of the pit lane with a yellow
//! countdown, flashes red when the car should pass the intermediate point,
//! and runs a red 5-to-0 light into the finish line.

use crate::colors::Color;
use crate::config::ConfigRecord;
use crate::log::log_info;
use crate::patterns::{BLINK_STEP_MS, BatteryBlink, DoubleBlink, SLOW_BLINK_MS, StripSteps};
use crate::phase::{Cx, Phase, PhaseTable, Session};
use crate::strip::LedSurface;
use crate::time::Timer;
use crate::types::{Progress, TableError};

/// Length of the yellow and red bar countdowns, seconds.
pub const COUNTDOWN_S: u32 = 5;
/// Length of the final green blink, seconds.
pub const FINISH_BLINK_S: u32 = 2;
/// A green countdown mark goes out every this many milliseconds.
pub const RETIRE_MS: u32 = 20_000;

const GREEN_HOLD_MS: u32 = 2_000;
const MARKS: [u8; 5] = [5, 20, 35, 50, 65];
const MARK_LEN: u8 = 2;

/// Phase boundaries derived from the configuration, milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PitTimings {
    pub exit_countdown_ms: u32,
    pub green_to_black_ms: u32,
    pub intermediate_ms: u32,
    pub lights_ms: u32,
    pub finish_ms: u32,
    pub end_ms: u32,
}

impl PitTimings {
    /// Computes the boundaries.
    ///
    /// Subtractions wrap; the configured ranges keep them ordered.
    pub fn from_record(record: &ConfigRecord) -> Self {
        let total = u32::from(record.pit_total_s);
        let t1 = u32::from(record.pit_exit_s);
        let t2 = u32::from(record.pit_intermediate_s);
        let ms = |s: u32| s.wrapping_mul(1000);
        Self {
            exit_countdown_ms: ms(total.wrapping_sub(t1).wrapping_sub(COUNTDOWN_S)),
            green_to_black_ms: ms(total.wrapping_sub(t1)),
            intermediate_ms: ms(total.wrapping_sub(t2)),
            lights_ms: ms(total.wrapping_sub(COUNTDOWN_S)),
            finish_ms: ms(total),
            end_ms: ms(total + FINISH_BLINK_S),
        }
    }
}

/// Blinking green marks, one retired every [`RETIRE_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreenCountdown {
    marks: u8,
    lit: bool,
    blink: Timer,
    retire: Timer,
}

impl GreenCountdown {
    pub const fn new() -> Self {
        Self {
            marks: MARKS.len() as u8,
            lit: false,
            blink: Timer::started_at(0),
            retire: Timer::started_at(0),
        }
    }

    /// Marks still counting.
    pub fn marks(&self) -> u8 {
        self.marks
    }

    fn draw<S: LedSurface>(&self, cx: &mut Cx<'_, S>) {
        cx.leds.fill(Color::Black);
        if self.lit {
            for &from in &MARKS[..usize::from(self.marks)] {
                cx.leds.fill_pairs(from..from + MARK_LEN, Color::Green);
            }
            cx.leds.put_pair(0, cx.battery);
        }
    }
}

impl Default for GreenCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for GreenCountdown {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.marks = MARKS.len() as u8;
            self.lit = true;
            self.blink.reset(cx.now);
            self.retire.reset(cx.now);
            self.draw(cx);
            return true;
        }

        if self.retire.is_expired(cx.now, RETIRE_MS) {
            self.retire.reset(cx.now);
            self.marks = self.marks.saturating_sub(1);
        }
        if !self.blink.is_expired(cx.now, BLINK_STEP_MS) {
            return false;
        }
        self.blink.reset(cx.now);
        self.lit = !self.lit;
        self.draw(cx);
        true
    }
}

/// Solid green while the car leaves, then a 0.5 Hz battery blink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreenToBlack {
    holding: bool,
    timer: Timer,
    after: BatteryBlink,
}

impl GreenToBlack {
    pub const fn new() -> Self {
        Self {
            holding: true,
            timer: Timer::started_at(0),
            after: BatteryBlink::new(SLOW_BLINK_MS, SLOW_BLINK_MS),
        }
    }
}

impl Default for GreenToBlack {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for GreenToBlack {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.holding = true;
            self.timer.reset(cx.now);
            cx.leds.fill(Color::Green);
            return true;
        }
        if !self.holding {
            return self.after.tick(cx);
        }
        if !self.timer.is_expired(cx.now, GREEN_HOLD_MS) {
            return false;
        }
        self.holding = false;
        self.after.begin(false, cx);
        true
    }
}

/// Phases of the pit-stop timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitPhase {
    Countdown(GreenCountdown),
    ExitCountdown(StripSteps),
    GreenToBlack(GreenToBlack),
    Intermediate(DoubleBlink),
    Lights(StripSteps),
    Finish(DoubleBlink),
}

impl Phase for PitPhase {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        match self {
            PitPhase::Countdown(phase) => phase.run(init, cx),
            PitPhase::ExitCountdown(phase) => phase.run(init, cx),
            PitPhase::GreenToBlack(phase) => phase.run(init, cx),
            PitPhase::Intermediate(phase) => phase.run(init, cx),
            PitPhase::Lights(phase) => phase.run(init, cx),
            PitPhase::Finish(phase) => phase.run(init, cx),
        }
    }
}

/// Pit-stop show mode.
#[derive(Debug, Clone)]
pub struct PitStop {
    table: PhaseTable<PitPhase, 6>,
    session: Session,
    timings: PitTimings,
}

impl PitStop {
    /// Builds the timeline from the pit channels of `record`.
    pub fn new(record: &ConfigRecord) -> Result<Self, TableError> {
        let timings = PitTimings::from_record(record);
        log_info!(
            "pit stop: yellow {=u32} ms, red {=u32} ms, end {=u32} ms",
            timings.exit_countdown_ms, timings.intermediate_ms, timings.end_ms
        );
        let table = PhaseTable::builder()
            .phase(0, PitPhase::Countdown(GreenCountdown::new()))?
            .phase(
                timings.exit_countdown_ms,
                PitPhase::ExitCountdown(StripSteps::new(Color::Yellow, 1, 5)),
            )?
            .phase(
                timings.green_to_black_ms,
                PitPhase::GreenToBlack(GreenToBlack::new()),
            )?
            .phase(
                timings.intermediate_ms,
                PitPhase::Intermediate(DoubleBlink::new(Color::Red)),
            )?
            .phase(
                timings.lights_ms,
                PitPhase::Lights(StripSteps::new(Color::Red, 5, 0)),
            )?
            .phase(timings.finish_ms, PitPhase::Finish(DoubleBlink::new(Color::Green)))?
            .end(timings.end_ms);
        Ok(Self {
            table,
            session: Session::new(),
            timings,
        })
    }

    /// Runs one tick.
    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        self.session.advance(&mut self.table, cx)
    }

    /// The derived phase boundaries.
    pub fn timings(&self) -> &PitTimings {
        &self.timings
    }

    /// The timeline.
    pub fn table(&self) -> &PhaseTable<PitPhase, 6> {
        &self.table
    }

    /// Index of the phase that ran last.
    pub fn active_phase(&self) -> Option<usize> {
        self.session.engine().active()
    }
}
