//! Slalom start lights.
//!
//! A yellow double blink, then five red bars lit one per second. After the
//! fifth bar the lights go out at a random moment, which is the start
//! signal. The delay is drawn once per activation.

use crate::colors::Color;
use crate::config::ConfigRecord;
use crate::log::log_info;
use crate::patterns::{DoubleBlink, ShowPower, StripSteps};
use crate::phase::{Cx, Phase, PhaseTable, Session};
use crate::random::Random;
use crate::strip::LedSurface;
use crate::time::Timer;
use crate::types::{Progress, TableError};

/// Start of the red ramp, milliseconds.
pub const RAMP_START_MS: u32 = 2_000;
/// Length of the battery window before the mode ends, milliseconds.
pub const POWER_WINDOW_MS: u32 = 5_000;

/// Seconds reserved after the longest random delay: ramp start, the ramp
/// itself and a pause before the battery window.
const POWER_WINDOW_LEAD_S: u32 = 2 + 5 + 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum RampState {
    Ramping,
    Holding,
    Blank,
}

/// Red ramp followed by the random hold before blanking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedRamp {
    steps: StripSteps,
    state: RampState,
    delay_ms: u32,
    timer: Timer,
}

impl RedRamp {
    pub const fn new(delay_ms: u32) -> Self {
        Self {
            steps: StripSteps::new(Color::Red, 1, 5),
            state: RampState::Ramping,
            delay_ms,
            timer: Timer::started_at(0),
        }
    }

    /// Hold between the fifth bar and the blank.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

impl Phase for RedRamp {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.state = RampState::Ramping;
            return self.steps.run(true, cx);
        }
        match self.state {
            RampState::Ramping => {
                let changed = self.steps.run(false, cx);
                if self.steps.is_done() {
                    self.state = RampState::Holding;
                    self.timer.reset(cx.now);
                }
                changed
            }
            RampState::Holding => {
                if !self.timer.is_expired(cx.now, self.delay_ms) {
                    return false;
                }
                self.state = RampState::Blank;
                cx.leds.fill(Color::Black);
                true
            }
            RampState::Blank => false,
        }
    }
}

/// Phases of the slalom timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlalomPhase {
    PreBlink(DoubleBlink),
    Ramp(RedRamp),
    Power(ShowPower),
}

impl Phase for SlalomPhase {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        match self {
            SlalomPhase::PreBlink(phase) => phase.run(init, cx),
            SlalomPhase::Ramp(phase) => phase.run(init, cx),
            SlalomPhase::Power(phase) => phase.run(init, cx),
        }
    }
}

/// Slalom show mode.
#[derive(Debug, Clone)]
pub struct Slalom {
    table: PhaseTable<SlalomPhase, 3>,
    session: Session,
    delay_ms: u32,
}

impl Slalom {
    /// Builds the timeline, drawing the blank delay from `rng`.
    ///
    /// The delay is `draw(min, max)` tenths of a second. The battery window
    /// starts late enough for the longest configurable delay to have passed.
    pub fn new<R: Random>(record: &ConfigRecord, rng: &mut R) -> Result<Self, TableError> {
        let draw = rng.next(
            u16::from(record.slalom_min_ds),
            u16::from(record.slalom_max_ds),
        );
        let delay_ms = u32::from(draw) * 100;
        let power_ms = (u32::from(record.slalom_max_ds).div_ceil(10) + POWER_WINDOW_LEAD_S) * 1000;
        log_info!(
            "slalom: blank {=u32} ms after last bar, power at {=u32} ms",
            delay_ms, power_ms
        );

        let table = PhaseTable::builder()
            .phase(0, SlalomPhase::PreBlink(DoubleBlink::new(Color::Yellow)))?
            .phase(RAMP_START_MS, SlalomPhase::Ramp(RedRamp::new(delay_ms)))?
            .phase(power_ms, SlalomPhase::Power(ShowPower))?
            .end(power_ms + POWER_WINDOW_MS);
        Ok(Self {
            table,
            session: Session::new(),
            delay_ms,
        })
    }

    /// Runs one tick.
    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        self.session.advance(&mut self.table, cx)
    }

    /// Drawn hold between the fifth bar and the blank, milliseconds.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// The timeline.
    pub fn table(&self) -> &PhaseTable<SlalomPhase, 3> {
        &self.table
    }
}
