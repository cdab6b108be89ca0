//! Iron-man start sequence.
//!
//! A white double blink on both ends of the stick announces the sequence,
//! then a dim battery blink holds until the first cycle. Each cycle sweeps a
//! blinking green pair inward, a red pair back outward, and flashes a center
//! block. Three full cycles and the inward sweep of a fourth run before the
//! final dim phase. Every boundary after the announcement is pushed back by
//! a random offset so the cadence cannot be anticipated.

use crate::colors::Color;
use crate::log::log_info;
use crate::patterns::{BLINK_STEP_MS, BatteryBlink};
use crate::phase::{Cx, Phase, PhaseTable, Session};
use crate::random::Random;
use crate::strip::{LedSurface, ROW_LEN, STRIPS};
use crate::time::Timer;
use crate::types::{Progress, TableError};

/// Start of the first cycle, before the random offset.
pub const FIRST_CYCLE_MS: u32 = 10_000;
/// Length of one full cycle.
pub const CYCLE_MS: u32 = 20_000;
/// Full cycles before the partial one.
pub const FULL_CYCLES: u32 = 3;
/// Largest value of each of the two random draws, tenths of a second.
pub const OFFSET_DRAW_MAX: u16 = 10;

const DIM_ON_MS: u32 = 300;
const DIM_OFF_MS: u32 = 1_700;
const ANNOUNCE_MS: u32 = 2_000;
const INWARD_MS: u32 = 10_000;
const OUTWARD_MS: u32 = 5_000;
const FINAL_DIM_MS: u32 = 10_000;

const CENTER: u8 = ROW_LEN / 2 - 1;
const INWARD_STEP_MS: u32 = 250;
const OUTWARD_STEP_MS: u32 = 150;
const SWEEP_BLINK_MS: u32 = 400;
const FAST_BLINK_MS: u32 = 100;
/// Inward sweep position from which the blink speeds up.
const ACCEL_FROM: u8 = 24;
const BLOCK: core::ops::Range<u8> = 26..46;

const PHASES: usize = 2 + 3 * FULL_CYCLES as usize + 2;

#[inline]
fn mirror(pos: u8) -> u8 {
    ROW_LEN - 1 - pos
}

fn draw_pair<S: LedSurface>(cx: &mut Cx<'_, S>, pos: u8, color: Color) {
    cx.leds.fill(Color::Black);
    cx.leds.put_pair(pos, color);
    cx.leds.put_pair(mirror(pos), color);
}

/// Double blink of the outermost bars only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndsBlink {
    steps_left: u8,
    timer: Timer,
}

impl EndsBlink {
    const STEPS: u8 = 4;

    pub const fn new() -> Self {
        Self {
            steps_left: Self::STEPS,
            timer: Timer::started_at(0),
        }
    }

    fn draw<S: LedSurface>(cx: &mut Cx<'_, S>, lit: bool) {
        cx.leds.fill(Color::Black);
        if lit {
            cx.leds.show_strip(Color::White, 0);
            cx.leds.show_strip(Color::White, STRIPS.len() as u8 - 1);
        }
    }
}

impl Default for EndsBlink {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for EndsBlink {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.steps_left = Self::STEPS;
            self.timer.reset(cx.now);
            Self::draw(cx, true);
            return true;
        }
        if self.steps_left <= 1 || !self.timer.is_expired(cx.now, BLINK_STEP_MS) {
            return false;
        }
        self.timer.reset(cx.now);
        self.steps_left -= 1;
        Self::draw(cx, self.steps_left % 2 == 0);
        true
    }
}

/// A blinking pair walking from both ends to the center.
///
/// The blink speeds up once the pair passes [`ACCEL_FROM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InwardSweep {
    pos: u8,
    lit: bool,
    walk: Timer,
    blink: Timer,
}

impl InwardSweep {
    pub const fn new() -> Self {
        Self {
            pos: 1,
            lit: true,
            walk: Timer::started_at(0),
            blink: Timer::started_at(0),
        }
    }

    /// Distance of the pair from the handle end.
    pub fn position(&self) -> u8 {
        self.pos
    }

    fn blink_ms(&self) -> u32 {
        if self.pos >= ACCEL_FROM {
            FAST_BLINK_MS
        } else {
            SWEEP_BLINK_MS
        }
    }

    fn draw<S: LedSurface>(&self, cx: &mut Cx<'_, S>) {
        if self.lit {
            draw_pair(cx, self.pos, Color::Green);
        } else {
            cx.leds.fill(Color::Black);
        }
    }
}

impl Default for InwardSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for InwardSweep {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            *self = Self::new();
            self.walk.reset(cx.now);
            self.blink.reset(cx.now);
            self.draw(cx);
            return true;
        }

        let moved = self.pos < CENTER && self.walk.is_expired(cx.now, INWARD_STEP_MS);
        if moved {
            self.walk.reset(cx.now);
            self.pos += 1;
        }
        let toggled = self.blink.is_expired(cx.now, self.blink_ms());
        if toggled {
            self.blink.reset(cx.now);
            self.lit = !self.lit;
        }
        // A dark pair moving is invisible.
        let redraw = toggled || (moved && self.lit);
        if redraw {
            self.draw(cx);
        }
        redraw
    }
}

/// A solid pair walking from the center back to the ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutwardSweep {
    pos: u8,
    timer: Timer,
}

impl OutwardSweep {
    pub const fn new() -> Self {
        Self {
            pos: CENTER,
            timer: Timer::started_at(0),
        }
    }
}

impl Default for OutwardSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for OutwardSweep {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.pos = CENTER;
        } else if self.pos > 1 && self.timer.is_expired(cx.now, OUTWARD_STEP_MS) {
            self.pos -= 1;
        } else {
            return false;
        }
        self.timer.reset(cx.now);
        draw_pair(cx, self.pos, Color::Red);
        true
    }
}

/// A center block alternating red and blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterBlock {
    red: bool,
    timer: Timer,
}

impl CenterBlock {
    pub const fn new() -> Self {
        Self {
            red: true,
            timer: Timer::started_at(0),
        }
    }
}

impl Default for CenterBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for CenterBlock {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        if init {
            self.red = true;
            cx.leds.fill(Color::Black);
        } else if self.timer.is_expired(cx.now, BLINK_STEP_MS) {
            self.red = !self.red;
        } else {
            return false;
        }
        self.timer.reset(cx.now);
        let color = if self.red { Color::Red } else { Color::Blue };
        cx.leds.fill_pairs(BLOCK, color);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IronManPhase {
    Announce(EndsBlink),
    Dim(BatteryBlink),
    Inward(InwardSweep),
    Outward(OutwardSweep),
    Center(CenterBlock),
}

impl Phase for IronManPhase {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        match self {
            IronManPhase::Announce(phase) => phase.run(init, cx),
            IronManPhase::Dim(phase) => phase.run(init, cx),
            IronManPhase::Inward(phase) => phase.run(init, cx),
            IronManPhase::Outward(phase) => phase.run(init, cx),
            IronManPhase::Center(phase) => phase.run(init, cx),
        }
    }
}

/// Iron-man show mode.
#[derive(Debug, Clone)]
pub struct IronMan {
    table: PhaseTable<IronManPhase, PHASES>,
    session: Session,
    offset_ms: u32,
}

impl IronMan {
    /// Builds the timeline, drawing the two offsets from `rng`.
    pub fn new<R: Random>(rng: &mut R) -> Result<Self, TableError> {
        let first = rng.next(0, OFFSET_DRAW_MAX);
        let second = rng.next(0, OFFSET_DRAW_MAX);
        let offset_ms = (u32::from(first) + u32::from(second)) * 100;
        log_info!("iron man: offset {=u32} ms", offset_ms);

        let mut builder = PhaseTable::builder()
            .phase(0, IronManPhase::Announce(EndsBlink::new()))?
            .phase(ANNOUNCE_MS, IronManPhase::Dim(BatteryBlink::new(DIM_ON_MS, DIM_OFF_MS)))?;
        let mut at = FIRST_CYCLE_MS + offset_ms;
        for _ in 0..FULL_CYCLES {
            builder = builder
                .phase(at, IronManPhase::Inward(InwardSweep::new()))?
                .phase(at + INWARD_MS, IronManPhase::Outward(OutwardSweep::new()))?
                .phase(
                    at + INWARD_MS + OUTWARD_MS,
                    IronManPhase::Center(CenterBlock::new()),
                )?;
            at += CYCLE_MS;
        }
        let table = builder
            .phase(at, IronManPhase::Inward(InwardSweep::new()))?
            .phase(
                at + INWARD_MS,
                IronManPhase::Dim(BatteryBlink::new(DIM_ON_MS, DIM_OFF_MS)),
            )?
            .end(at + INWARD_MS + FINAL_DIM_MS);

        Ok(Self {
            table,
            session: Session::new(),
            offset_ms,
        })
    }

    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        self.session.advance(&mut self.table, cx)
    }

    /// Random delay added to every boundary after the announcement.
    pub fn offset_ms(&self) -> u32 {
        self.offset_ms
    }

    /// The timeline.
    pub fn table(&self) -> &PhaseTable<IronManPhase, PHASES> {
        &self.table
    }
}
