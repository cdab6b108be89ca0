//! Endless safety-car pattern.
//!
//! After a short battery display the stick loops a 13-second script of
//! yellow bar subsets. The loop restarts in the tick that ends it, so the
//! mode never reports an end. The script ends dark and starts dark, so the
//! wrap itself sends nothing.

use crate::colors::Color;
use crate::log::log_debug;
use crate::patterns::{ShowPower, StripSet};
use crate::phase::{Cx, Phase, PhaseTable, Session};
use crate::strip::LedSurface;
use crate::time::Timer;
use crate::types::{Progress, TableError};

/// Battery display before the loop, milliseconds.
pub const INTRO_MS: u32 = 500;
/// Length of one loop, milliseconds.
pub const LOOP_MS: u32 = 13_000;

const OFF: u8 = 0;
const BARS_234: u8 = 0b01110;
const BARS_1245: u8 = 0b11011;
const BARS_15: u8 = 0b10001;

/// The loop as (start in tenths of a second, bar mask).
const SCRIPT: [(u32, u8); 19] = [
    (0, OFF),
    (10, BARS_234),
    (20, OFF),
    (30, BARS_1245),
    (35, OFF),
    (40, BARS_1245),
    (45, OFF),
    (50, BARS_15),
    (60, OFF),
    (70, BARS_234),
    (75, OFF),
    (80, BARS_234),
    (85, OFF),
    (90, BARS_15),
    (100, OFF),
    (110, BARS_1245),
    (115, OFF),
    (120, BARS_1245),
    (125, OFF),
];

/// Whether the first step of a pass looks different from the last one.
const WRAP_REDRAWS: bool = SCRIPT[0].1 != SCRIPT[SCRIPT.len() - 1].1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Stage {
    Start,
    Intro,
    Looping,
}

/// Safety-car show mode.
#[derive(Debug, Clone)]
pub struct SafetyCar {
    stage: Stage,
    timer: Timer,
    table: PhaseTable<StripSet, 19>,
    session: Session,
    loops: u32,
}

impl SafetyCar {
    pub fn new() -> Result<Self, TableError> {
        let table = SCRIPT
            .iter()
            .try_fold(PhaseTable::<StripSet, 19>::builder(), |builder, &(start_ds, mask)| {
                builder.phase(start_ds * 100, StripSet::new(Color::Yellow, mask))
            })?
            .end(LOOP_MS);
        Ok(Self {
            stage: Stage::Start,
            timer: Timer::started_at(0),
            table,
            session: Session::new(),
            loops: 0,
        })
    }

    /// Runs one tick. Never reports an end.
    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        match self.stage {
            Stage::Start => {
                self.stage = Stage::Intro;
                self.timer.reset(cx.now);
                Progress::running(ShowPower.run(true, cx))
            }
            Stage::Intro => {
                if !self.timer.is_expired(cx.now, INTRO_MS) {
                    return Progress::running(false);
                }
                self.stage = Stage::Looping;
                self.session.restart_at(cx.now);
                self.advance_loop(cx)
            }
            Stage::Looping => self.advance_loop(cx),
        }
    }

    /// Completed passes through the loop.
    pub fn loops(&self) -> u32 {
        self.loops
    }

    fn advance_loop<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        let progress = self.session.advance(&mut self.table, cx);
        if !progress.ended {
            return progress;
        }
        self.loops = self.loops.wrapping_add(1);
        log_debug!("safety car loop {=u32} done", self.loops);
        self.session.restart_at(cx.now);
        let redrawn = self.session.advance(&mut self.table, cx).changed;
        Progress::running(redrawn && WRAP_REDRAWS)
    }
}
