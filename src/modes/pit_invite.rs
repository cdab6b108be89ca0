//! Endless pit-lane invite wave.
//!
//! Two adjacent bars in the configured color travel to the tip of the stick
//! and back, one bar every half second. Both bars stay lit at every step, so
//! one pass out and back is six steps. The step is taken straight from the
//! elapsed time; there is no phase table.

use crate::colors::{Color, invite_color};
use crate::config::ConfigRecord;
use crate::phase::Cx;
use crate::strip::{BATTERY_POS, LedSurface};
use crate::types::Progress;

/// Time per wave step, milliseconds.
pub const STEP_MS: u32 = 500;

/// Lower bar of the lit pair at each step.
const WAVE: [u8; 6] = [0, 1, 2, 3, 2, 1];

/// Steps per pass.
pub const STEPS: u32 = WAVE.len() as u32;

/// Pit-invite show mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitInvite {
    color: Color,
    origin: Option<u32>,
    step: Option<u32>,
}

impl PitInvite {
    pub fn new(record: &ConfigRecord) -> Self {
        Self {
            color: invite_color(record.invite_color),
            origin: None,
            step: None,
        }
    }

    /// Wave color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Runs one tick. Never reports an end.
    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        let origin = *self.origin.get_or_insert(cx.now);
        let step = (cx.now.wrapping_sub(origin) % (STEPS * STEP_MS)) / STEP_MS;
        if self.step == Some(step) {
            return Progress::running(false);
        }
        self.step = Some(step);

        cx.leds.fill(Color::Black);
        let lower = WAVE[step as usize % WAVE.len()];
        cx.leds.show_strip(self.color, lower);
        cx.leds.show_strip(self.color, lower + 1);
        cx.leds.put_pair(BATTERY_POS, cx.battery);
        Progress::running(true)
    }
}
