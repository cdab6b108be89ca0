//! Terminal reminder shown after every sequence.
//!
//! The stick stays dark for 19 seconds, then lights dim red bars at both
//! ends and the battery indicator for one second, forever, so an operator
//! notices it was left switched on.

use crate::colors::Color;
use crate::phase::Cx;
use crate::strip::{BATTERY_POS, LedSurface, ROW_LEN};
use crate::time::Timer;

/// Dark part of the reminder, milliseconds.
pub const DARK_MS: u32 = 19_000;
/// Lit part of the reminder, milliseconds.
pub const LIT_MS: u32 = 1_000;

const NEAR_END: core::ops::Range<u8> = 1..10;
const FAR_END: core::ops::Range<u8> = ROW_LEN - 11..ROW_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum LockState {
    Start,
    Dark,
    Lit,
}

/// The lock reminder loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    state: LockState,
    timer: Timer,
}

impl Lock {
    pub const fn new() -> Self {
        Self {
            state: LockState::Start,
            timer: Timer::started_at(0),
        }
    }

    /// Returns true while the reminder is lit.
    pub fn is_lit(&self) -> bool {
        self.state == LockState::Lit
    }

    /// Runs one tick, returning true if the buffer changed.
    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> bool {
        match self.state {
            LockState::Start => {
                self.state = LockState::Dark;
                self.timer.reset(cx.now);
                cx.leds.fill(Color::Black);
                true
            }
            LockState::Dark => {
                if !self.timer.is_expired(cx.now, DARK_MS) {
                    return false;
                }
                self.state = LockState::Lit;
                self.timer.reset(cx.now);
                cx.leds.fill_pairs(NEAR_END, Color::DarkRed);
                cx.leds.fill_pairs(FAR_END, Color::DarkRed);
                cx.leds.put_pair(BATTERY_POS, cx.battery);
                true
            }
            LockState::Lit => {
                if !self.timer.is_expired(cx.now, LIT_MS) {
                    return false;
                }
                self.state = LockState::Dark;
                self.timer.reset(cx.now);
                cx.leds.fill(Color::Black);
                true
            }
        }
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}
