//! Pseudo-random draws for the slalom delay and iron-man offsets.
//!
//! A 15-bit linear congruential generator, `x' = (5x + 17) mod 2^15`. The
//! state is meant to be persisted between power cycles so consecutive runs
//! do not repeat the same delays.

use crate::log::log_trace;

/// Value of an erased seed slot.
pub const ERASED_SEED: u16 = 0xFFFF;

const MULTIPLIER: u32 = 5;
const INCREMENT: u32 = 17;
const STATE_MASK: u32 = 0x7FFF;

/// Trait for bounded pseudo-random integers.
pub trait Random {
    /// Returns a value in `min..=max`. A reversed range yields `min`.
    fn next(&mut self, min: u16, max: u16) -> u16;

    /// State to persist so the next power cycle continues the sequence.
    ///
    /// Sources without such state return `None`.
    fn seed(&self) -> Option<u16> {
        None
    }
}

/// Linear congruential [`Random`] source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u16,
}

impl Lcg {
    /// Resumes from a persisted seed, or from entropy if the slot is erased.
    pub fn new(seed: u16, entropy: u32) -> Self {
        let state = if seed == ERASED_SEED {
            (entropy & STATE_MASK) as u16
        } else {
            seed & STATE_MASK as u16
        };
        Self { state }
    }

    fn step(&mut self) -> u16 {
        self.state = ((MULTIPLIER * u32::from(self.state) + INCREMENT) & STATE_MASK) as u16;
        self.state
    }
}

impl Random for Lcg {
    fn next(&mut self, min: u16, max: u16) -> u16 {
        let raw = u32::from(self.step());
        if max <= min {
            return min;
        }
        let span = u32::from(max - min) + 1;
        // Use the high bits of the state: the low bits of an LCG with a
        // power-of-two modulus cycle with short periods.
        let width = (1u32..16).rev().find(|bit| span & (1 << bit) != 0).unwrap_or(0) + 1;
        let value = (raw >> (14u32.saturating_sub(width))) % span;
        let drawn = min + value as u16;
        log_trace!("random draw {=u16} in {=u16}..={=u16}", drawn, min, max);
        drawn
    }

    #[inline]
    fn seed(&self) -> Option<u16> {
        Some(self.state)
    }
}
