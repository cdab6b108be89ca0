//! Millisecond clock abstraction and software timers.

/// Trait for abstracting the free-running millisecond clock.
pub trait TimeSource {
    /// Returns milliseconds since power-on. Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

/// A software timer measured against a wrapping millisecond clock.
///
/// The timer stores only the instant of its last reset, so it is `Copy` and
/// costs four bytes. All comparisons use wrapping arithmetic and stay
/// correct across a clock wrap as long as measured spans are shorter than
/// about 24 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer {
    started: u32,
}

impl Timer {
    /// Creates a timer that was reset at `now`.
    #[inline]
    pub const fn started_at(now: u32) -> Self {
        Self { started: now }
    }

    /// Restarts the timer at `now`.
    #[inline]
    pub fn reset(&mut self, now: u32) {
        self.started = now;
    }

    /// Milliseconds since the last reset.
    #[inline]
    pub fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.started)
    }

    /// Returns true once at least `timeout_ms` passed since the last reset.
    #[inline]
    pub fn is_expired(&self, now: u32, timeout_ms: u32) -> bool {
        self.elapsed(now) >= timeout_ms
    }
}
