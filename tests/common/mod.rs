//! Shared test infrastructure for pitstick integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;

use pitstick::strip::{NLEDS, ROW_LEN, STRIPS};
use pitstick::{Battery, ButtonInput, Color, LedSurface, Progress, Random, Row, TimeSource};

/// Control-loop period of the engine.
pub const TICK_MS: u32 = 100;

// ============================================================================
// Mock LED surface
// ============================================================================

/// LED surface that keeps the buffer and counts flushes
pub struct MockLeds {
    pixels: [Color; NLEDS],
    shown: [Color; NLEDS],
    brightness: Option<u8>,
    flushes: u32,
}

impl MockLeds {
    pub fn new() -> Self {
        Self {
            pixels: [Color::Black; NLEDS],
            shown: [Color::Black; NLEDS],
            brightness: None,
            flushes: 0,
        }
    }

    fn index(row: Row, pos: u8) -> usize {
        row.strip_index(pos)
    }

    /// Buffered color at a row position
    pub fn pixel(&self, row: Row, pos: u8) -> Color {
        self.pixels[Self::index(row, pos)]
    }

    /// Buffered color at a position, checking both rows agree
    pub fn pair(&self, pos: u8) -> Color {
        let left = self.pixel(Row::Left, pos);
        assert_eq!(left, self.pixel(Row::Right, pos), "rows differ at {}", pos);
        left
    }

    /// Color at a row position as of the last flush
    pub fn shown(&self, row: Row, pos: u8) -> Color {
        self.shown[Self::index(row, pos)]
    }

    pub fn is_dark(&self) -> bool {
        self.pixels.iter().all(|&c| c == Color::Black)
    }

    /// Number of pixels holding `color`
    pub fn count(&self, color: Color) -> usize {
        self.pixels.iter().filter(|&&c| c == color).count()
    }

    /// Which of the five bars are fully lit in `color`
    pub fn lit_strips(&self, color: Color) -> [bool; 5] {
        core::array::from_fn(|i| {
            let (from, len) = STRIPS[i];
            (from..from + len).all(|pos| self.pair(pos) == color)
        })
    }

    /// Number of bars fully lit in `color`
    pub fn strip_count(&self, color: Color) -> usize {
        self.lit_strips(color).iter().filter(|&&lit| lit).count()
    }

    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }
}

impl LedSurface for MockLeds {
    fn set_brightness(&mut self, level: u8) {
        self.brightness = Some(level);
    }

    fn set_pixel(&mut self, row: Row, pos: u8, color: Color) {
        if pos < ROW_LEN {
            self.pixels[Self::index(row, pos)] = color;
        }
    }

    fn fill(&mut self, color: Color) {
        self.pixels = [color; NLEDS];
    }

    fn flush(&mut self) {
        self.shown = self.pixels;
        self.flushes += 1;
    }
}

// ============================================================================
// Mock button
// ============================================================================

/// Button whose debounced state is set directly by the test
pub struct MockButton {
    pressed: Cell<bool>,
    long_pressed: Cell<bool>,
}

impl MockButton {
    pub fn new() -> Self {
        Self {
            pressed: Cell::new(false),
            long_pressed: Cell::new(false),
        }
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn hold(&self) {
        self.pressed.set(true);
        self.long_pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
        self.long_pressed.set(false);
    }
}

impl ButtonInput for MockButton {
    fn is_pressed(&self) -> bool {
        self.pressed.get()
    }

    fn is_long_pressed(&self) -> bool {
        self.long_pressed.get()
    }
}

// ============================================================================
// Mock collaborators
// ============================================================================

/// Random source that always draws the same value, clamped into range
pub struct FixedRandom {
    value: u16,
    draws: u32,
}

impl FixedRandom {
    pub fn new(value: u16) -> Self {
        Self { value, draws: 0 }
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }
}

impl Random for FixedRandom {
    fn next(&mut self, min: u16, max: u16) -> u16 {
        self.draws += 1;
        self.value.clamp(min, max.max(min))
    }
}

/// Battery reading a fixed voltage
pub struct FixedBattery(pub u16);

impl Battery for FixedBattery {
    fn millivolts(&self) -> u16 {
        self.0
    }
}

/// Color a full battery shows
pub const FULL_BATTERY: Color = Color::Green;

/// Millisecond clock advanced by the test
pub struct MockClock {
    now: Cell<u32>,
}

impl MockClock {
    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get() + ms);
    }
}

impl TimeSource for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

// ============================================================================
// Test helper functions
// ============================================================================

/// Engine tick instants from `from_ms` to `until_ms` inclusive
pub fn ticks(from_ms: u32, until_ms: u32) -> impl Iterator<Item = u32> {
    (from_ms..=until_ms).step_by(TICK_MS as usize)
}

/// Ticks `tick` every 100 ms until it reports an end or `until_ms` passes.
///
/// Returns the instant of the first tick that reported an end.
pub fn run_until<F: FnMut(u32) -> Progress>(from_ms: u32, until_ms: u32, mut tick: F) -> Option<u32> {
    ticks(from_ms, until_ms).find(|&now| tick(now).ended)
}
