//! LED output surface and the shared drawing primitives.
//!
//! The stick carries one physical strip folded into two parallel rows of
//! [`ROW_LEN`] pixels. Row positions count from the handle end, so pixel
//! `0` of both rows sits next to the handle. Almost everything is drawn
//! mirrored on both rows with [`LedSurface::put_pair`].

use core::ops::Range;

use crate::colors::{BRIGHTNESS_LEVELS, Color, Rgbw};

/// Number of pixels on the physical strip.
pub const NLEDS: usize = 144;

/// Number of pixels per row.
pub const ROW_LEN: u8 = (NLEDS / 2) as u8;

/// Pixel position of the battery indicator.
pub const BATTERY_POS: u8 = 0;

/// The five traffic-light bars as (first position, length).
pub const STRIPS: [(u8, u8); 5] = [(1, 10), (16, 10), (31, 10), (46, 10), (61, 10)];

/// Largest value a single digit bar can show: groups of three lit pixels
/// separated by one dark pixel, plus whatever fits after the last gap.
pub const MAX_DIGIT: u8 = (ROW_LEN / 4) * 3 + ROW_LEN % 4;

/// One of the two pixel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Row {
    /// Starts at the beginning of the physical strip.
    Left,
    /// Runs backwards from the end of the physical strip.
    Right,
}

impl Row {
    /// Index into the physical strip for a row position.
    #[inline]
    pub fn strip_index(self, pos: u8) -> usize {
        match self {
            Row::Left => usize::from(pos),
            Row::Right => NLEDS - 1 - usize::from(pos),
        }
    }
}

/// Trait for the pixel write buffer the show modes draw into.
///
/// Drawing only touches the buffer. Nothing reaches the strip until
/// [`flush`](LedSurface::flush) is called, which the dispatcher does at most
/// once per tick.
pub trait LedSurface {
    /// Selects the brightness level used for transmitted frames.
    fn set_brightness(&mut self, level: u8);

    /// Sets one pixel. Positions past the row end are ignored.
    fn set_pixel(&mut self, row: Row, pos: u8, color: Color);

    /// Sets every pixel to `color`.
    fn fill(&mut self, color: Color);

    /// Transmits the buffer to the strip.
    fn flush(&mut self);

    /// Sets the same position on both rows.
    #[inline]
    fn put_pair(&mut self, pos: u8, color: Color) {
        self.set_pixel(Row::Left, pos, color);
        self.set_pixel(Row::Right, pos, color);
    }

    /// Sets a range of positions on both rows.
    fn fill_pairs(&mut self, range: Range<u8>, color: Color) {
        for pos in range {
            self.put_pair(pos, color);
        }
    }

    /// Draws one traffic-light bar (0-4) without clearing the rest.
    fn show_strip(&mut self, color: Color, strip: u8) {
        if let Some(&(from, len)) = STRIPS.get(usize::from(strip)) {
            self.fill_pairs(from..from + len, color);
        }
    }

    /// Clears the stick and draws the first `count` bars (at most five).
    fn show_strips(&mut self, color: Color, count: u8) {
        self.fill(Color::Black);
        for strip in 0..count.min(STRIPS.len() as u8) {
            self.show_strip(color, strip);
        }
    }

    /// Draws a digit bar on one row: three lit pixels then a gap, repeated.
    ///
    /// Values above [`MAX_DIGIT`] are clamped. Every remaining pixel of the
    /// row is cleared.
    fn show_digit(&mut self, row: Row, color: Color, digit: u8) {
        let digit = digit.min(MAX_DIGIT);
        let mut pos = 0u8;
        for _ in 0..digit / 3 {
            for _ in 0..3 {
                self.set_pixel(row, pos, color);
                pos += 1;
            }
            self.set_pixel(row, pos, Color::Black);
            pos += 1;
        }
        for _ in 0..digit % 3 {
            self.set_pixel(row, pos, color);
            pos += 1;
        }
        while pos < ROW_LEN {
            self.set_pixel(row, pos, Color::Black);
            pos += 1;
        }
    }

    /// Shows a number as tens on the left row and ones on the right row.
    fn show_number(&mut self, tens: Color, ones: Color, value: u8) {
        self.show_digit(Row::Right, ones, value % 10);
        self.show_digit(Row::Left, tens, value / 10);
    }

    /// Clears the stick, leaving only the battery indicator lit.
    fn show_battery_only(&mut self, battery: Color) {
        self.fill(Color::Black);
        self.put_pair(BATTERY_POS, battery);
    }
}

/// Sink for rendered frames, implemented by the strip driver.
pub trait StripWriter {
    /// Transmits one complete frame, first physical pixel first.
    fn write(&mut self, frame: &[Rgbw; NLEDS]);
}

/// In-memory [`LedSurface`] that renders frames for a [`StripWriter`].
///
/// Colors are kept by name; brightness is applied when the frame is
/// rendered, so a brightness change shows up on the next flush without
/// redrawing.
pub struct LedBuffer<W: StripWriter> {
    pixels: [Color; NLEDS],
    brightness: u8,
    writer: W,
    frames_sent: u32,
}

impl<W: StripWriter> LedBuffer<W> {
    /// Creates a dark buffer at the dimmest level.
    pub fn new(writer: W) -> Self {
        Self {
            pixels: [Color::Black; NLEDS],
            brightness: 0,
            writer,
            frames_sent: 0,
        }
    }

    /// Color currently buffered at a row position.
    pub fn pixel(&self, row: Row, pos: u8) -> Option<Color> {
        (pos < ROW_LEN).then(|| self.pixels[row.strip_index(pos)])
    }

    /// The brightness level in use.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Number of frames handed to the writer so far.
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Renders the buffered colors at the current brightness.
    pub fn render(&self) -> [Rgbw; NLEDS] {
        let mut frame = [Rgbw::default(); NLEDS];
        for (out, color) in frame.iter_mut().zip(self.pixels.iter()) {
            *out = color.at_brightness(self.brightness);
        }
        frame
    }

    /// Borrows the frame writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: StripWriter> LedSurface for LedBuffer<W> {
    fn set_brightness(&mut self, level: u8) {
        self.brightness = level.min(BRIGHTNESS_LEVELS - 1);
    }

    fn set_pixel(&mut self, row: Row, pos: u8, color: Color) {
        if pos < ROW_LEN {
            self.pixels[row.strip_index(pos)] = color;
        }
    }

    fn fill(&mut self, color: Color) {
        self.pixels = [color; NLEDS];
    }

    fn flush(&mut self) {
        let frame = self.render();
        self.writer.write(&frame);
        self.frames_sent = self.frames_sent.wrapping_add(1);
    }
}
