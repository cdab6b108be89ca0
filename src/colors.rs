//! Named stick colors and their RGBW output values.
//!
//! Sequencers only ever draw named [`Color`]s. The conversion to channel
//! values, including the brightness level, happens when a frame is
//! rendered for transmission.

use palette::Srgb;

/// Number of selectable brightness levels.
pub const BRIGHTNESS_LEVELS: u8 = 4;

/// Brightness multipliers as (numerator, denominator), dimmest first.
const BRIGHTNESS_COEFS: [(u16, u16); BRIGHTNESS_LEVELS as usize] = [(1, 8), (1, 4), (1, 2), (1, 1)];

/// One output pixel: RGB plus the dedicated white channel of RGBW strips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgbw {
    /// Red, green and blue channel values.
    pub rgb: Srgb<u8>,
    /// White channel value.
    pub white: u8,
}

impl Default for Rgbw {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Rgbw {
    /// Creates a pixel value from raw channels.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            rgb: Srgb::new(red, green, blue),
            white,
        }
    }

    /// Returns true if every channel is zero.
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.rgb.red == 0 && self.rgb.green == 0 && self.rgb.blue == 0 && self.white == 0
    }

    /// Scales all channels by a brightness level (clamped to the brightest).
    pub fn dimmed(self, level: u8) -> Self {
        let (mul, div) = BRIGHTNESS_COEFS[usize::from(level.min(BRIGHTNESS_LEVELS - 1))];
        let scale = |v: u8| ((u16::from(v) * mul) / div) as u8;
        Self::new(
            scale(self.rgb.red),
            scale(self.rgb.green),
            scale(self.rgb.blue),
            scale(self.white),
        )
    }
}

/// Colors the stick can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    #[default]
    Black,
    Red,
    Green,
    Blue,
    White,
    Yellow,
    Magenta,
    Cyan,
    DarkRed,
    Orange,
    /// Between red and orange, used for a nearly flat battery.
    Redder,
    /// Green at roughly 10%.
    Green10,
    /// Blue at roughly 10%.
    Blue10,
}

impl Color {
    /// Full-brightness channel values for this color.
    pub const fn rgbw(self) -> Rgbw {
        match self {
            Color::Black => Rgbw::new(0, 0, 0, 0),
            Color::Red => Rgbw::new(255, 0, 0, 0),
            Color::Green => Rgbw::new(0, 255, 0, 0),
            Color::Blue => Rgbw::new(0, 0, 255, 0),
            Color::White => Rgbw::new(0, 0, 0, 255),
            Color::Yellow => Rgbw::new(255, 255, 0, 15),
            Color::Magenta => Rgbw::new(255, 0, 255, 20),
            Color::Cyan => Rgbw::new(0, 255, 255, 20),
            Color::DarkRed => Rgbw::new(50, 0, 0, 0),
            Color::Orange => Rgbw::new(100, 50, 0, 0),
            Color::Redder => Rgbw::new(200, 50, 0, 0),
            Color::Green10 => Rgbw::new(0, 25, 0, 0),
            Color::Blue10 => Rgbw::new(0, 0, 25, 0),
        }
    }

    /// Channel values for this color at a brightness level.
    #[inline]
    pub fn at_brightness(self, level: u8) -> Rgbw {
        self.rgbw().dimmed(level)
    }
}

/// Colors selectable for the pit-lane invite wave, by channel value.
pub const INVITE_COLORS: [Color; 6] = [
    Color::Green,
    Color::Blue,
    Color::White,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

/// Looks up an invite color, falling back to the first entry.
#[inline]
pub fn invite_color(index: u8) -> Color {
    INVITE_COLORS
        .get(usize::from(index))
        .copied()
        .unwrap_or(INVITE_COLORS[0])
}
