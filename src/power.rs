//! Battery voltage to indicator color mapping.

use crate::colors::Color;

/// Trait for the battery voltage sense input.
pub trait Battery {
    /// Averaged battery voltage in millivolts.
    fn millivolts(&self) -> u16;
}

/// Lower voltage edge of each indicator color, ascending.
const THRESHOLDS: [(u16, Color); 4] = [
    (6300, Color::Redder),
    (6500, Color::Orange),
    (7000, Color::Yellow),
    (7600, Color::Green),
];

/// Color of the battery indicator pixel for a voltage.
///
/// Red means the two-cell pack needs charging right away.
pub fn battery_color(millivolts: u16) -> Color {
    if millivolts <= THRESHOLDS[0].0 {
        return Color::Red;
    }
    THRESHOLDS
        .iter()
        .rev()
        .find(|(edge, _)| millivolts >= *edge)
        .map_or(Color::Red, |&(_, color)| color)
}
