//! Integration tests for colors and frame rendering

use palette::Srgb;
use pitstick::colors::{self, INVITE_COLORS};
use pitstick::strip::{NLEDS, ROW_LEN};
use pitstick::{Color, LedBuffer, LedSurface, Rgbw, Row, StripWriter};

struct Frames {
    last: Option<[Rgbw; NLEDS]>,
    count: u32,
}

impl StripWriter for Frames {
    fn write(&mut self, frame: &[Rgbw; NLEDS]) {
        self.last = Some(*frame);
        self.count += 1;
    }
}

fn buffer() -> LedBuffer<Frames> {
    LedBuffer::new(Frames {
        last: None,
        count: 0,
    })
}

#[test]
fn named_colors_map_to_rgbw() {
    assert!(Color::Black.rgbw().is_dark());
    assert_eq!(Color::Red.rgbw().rgb, Srgb::new(255, 0, 0));
    // White uses the dedicated channel only.
    assert_eq!(Color::White.rgbw(), Rgbw::new(0, 0, 0, 255));
    assert_eq!(Color::Yellow.rgbw().white, 15);
    assert_eq!(Color::DarkRed.rgbw(), Rgbw::new(50, 0, 0, 0));
}

#[test]
fn brightness_levels_scale_every_channel() {
    let yellow = Color::Yellow.rgbw();
    assert_eq!(yellow.dimmed(3), yellow);
    assert_eq!(yellow.dimmed(2), Rgbw::new(127, 127, 0, 7));
    assert_eq!(yellow.dimmed(1), Rgbw::new(63, 63, 0, 3));
    assert_eq!(yellow.dimmed(0), Rgbw::new(31, 31, 0, 1));

    // Levels past the brightest clamp to it.
    assert_eq!(yellow.dimmed(200), yellow);
    assert_eq!(Color::Green.at_brightness(1), Color::Green.rgbw().dimmed(1));
}

#[test]
fn invite_color_falls_back_to_first_entry() {
    for (i, &color) in INVITE_COLORS.iter().enumerate() {
        assert_eq!(colors::invite_color(i as u8), color);
    }
    assert_eq!(colors::invite_color(INVITE_COLORS.len() as u8), Color::Green);
    assert_eq!(colors::invite_color(u8::MAX), Color::Green);
}

#[test]
fn flush_renders_pairs_on_both_physical_ends() {
    let mut leds = buffer();
    leds.set_brightness(3);
    leds.put_pair(0, Color::Blue);
    leds.put_pair(ROW_LEN - 1, Color::Red);
    leds.flush();

    let frame = leds.writer().last.unwrap();
    assert_eq!(frame[0], Color::Blue.rgbw());
    assert_eq!(frame[NLEDS - 1], Color::Blue.rgbw());
    // The two rows meet in the middle of the physical strip.
    assert_eq!(frame[usize::from(ROW_LEN) - 1], Color::Red.rgbw());
    assert_eq!(frame[usize::from(ROW_LEN)], Color::Red.rgbw());
    assert_eq!(frame.iter().filter(|px| !px.is_dark()).count(), 4);
}

#[test]
fn drawing_without_flush_sends_nothing() {
    let mut leds = buffer();
    leds.fill(Color::Green);
    leds.show_strips(Color::Red, 3);
    assert_eq!(leds.frames_sent(), 0);
    assert!(leds.writer().last.is_none());

    leds.flush();
    leds.flush();
    assert_eq!(leds.frames_sent(), 2);
    assert_eq!(leds.writer().count, 2);
    assert_eq!(leds.pixel(Row::Left, 1), Some(Color::Red));
    assert_eq!(leds.pixel(Row::Left, 0), Some(Color::Black));
}

#[test]
fn new_brightness_applies_on_next_flush() {
    let mut leds = buffer();
    leds.fill(Color::Red);
    leds.set_brightness(0);
    leds.flush();
    assert_eq!(leds.writer().last.unwrap()[10].rgb.red, 31);

    leds.set_brightness(2);
    leds.flush();
    assert_eq!(leds.writer().last.unwrap()[10].rgb.red, 127);
}
