//! Integration tests for the show modes

mod common;
use common::*;

use pitstick::modes::endurance::{self, Endurance};
use pitstick::modes::iron_man::IronMan;
use pitstick::modes::pit::{PitPhase, PitStop};
use pitstick::modes::pit_invite::PitInvite;
use pitstick::modes::safety_car::SafetyCar;
use pitstick::modes::slalom::Slalom;
use pitstick::modes::stop_go::StopAndGo;
use pitstick::modes::{Lock, ShowMode};
use pitstick::strip::STRIPS;
use pitstick::{Color, ConfigRecord, Cx, Lcg, LedSurface, Mode, Progress};

fn pit_record(total: u8, t1: u8, t2: u8) -> ConfigRecord {
    ConfigRecord {
        pit_total_s: total,
        pit_exit_s: t1,
        pit_intermediate_s: t2,
        ..ConfigRecord::default()
    }
}

/// Ticks a mode from zero to `until_ms`, returning the buffer and the first end
fn drive<F>(until_ms: u32, mut run: F) -> (MockLeds, Option<u32>)
where
    F: FnMut(&mut Cx<'_, MockLeds>) -> Progress,
{
    let mut leds = MockLeds::new();
    let ended = run_until(0, until_ms, |now| {
        run(&mut Cx::new(now, &mut leds, FULL_BATTERY))
    });
    (leds, ended)
}

// ============================================================================
// Pit stop
// ============================================================================

#[test]
fn pit_boundaries_from_config() {
    let pit = PitStop::new(&pit_record(60, 20, 10)).unwrap();
    let t = pit.timings();
    assert_eq!(t.exit_countdown_ms, 35_000);
    assert_eq!(t.green_to_black_ms, 40_000);
    assert_eq!(t.intermediate_ms, 50_000);
    assert_eq!(t.lights_ms, 55_000);
    assert_eq!(t.finish_ms, 60_000);
    assert_eq!(t.end_ms, 62_000);
    assert_eq!(pit.table().len(), 6);
}

#[test]
fn pit_green_countdown_retires_a_mark_every_20s() {
    let mut pit = PitStop::new(&pit_record(60, 20, 10)).unwrap();

    let (leds, _) = drive(0, |cx| pit.run(cx));
    assert_eq!(pit.active_phase(), Some(0));
    for from in [5, 20, 35, 50, 65] {
        assert_eq!(leds.pair(from), Color::Green);
        assert_eq!(leds.pair(from + 1), Color::Green);
    }
    assert_eq!(leds.pair(0), FULL_BATTERY);

    let mut leds = MockLeds::new();
    for now in ticks(0, 19_000) {
        pit.run(&mut Cx::new(now, &mut leds, FULL_BATTERY));
    }
    assert_eq!(leds.pair(65), Color::Green);

    pit.run(&mut Cx::new(19_500, &mut leds, FULL_BATTERY));
    assert!(leds.pair(65) == Color::Black && leds.pair(5) == Color::Black);

    pit.run(&mut Cx::new(20_000, &mut leds, FULL_BATTERY));
    assert_eq!(leds.pair(50), Color::Green);
    assert_eq!(leds.pair(65), Color::Black);
    match pit.table().phase(0) {
        Some(PitPhase::Countdown(countdown)) => assert_eq!(countdown.marks(), 4),
        other => panic!("unexpected phase {:?}", other),
    }
}

#[test]
fn pit_full_sequence() {
    let mut pit = PitStop::new(&pit_record(60, 20, 10)).unwrap();
    let mut leds = MockLeds::new();
    let at = |pit: &mut PitStop, leds: &mut MockLeds, from: u32, to: u32| {
        run_until(from, to, |now| pit.run(&mut Cx::new(now, leds, FULL_BATTERY)))
    };

    assert_eq!(at(&mut pit, &mut leds, 0, 35_000), None);
    assert_eq!(leds.lit_strips(Color::Yellow), [true, false, false, false, false]);

    at(&mut pit, &mut leds, 35_100, 39_000);
    assert_eq!(leds.strip_count(Color::Yellow), 5);

    at(&mut pit, &mut leds, 39_100, 40_000);
    assert_eq!(leds.count(Color::Green), 144);

    at(&mut pit, &mut leds, 40_100, 42_900);
    assert!(leds.is_dark());
    at(&mut pit, &mut leds, 43_000, 43_000);
    assert_eq!(leds.pair(0), FULL_BATTERY);

    at(&mut pit, &mut leds, 43_100, 50_000);
    assert_eq!(leds.count(Color::Red), 144);

    at(&mut pit, &mut leds, 50_100, 55_000);
    assert_eq!(leds.strip_count(Color::Red), 5);
    at(&mut pit, &mut leds, 55_100, 59_000);
    assert_eq!(leds.lit_strips(Color::Red), [true, false, false, false, false]);

    at(&mut pit, &mut leds, 59_100, 60_000);
    assert_eq!(leds.count(Color::Green), 144);

    assert_eq!(at(&mut pit, &mut leds, 60_100, 70_000), Some(62_000));
}

#[test]
fn pit_battery_blink_after_green_runs_at_half_hertz() {
    let mut pit = PitStop::new(&pit_record(60, 20, 10)).unwrap();
    let mut leds = MockLeds::new();
    let mut toggles = Vec::new();
    for now in ticks(0, 49_900) {
        let progress = pit.run(&mut Cx::new(now, &mut leds, FULL_BATTERY));
        if now >= 42_000 && progress.changed {
            toggles.push((now, leds.pair(0) == FULL_BATTERY));
        }
    }
    assert_eq!(
        toggles,
        vec![
            (42_000, false),
            (43_000, true),
            (44_000, false),
            (45_000, true),
            (46_000, false),
            (47_000, true),
            (48_000, false),
            (49_000, true),
        ]
    );
}

#[test]
fn pit_ends_at_total_plus_two_seconds() {
    for (total, t1, t2) in [(60, 20, 10), (30, 10, 7), (240, 230, 226)] {
        let mut pit = PitStop::new(&pit_record(total, t1, t2)).unwrap();
        let end = u32::from(total) * 1000 + 2_000;
        let (_, ended) = drive(end + 1_000, |cx| pit.run(cx));
        assert_eq!(ended, Some(end));
    }
}

// ============================================================================
// Slalom
// ============================================================================

fn slalom_record(min: u8, max: u8) -> ConfigRecord {
    ConfigRecord {
        slalom_min_ds: min,
        slalom_max_ds: max,
        ..ConfigRecord::default()
    }
}

/// Returns (fifth bar instant, blank instant)
fn slalom_events(slalom: &mut Slalom) -> (u32, u32) {
    let mut leds = MockLeds::new();
    let mut fifth = None;
    for now in ticks(0, 30_000) {
        let progress = slalom.run(&mut Cx::new(now, &mut leds, FULL_BATTERY));
        if fifth.is_none() && leds.strip_count(Color::Red) == 5 {
            fifth = Some(now);
        }
        if let Some(fifth) = fifth {
            if progress.changed && leds.is_dark() {
                return (fifth, now);
            }
        }
    }
    panic!("no blank after the fifth bar");
}

#[test]
fn slalom_blank_follows_fifth_bar_within_window() {
    let record = slalom_record(10, 20);
    for seed in [0, 1, 77, 1234, 20_000, 32_767] {
        let mut rng = Lcg::new(seed, 0);
        let mut slalom = Slalom::new(&record, &mut rng).unwrap();
        let (fifth, blank) = slalom_events(&mut slalom);
        assert_eq!(fifth, 6_000);
        let delay = blank - fifth;
        assert!((1_000..=2_000).contains(&delay), "seed {} gave {} ms", seed, delay);
        assert_eq!(delay, slalom.delay_ms());
    }
}

#[test]
fn slalom_uses_one_draw_per_activation() {
    let mut rng = FixedRandom::new(15);
    let mut slalom = Slalom::new(&slalom_record(10, 20), &mut rng).unwrap();
    assert_eq!(rng.draws(), 1);
    assert_eq!(slalom.delay_ms(), 1_500);

    let (_, blank) = slalom_events(&mut slalom);
    assert_eq!(blank, 7_500);
    assert_eq!(rng.draws(), 1);
}

#[test]
fn slalom_battery_window_and_end() {
    let mut rng = FixedRandom::new(20);
    let mut slalom = Slalom::new(&slalom_record(10, 20), &mut rng).unwrap();
    assert_eq!(slalom.table().start_of(2), Some(14_000));
    assert_eq!(slalom.table().end_ms(), 19_000);

    let mut leds = MockLeds::new();
    let ended = run_until(0, 25_000, |now| slalom.run(&mut Cx::new(now, &mut leds, FULL_BATTERY)));
    assert_eq!(ended, Some(19_000));
    assert_eq!(leds.pair(0), FULL_BATTERY);
    assert_eq!(leds.count(Color::Black), 142);
}

// ============================================================================
// Stop and go, safety car
// ============================================================================

#[test]
fn stop_and_go_sequence() {
    let record = ConfigRecord {
        stop_go_s: 5,
        ..ConfigRecord::default()
    };
    let mut mode = StopAndGo::new(&record).unwrap();
    let mut leds = MockLeds::new();
    let go = |mode: &mut StopAndGo, leds: &mut MockLeds, from: u32, to: u32| {
        run_until(from, to, |now| mode.run(&mut Cx::new(now, leds, FULL_BATTERY)))
    };

    go(&mut mode, &mut leds, 0, 4_900);
    assert_eq!(leds.count(Color::Red), 144);
    go(&mut mode, &mut leds, 5_000, 14_900);
    assert_eq!(leds.count(Color::Green), 144);
    go(&mut mode, &mut leds, 15_000, 15_000);
    assert_eq!(leds.pair(0), FULL_BATTERY);
    assert_eq!(go(&mut mode, &mut leds, 15_100, 30_000), Some(20_000));
}

#[test]
fn safety_car_never_ends() {
    let mut mode = SafetyCar::new().unwrap();
    let (_, ended) = drive(600_000, |cx| mode.run(cx));
    assert_eq!(ended, None);
    assert!(mode.loops() >= 46);
}

#[test]
fn safety_car_script() {
    let mut mode = SafetyCar::new().unwrap();
    let mut leds = MockLeds::new();
    let mut at = |now: u32, leds: &mut MockLeds| mode.run(&mut Cx::new(now, leds, FULL_BATTERY));

    assert!(at(0, &mut leds).changed);
    assert_eq!(leds.pair(0), FULL_BATTERY);
    assert!(!at(400, &mut leds).changed);

    // The loop starts at 500 ms with the bars off.
    assert!(at(500, &mut leds).changed);
    assert!(leds.is_dark());
    for now in ticks(600, 1_500) {
        at(now, &mut leds);
    }
    assert_eq!(leds.lit_strips(Color::Yellow), [false, true, true, true, false]);
    for now in ticks(1_600, 3_500) {
        at(now, &mut leds);
    }
    assert_eq!(leds.lit_strips(Color::Yellow), [true, true, false, true, true]);
    for now in ticks(3_600, 6_000) {
        at(now, &mut leds);
    }
    assert_eq!(leds.lit_strips(Color::Yellow), [true, false, false, false, true]);

    // Second pass restarts in the tick that ends the first.
    for now in ticks(6_100, 14_400) {
        assert!(!at(now, &mut leds).ended);
    }
    assert!(leds.is_dark());
    for now in ticks(14_500, 15_000) {
        at(now, &mut leds);
    }
    assert_eq!(leds.lit_strips(Color::Yellow), [false, true, true, true, false]);
    assert_eq!(mode.loops(), 1);
}

#[test]
fn safety_car_wrap_sends_nothing() {
    let mut mode = SafetyCar::new().unwrap();
    let mut leds = MockLeds::new();
    let changed_at: Vec<u32> = ticks(0, 26_400)
        .filter(|&now| mode.run(&mut Cx::new(now, &mut leds, FULL_BATTERY)).changed)
        .collect();

    assert_eq!(mode.loops(), 1);
    assert!(!changed_at.contains(&13_500));
    // Battery intro, then every script step of the first pass.
    assert_eq!(changed_at.iter().filter(|&&now| now < 13_500).count(), 20);
    // The second pass skips its leading dark step.
    assert_eq!(changed_at.iter().filter(|&&now| now >= 13_500).count(), 18);
    assert_eq!(changed_at.iter().find(|&&now| now >= 13_500), Some(&14_500));
}

// ============================================================================
// Endurance
// ============================================================================

#[test]
fn endurance_race_length() {
    assert_eq!(endurance::WINDOW_MS, 10 * 60_000);
    assert_eq!(endurance::RACE_MS, 105 * 60_000 + 30_000);

    let mut mode = Endurance::new().unwrap();
    assert_eq!(mode.table().len(), 25);
    assert_eq!(mode.table().end_ms(), endurance::RACE_MS);

    let (_, ended) = drive(endurance::RACE_MS + 1_000, |cx| mode.run(cx));
    assert_eq!(ended, Some(endurance::RACE_MS));
}

#[test]
fn endurance_window_indicators() {
    let mut mode = Endurance::new().unwrap();
    let mut leds = MockLeds::new();
    let window = endurance::FIRST_DARK_MS;
    let advance = |mode: &mut Endurance, leds: &mut MockLeds, from: u32, to: u32| {
        run_until(from, to, |now| mode.run(&mut Cx::new(now, leds, FULL_BATTERY)));
    };

    advance(&mut mode, &mut leds, 0, 0);
    assert_eq!(leds.pair(0), FULL_BATTERY);
    advance(&mut mode, &mut leds, 100, 300);
    assert!(leds.is_dark());

    advance(&mut mode, &mut leds, 400, window);
    assert_eq!(leds.strip_count(Color::Green), 5);

    advance(&mut mode, &mut leds, window + 100, window + 8_000);
    assert_eq!(leds.pair(1), Color::Green);
    assert_eq!(leds.pair(59), Color::Blue);

    advance(&mut mode, &mut leds, window + 8_100, window + 16_000);
    assert_eq!(leds.pair(1), Color::Black);
    assert_eq!(leds.pair(2), Color::Green);

    let blue = window + 8_000 + 58 * 8_000;
    advance(&mut mode, &mut leds, window + 16_100, blue);
    assert_eq!(leds.pair(59), Color::Blue);
    assert_eq!(leds.pair(71), Color::Red);

    advance(&mut mode, &mut leds, blue + 100, blue + 120_000);
    assert_eq!(leds.strip_count(Color::Red), 5);
}

#[test]
fn endurance_window_blinks_four_times_in_eight_seconds() {
    let mut mode = Endurance::new().unwrap();
    let mut leds = MockLeds::new();
    let window = endurance::FIRST_DARK_MS;

    let mut lit_at = Vec::new();
    for now in ticks(0, window + 7_900) {
        let progress = mode.run(&mut Cx::new(now, &mut leds, FULL_BATTERY));
        if now >= window && progress.changed && leds.strip_count(Color::Green) == 5 {
            lit_at.push(now - window);
        }
    }
    assert_eq!(lit_at, vec![0, 2_000, 4_000, 6_000]);

    // The closing red blink keeps the same rate.
    let red = window + endurance::WINDOW_MS - 8_000;
    let mut red_at = Vec::new();
    for now in ticks(window + 8_000, red + 7_900) {
        let progress = mode.run(&mut Cx::new(now, &mut leds, FULL_BATTERY));
        if progress.changed && leds.strip_count(Color::Red) == 5 {
            red_at.push(now - red);
        }
    }
    assert_eq!(red_at, vec![0, 2_000, 4_000, 6_000]);
}

// ============================================================================
// Pit invite, iron man
// ============================================================================

#[test]
fn pit_invite_wave() {
    let record = ConfigRecord {
        invite_color: 1,
        ..ConfigRecord::default()
    };
    let mut mode = PitInvite::new(&record);
    assert_eq!(mode.color(), Color::Blue);
    let mut leds = MockLeds::new();

    let expected = [
        [true, true, false, false, false],
        [false, true, true, false, false],
        [false, false, true, true, false],
        [false, false, false, true, true],
        [false, false, true, true, false],
        [false, true, true, false, false],
    ];
    for cycle in 0..3u32 {
        for (step, bars) in expected.iter().enumerate() {
            let now = 1_000 + cycle * 3_000 + step as u32 * 500;
            let progress = mode.run(&mut Cx::new(now, &mut leds, FULL_BATTERY));
            assert!(progress.changed && !progress.ended);
            assert_eq!(&leds.lit_strips(Color::Blue), bars, "step {}", step);
            assert_eq!(leds.strip_count(Color::Blue), 2);
            assert_eq!(leds.pair(0), FULL_BATTERY);

            let again = mode.run(&mut Cx::new(now + 100, &mut leds, FULL_BATTERY));
            assert!(!again.changed);
        }
    }
}

#[test]
fn iron_man_offsets_every_boundary_after_the_announcement() {
    let mut rng = FixedRandom::new(5);
    let mut mode = IronMan::new(&mut rng).unwrap();
    assert_eq!(rng.draws(), 2);
    assert_eq!(mode.offset_ms(), 1_000);

    let table = mode.table();
    assert_eq!(table.start_of(0), Some(0));
    assert_eq!(table.start_of(1), Some(2_000));
    assert_eq!(table.start_of(2), Some(11_000));
    assert_eq!(table.start_of(3), Some(21_000));
    assert_eq!(table.start_of(10), Some(66_000));
    assert_eq!(table.start_of(11), Some(71_000));
    assert_eq!(table.end_ms(), 91_000);

    let (_, ended) = drive(100_000, |cx| mode.run(cx));
    assert_eq!(ended, Some(91_000));
}

#[test]
fn iron_man_announcement_and_sweeps() {
    let mut rng = FixedRandom::new(0);
    let mut mode = IronMan::new(&mut rng).unwrap();
    let mut leds = MockLeds::new();
    let advance = |mode: &mut IronMan, leds: &mut MockLeds, from: u32, to: u32| {
        run_until(from, to, |now| mode.run(&mut Cx::new(now, leds, FULL_BATTERY)));
    };

    advance(&mut mode, &mut leds, 0, 0);
    assert_eq!(leds.lit_strips(Color::White), [true, false, false, false, true]);
    advance(&mut mode, &mut leds, 100, 500);
    assert!(leds.is_dark());
    advance(&mut mode, &mut leds, 600, 1_000);
    assert_eq!(leds.strip_count(Color::White), 2);
    advance(&mut mode, &mut leds, 1_100, 1_900);
    assert!(leds.is_dark());

    advance(&mut mode, &mut leds, 2_000, 10_000);
    assert_eq!(leds.count(Color::Green), 4);
    assert_eq!(leds.pair(1), Color::Green);
    assert_eq!(leds.pair(70), Color::Green);

    advance(&mut mode, &mut leds, 10_100, 20_000);
    assert_eq!(leds.count(Color::Red), 4);
    assert_eq!(leds.pair(35), Color::Red);
    assert_eq!(leds.pair(36), Color::Red);

    advance(&mut mode, &mut leds, 20_100, 25_000);
    assert_eq!(leds.count(Color::Red), 40);
    advance(&mut mode, &mut leds, 25_100, 25_500);
    assert_eq!(leds.count(Color::Blue), 40);
}

// ============================================================================
// Mode selection, lock
// ============================================================================

#[test]
fn every_mode_can_be_entered() {
    let record = ConfigRecord::default();
    let mut rng = FixedRandom::new(3);
    for value in 0..Mode::COUNT {
        let mode = Mode::from_channel(value).unwrap();
        let show = ShowMode::enter(mode, &record, &mut rng).unwrap();
        assert_eq!(show.mode(), mode);
        assert_eq!(
            show.is_endless(),
            matches!(mode, Mode::SafetyCar | Mode::PitInvite)
        );
    }
}

#[test]
fn lock_reminder_loop() {
    let mut lock = Lock::new();
    let mut leds = MockLeds::new();
    leds.fill(Color::White);

    assert!(lock.run(&mut Cx::new(0, &mut leds, FULL_BATTERY)));
    assert!(leds.is_dark());

    for now in ticks(100, 18_900) {
        assert!(!lock.run(&mut Cx::new(now, &mut leds, FULL_BATTERY)));
    }
    assert!(lock.run(&mut Cx::new(19_000, &mut leds, FULL_BATTERY)));
    assert!(lock.is_lit());
    assert_eq!(leds.pair(0), FULL_BATTERY);
    assert_eq!(leds.pair(1), Color::DarkRed);
    assert_eq!(leds.pair(9), Color::DarkRed);
    assert_eq!(leds.pair(10), Color::Black);
    assert_eq!(leds.pair(61), Color::DarkRed);
    assert_eq!(leds.pair(71), Color::DarkRed);
    assert_eq!(leds.pair(STRIPS[2].0), Color::Black);

    assert!(!lock.run(&mut Cx::new(19_900, &mut leds, FULL_BATTERY)));
    assert!(lock.run(&mut Cx::new(20_000, &mut leds, FULL_BATTERY)));
    assert!(leds.is_dark());
    assert!(lock.run(&mut Cx::new(39_000, &mut leds, FULL_BATTERY)));
}
