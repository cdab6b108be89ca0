//! Button-driven configuration editing.
//!
//! [`ParamEditor`] edits one channel: every press steps the value up,
//! wrapping from the maximum back to the minimum, and holding the button
//! repeats the step every 200 ms. Ten seconds without a press close the
//! parameter with a one-second confirmation: dim red bars if the value
//! changed, a dark stick otherwise.
//!
//! [`ConfigEditor`] chains parameter editors: brightness, then mode, then
//! the channels of the selected mode. When the chain is through it writes
//! the record once, and only if something changed.

use crate::colors::{Color, INVITE_COLORS, invite_color};
use crate::config::{Channel, ConfigRecord, ConfigStore, Mode};
use crate::button::ButtonInput;
use crate::log::{log_debug, log_info};
use crate::strip::{LedSurface, ROW_LEN};
use crate::time::Timer;

/// Release time after which a parameter is closed.
pub const INACTIVITY_MS: u32 = 10_000;
/// Step interval while the button is held.
pub const REPEAT_MS: u32 = 200;
/// Length of the confirmation shown when a parameter is closed.
pub const CONFIRM_MS: u32 = 1_000;

/// Pairs lit by the confirmation patterns.
const CONFIRM_PAIRS: u8 = 20;

/// What the caller should do after a parameter editor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Still editing; redraw when the step reports a change.
    Continue,
    /// Showing the confirmation; leave the display alone.
    ContinueQuiet,
    /// Done, and the value must be saved.
    EndSaving,
    /// Done, nothing to save.
    EndNotSaving,
}

impl Outcome {
    /// Returns true for the two terminal outcomes.
    #[inline]
    pub fn is_end(self) -> bool {
        matches!(self, Outcome::EndSaving | Outcome::EndNotSaving)
    }
}

/// States of a parameter editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EditState {
    /// Freshly created; the next step samples the button and draws.
    Idle,
    Pressed,
    /// Released, inactivity timer running.
    Released,
    /// Held past the long-press threshold, auto-repeating.
    LongPressed,
    /// About to show the save confirmation.
    Saving,
    /// About to show the discard confirmation.
    NotSaving,
    /// Confirmation showing.
    Waiting,
}

/// Edits one configuration channel with the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamEditor {
    channel: Channel,
    value: u8,
    original: u8,
    min: u8,
    max: u8,
    clamped: bool,
    state: EditState,
    outcome: Outcome,
    timer: Timer,
    repeat: Timer,
}

impl ParamEditor {
    /// Starts editing `value` within `min..=max`.
    ///
    /// An out-of-range value is clamped, and the clamp alone makes the
    /// parameter count as changed.
    pub fn new(channel: Channel, value: u8, min: u8, max: u8) -> Self {
        let max = max.max(min);
        let clamped_value = value.clamp(min, max);
        Self {
            channel,
            value: clamped_value,
            original: value,
            min,
            max,
            clamped: clamped_value != value,
            state: EditState::Idle,
            outcome: Outcome::Continue,
            timer: Timer::started_at(0),
            repeat: Timer::started_at(0),
        }
    }

    /// Starts editing a channel of `record` within its current range.
    pub fn for_channel(channel: Channel, record: &ConfigRecord) -> Self {
        let (min, max) = record.bounds(channel);
        Self::new(channel, record.get(channel), min, max)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Inclusive range being edited.
    pub fn bounds(&self) -> (u8, u8) {
        (self.min, self.max)
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Outcome of the last step.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns true if closing now would save.
    pub fn is_modified(&self) -> bool {
        self.clamped || self.value != self.original
    }

    /// Runs one tick, returning true if the buffer changed.
    pub fn step<B: ButtonInput, S: LedSurface>(
        &mut self,
        now: u32,
        button: &B,
        leds: &mut S,
    ) -> bool {
        let pressed = button.is_pressed();
        match self.state {
            EditState::Idle => {
                if pressed {
                    self.state = EditState::Pressed;
                } else {
                    self.state = EditState::Released;
                    self.timer.reset(now);
                }
                self.outcome = Outcome::Continue;
                show_value(leds, self.channel, self.value);
                true
            }
            EditState::Pressed => {
                if button.is_long_pressed() {
                    self.repeat.reset(now);
                    self.state = EditState::LongPressed;
                } else if !pressed {
                    self.state = EditState::Released;
                    self.timer.reset(now);
                }
                false
            }
            EditState::Released => {
                if self.timer.is_expired(now, INACTIVITY_MS) {
                    self.state = if self.is_modified() {
                        EditState::Saving
                    } else {
                        EditState::NotSaving
                    };
                    false
                } else if pressed {
                    self.state = EditState::Pressed;
                    self.increment(leds)
                } else {
                    false
                }
            }
            EditState::LongPressed => {
                if !pressed {
                    self.state = EditState::Released;
                    self.timer.reset(now);
                    false
                } else if self.repeat.is_expired(now, REPEAT_MS) {
                    self.repeat.reset(now);
                    self.increment(leds)
                } else {
                    false
                }
            }
            EditState::Saving => {
                leds.fill(Color::Black);
                leds.fill_pairs(0..CONFIRM_PAIRS, Color::DarkRed);
                self.confirm(now);
                true
            }
            EditState::NotSaving => {
                leds.fill(Color::Black);
                self.confirm(now);
                true
            }
            EditState::Waiting => {
                self.outcome = if !self.timer.is_expired(now, CONFIRM_MS) {
                    Outcome::ContinueQuiet
                } else if self.is_modified() {
                    Outcome::EndSaving
                } else {
                    Outcome::EndNotSaving
                };
                false
            }
        }
    }

    fn increment<S: LedSurface>(&mut self, leds: &mut S) -> bool {
        self.value = if self.value >= self.max {
            self.min
        } else {
            self.value + 1
        };
        show_value(leds, self.channel, self.value);
        true
    }

    fn confirm(&mut self, now: u32) {
        self.timer.reset(now);
        self.state = EditState::Waiting;
        self.outcome = Outcome::ContinueQuiet;
    }
}

/// Draws a candidate value the way its channel is shown while editing.
pub fn show_value<S: LedSurface>(leds: &mut S, channel: Channel, value: u8) {
    match channel {
        Channel::Brightness => show_brightness_pattern(leds),
        Channel::Mode => show_mode_icon(leds, value),
        Channel::PitTotal => leds.show_number(Color::Orange, Color::Orange, value),
        Channel::PitExit => leds.show_number(Color::Yellow, Color::Yellow, value),
        Channel::PitIntermediate => leds.show_number(Color::Blue, Color::Blue, value),
        Channel::SlalomMin => leds.show_number(Color::White, Color::White, value),
        Channel::SlalomMax => leds.show_number(Color::Green, Color::Green, value),
        Channel::StopGo => leds.show_number(Color::Red, Color::Red, value),
        Channel::InviteColor => leds.show_strips(invite_color(value), 2),
    }
}

/// Red, green, blue and white blocks; the brightness applies on flush.
fn show_brightness_pattern<S: LedSurface>(leds: &mut S) {
    leds.fill(Color::Black);
    leds.fill_pairs(0..5, Color::Red);
    leds.fill_pairs(5..10, Color::Green);
    leds.fill_pairs(10..15, Color::Blue);
    leds.fill_pairs(15..20, Color::White);
}

/// A small icon near the handle for each mode. Unknown values stay dark.
fn show_mode_icon<S: LedSurface>(leds: &mut S, value: u8) {
    leds.fill(Color::Black);
    let Some(mode) = Mode::from_channel(value) else {
        return;
    };
    match mode {
        Mode::PitStop => {
            for i in 0..5 {
                leds.put_pair(i * 2, Color::Green);
            }
        }
        Mode::Slalom => {
            for i in 0..5 {
                leds.fill_pairs(i * 3..i * 3 + 2, Color::Red);
            }
        }
        Mode::StopAndGo => {
            leds.fill_pairs(0..10, Color::Red);
            leds.fill_pairs(10..20, Color::Green);
        }
        Mode::SafetyCar => {
            leds.put_pair(0, Color::Yellow);
            leds.put_pair(4, Color::Yellow);
        }
        Mode::Endurance => {
            leds.fill_pairs(0..10, Color::Green);
            leds.fill_pairs(10..13, Color::Blue);
        }
        Mode::PitInvite => {
            for (i, &color) in INVITE_COLORS.iter().enumerate() {
                leds.put_pair(i as u8 * 2, color);
            }
        }
        Mode::IronMan => {
            leds.fill_pairs(0..3, Color::White);
            leds.fill_pairs(ROW_LEN - 3..ROW_LEN, Color::White);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Stage {
    Editing,
    Finished,
    Done,
}

/// Walks the operator through the whole configuration.
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    working: ConfigRecord,
    param: ParamEditor,
    dirty: bool,
    saved: bool,
    stage: Stage,
}

impl ConfigEditor {
    /// Starts editing from the stored record.
    pub fn new(record: ConfigRecord) -> Self {
        Self {
            working: record,
            param: ParamEditor::for_channel(Channel::Brightness, &record),
            dirty: false,
            saved: false,
            stage: Stage::Editing,
        }
    }

    /// The record as edited so far.
    pub fn record(&self) -> &ConfigRecord {
        &self.working
    }

    /// Brightness to display with, following the edit live.
    pub fn brightness(&self) -> u8 {
        self.working.brightness
    }

    /// The parameter being edited.
    pub fn param(&self) -> &ParamEditor {
        &self.param
    }

    /// Returns true once the chain is complete and its last screen was shown.
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Returns true if the record was written.
    pub fn saved(&self) -> bool {
        self.saved
    }

    /// Runs one tick, returning true if the buffer changed.
    pub fn step<B: ButtonInput, S: LedSurface, C: ConfigStore>(
        &mut self,
        now: u32,
        button: &B,
        leds: &mut S,
        store: &mut C,
    ) -> bool {
        match self.stage {
            Stage::Editing => {}
            Stage::Finished => {
                self.stage = Stage::Done;
                return false;
            }
            Stage::Done => return false,
        }

        let mut changed = self.param.step(now, button, leds);
        self.working.set(self.param.channel(), self.param.value());

        let outcome = self.param.outcome();
        if !outcome.is_end() {
            return changed;
        }
        log_debug!("{} closed with {}", self.param.channel(), outcome);
        if outcome == Outcome::EndSaving {
            self.dirty = true;
        }

        match self.next_channel() {
            Some(channel) => {
                self.param = ParamEditor::for_channel(channel, &self.working);
                changed |= self.param.step(now, button, leds);
            }
            None => {
                self.finish(leds, store);
                changed = true;
            }
        }
        changed
    }

    fn next_channel(&self) -> Option<Channel> {
        let current = self.param.channel();
        match current {
            Channel::Brightness => Some(Channel::Mode),
            Channel::Mode => self.mode_parameters().first().copied(),
            _ => {
                let parameters = self.mode_parameters();
                let index = parameters.iter().position(|&channel| channel == current)?;
                parameters.get(index + 1).copied()
            }
        }
    }

    fn mode_parameters(&self) -> &'static [Channel] {
        match self.working.show_mode() {
            Some(mode) => mode.parameters(),
            None => &[],
        }
    }

    fn finish<S: LedSurface, C: ConfigStore>(&mut self, leds: &mut S, store: &mut C) {
        leds.fill(Color::Black);
        if self.dirty {
            let record = self.working.clamped();
            log_info!("config saved: {}", record);
            store.save(&record);
            self.working = record;
            self.saved = true;
            leds.fill_pairs(0..CONFIRM_PAIRS, Color::Red);
        } else {
            log_info!("config unchanged");
        }
        self.stage = Stage::Finished;
    }
}
