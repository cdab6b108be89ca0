//! Persisted configuration record and the store it lives in.
//!
//! The record is one byte per [`Channel`], persisted in channel order. Every
//! channel has a documented range; some ranges depend on other channels
//! (T1 must leave room before the total pit time, T2 before T1, the slalom
//! maximum must exceed the minimum). Records are clamped into range on load
//! and on edit entry, so a saved record never carries an out-of-range value.

use crate::colors::{BRIGHTNESS_LEVELS, INVITE_COLORS};
use crate::log::log_warn;
use crate::random::ERASED_SEED;

/// Number of persisted channels.
pub const RECORD_LEN: usize = 9;

/// Shortest total pit-stop plus lap time, seconds.
pub const PIT_TOTAL_MIN: u8 = 30;
/// Longest total pit-stop plus lap time, seconds.
pub const PIT_TOTAL_MAX: u8 = 240;
/// Shortest time from leaving the pit lane to the finish line, seconds.
pub const PIT_EXIT_MIN: u8 = 10;
/// Shortest time from switching on to leaving the pit lane, seconds.
pub const PIT_EXIT_MARGIN: u8 = 10;
/// Shortest time from the intermediate point to the finish line, seconds.
pub const PIT_INTERMEDIATE_MIN: u8 = 7;
/// Shortest time from leaving the pit lane to the intermediate point, seconds.
pub const PIT_INTERMEDIATE_MARGIN: u8 = 4;
/// Smallest random slalom delay bound, tenths of a second.
pub const SLALOM_MIN: u8 = 1;
/// Largest random slalom delay bound, tenths of a second.
pub const SLALOM_MAX: u8 = 100;
/// Shortest stop-and-go hold, seconds.
pub const STOP_GO_MIN: u8 = 1;
/// Longest stop-and-go hold, seconds.
pub const STOP_GO_MAX: u8 = 50;

/// Show modes selectable through the mode channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Pit-stop sequencing.
    PitStop,
    /// Slalom start lights.
    Slalom,
    /// Rally stop-and-go timer.
    StopAndGo,
    /// Endless safety-car pattern.
    SafetyCar,
    /// Two-hour endurance phase indicator.
    Endurance,
    /// Endless pit-lane invite wave.
    PitInvite,
    /// Iron-man start sequence.
    IronMan,
}

impl Mode {
    /// Number of selectable modes.
    pub const COUNT: u8 = 7;

    /// Decodes the mode channel. Unknown values select no mode.
    pub fn from_channel(value: u8) -> Option<Self> {
        match value {
            0 => Some(Mode::PitStop),
            1 => Some(Mode::Slalom),
            2 => Some(Mode::StopAndGo),
            3 => Some(Mode::SafetyCar),
            4 => Some(Mode::Endurance),
            5 => Some(Mode::PitInvite),
            6 => Some(Mode::IronMan),
            _ => None,
        }
    }

    /// Value stored in the mode channel.
    #[inline]
    pub fn channel_value(self) -> u8 {
        self as u8
    }

    /// Mode-specific channels edited after the mode, in edit order.
    pub fn parameters(self) -> &'static [Channel] {
        match self {
            Mode::PitStop => &[Channel::PitTotal, Channel::PitExit, Channel::PitIntermediate],
            Mode::Slalom => &[Channel::SlalomMin, Channel::SlalomMax],
            Mode::StopAndGo => &[Channel::StopGo],
            Mode::PitInvite => &[Channel::InviteColor],
            Mode::SafetyCar | Mode::Endurance | Mode::IronMan => &[],
        }
    }
}

/// Named configuration channels, in persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Brightness,
    Mode,
    PitTotal,
    PitExit,
    PitIntermediate,
    SlalomMin,
    SlalomMax,
    StopGo,
    InviteColor,
}

impl Channel {
    /// All channels in persisted order.
    pub const ALL: [Channel; RECORD_LEN] = [
        Channel::Brightness,
        Channel::Mode,
        Channel::PitTotal,
        Channel::PitExit,
        Channel::PitIntermediate,
        Channel::SlalomMin,
        Channel::SlalomMax,
        Channel::StopGo,
        Channel::InviteColor,
    ];

    /// Byte offset of this channel in the persisted record.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Errors from decoding or validating a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Persisted bytes do not match the record length.
    WrongLength { expected: usize, actual: usize },

    /// A channel holds a value outside its range.
    OutOfRange {
        channel: Channel,
        value: u8,
        min: u8,
        max: u8,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::WrongLength { expected, actual } => {
                write!(f, "config record must be {} bytes, got {}", expected, actual)
            }
            ConfigError::OutOfRange {
                channel,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "channel {:?} holds {} outside {}..={}",
                    channel, value, min, max
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// The persisted configuration, one field per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRecord {
    /// Brightness level, 0 is dimmest.
    pub brightness: u8,
    /// Selected show mode, see [`Mode::from_channel`].
    pub mode: u8,
    /// Total pit-stop plus lap time, seconds.
    pub pit_total_s: u8,
    /// T1: time from leaving the pit lane to the finish line, seconds.
    pub pit_exit_s: u8,
    /// T2: time from the intermediate point to the finish line, seconds.
    pub pit_intermediate_s: u8,
    /// Lower bound of the random slalom delay, tenths of a second.
    pub slalom_min_ds: u8,
    /// Upper bound of the random slalom delay, tenths of a second.
    pub slalom_max_ds: u8,
    /// Stop-and-go red hold, seconds.
    pub stop_go_s: u8,
    /// Index into [`INVITE_COLORS`].
    pub invite_color: u8,
}

impl Default for ConfigRecord {
    /// Every channel at its minimum, used when storage holds no record.
    fn default() -> Self {
        Self {
            brightness: 0,
            mode: 0,
            pit_total_s: PIT_TOTAL_MIN,
            pit_exit_s: PIT_EXIT_MIN,
            pit_intermediate_s: PIT_INTERMEDIATE_MIN,
            slalom_min_ds: SLALOM_MIN,
            slalom_max_ds: SLALOM_MIN + 1,
            stop_go_s: STOP_GO_MIN,
            invite_color: 0,
        }
    }
}

impl ConfigRecord {
    /// Decodes the persisted shape. Values are taken as-is; see [`clamped`](Self::clamped).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let raw: &[u8; RECORD_LEN] = bytes.try_into().map_err(|_| ConfigError::WrongLength {
            expected: RECORD_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self {
            brightness: raw[0],
            mode: raw[1],
            pit_total_s: raw[2],
            pit_exit_s: raw[3],
            pit_intermediate_s: raw[4],
            slalom_min_ds: raw[5],
            slalom_max_ds: raw[6],
            stop_go_s: raw[7],
            invite_color: raw[8],
        })
    }

    /// Encodes the persisted shape.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        Channel::ALL.map(|channel| self.get(channel))
    }

    /// Reads one channel.
    pub fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Brightness => self.brightness,
            Channel::Mode => self.mode,
            Channel::PitTotal => self.pit_total_s,
            Channel::PitExit => self.pit_exit_s,
            Channel::PitIntermediate => self.pit_intermediate_s,
            Channel::SlalomMin => self.slalom_min_ds,
            Channel::SlalomMax => self.slalom_max_ds,
            Channel::StopGo => self.stop_go_s,
            Channel::InviteColor => self.invite_color,
        }
    }

    /// Writes one channel without range checks.
    pub fn set(&mut self, channel: Channel, value: u8) {
        let slot = match channel {
            Channel::Brightness => &mut self.brightness,
            Channel::Mode => &mut self.mode,
            Channel::PitTotal => &mut self.pit_total_s,
            Channel::PitExit => &mut self.pit_exit_s,
            Channel::PitIntermediate => &mut self.pit_intermediate_s,
            Channel::SlalomMin => &mut self.slalom_min_ds,
            Channel::SlalomMax => &mut self.slalom_max_ds,
            Channel::StopGo => &mut self.stop_go_s,
            Channel::InviteColor => &mut self.invite_color,
        };
        *slot = value;
    }

    /// Inclusive range of a channel, given the channels it depends on.
    ///
    /// Dependent ranges are computed from the record's current values, which
    /// must themselves be in range for the result to be meaningful. The
    /// returned minimum never exceeds the maximum.
    pub fn bounds(&self, channel: Channel) -> (u8, u8) {
        let (min, max) = match channel {
            Channel::Brightness => (0, BRIGHTNESS_LEVELS - 1),
            Channel::Mode => (0, Mode::COUNT - 1),
            Channel::PitTotal => (PIT_TOTAL_MIN, PIT_TOTAL_MAX),
            Channel::PitExit => (
                PIT_EXIT_MIN,
                self.pit_total_s.saturating_sub(PIT_EXIT_MARGIN),
            ),
            Channel::PitIntermediate => (
                PIT_INTERMEDIATE_MIN,
                self.pit_exit_s.saturating_sub(PIT_INTERMEDIATE_MARGIN),
            ),
            Channel::SlalomMin => (SLALOM_MIN, SLALOM_MAX - 2),
            Channel::SlalomMax => (self.slalom_min_ds.saturating_add(1), SLALOM_MAX),
            Channel::StopGo => (STOP_GO_MIN, STOP_GO_MAX),
            Channel::InviteColor => (0, INVITE_COLORS.len() as u8 - 1),
        };
        // A shortest T1 leaves no room for T2 above its minimum; the range
        // then collapses onto the minimum.
        (min, max.max(min))
    }

    /// Returns a copy with every channel forced into range.
    ///
    /// Channels are clamped in persisted order so dependent ranges see
    /// already-clamped inputs.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for channel in Channel::ALL {
            let (min, max) = out.bounds(channel);
            out.set(channel, out.get(channel).clamp(min, max));
        }
        out
    }

    /// Checks every channel against its range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for channel in Channel::ALL {
            let (min, max) = self.bounds(channel);
            let value = self.get(channel);
            if !(min..=max).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    channel,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// The configured show mode, if the mode channel names one.
    #[inline]
    pub fn show_mode(&self) -> Option<Mode> {
        Mode::from_channel(self.mode)
    }
}

/// Trait for the persistent configuration storage.
///
/// Wear leveling and physical layout are the implementation's business.
pub trait ConfigStore {
    /// Returns the current record, clamped, or the default if none is stored.
    fn load(&self) -> ConfigRecord;

    /// Durably replaces the stored record in one logical write.
    fn save(&mut self, record: &ConfigRecord);

    /// Returns the persisted random seed, or [`ERASED_SEED`] if none is stored.
    fn load_seed(&self) -> u16;

    /// Durably replaces the persisted random seed.
    fn save_seed(&mut self, seed: u16);
}

/// A [`ConfigStore`] backed by RAM.
///
/// Holds the raw persisted bytes so decoding and clamping behave exactly as
/// they would over real storage. `None` models erased storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bytes: Option<[u8; RECORD_LEN]>,
    writes: u32,
    seed: Option<u16>,
}

impl MemoryStore {
    /// Creates an erased store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds raw bytes.
    pub fn with_bytes(bytes: [u8; RECORD_LEN]) -> Self {
        Self {
            bytes: Some(bytes),
            writes: 0,
            seed: None,
        }
    }

    /// Creates a store holding a record.
    pub fn with_record(record: &ConfigRecord) -> Self {
        Self::with_bytes(record.to_bytes())
    }

    /// Raw persisted bytes, if any were written.
    pub fn bytes(&self) -> Option<&[u8; RECORD_LEN]> {
        self.bytes.as_ref()
    }

    /// Number of completed record writes. Seed writes are not counted.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> ConfigRecord {
        match self.bytes {
            Some(bytes) => match ConfigRecord::from_bytes(&bytes) {
                Ok(record) => record.clamped(),
                Err(_err) => {
                    log_warn!("config record unreadable, using defaults");
                    ConfigRecord::default()
                }
            },
            None => ConfigRecord::default(),
        }
    }

    fn save(&mut self, record: &ConfigRecord) {
        self.bytes = Some(record.to_bytes());
        self.writes = self.writes.wrapping_add(1);
    }

    fn load_seed(&self) -> u16 {
        self.seed.unwrap_or(ERASED_SEED)
    }

    fn save_seed(&mut self, seed: u16) {
        self.seed = Some(seed);
    }
}
