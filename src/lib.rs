#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PhaseTable`**: A mode's timeline of (start offset, phase) entries with an end offset
//! - **`Phase`**: One segment of a timeline; owns its timers and resets them on entry
//! - **`PhaseEngine`** / **`Session`**: Find and run the active phase, remembering transitions
//! - **`ShowMode`**: The seven show modes, each built from the configuration on entry
//! - **`ParamEditor`** / **`ConfigEditor`**: Button-driven editing of the configuration record
//! - **`Dispatcher`**: Chooses between configuration, a show mode and the lock reminder
//! - **`ControlLoop`**: The fixed task table (button polling, heartbeat, engine, watchdog)
//! - **`LedSurface`**: Trait for the pixel write buffer; `LedBuffer` is the in-memory one
//! - **`ConfigStore`**, **`Random`**, **`Battery`**, **`ButtonInput`**: Hardware-facing traits
//!
//! Sequencers draw named [`Color`]s. Brightness and the conversion to `Srgb<u8>`
//! channel values happen when a frame is rendered for the strip.

// Re-export Srgb from palette for strip driver implementations
pub use palette::Srgb;

mod log;

pub mod button;
pub mod colors;
pub mod config;
pub mod control;
pub mod dispatcher;
pub mod editor;
pub mod modes;
pub mod patterns;
pub mod phase;
pub mod power;
pub mod random;
pub mod strip;
pub mod time;
pub mod types;

pub use button::{ButtonInput, Debouncer};
pub use colors::{Color, Rgbw};
pub use config::{Channel, ConfigError, ConfigRecord, ConfigStore, MemoryStore, Mode};
pub use control::{ControlLoop, Housekeeping};
pub use dispatcher::{Board, Dispatcher, DispatcherState};
pub use editor::{ConfigEditor, EditState, Outcome, ParamEditor};
pub use modes::{Lock, ShowMode};
pub use phase::{Cx, Phase, PhaseEngine, PhaseTable, Session, TableBuilder};
pub use power::{Battery, battery_color};
pub use random::{Lcg, Random};
pub use strip::{LedBuffer, LedSurface, Row, StripWriter};
pub use time::{TimeSource, Timer};
pub use types::{Progress, TableError};
