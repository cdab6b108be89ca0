//! The show modes and the lock reminder.
//!
//! Every mode derives its timeline from the configuration when it is
//! entered and owns its own [`Session`](crate::phase::Session), so nothing
//! carries over between activations.

pub mod endurance;
pub mod iron_man;
pub mod lock;
pub mod pit;
pub mod pit_invite;
pub mod safety_car;
pub mod slalom;
pub mod stop_go;

pub use endurance::Endurance;
pub use iron_man::IronMan;
pub use lock::Lock;
pub use pit::PitStop;
pub use pit_invite::PitInvite;
pub use safety_car::SafetyCar;
pub use slalom::Slalom;
pub use stop_go::StopAndGo;

use crate::config::{ConfigRecord, Mode};
use crate::phase::Cx;
use crate::random::Random;
use crate::strip::LedSurface;
use crate::types::{Progress, TableError};

/// A running show mode.
#[derive(Debug, Clone)]
pub enum ShowMode {
    PitStop(PitStop),
    Slalom(Slalom),
    StopAndGo(StopAndGo),
    SafetyCar(SafetyCar),
    Endurance(Endurance),
    PitInvite(PitInvite),
    IronMan(IronMan),
}

impl ShowMode {
    /// Activates `mode` with the given configuration.
    ///
    /// Random draws for the activation happen here.
    ///
    /// # Errors
    /// * `CapacityExceeded` - The mode's timeline does not fit its table
    pub fn enter<R: Random>(
        mode: Mode,
        record: &ConfigRecord,
        rng: &mut R,
    ) -> Result<Self, TableError> {
        Ok(match mode {
            Mode::PitStop => ShowMode::PitStop(PitStop::new(record)?),
            Mode::Slalom => ShowMode::Slalom(Slalom::new(record, rng)?),
            Mode::StopAndGo => ShowMode::StopAndGo(StopAndGo::new(record)?),
            Mode::SafetyCar => ShowMode::SafetyCar(SafetyCar::new()?),
            Mode::Endurance => ShowMode::Endurance(Endurance::new()?),
            Mode::PitInvite => ShowMode::PitInvite(PitInvite::new(record)),
            Mode::IronMan => ShowMode::IronMan(IronMan::new(rng)?),
        })
    }

    /// Runs one tick of the mode.
    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        match self {
            ShowMode::PitStop(mode) => mode.run(cx),
            ShowMode::Slalom(mode) => mode.run(cx),
            ShowMode::StopAndGo(mode) => mode.run(cx),
            ShowMode::SafetyCar(mode) => mode.run(cx),
            ShowMode::Endurance(mode) => mode.run(cx),
            ShowMode::PitInvite(mode) => mode.run(cx),
            ShowMode::IronMan(mode) => mode.run(cx),
        }
    }

    /// Which mode this is.
    pub fn mode(&self) -> Mode {
        match self {
            ShowMode::PitStop(_) => Mode::PitStop,
            ShowMode::Slalom(_) => Mode::Slalom,
            ShowMode::StopAndGo(_) => Mode::StopAndGo,
            ShowMode::SafetyCar(_) => Mode::SafetyCar,
            ShowMode::Endurance(_) => Mode::Endurance,
            ShowMode::PitInvite(_) => Mode::PitInvite,
            ShowMode::IronMan(_) => Mode::IronMan,
        }
    }

    /// Returns true for modes that run until power-off.
    pub fn is_endless(&self) -> bool {
        matches!(self, ShowMode::SafetyCar(_) | ShowMode::PitInvite(_))
    }
}
