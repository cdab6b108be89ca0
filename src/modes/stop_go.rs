//! Rally stop-and-go timer: red for the configured hold, then green.

use crate::colors::Color;
use crate::config::ConfigRecord;
use crate::log::log_info;
use crate::patterns::{ShowPower, Solid};
use crate::phase::{Cx, Phase, PhaseTable, Session};
use crate::strip::LedSurface;
use crate::types::{Progress, TableError};

/// Green time after the hold, milliseconds.
pub const GO_MS: u32 = 10_000;
/// Battery window before the mode ends, milliseconds.
pub const POWER_WINDOW_MS: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopGoPhase {
    Hold(Solid),
    Power(ShowPower),
}

impl Phase for StopGoPhase {
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool {
        match self {
            StopGoPhase::Hold(phase) => phase.run(init, cx),
            StopGoPhase::Power(phase) => phase.run(init, cx),
        }
    }
}

/// Stop-and-go show mode.
#[derive(Debug, Clone)]
pub struct StopAndGo {
    table: PhaseTable<StopGoPhase, 3>,
    session: Session,
}

impl StopAndGo {
    pub fn new(record: &ConfigRecord) -> Result<Self, TableError> {
        let hold_ms = u32::from(record.stop_go_s) * 1000;
        let power_ms = hold_ms + GO_MS;
        log_info!("stop and go: hold {=u32} ms", hold_ms);

        let table = PhaseTable::builder()
            .phase(0, StopGoPhase::Hold(Solid::new(Color::Red)))?
            .phase(hold_ms, StopGoPhase::Hold(Solid::new(Color::Green)))?
            .phase(power_ms, StopGoPhase::Power(ShowPower))?
            .end(power_ms + POWER_WINDOW_MS);
        Ok(Self {
            table,
            session: Session::new(),
        })
    }

    pub fn run<S: LedSurface>(&mut self, cx: &mut Cx<'_, S>) -> Progress {
        self.session.advance(&mut self.table, cx)
    }
}
