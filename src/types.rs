//! Core types shared by the engine, the show modes and the editor.

/// Result of one tick of a phase table, show mode or editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Progress {
    /// The write buffer changed and must be transmitted.
    pub changed: bool,

    /// The sequence reached its end.
    pub ended: bool,
}

impl Progress {
    /// Still running, redraw reported by the active phase.
    #[inline]
    pub const fn running(changed: bool) -> Self {
        Self {
            changed,
            ended: false,
        }
    }

    /// Sequence over.
    #[inline]
    pub const fn ended(changed: bool) -> Self {
        Self {
            changed,
            ended: true,
        }
    }
}

/// Phase table construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// More phases than the table can hold.
    CapacityExceeded,
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TableError::CapacityExceeded => {
                write!(f, "phase table capacity exceeded")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TableError {}
