//! Phase tables and the engine that walks them.
//!
//! A show mode is a timeline of phases. Each phase starts at a fixed offset
//! from the mode's start and lasts until the next phase starts; the table
//! ends at an explicit end offset. Every tick the engine finds the phase
//! whose interval contains the elapsed time and runs it, passing `init =
//! true` on the first tick of a new phase so it can reset its own state.
//!
//! Phase behavior is a closed set per mode, so each mode defines an enum of
//! its phases and implements [`Phase`] for it with a `match`.

use heapless::Vec;

use crate::colors::Color;
use crate::log::log_debug;
use crate::strip::LedSurface;
use crate::types::{Progress, TableError};

/// Everything a phase may touch during one tick.
pub struct Cx<'a, S: LedSurface> {
    /// Current clock reading in milliseconds. Phase timers measure against it.
    pub now: u32,
    /// The write buffer.
    pub leds: &'a mut S,
    /// Battery indicator color for this tick.
    pub battery: Color,
}

impl<'a, S: LedSurface> Cx<'a, S> {
    /// Bundles one tick's inputs.
    pub fn new(now: u32, leds: &'a mut S, battery: Color) -> Self {
        Self {
            now,
            leds,
            battery,
        }
    }
}

/// Trait for one segment of a show mode's timeline.
pub trait Phase {
    /// Runs one tick of the phase.
    ///
    /// `init` is true on the first tick after the phase became active; the
    /// phase must then reset its timers and counters. Returns true if the
    /// write buffer changed. A call with `init = false` and no expired timer
    /// must leave the buffer alone and return false.
    fn run<S: LedSurface>(&mut self, init: bool, cx: &mut Cx<'_, S>) -> bool;
}

#[derive(Debug, Clone)]
struct Entry<P> {
    start_ms: u32,
    phase: P,
}

/// An ordered timeline of phases with an end offset.
///
/// Start offsets are expected to be non-decreasing. Nothing checks this at
/// runtime; with a malformed table some phases are simply never active.
///
/// # Type Parameters
/// * `P` - The phase type, usually a per-mode enum
/// * `N` - Maximum number of phases
#[derive(Debug, Clone)]
pub struct PhaseTable<P, const N: usize> {
    entries: Vec<Entry<P>, N>,
    end_ms: u32,
}

impl<P, const N: usize> PhaseTable<P, N> {
    /// Starts building a table.
    pub fn builder() -> TableBuilder<P, N> {
        TableBuilder::new()
    }

    /// Index of the phase active at `elapsed_ms`, or `None` once the table
    /// has ended.
    ///
    /// The active phase is the one with `start <= elapsed < next start`,
    /// where the last phase is followed by the end offset.
    pub fn active_index(&self, elapsed_ms: u32) -> Option<usize> {
        (0..self.entries.len()).find(|&i| {
            let next = self
                .entries
                .get(i + 1)
                .map_or(self.end_ms, |entry| entry.start_ms);
            self.entries[i].start_ms <= elapsed_ms && elapsed_ms < next
        })
    }

    /// Number of phases, not counting the end marker.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no phases.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start offset of a phase.
    pub fn start_of(&self, index: usize) -> Option<u32> {
        self.entries.get(index).map(|entry| entry.start_ms)
    }

    /// Offset at which the table ends.
    pub fn end_ms(&self) -> u32 {
        self.end_ms
    }

    /// Borrows a phase.
    pub fn phase(&self, index: usize) -> Option<&P> {
        self.entries.get(index).map(|entry| &entry.phase)
    }

    fn phase_mut(&mut self, index: usize) -> Option<&mut P> {
        self.entries.get_mut(index).map(|entry| &mut entry.phase)
    }
}

/// Builder for [`PhaseTable`].
#[derive(Debug)]
pub struct TableBuilder<P, const N: usize> {
    entries: Vec<Entry<P>, N>,
}

impl<P, const N: usize> TableBuilder<P, N> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends a phase starting at `start_ms`.
    ///
    /// # Errors
    /// * `CapacityExceeded` - The table already holds `N` phases
    pub fn phase(mut self, start_ms: u32, phase: P) -> Result<Self, TableError> {
        self.entries
            .push(Entry { start_ms, phase })
            .map_err(|_| TableError::CapacityExceeded)?;
        Ok(self)
    }

    /// Closes the table; it ends at `end_ms`.
    pub fn end(self, end_ms: u32) -> PhaseTable<P, N> {
        PhaseTable {
            entries: self.entries,
            end_ms,
        }
    }
}

impl<P, const N: usize> Default for TableBuilder<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a [`PhaseTable`], remembering which phase ran last.
///
/// The memory is per engine. Every sequencer owns its own engine, so two
/// tables never confuse each other's transitions.
#[derive(Debug, Clone, Default)]
pub struct PhaseEngine {
    previous: Option<usize>,
}

impl PhaseEngine {
    /// Creates an engine with no phase active.
    pub const fn new() -> Self {
        Self { previous: None }
    }

    /// Runs the phase active at `elapsed_ms`.
    ///
    /// Reports `ended` once `elapsed_ms` is past the table, and forgets the
    /// previous phase so a restart from zero initializes again.
    pub fn advance<P: Phase, S: LedSurface, const N: usize>(
        &mut self,
        table: &mut PhaseTable<P, N>,
        elapsed_ms: u32,
        cx: &mut Cx<'_, S>,
    ) -> Progress {
        let Some(index) = table.active_index(elapsed_ms) else {
            self.previous = None;
            return Progress::ended(false);
        };
        let Some(phase) = table.phase_mut(index) else {
            return Progress::ended(false);
        };
        let init = self.previous != Some(index);
        if init {
            log_debug!("phase {=usize} starts at {=u32} ms", index, elapsed_ms);
        }
        self.previous = Some(index);
        Progress::running(phase.run(init, cx))
    }

    /// Index of the phase that ran last, if any.
    pub fn active(&self) -> Option<usize> {
        self.previous
    }

    /// Forgets the previous phase.
    pub fn restart(&mut self) {
        self.previous = None;
    }
}

/// Elapsed-time origin plus transition memory for one mode activation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    origin: Option<u32>,
    engine: PhaseEngine,
}

impl Session {
    /// Creates a session whose origin is the first clock reading it sees.
    pub const fn new() -> Self {
        Self {
            origin: None,
            engine: PhaseEngine::new(),
        }
    }

    /// Milliseconds since the session's origin, fixing the origin on first use.
    pub fn elapsed(&mut self, now: u32) -> u32 {
        let origin = *self.origin.get_or_insert(now);
        now.wrapping_sub(origin)
    }

    /// Moves the origin to `now` and forgets the previous phase.
    pub fn restart_at(&mut self, now: u32) {
        self.origin = Some(now);
        self.engine.restart();
    }

    /// Runs `table` at the session's elapsed time.
    pub fn advance<P: Phase, S: LedSurface, const N: usize>(
        &mut self,
        table: &mut PhaseTable<P, N>,
        cx: &mut Cx<'_, S>,
    ) -> Progress {
        let elapsed = self.elapsed(cx.now);
        self.engine.advance(table, elapsed, cx)
    }

    /// The session's engine.
    pub fn engine(&self) -> &PhaseEngine {
        &self.engine
    }
}
