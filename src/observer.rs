//! Hook for an optional visualization of a run.

use crate::field::Field;
use crate::piece::Form;
use crate::stats::Stats;

/// A form about to be dropped at column `xpos`.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub form: &'a Form,
    pub xpos: usize,
}

/// Receives read-only snapshots while a game is played.
///
/// Runs never depend on an observer for their outcome.
pub trait Observer {
    /// Called with the current state, and with the form about to be dropped
    /// when a placement is pending.
    fn update(&mut self, field: &Field, stats: &Stats, candidate: Option<Candidate<'_>>);

    /// Called once after the run has ended and its report was written.
    fn wait(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Observer for Headless {
    fn update(&mut self, _field: &Field, _stats: &Stats, _candidate: Option<Candidate<'_>>) {}
}
