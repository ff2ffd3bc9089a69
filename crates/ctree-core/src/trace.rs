//! Structured trace events for the reduction algorithms.
//!
//! The algorithms never print; callers that want per-stage diagnostics pass
//! an observer and render the events themselves.

use crate::cell::CellKind;
use crate::heap::BitHeap;

#[derive(Debug)]
pub enum TraceEvent<'a> {
    /// A reduction stage is about to run. `target` is absent for FA-only.
    StageBegin {
        stage: usize,
        target: Option<usize>,
        max_height: usize,
    },
    /// A compressor cell was scheduled, consuming `kind.arity()` bits of the
    /// pre-stage column starting at `start`.
    CellPlaced {
        stage: usize,
        column: usize,
        kind: CellKind,
        sequence: usize,
        start: usize,
    },
    /// A reduction stage finished; `heap` is the frozen result snapshot.
    StageEnd { stage: usize, heap: &'a BitHeap },
}

pub trait StageObserver {
    fn on_event(&mut self, event: &TraceEvent<'_>);
}

/// Observer that discards all events.
pub struct NullObserver;

impl StageObserver for NullObserver {
    fn on_event(&mut self, _event: &TraceEvent<'_>) {}
}
