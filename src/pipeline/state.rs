//! Pipeline lifecycle state and cancellation flag.
//!
//! ```text
//! Idle ──> Running ──> Draining ──> Completed
//!             │           │
//!             └───────────┴──> Failed
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crate::PipelineError;

/// Lifecycle state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PipelineState {
    /// No component started
    #[default]
    Idle = 0,
    /// Producer, workers and aggregator are active
    Running = 1,
    /// The source is exhausted and every worker has been sent its termination signal
    Draining = 2,
    /// Every worker reported completion and the report is final
    Completed = 3,
    /// The run was aborted
    Failed = 4,
}
impl PipelineState {
    /// Returns true if `self -> to` is a legal transition
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Completed)
                | (Self::Running | Self::Draining, Self::Failed)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Draining,
            3 => Self::Completed,
            _ => Self::Failed,
        }
    }
}
impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Draining => "Draining",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Atomically updated [`PipelineState`], shared between controller and producer
#[derive(Debug, Default)]
pub struct StateCell(AtomicU8);
impl StateCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from -> to`, failing if the transition is illegal or the current state
    /// is not `from`
    pub fn transition(&self, from: PipelineState, to: PipelineState) -> Result<(), PipelineError> {
        if !from.can_transition(to) {
            return Err(PipelineError::InvalidTransition { from, to });
        }
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| PipelineError::InvalidTransition {
                from: PipelineState::from_u8(actual),
                to,
            })
    }

    /// Moves to `Failed` from whichever active state the run is in
    ///
    /// Returns false if the run was not active.
    pub fn fail(&self) -> bool {
        let mut current = self.get();
        while current.can_transition(PipelineState::Failed) {
            match self.transition(current, PipelineState::Failed) {
                Ok(()) => return true,
                Err(_) => current = self.get(),
            }
        }
        false
    }

    /// Returns a finished (or never started) run to `Idle`
    pub fn reset(&self) -> Result<(), PipelineError> {
        let current = self.get();
        if current == PipelineState::Idle || current.is_terminal() {
            self.0.store(PipelineState::Idle as u8, Ordering::Release);
            Ok(())
        } else {
            Err(PipelineError::InvalidTransition {
                from: current,
                to: PipelineState::Idle,
            })
        }
    }
}

/// Cooperative cancellation flag shared by every component of a run
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);
impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
