//! Floor Snap State Machine
//!
//! One run walks these phases in order:
//!
//! ```text
//! Idle -> Debouncing -> Converging -> Normalizing -> (ResumeSensing)
//!      -> AwaitingGround -> ComputingHeight -> Animating -> Finalizing -> Idle
//! ```
//!
//! - Waiting phases (Debouncing, Converging, AwaitingGround, Animating)
//!   carry their own bound and yield to the next tick
//! - Every other phase completes within the tick that enters it
//! - A new trigger cancels the run in whatever phase it is in
//! - Only Finalizing mutates snap memory

use crate::errors::FrameError;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use uuid::Uuid;

/// Floor snap phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapPhase {
    /// No run in flight
    Idle,
    /// Waiting out the trigger delay
    Debouncing { until: Duration },
    /// Copying the tracking origin into the reference until they agree
    Converging { deadline: Duration },
    /// Resetting or restoring the target pose relative to the reference
    Normalizing,
    /// Resuming sensing for the duration of the run
    ResumeSensing,
    /// Waiting for a plane or mesh collider near the target
    AwaitingGround { deadline: Duration },
    /// Lock replay or downward ray cast
    ComputingHeight,
    /// Easing the target height toward `target_y`
    Animating {
        start_y: f32,
        target_y: f32,
        started: Duration,
        duration: Duration,
    },
    /// Reparenting, remembering, stopping sensing, feedback
    Finalizing { target_y: f32 },
}

impl SnapPhase {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Debouncing { .. } => "debouncing",
            Self::Converging { .. } => "converging",
            Self::Normalizing => "normalizing",
            Self::ResumeSensing => "resume_sensing",
            Self::AwaitingGround { .. } => "awaiting_ground",
            Self::ComputingHeight => "computing_height",
            Self::Animating { .. } => "animating",
            Self::Finalizing { .. } => "finalizing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Phase yields to the next tick instead of completing immediately.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            Self::Debouncing { .. }
                | Self::Converging { .. }
                | Self::AwaitingGround { .. }
                | Self::Animating { .. }
        )
    }
}

/// Cancellation flag shared between a run and whoever may cancel it
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum SnapOutcome {
    /// Target lowered to `target_height` (world Y)
    Completed { run_id: Uuid, target_height: f32 },
    /// Run stopped without moving the target height
    Aborted { run_id: Uuid, error: FrameError },
}

impl SnapOutcome {
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Completed { run_id, .. } | Self::Aborted { run_id, .. } => *run_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
