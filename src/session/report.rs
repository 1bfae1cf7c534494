//! Per-tick session report

use crate::authority::Authority;
use crate::sensing::{BootstrapPhase, SensingState};
use crate::snap::{SnapOutcome, SnapPhase};
use std::time::Duration;

/// What one `FrameSession::tick` observed
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub now: Duration,
    /// Authority from the latest evaluation
    pub authority: Authority,
    pub sensing: SensingState,
    pub bootstrap: BootstrapPhase,
    pub snap_phase: SnapPhase,
    /// `Localized` transitions handled this tick
    pub localized_events: usize,
    /// Snap run that ended this tick
    pub snap_outcome: Option<SnapOutcome>,
}
