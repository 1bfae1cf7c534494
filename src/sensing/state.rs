//! Sensing State
//!
//! Stopped ⇄ Running. A pending permission request is tracked by the
//! controller and does not count as Running.

/// Sensing lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensingState {
    /// Not producing sensing data
    #[default]
    Stopped,
    /// Configured and producing sensing data
    Running,
}

impl SensingState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Get state name for observability.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        }
    }
}
