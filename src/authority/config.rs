//! Authority Configuration

use crate::config::secs_to_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authority resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Resolve "no session detected" to Host.
    ///
    /// Development convenience only; production keeps `false`.
    pub treat_no_session_as_host: bool,

    /// Upper bound on waiting for a running session, seconds
    pub resolve_timeout_secs: f32,

    /// How long authority keeps being re-evaluated after first resolution,
    /// seconds. Covers late master election.
    pub role_grace_window_secs: f32,
}

impl AuthorityConfig {
    pub fn resolve_timeout(&self) -> Duration {
        secs_to_duration(self.resolve_timeout_secs)
    }

    pub fn role_grace_window(&self) -> Duration {
        secs_to_duration(self.role_grace_window_secs)
    }
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            treat_no_session_as_host: false,
            resolve_timeout_secs: 10.0,
            role_grace_window_secs: 5.0,
        }
    }
}
