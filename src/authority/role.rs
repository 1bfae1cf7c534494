//! Authority Role
//!
//! - Unresolved: resolution has not finished; grants nothing
//! - Host: sole producer of sensing data and anchor pose
//! - Follower: consumes replicated state only

use crate::collaborators::Session;

/// Authority of this process over shared sensing and anchor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Authority {
    /// Resolution still in progress
    #[default]
    Unresolved,

    /// This process holds authority
    Host,

    /// Another participant holds authority
    Follower,
}

impl Authority {
    /// Check if this is the Host.
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }

    /// Check if this is a Follower.
    pub fn is_follower(&self) -> bool {
        matches!(self, Self::Follower)
    }

    /// Check if resolution has finished.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Get state name for observability.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Host => "host",
            Self::Follower => "follower",
        }
    }

    fn from_flag(host: bool) -> Self {
        if host {
            Self::Host
        } else {
            Self::Follower
        }
    }
}

/// Derive authority from the session's live flags.
///
/// A missing or stopped session yields the fallback. A running session
/// grants authority to the server or to the elected master among equals.
pub fn derive_authority(session: Option<&dyn Session>, treat_no_session_as_host: bool) -> Authority {
    match session {
        Some(s) if s.is_running() => Authority::from_flag(s.is_server() || s.is_elected_master()),
        _ => Authority::from_flag(treat_no_session_as_host),
    }
}
