//! Lifecycle events for anchorframe
//!
//! Every observable step of authority resolution, sensing lifecycle,
//! anchor alignment and floor snapping has a typed event.
//! Call sites never log free-form event names.

use super::logger::Severity;
use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Session
    /// Session instance constructed
    SessionStart,
    /// Session torn down, subscriptions released
    SessionShutdown,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// A localization transition was received
    LocalizationReceived,

    // Authority
    /// Authority resolution wait begins
    AuthorityResolveBegin,
    /// A running session was found and authority derived from it
    AuthorityResolved,
    /// No running session within the timeout; fallback applied
    AuthorityFallback,
    /// Re-evaluation produced a different authority
    AuthorityChanged,

    // Sensing
    /// Sensing subsystem became ready
    SensingSubsystemReady,
    /// Sensing subsystem never became ready
    SensingSubsystemMissing,
    /// Subsystems forced off (startup or follower guard)
    SensingForcedOff,
    /// Spatial mapping permission requested
    PermissionRequested,
    /// Spatial mapping permission granted
    PermissionGranted,
    /// Spatial mapping permission denied
    PermissionDenied,
    /// Sensing configured and running
    SensingStarted,
    /// Sensing stopped
    SensingStopped,
    /// Sensing resumed after a stop
    SensingResumed,
    /// Resume refused (not authority or never configured)
    SensingResumeRejected,

    // Anchor
    /// Shared anchor aligned to the reference pose
    AnchorAligned,
    /// Alignment skipped
    AnchorAlignSkipped,
    /// Content reparented under the shared anchor
    ContentBound,
    /// Content binding skipped (missing node)
    ContentBindSkipped,

    // Snap
    /// Snap run scheduled
    SnapTriggered,
    /// In-flight snap run cancelled by a newer trigger
    SnapCancelled,
    /// Reference transform matches the tracking origin
    SnapConverged,
    /// Convergence bound elapsed
    SnapConvergeTimeout,
    /// Content normalized relative to the reference transform
    SnapNormalized,
    /// Ground evidence detected near the content
    SnapGroundDetected,
    /// Ground wait bound elapsed
    SnapGroundTimeout,
    /// Target height replayed from the locked local height
    SnapLockedReplay,
    /// Downward ray cast found no usable hit
    SnapRaycastMiss,
    /// Snap run finished
    SnapCompleted,
    /// Snap run aborted without moving content
    SnapAborted,
    /// Transient feedback shown
    FeedbackShown,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SessionStart => "SESSION_START",
            Event::SessionShutdown => "SESSION_SHUTDOWN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::LocalizationReceived => "LOCALIZATION_RECEIVED",

            Event::AuthorityResolveBegin => "AUTHORITY_RESOLVE_BEGIN",
            Event::AuthorityResolved => "AUTHORITY_RESOLVED",
            Event::AuthorityFallback => "AUTHORITY_FALLBACK",
            Event::AuthorityChanged => "AUTHORITY_CHANGED",

            Event::SensingSubsystemReady => "SENSING_SUBSYSTEM_READY",
            Event::SensingSubsystemMissing => "SENSING_SUBSYSTEM_MISSING",
            Event::SensingForcedOff => "SENSING_FORCED_OFF",
            Event::PermissionRequested => "PERMISSION_REQUESTED",
            Event::PermissionGranted => "PERMISSION_GRANTED",
            Event::PermissionDenied => "PERMISSION_DENIED",
            Event::SensingStarted => "SENSING_STARTED",
            Event::SensingStopped => "SENSING_STOPPED",
            Event::SensingResumed => "SENSING_RESUMED",
            Event::SensingResumeRejected => "SENSING_RESUME_REJECTED",

            Event::AnchorAligned => "ANCHOR_ALIGNED",
            Event::AnchorAlignSkipped => "ANCHOR_ALIGN_SKIPPED",
            Event::ContentBound => "CONTENT_BOUND",
            Event::ContentBindSkipped => "CONTENT_BIND_SKIPPED",

            Event::SnapTriggered => "SNAP_TRIGGERED",
            Event::SnapCancelled => "SNAP_CANCELLED",
            Event::SnapConverged => "SNAP_CONVERGED",
            Event::SnapConvergeTimeout => "SNAP_CONVERGE_TIMEOUT",
            Event::SnapNormalized => "SNAP_NORMALIZED",
            Event::SnapGroundDetected => "SNAP_GROUND_DETECTED",
            Event::SnapGroundTimeout => "SNAP_GROUND_TIMEOUT",
            Event::SnapLockedReplay => "SNAP_LOCKED_REPLAY",
            Event::SnapRaycastMiss => "SNAP_RAYCAST_MISS",
            Event::SnapCompleted => "SNAP_COMPLETED",
            Event::SnapAborted => "SNAP_ABORTED",
            Event::FeedbackShown => "FEEDBACK_SHOWN",
        }
    }

    /// Severity used when the event is logged without an explicit level.
    ///
    /// Nothing in this crate is fatal; the worst outcome is `Error`.
    pub fn default_severity(&self) -> Severity {
        match self {
            Event::PermissionDenied | Event::SensingSubsystemMissing => Severity::Error,
            Event::AuthorityFallback
            | Event::AnchorAlignSkipped
            | Event::ContentBindSkipped
            | Event::SensingResumeRejected
            | Event::SnapConvergeTimeout
            | Event::SnapGroundTimeout
            | Event::SnapRaycastMiss
            | Event::SnapAborted => Severity::Warn,
            Event::SnapConverged | Event::SnapNormalized | Event::LocalizationReceived => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::SessionStart,
            Event::SessionShutdown,
            Event::ConfigLoaded,
            Event::LocalizationReceived,
            Event::AuthorityResolveBegin,
            Event::AuthorityResolved,
            Event::AuthorityFallback,
            Event::AuthorityChanged,
            Event::SensingSubsystemReady,
            Event::SensingSubsystemMissing,
            Event::SensingForcedOff,
            Event::PermissionRequested,
            Event::PermissionGranted,
            Event::PermissionDenied,
            Event::SensingStarted,
            Event::SensingStopped,
            Event::SensingResumed,
            Event::SensingResumeRejected,
            Event::AnchorAligned,
            Event::AnchorAlignSkipped,
            Event::ContentBound,
            Event::ContentBindSkipped,
            Event::SnapTriggered,
            Event::SnapCancelled,
            Event::SnapConverged,
            Event::SnapConvergeTimeout,
            Event::SnapNormalized,
            Event::SnapGroundDetected,
            Event::SnapGroundTimeout,
            Event::SnapLockedReplay,
            Event::SnapRaycastMiss,
            Event::SnapCompleted,
            Event::SnapAborted,
            Event::FeedbackShown,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_nothing_is_fatal() {
        assert_eq!(Event::PermissionDenied.default_severity(), Severity::Error);
        assert_eq!(Event::SnapRaycastMiss.default_severity(), Severity::Warn);
        assert_eq!(Event::SnapCompleted.default_severity(), Severity::Info);
    }
}
