//! Coordination Error Types
//!
//! Failures in the coordination core are never fatal:
//! - Timeouts fall through to a defined default
//! - Permission denial leaves sensing stopped
//! - Missing collaborators skip the dependent operation
//! - A missing ground hit aborts the snap run without moving content

use std::fmt;

/// Coordination error type
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    /// Error kind
    pub kind: FrameErrorKind,
    /// Error message
    pub message: String,
}

/// Coordination error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameErrorKind {
    /// A bounded wait elapsed
    Timeout,

    /// Spatial mapping permission was denied
    PermissionDenied,

    /// A collaborator (tracking, anchor, reference node, subsystem) is absent
    MissingCollaborator,

    /// The downward ray cast produced no usable hit
    NoGroundHit,
}

impl FrameErrorKind {
    /// Stable name for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::PermissionDenied => "permission_denied",
            Self::MissingCollaborator => "missing_collaborator",
            Self::NoGroundHit => "no_ground_hit",
        }
    }
}

impl FrameError {
    /// Create a new coordination error.
    pub fn new(kind: FrameErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FrameErrorKind::Timeout, message)
    }

    /// Create a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(FrameErrorKind::PermissionDenied, message)
    }

    /// Create a missing collaborator error.
    pub fn missing_collaborator(message: impl Into<String>) -> Self {
        Self::new(FrameErrorKind::MissingCollaborator, message)
    }

    /// Create a no ground hit error.
    pub fn no_ground_hit(message: impl Into<String>) -> Self {
        Self::new(FrameErrorKind::NoGroundHit, message)
    }

    /// Coordination errors are always absorbed locally.
    pub fn is_fatal(&self) -> bool {
        false
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameError({:?}): {}", self.kind, self.message)
    }
}

impl std::error::Error for FrameError {}

/// Result type for coordination operations
pub type FrameResult<T> = Result<T, FrameError>;
