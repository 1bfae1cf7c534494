//! In-memory session, tracking, sensing, planes, permissions and feedback

use crate::collaborators::{
    FeedbackSink, PermissionKind, PermissionOutcome, PermissionService, PlaneDetectionMode,
    PlaneSubsystem, SensingSubsystem, Session, Tracking,
};
use crate::geometry::{Pose, Quat, Vec3};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tokio::sync::oneshot;

// =============================================================================
// Session
// =============================================================================

/// Session with settable flags
#[derive(Debug, Default)]
pub struct MemorySession {
    running: Cell<bool>,
    server: Cell<bool>,
    master: Cell<bool>,
}

impl MemorySession {
    pub fn new(running: bool, server: bool, master: bool) -> Self {
        Self {
            running: Cell::new(running),
            server: Cell::new(server),
            master: Cell::new(master),
        }
    }

    /// Running, this process is the server.
    pub fn running_server() -> Self {
        Self::new(true, true, false)
    }

    /// Running, this process is a plain peer.
    pub fn running_peer() -> Self {
        Self::new(true, false, false)
    }

    /// Exists but not yet running.
    pub fn stopped() -> Self {
        Self::new(false, false, false)
    }

    pub fn set_running(&self, running: bool) {
        self.running.set(running);
    }

    pub fn set_server(&self, server: bool) {
        self.server.set(server);
    }

    pub fn set_elected_master(&self, master: bool) {
        self.master.set(master);
    }
}

impl Session for MemorySession {
    fn is_running(&self) -> bool {
        self.running.get()
    }

    fn is_server(&self) -> bool {
        self.server.get()
    }

    fn is_elected_master(&self) -> bool {
        self.master.get()
    }
}

// =============================================================================
// Tracking
// =============================================================================

/// Tracking with a settable map origin and viewer position
#[derive(Debug)]
pub struct MemoryTracking {
    running: Cell<bool>,
    origin: Cell<Pose>,
    viewer: Cell<Option<Vec3>>,
    origin_reads: Cell<usize>,
}

impl Default for MemoryTracking {
    fn default() -> Self {
        Self::new(Pose::IDENTITY)
    }
}

impl MemoryTracking {
    pub fn new(origin: Pose) -> Self {
        Self {
            running: Cell::new(true),
            origin: Cell::new(origin),
            viewer: Cell::new(Some(Vec3::new(0.0, 1.6, 0.0))),
            origin_reads: Cell::new(0),
        }
    }

    pub fn set_running(&self, running: bool) {
        self.running.set(running);
    }

    pub fn set_origin(&self, origin: Pose) {
        self.origin.set(origin);
    }

    pub fn set_viewer(&self, viewer: Option<Vec3>) {
        self.viewer.set(viewer);
    }

    pub fn origin_reads(&self) -> usize {
        self.origin_reads.get()
    }
}

impl Tracking for MemoryTracking {
    fn is_running(&self) -> bool {
        self.running.get()
    }

    fn reference_origin(&self) -> Pose {
        self.origin_reads.set(self.origin_reads.get() + 1);
        self.origin.get()
    }

    fn viewer_position(&self) -> Option<Vec3> {
        self.viewer.get()
    }
}

// =============================================================================
// Sensing
// =============================================================================

/// Mesh reconstruction recorder
#[derive(Debug)]
pub struct MemorySensing {
    ready: Cell<bool>,
    enabled: Cell<bool>,
    density: Cell<f32>,
    bounds: Cell<Option<(Vec3, Quat, Vec3)>>,
    invalidations: Cell<usize>,
    destroyed: Cell<usize>,
    enable_calls: Cell<usize>,
}

impl Default for MemorySensing {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MemorySensing {
    /// Start enabled, as a misconfigured scene would, so forced-off is visible.
    pub fn new(ready: bool) -> Self {
        Self {
            ready: Cell::new(ready),
            enabled: Cell::new(true),
            density: Cell::new(0.0),
            bounds: Cell::new(None),
            invalidations: Cell::new(0),
            destroyed: Cell::new(0),
            enable_calls: Cell::new(0),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn density(&self) -> f32 {
        self.density.get()
    }

    pub fn bounds(&self) -> Option<(Vec3, Quat, Vec3)> {
        self.bounds.get()
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.get()
    }

    /// Number of `destroy_all_artifacts` calls.
    pub fn destroyed(&self) -> usize {
        self.destroyed.get()
    }

    /// Number of `set_enabled(true)` calls.
    pub fn enable_calls(&self) -> usize {
        self.enable_calls.get()
    }
}

impl SensingSubsystem for MemorySensing {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable_calls.set(self.enable_calls.get() + 1);
        }
        self.enabled.set(enabled);
    }

    fn set_density(&self, density: f32) {
        self.density.set(density);
    }

    fn set_bounds(&self, center: Vec3, rotation: Quat, scale: Vec3) {
        self.bounds.set(Some((center, rotation, scale)));
    }

    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }

    fn destroy_all_artifacts(&self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

// =============================================================================
// Planes
// =============================================================================

/// Plane detection recorder
#[derive(Debug)]
pub struct MemoryPlanes {
    enabled: Cell<bool>,
    mode: Cell<Option<PlaneDetectionMode>>,
    trackables_active: Cell<bool>,
}

impl Default for MemoryPlanes {
    fn default() -> Self {
        Self {
            enabled: Cell::new(true),
            mode: Cell::new(None),
            trackables_active: Cell::new(true),
        }
    }
}

impl MemoryPlanes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn mode(&self) -> Option<PlaneDetectionMode> {
        self.mode.get()
    }

    pub fn trackables_active(&self) -> bool {
        self.trackables_active.get()
    }
}

impl PlaneSubsystem for MemoryPlanes {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn set_detection_mode(&self, mode: PlaneDetectionMode) {
        self.mode.set(Some(mode));
    }

    fn set_trackables_active(&self, active: bool) {
        self.trackables_active.set(active);
    }
}

// =============================================================================
// Permissions
// =============================================================================

/// How the fake dialog answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    /// Hold requests until `answer_pending`
    Manual,
    /// Answer every request immediately with this outcome
    Auto(PermissionOutcome),
}

/// Permission dialog with scripted answers
#[derive(Debug)]
pub struct MemoryPermissions {
    mode: Cell<PermissionMode>,
    pending: RefCell<Vec<oneshot::Sender<PermissionOutcome>>>,
    requests: Cell<usize>,
}

impl Default for MemoryPermissions {
    fn default() -> Self {
        Self::new(PermissionMode::Auto(PermissionOutcome::Granted))
    }
}

impl MemoryPermissions {
    pub fn new(mode: PermissionMode) -> Self {
        Self {
            mode: Cell::new(mode),
            pending: RefCell::new(Vec::new()),
            requests: Cell::new(0),
        }
    }

    pub fn set_mode(&self, mode: PermissionMode) {
        self.mode.set(mode);
    }

    /// Total requests received.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer every held request. Returns how many were delivered.
    pub fn answer_pending(&self, outcome: PermissionOutcome) -> usize {
        self.pending
            .borrow_mut()
            .drain(..)
            .filter_map(|reply| reply.send(outcome).ok())
            .count()
    }

    /// Drop every held request without answering.
    pub fn drop_pending(&self) -> usize {
        self.pending.borrow_mut().drain(..).count()
    }
}

impl PermissionService for MemoryPermissions {
    fn request(&self, _kind: PermissionKind, reply: oneshot::Sender<PermissionOutcome>) {
        self.requests.set(self.requests.get() + 1);
        match self.mode.get() {
            PermissionMode::Manual => self.pending.borrow_mut().push(reply),
            PermissionMode::Auto(outcome) => {
                // Receiver may already be gone; nothing to report then
                let _ = reply.send(outcome);
            }
        }
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// Records every feedback message
#[derive(Debug, Default)]
pub struct MemoryFeedback {
    shown: RefCell<Vec<(String, Duration)>>,
}

impl MemoryFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(String, Duration)> {
        self.shown.borrow().clone()
    }
}

impl FeedbackSink for MemoryFeedback {
    fn show(&self, message: &str, duration: Duration) {
        self.shown.borrow_mut().push((message.to_string(), duration));
    }
}
