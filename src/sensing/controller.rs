//! Sensing Lifecycle Controller
//!
//! Startup sequence:
//! 1. Force both subsystems off (construction)
//! 2. Wait, bounded, for the sensing subsystem to report ready
//! 3. Wait for authority resolution
//! 4. Apply gating once, then re-apply every tick for the grace window
//!
//! Gating starts sensing on the Host (permission first) and forces
//! everything off otherwise. The follower guard runs on every tick after
//! resolution, independent of the grace window.

use super::config::SensingConfig;
use super::state::SensingState;
use crate::authority::{Authority, AuthorityResolver, ResolvePoll};
use crate::collaborators::{
    Collaborators, NodeId, PermissionKind, PermissionOutcome, PermissionService,
    PlaneDetectionMode, PlaneSubsystem, SceneGraph, SensingSubsystem, Tracking,
};
use crate::geometry::{Quat, Vec3};
use crate::observability::{fmt_f32, log_event, Event};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Reconstruction volume currently applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensingBounds {
    pub center: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Startup progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    /// Waiting for the sensing subsystem to report ready
    WaitingForSubsystem { since: Option<Duration> },
    /// Waiting for authority resolution
    WaitingForAuthority,
    /// Re-applying gating every tick until `until`
    Grace { until: Duration },
    /// Startup finished
    Settled,
    /// Sensing subsystem never became ready; nothing will be started
    Inert,
}

impl BootstrapPhase {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::WaitingForSubsystem { .. } => "waiting_for_subsystem",
            Self::WaitingForAuthority => "waiting_for_authority",
            Self::Grace { .. } => "grace",
            Self::Settled => "settled",
            Self::Inert => "inert",
        }
    }
}

/// Sensing Lifecycle Controller
pub struct SensingLifecycleController {
    config: SensingConfig,
    authority: Rc<AuthorityResolver>,
    sensing: Option<Rc<dyn SensingSubsystem>>,
    planes: Option<Rc<dyn PlaneSubsystem>>,
    permissions: Rc<dyn PermissionService>,
    tracking: Option<Rc<dyn Tracking>>,
    scene: Rc<dyn SceneGraph>,
    external_root: Option<NodeId>,
    grace_window: Duration,

    state: SensingState,
    bootstrap: BootstrapPhase,
    pending_permission: Option<oneshot::Receiver<PermissionOutcome>>,
    /// Gating already asked for a start; cleared by the follower guard
    start_attempted: bool,
    /// A permission grant has configured the subsystems at least once
    configured: bool,
    bounds: SensingBounds,
}

impl SensingLifecycleController {
    /// Create a controller and force every subsystem off.
    pub fn new(
        config: SensingConfig,
        authority: Rc<AuthorityResolver>,
        collaborators: &Collaborators,
        external_root: Option<NodeId>,
    ) -> Self {
        let scale = Vec3::new(config.bounds_size_xz, config.bounds_height, config.bounds_size_xz);
        let grace_window = authority.grace_window();
        let controller = Self {
            config,
            authority,
            sensing: collaborators.sensing.clone(),
            planes: collaborators.planes.clone(),
            permissions: collaborators.permissions.clone(),
            tracking: collaborators.tracking.clone(),
            scene: collaborators.scene.clone(),
            external_root,
            grace_window,
            state: SensingState::Stopped,
            bootstrap: BootstrapPhase::WaitingForSubsystem { since: None },
            pending_permission: None,
            start_attempted: false,
            configured: false,
            bounds: SensingBounds {
                center: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale,
            },
        };
        controller.disable_subsystems();
        log_event(Event::SensingForcedOff, &[("reason", "startup")]);
        controller
    }

    /// Override how long gating is re-applied after first resolution.
    pub fn with_grace_window(mut self, grace_window: Duration) -> Self {
        self.grace_window = grace_window;
        self
    }

    /// Get the current state.
    pub fn state(&self) -> SensingState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// A permission request is outstanding.
    pub fn is_permission_pending(&self) -> bool {
        self.pending_permission.is_some()
    }

    pub fn bootstrap_phase(&self) -> BootstrapPhase {
        self.bootstrap
    }

    pub fn bounds(&self) -> SensingBounds {
        self.bounds
    }

    pub fn config(&self) -> &SensingConfig {
        &self.config
    }

    /// Advance one scheduling tick.
    pub fn tick(&mut self, now: Duration) {
        self.poll_permission();
        self.advance_bootstrap(now);
        self.guard_follower();
        self.follow_viewer();
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    fn advance_bootstrap(&mut self, now: Duration) {
        if let BootstrapPhase::WaitingForSubsystem { since } = self.bootstrap {
            let since = since.unwrap_or(now);
            if self.sensing.as_ref().map_or(false, |s| s.is_ready()) {
                log_event(Event::SensingSubsystemReady, &[]);
                self.bootstrap = BootstrapPhase::WaitingForAuthority;
            } else if now.saturating_sub(since) >= self.config.subsystem_wait_timeout() {
                let reason = if self.sensing.is_some() {
                    "not_ready"
                } else {
                    "absent"
                };
                log_event(Event::SensingSubsystemMissing, &[("reason", reason)]);
                self.bootstrap = BootstrapPhase::Inert;
                return;
            } else {
                self.bootstrap = BootstrapPhase::WaitingForSubsystem { since: Some(since) };
                return;
            }
        }

        match self.bootstrap {
            BootstrapPhase::WaitingForAuthority => {
                if let ResolvePoll::Resolved(authority) = self.authority.poll(now) {
                    self.apply_gating(authority);
                    self.bootstrap = BootstrapPhase::Grace {
                        until: now.saturating_add(self.grace_window),
                    };
                }
            }
            BootstrapPhase::Grace { until } => {
                if now < until {
                    let authority = self.authority.evaluate();
                    self.apply_gating(authority);
                } else {
                    self.bootstrap = BootstrapPhase::Settled;
                }
            }
            _ => {}
        }
    }

    /// Start on the Host, force everything off otherwise.
    fn apply_gating(&mut self, authority: Authority) {
        if self.config.host_builds_sensing && authority.is_host() {
            if !self.start_attempted {
                self.start_attempted = true;
                self.start();
            }
        } else {
            self.force_stopped(if authority.is_host() {
                "host_sensing_disabled"
            } else {
                "not_authority"
            });
        }
    }

    fn guard_follower(&mut self) {
        if !self.authority.is_resolved() {
            return;
        }
        // Subsystems may still be enabled after a non-disabling stop
        if self.authority.evaluate().is_follower() {
            self.force_stopped("follower_guard");
        }
    }

    // =========================================================================
    // START
    // =========================================================================

    /// Request permission and start sensing.
    ///
    /// Host only. No-op while running or while a request is outstanding.
    /// Returns whether a permission request was issued.
    pub fn start(&mut self) -> bool {
        let authority = self.authority.evaluate();
        if !authority.is_host() {
            if authority.is_follower() {
                self.force_stopped("not_authority");
            }
            return false;
        }
        if self.state.is_running() || self.pending_permission.is_some() {
            return false;
        }

        let (reply, receiver) = oneshot::channel();
        self.pending_permission = Some(receiver);
        log_event(
            Event::PermissionRequested,
            &[("kind", PermissionKind::SpatialMapping.as_str())],
        );
        self.permissions.request(PermissionKind::SpatialMapping, reply);
        true
    }

    fn poll_permission(&mut self) {
        let Some(receiver) = self.pending_permission.as_mut() else {
            return;
        };
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            // Reply dropped without an answer
            Err(TryRecvError::Closed) => PermissionOutcome::Denied,
        };
        self.pending_permission = None;

        if !outcome.is_granted() {
            log_event(
                Event::PermissionDenied,
                &[
                    ("kind", PermissionKind::SpatialMapping.as_str()),
                    ("outcome", outcome.as_str()),
                ],
            );
            return;
        }

        log_event(Event::PermissionGranted, &[]);
        if !self.authority.evaluate().is_host() {
            self.force_stopped("authority_lost_before_grant");
            return;
        }
        self.configure_and_enable();
    }

    fn configure_and_enable(&mut self) {
        if let Some(center) = self.viewer_position() {
            self.bounds.center = center;
        }
        self.bounds.rotation = Quat::IDENTITY;

        if let Some(sensing) = &self.sensing {
            sensing.set_density(self.config.density);
            sensing.set_bounds(self.bounds.center, self.bounds.rotation, self.bounds.scale);
            sensing.set_enabled(true);
            sensing.invalidate();
        }
        if let Some(planes) = &self.planes {
            planes.set_detection_mode(PlaneDetectionMode::Horizontal);
            planes.set_enabled(true);
        }
        if let Some(root) = self.external_root {
            self.scene.set_active(root, true);
        }

        self.configured = true;
        self.state = SensingState::Running;
        log_event(
            Event::SensingStarted,
            &[
                ("center_x", &fmt_f32(self.bounds.center.x)),
                ("center_y", &fmt_f32(self.bounds.center.y)),
                ("center_z", &fmt_f32(self.bounds.center.z)),
                ("density", &fmt_f32(self.config.density)),
            ],
        );
    }

    // =========================================================================
    // STOP / RESUME
    // =========================================================================

    /// Stop sensing. Always allowed.
    ///
    /// `None` flags fall back to the configured stop policy.
    pub fn stop(&mut self, destroy_meshes: Option<bool>, hide_planes: Option<bool>) {
        let hide = hide_planes.unwrap_or(self.config.hide_planes_on_stop);
        let destroy = destroy_meshes.unwrap_or(self.config.destroy_meshes_on_stop);

        if let Some(planes) = &self.planes {
            if hide {
                planes.set_trackables_active(false);
            }
            if self.config.disable_plane_subsystem_on_stop {
                planes.set_enabled(false);
            }
        }
        if let Some(sensing) = &self.sensing {
            if self.config.disable_mesh_subsystem_on_stop {
                sensing.set_enabled(false);
            }
            if destroy {
                sensing.destroy_all_artifacts();
            }
        }

        self.state = SensingState::Stopped;
        log_event(
            Event::SensingStopped,
            &[
                ("destroy_meshes", if destroy { "true" } else { "false" }),
                ("hide_planes", if hide { "true" } else { "false" }),
            ],
        );
    }

    /// Re-enable both subsystems after a stop.
    ///
    /// Authority is re-evaluated now, never cached. Requires that a prior
    /// permission grant configured the subsystems. Returns whether sensing
    /// was resumed.
    pub fn resume(&mut self) -> bool {
        let authority = self.authority.evaluate();
        if !authority.is_host() {
            if authority.is_follower() {
                self.force_stopped("not_authority");
            }
            log_event(
                Event::SensingResumeRejected,
                &[("authority", authority.state_name())],
            );
            return false;
        }
        if !self.configured {
            log_event(
                Event::SensingResumeRejected,
                &[("reason", "never_configured")],
            );
            return false;
        }

        if let Some(sensing) = &self.sensing {
            sensing.set_enabled(true);
        }
        if let Some(planes) = &self.planes {
            planes.set_enabled(true);
        }
        if let Some(sensing) = &self.sensing {
            sensing.invalidate();
        }
        self.state = SensingState::Running;
        log_event(Event::SensingResumed, &[]);
        true
    }

    /// Stop (if active), then force both subsystems off and forget any
    /// outstanding permission request.
    fn force_stopped(&mut self, reason: &str) {
        let was_active = self.state.is_running() || self.pending_permission.is_some();
        self.pending_permission = None;
        self.start_attempted = false;
        if was_active {
            self.stop(None, None);
        }
        self.disable_subsystems();
        self.state = SensingState::Stopped;
        if was_active {
            log_event(Event::SensingForcedOff, &[("reason", reason)]);
        }
    }

    fn disable_subsystems(&self) {
        if let Some(planes) = &self.planes {
            planes.set_enabled(false);
        }
        if let Some(sensing) = &self.sensing {
            sensing.set_enabled(false);
        }
        if let Some(root) = self.external_root {
            self.scene.set_active(root, false);
        }
    }

    // =========================================================================
    // FOLLOW
    // =========================================================================

    fn follow_viewer(&mut self) {
        if !self.state.is_running() || !self.config.follow_viewer {
            return;
        }
        let Some(center) = self.viewer_position() else {
            return;
        };
        self.bounds.center = center;
        if let Some(sensing) = &self.sensing {
            sensing.set_bounds(center, self.bounds.rotation, self.bounds.scale);
        }
    }

    fn viewer_position(&self) -> Option<Vec3> {
        self.tracking.as_ref().and_then(|t| t.viewer_position())
    }
}
