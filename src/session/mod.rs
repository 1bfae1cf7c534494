//! Frame Session
//!
//! Per-instance orchestrator. Owns the authority resolver, the sensing
//! controller, the anchor aligner, the content binder and the floor snap
//! coordinator, plus the optional localization subscription.
//!
//! Each `tick(now)`:
//! 1. Drains localization transitions
//! 2. Advances authority resolution (initial bind once resolved)
//! 3. Advances sensing bootstrap, gating and viewer follow
//! 4. Advances the snap run in flight

mod report;

pub use report::TickReport;

use crate::anchor::{AlignOutcome, AnchorAligner, BindOutcome, ContentBinder};
use crate::authority::{Authority, AuthorityResolver, ResolvePoll};
use crate::collaborators::{Collaborators, FrameNodes, LocalizationEvent};
use crate::config::FrameConfig;
use crate::observability::{log_event, Event};
use crate::sensing::{BootstrapPhase, SensingLifecycleController, SensingState};
use crate::snap::{FloorSnapCoordinator, SnapMemory, SnapPhase};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;

/// Frame Session
pub struct FrameSession {
    config: FrameConfig,
    authority: Rc<AuthorityResolver>,
    sensing: Rc<RefCell<SensingLifecycleController>>,
    aligner: AnchorAligner,
    binder: ContentBinder,
    snap: FloorSnapCoordinator,
    localization: Option<broadcast::Receiver<LocalizationEvent>>,
    initial_bind_done: bool,
    now: Duration,
}

impl FrameSession {
    /// Build every component and subscribe to localization if anything
    /// consumes it.
    pub fn new(config: FrameConfig, collaborators: Collaborators, nodes: FrameNodes) -> Self {
        let authority = Rc::new(AuthorityResolver::new(
            collaborators.session.clone(),
            &config.authority,
        ));
        let sensing = Rc::new(RefCell::new(SensingLifecycleController::new(
            config.sensing.clone(),
            authority.clone(),
            &collaborators,
            nodes.external_sensing_root,
        )));
        let aligner = AnchorAligner::new(
            authority.clone(),
            collaborators.scene.clone(),
            collaborators.tracking.clone(),
            nodes.anchor,
            nodes.reference,
        );
        let binder = ContentBinder::new(
            collaborators.scene.clone(),
            nodes.content_root,
            nodes.anchor,
        );
        let snap = FloorSnapCoordinator::new(config.snap.clone(), &collaborators, &nodes)
            .with_sensing(sensing.clone());

        let wants_localization =
            config.binder.auto_align_on_localized || config.snap.subscribe_to_localization;
        let localization = if wants_localization {
            collaborators.localization.as_ref().map(|tx| tx.subscribe())
        } else {
            None
        };

        log_event(
            Event::SessionStart,
            &[(
                "localization",
                if localization.is_some() { "subscribed" } else { "off" },
            )],
        );

        Self {
            config,
            authority,
            sensing,
            aligner,
            binder,
            snap,
            localization,
            initial_bind_done: false,
            now: Duration::ZERO,
        }
    }

    /// Advance every component by one scheduling tick.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        self.now = now;
        let localized_events = self.drain_localization(now);

        if let ResolvePoll::Resolved(_) = self.authority.poll(now) {
            if !self.initial_bind_done {
                self.initial_bind_done = true;
                self.binder.bind();
            }
        }

        self.sensing.borrow_mut().tick(now);
        let snap_outcome = self.snap.tick(now);

        TickReport {
            now,
            authority: self.authority.last_known(),
            sensing: self.sensing_state(),
            bootstrap: self.bootstrap_phase(),
            snap_phase: self.snap.phase(),
            localized_events,
            snap_outcome,
        }
    }

    // =========================================================================
    // EXTERNAL SIGNALS
    // =========================================================================

    /// Start a snap run now, cancelling the one in flight.
    pub fn trigger_snap(&mut self) -> Option<Uuid> {
        self.snap.trigger(self.now, Duration::ZERO)
    }

    /// The reference transform was updated by external code.
    ///
    /// Aligns the anchor (Host only), rebinds content and starts a snap run.
    pub fn notify_reference_pose_updated(&mut self) -> (AlignOutcome, BindOutcome) {
        let aligned = self.aligner.align();
        let bound = self.binder.bind();
        self.snap.trigger(self.now, Duration::ZERO);
        (aligned, bound)
    }

    pub fn stop_sensing(&mut self, destroy_meshes: Option<bool>, hide_planes: Option<bool>) {
        self.sensing.borrow_mut().stop(destroy_meshes, hide_planes);
    }

    pub fn resume_sensing(&mut self) -> bool {
        self.sensing.borrow_mut().resume()
    }

    /// Cancel the snap run in flight and release the localization subscription.
    pub fn shutdown(&mut self) {
        let cancelled = self.snap.cancel();
        self.localization = None;
        let run = cancelled.map(|id| id.to_string()).unwrap_or_default();
        log_event(Event::SessionShutdown, &[("cancelled_run", &run)]);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Current authority, re-evaluated from the session's live flags.
    pub fn authority(&self) -> Authority {
        self.authority.evaluate()
    }

    pub fn sensing_state(&self) -> SensingState {
        self.sensing.borrow().state()
    }

    pub fn bootstrap_phase(&self) -> BootstrapPhase {
        self.sensing.borrow().bootstrap_phase()
    }

    pub fn snap_memory(&self) -> SnapMemory {
        *self.snap.memory()
    }

    pub fn snap_phase(&self) -> SnapPhase {
        self.snap.phase()
    }

    pub fn is_subscribed(&self) -> bool {
        self.localization.is_some()
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    // =========================================================================
    // LOCALIZATION
    // =========================================================================

    fn drain_localization(&mut self, now: Duration) -> usize {
        let mut localized = 0;
        loop {
            let Some(receiver) = self.localization.as_mut() else {
                break;
            };
            match receiver.try_recv() {
                Ok(event) => {
                    log_event(
                        Event::LocalizationReceived,
                        &[("state", &format!("{:?}", event.state))],
                    );
                    if event.is_localized() {
                        localized += 1;
                        self.on_localized(now);
                    }
                }
                Err(TryRecvError::Empty) => break,
                // Missed transitions may have included a localization
                Err(TryRecvError::Lagged(missed)) => {
                    log_event(
                        Event::LocalizationReceived,
                        &[("lagged", &missed.to_string())],
                    );
                    localized += 1;
                    self.on_localized(now);
                }
                Err(TryRecvError::Closed) => {
                    self.localization = None;
                    break;
                }
            }
        }
        localized
    }

    fn on_localized(&mut self, now: Duration) {
        if self.config.binder.auto_align_on_localized {
            self.aligner.align();
            self.binder.bind();
        }
        if self.config.snap.subscribe_to_localization {
            self.snap.trigger(now, self.config.snap.localization_debounce());
        }
    }
}
