//! Floor Snap Coordinator
//!
//! Drives one snap run at a time through the phases in `state`. Runs are
//! identified by a fresh `Uuid` and cancelled by the next trigger.

use super::config::SnapConfig;
use super::memory::SnapMemory;
use super::raycast::{raycast_target_height, snap_duration};
use super::state::{CancelToken, SnapOutcome, SnapPhase};
use crate::collaborators::{
    Collaborators, FeedbackSink, FrameNodes, GroundQuery, NodeId, SceneGraph, Tracking,
};
use crate::errors::FrameError;
use crate::geometry::{delta_angle, lerp, smoothstep, Pose, Vec3};
use crate::observability::{fmt_f32, log_event, Event};
use crate::sensing::SensingLifecycleController;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use uuid::Uuid;

struct SnapRun {
    id: Uuid,
    phase: SnapPhase,
    cancel: CancelToken,
    /// Sensing was resumed by this run and is stopped again on success
    resumed_sensing: bool,
}

enum Step {
    /// Phase finished, run the next one in the same tick
    Continue,
    /// Phase is waiting, resume on a later tick
    Yield,
    /// Run ended
    Done(SnapOutcome),
}

/// Floor Snap Coordinator
pub struct FloorSnapCoordinator {
    config: SnapConfig,
    scene: Rc<dyn SceneGraph>,
    tracking: Option<Rc<dyn Tracking>>,
    ground: Rc<dyn GroundQuery>,
    feedback: Option<Rc<dyn FeedbackSink>>,
    sensing: Option<Rc<RefCell<SensingLifecycleController>>>,

    target: Option<NodeId>,
    reference: Option<NodeId>,
    grounding_point: Option<NodeId>,

    memory: SnapMemory,
    run: Option<SnapRun>,
}

impl FloorSnapCoordinator {
    pub fn new(config: SnapConfig, collaborators: &Collaborators, nodes: &FrameNodes) -> Self {
        Self {
            config,
            scene: collaborators.scene.clone(),
            tracking: collaborators.tracking.clone(),
            ground: collaborators.ground.clone(),
            feedback: collaborators.feedback.clone(),
            sensing: None,
            target: nodes.snap_target,
            reference: nodes.reference,
            grounding_point: nodes.grounding_point,
            memory: SnapMemory::default(),
            run: None,
        }
    }

    /// Attach the sensing controller resumed and stopped around each run.
    pub fn with_sensing(mut self, sensing: Rc<RefCell<SensingLifecycleController>>) -> Self {
        self.sensing = Some(sensing);
        self
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn memory(&self) -> &SnapMemory {
        &self.memory
    }

    pub fn phase(&self) -> SnapPhase {
        self.run.as_ref().map_or(SnapPhase::Idle, |run| run.phase)
    }

    /// Id of the run in flight.
    pub fn current_run(&self) -> Option<Uuid> {
        self.run.as_ref().map(|run| run.id)
    }

    /// Token that cancels the run in flight.
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.run.as_ref().map(|run| run.cancel.clone())
    }

    /// Start a new run after `delay`, cancelling the run in flight.
    ///
    /// Returns the id of the cancelled run, if any.
    pub fn trigger(&mut self, now: Duration, delay: Duration) -> Option<Uuid> {
        let cancelled = self.cancel();
        let id = Uuid::new_v4();
        self.run = Some(SnapRun {
            id,
            phase: SnapPhase::Debouncing { until: now.saturating_add(delay) },
            cancel: CancelToken::new(),
            resumed_sensing: false,
        });

        let id_str = id.to_string();
        let delay_ms = delay.as_millis().to_string();
        let cancelled_str = cancelled.map(|c| c.to_string());
        let mut fields = vec![("run_id", id_str.as_str()), ("delay_ms", delay_ms.as_str())];
        if let Some(c) = &cancelled_str {
            fields.push(("cancelled", c.as_str()));
        }
        log_event(Event::SnapTriggered, &fields);
        cancelled
    }

    /// Cancel the run in flight. Returns its id.
    pub fn cancel(&mut self) -> Option<Uuid> {
        let run = self.run.take()?;
        run.cancel.cancel();
        log_event(
            Event::SnapCancelled,
            &[
                ("run_id", &run.id.to_string()),
                ("phase", run.phase.state_name()),
            ],
        );
        Some(run.id)
    }

    /// Advance the run in flight.
    pub fn tick(&mut self, now: Duration) -> Option<SnapOutcome> {
        let mut run = self.run.take()?;
        if run.cancel.is_cancelled() {
            log_event(
                Event::SnapCancelled,
                &[
                    ("run_id", &run.id.to_string()),
                    ("phase", run.phase.state_name()),
                ],
            );
            return None;
        }

        loop {
            match self.step(&mut run, now) {
                Step::Continue => continue,
                Step::Yield => {
                    self.run = Some(run);
                    return None;
                }
                Step::Done(outcome) => return Some(outcome),
            }
        }
    }

    // =========================================================================
    // PHASES
    // =========================================================================

    fn step(&mut self, run: &mut SnapRun, now: Duration) -> Step {
        match run.phase {
            SnapPhase::Idle => Step::Yield,

            SnapPhase::Debouncing { until } => {
                if now < until {
                    return Step::Yield;
                }
                if self.target_node().is_none() {
                    return self.abort(run, FrameError::missing_collaborator("snap target absent"));
                }
                run.phase = if self.tracking_running() && self.reference_node().is_some() {
                    SnapPhase::Converging {
                        deadline: now.saturating_add(self.config.converge_timeout()),
                    }
                } else {
                    SnapPhase::Normalizing
                };
                Step::Continue
            }

            SnapPhase::Converging { deadline } => {
                if now >= deadline {
                    log_event(Event::SnapConvergeTimeout, &[("run_id", &run.id.to_string())]);
                    run.phase = SnapPhase::Normalizing;
                    return Step::Continue;
                }
                if self.converge_reference() {
                    log_event(Event::SnapConverged, &[("run_id", &run.id.to_string())]);
                    run.phase = SnapPhase::Normalizing;
                    return Step::Continue;
                }
                Step::Yield
            }

            SnapPhase::Normalizing => {
                if let Some(target) = self.target_node() {
                    self.normalize(target);
                }
                run.phase = if self.config.stop_sensing_after_snap && self.sensing.is_some() {
                    SnapPhase::ResumeSensing
                } else {
                    self.awaiting_ground(now)
                };
                Step::Continue
            }

            SnapPhase::ResumeSensing => {
                if let Some(sensing) = &self.sensing {
                    run.resumed_sensing = sensing.borrow_mut().resume();
                }
                run.phase = self.awaiting_ground(now);
                Step::Continue
            }

            SnapPhase::AwaitingGround { deadline } => {
                if self.ground_nearby() {
                    log_event(Event::SnapGroundDetected, &[("run_id", &run.id.to_string())]);
                    run.phase = SnapPhase::ComputingHeight;
                    return Step::Continue;
                }
                if now >= deadline {
                    log_event(Event::SnapGroundTimeout, &[("run_id", &run.id.to_string())]);
                    run.phase = SnapPhase::ComputingHeight;
                    return Step::Continue;
                }
                Step::Yield
            }

            SnapPhase::ComputingHeight => {
                let Some((target, pose)) = self.target_pose() else {
                    return self.abort(run, FrameError::missing_collaborator("snap target absent"));
                };
                let target_y = match self.replay_locked_height() {
                    Some(y) => {
                        log_event(
                            Event::SnapLockedReplay,
                            &[("run_id", &run.id.to_string()), ("target_y", &fmt_f32(y))],
                        );
                        y
                    }
                    None => match raycast_target_height(
                        self.ground.as_ref(),
                        self.scene.as_ref(),
                        target,
                        self.grounding_point,
                        &self.config,
                    ) {
                        Some(y) => y,
                        None => {
                            log_event(
                                Event::SnapRaycastMiss,
                                &[
                                    ("run_id", &run.id.to_string()),
                                    ("cast_height", &fmt_f32(self.config.cast_height)),
                                    (
                                        "sensing",
                                        if run.resumed_sensing { "continues" } else { "unchanged" },
                                    ),
                                ],
                            );
                            return self
                                .abort(run, FrameError::no_ground_hit("no ground below target"));
                        }
                    },
                };

                let start_y = pose.position.y;
                run.phase = SnapPhase::Animating {
                    start_y,
                    target_y,
                    started: now,
                    duration: snap_duration(start_y, target_y, self.config.snap_speed),
                };
                Step::Continue
            }

            SnapPhase::Animating {
                start_y,
                target_y,
                started,
                duration,
            } => {
                let t = now.saturating_sub(started).as_secs_f32()
                    / duration.as_secs_f32().max(0.0001);
                if t >= 1.0 {
                    self.set_target_height(target_y);
                    run.phase = SnapPhase::Finalizing { target_y };
                    return Step::Continue;
                }
                self.set_target_height(lerp(start_y, target_y, smoothstep(0.0, 1.0, t)));
                Step::Yield
            }

            SnapPhase::Finalizing { target_y } => {
                self.finalize(run);
                log_event(
                    Event::SnapCompleted,
                    &[("run_id", &run.id.to_string()), ("target_y", &fmt_f32(target_y))],
                );
                Step::Done(SnapOutcome::Completed {
                    run_id: run.id,
                    target_height: target_y,
                })
            }
        }
    }

    fn awaiting_ground(&self, now: Duration) -> SnapPhase {
        SnapPhase::AwaitingGround {
            deadline: now.saturating_add(self.config.ground_wait_timeout()),
        }
    }

    fn abort(&self, run: &SnapRun, error: FrameError) -> Step {
        log_event(
            Event::SnapAborted,
            &[
                ("run_id", &run.id.to_string()),
                ("reason", error.kind.as_str()),
            ],
        );
        Step::Done(SnapOutcome::Aborted {
            run_id: run.id,
            error,
        })
    }

    // =========================================================================
    // CONVERGENCE
    // =========================================================================

    /// True when the reference already matches the tracking origin;
    /// otherwise copy the origin into the reference for the next check.
    fn converge_reference(&self) -> bool {
        let (Some(tracking), Some(reference)) = (&self.tracking, self.reference_node()) else {
            return true;
        };
        // A stopped tracker has no usable origin
        if !tracking.is_running() {
            return true;
        }
        let origin = tracking.reference_origin();
        let Some(current) = self.scene.world_pose(reference) else {
            return true;
        };

        let position_delta = current.position.distance(origin.position);
        let yaw_delta = delta_angle(current.yaw_degrees(), origin.yaw_degrees()).abs();
        if position_delta < self.config.converge_position_epsilon
            && yaw_delta < self.config.converge_yaw_epsilon_deg
        {
            return true;
        }
        self.scene.set_world_pose(reference, origin);
        false
    }

    // =========================================================================
    // NORMALIZATION
    // =========================================================================

    fn normalize(&self, target: NodeId) {
        let Some(reference) = self.reference_node() else {
            return;
        };

        if self.config.restore_initial_local_pose_after_first_snap {
            if let Some(initial) = self.memory.initial_local_pose {
                self.scene.set_parent(target, Some(reference), false);
                self.scene.set_local_pose(target, initial);
                log_event(Event::SnapNormalized, &[("mode", "restore")]);
                return;
            }
        }

        if self.config.reset_to_reference_xz_each_localization {
            if let (Some(reference_pose), Some(mut pose)) =
                (self.scene.world_pose(reference), self.scene.world_pose(target))
            {
                pose.position.x = reference_pose.position.x;
                pose.position.z = reference_pose.position.z;
                if self.config.align_yaw_to_reference {
                    pose.rotation = pose.rotation.with_yaw(reference_pose.yaw_degrees());
                }
                self.scene.set_world_pose(target, pose);
            }
        }

        self.scene.set_parent(target, Some(reference), true);
        log_event(Event::SnapNormalized, &[("mode", "reset")]);
    }

    // =========================================================================
    // GROUND
    // =========================================================================

    fn ground_nearby(&self) -> bool {
        let Some((_, pose)) = self.target_pose() else {
            return false;
        };
        self.ground
            .overlap_sphere(
                pose.position,
                self.config.ground_search_radius,
                self.config.ground_mask,
            )
            .iter()
            .any(|c| c.is_ground_capable())
    }

    fn replay_locked_height(&self) -> Option<f32> {
        if !self.config.lock_local_height_after_first_snap {
            return None;
        }
        let locked = self.memory.locked_local_height?;
        let reference = self.scene.world_pose(self.reference_node()?)?;
        Some(reference.transform_point(Vec3::new(0.0, locked, 0.0)).y)
    }

    fn set_target_height(&self, y: f32) {
        if let Some((target, pose)) = self.target_pose() {
            let mut pose = pose;
            pose.position.y = y;
            self.scene.set_world_pose(target, pose);
        }
    }

    // =========================================================================
    // FINALIZATION
    // =========================================================================

    fn finalize(&mut self, run: &SnapRun) {
        if let (Some(target), Some(reference)) = (self.target_node(), self.reference_node()) {
            self.scene.set_parent(target, Some(reference), true);
            if let Some(local) = self.scene.local_pose(target) {
                self.memory.remember_initial_pose(local);
                if self.config.lock_local_height_after_first_snap {
                    self.memory.lock_height(local.position.y);
                }
            }
        }

        if run.resumed_sensing {
            if let Some(sensing) = &self.sensing {
                sensing.borrow_mut().stop(
                    Some(self.config.destroy_meshes_on_stop),
                    Some(self.config.hide_planes_on_stop),
                );
            }
        }

        if let Some(feedback) = &self.feedback {
            if self.config.feedback_seconds > 0.0 {
                feedback.show(&self.config.grounded_message, self.config.feedback_duration());
                log_event(
                    Event::FeedbackShown,
                    &[("seconds", &fmt_f32(self.config.feedback_seconds))],
                );
            }
        }
    }

    // =========================================================================
    // NODES
    // =========================================================================

    fn target_node(&self) -> Option<NodeId> {
        self.target.filter(|n| self.scene.exists(*n))
    }

    fn reference_node(&self) -> Option<NodeId> {
        self.reference.filter(|n| self.scene.exists(*n))
    }

    fn tracking_running(&self) -> bool {
        self.tracking.as_ref().map_or(false, |t| t.is_running())
    }

    fn target_pose(&self) -> Option<(NodeId, Pose)> {
        let target = self.target_node()?;
        Some((target, self.scene.world_pose(target)?))
    }
}
