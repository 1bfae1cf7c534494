//! Session, tracking and localization boundaries

use crate::geometry::{Pose, Vec3};

/// Networked session as seen by this process
pub trait Session {
    fn is_running(&self) -> bool;

    /// This process hosts the session
    fn is_server(&self) -> bool;

    /// This process was elected master among equal peers
    fn is_elected_master(&self) -> bool;
}

/// Tracking subsystem
pub trait Tracking {
    fn is_running(&self) -> bool;

    /// Current origin of the localized map, subject to drift and correction
    fn reference_origin(&self) -> Pose;

    /// Tracked viewer (head) position, used to center sensing bounds
    fn viewer_position(&self) -> Option<Vec3>;
}

/// Localization map state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationState {
    NotLocalized,
    Localizing,
    Localized,
    Lost,
}

/// One localization transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizationEvent {
    pub state: LocalizationState,
}

impl LocalizationEvent {
    pub fn new(state: LocalizationState) -> Self {
        Self { state }
    }

    pub fn localized() -> Self {
        Self::new(LocalizationState::Localized)
    }

    pub fn is_localized(&self) -> bool {
        self.state == LocalizationState::Localized
    }
}
