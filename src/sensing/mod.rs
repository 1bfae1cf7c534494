//! Sensing Lifecycle Subsystem
//!
//! Environment sensing (mesh reconstruction + horizontal plane detection)
//! is produced by the authority alone:
//! - Both subsystems are forced off at construction
//! - Start requires Host authority and an asynchronous permission grant
//! - Stop is always allowed and may destroy or hide produced artifacts
//! - Resume re-checks authority at call time
//! - A Follower evaluation forces everything off within the same tick

mod config;
mod controller;
mod state;

pub use config::SensingConfig;
pub use controller::{BootstrapPhase, SensingBounds, SensingLifecycleController};
pub use state::SensingState;
