//! Floor Snap Subsystem
//!
//! Lowers a content object onto the detected floor after localization:
//! - Waits for the reference transform to match the tracking origin
//! - Normalizes the object relative to the reference
//! - Waits for ground evidence, then ray casts (or replays a locked height)
//! - Animates, then remembers the result for later runs

mod config;
mod coordinator;
mod memory;
mod raycast;
mod state;

pub use config::{SnapConfig, DEFAULT_GROUNDED_MESSAGE};
pub use coordinator::FloorSnapCoordinator;
pub use memory::SnapMemory;
pub use raycast::{bottom_offset, raycast_target_height, select_ground_hit, snap_duration};
pub use state::{CancelToken, SnapOutcome, SnapPhase};
