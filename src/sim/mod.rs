//! In-memory collaborators
//!
//! Deterministic stand-ins for every external collaborator, used by the
//! test suite and by the `simulate` CLI command. They record what the
//! coordination core asked of them so callers can assert on it.

mod devices;
mod ground;
mod scene;
mod world;

pub use devices::{
    MemoryFeedback, MemoryPermissions, MemoryPlanes, MemorySensing, MemorySession,
    MemoryTracking, PermissionMode,
};
pub use ground::{GroundSurface, MemoryGround};
pub use scene::MemoryScene;
pub use world::{SimRole, SimWorld, SimWorldBuilder};
