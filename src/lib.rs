//! anchorframe - Authority-gated shared spatial frame coordination
//!
//! One participant per session (the Host) senses the environment and sets
//! the shared anchor pose; every other participant follows. The crate
//! resolves authority, gates sensing on it, aligns and binds content to the
//! shared anchor, and snaps content onto the detected floor.

pub mod anchor;
pub mod authority;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod observability;
pub mod sensing;
pub mod session;
pub mod sim;
pub mod snap;

pub use errors::{FrameError, FrameErrorKind, FrameResult};
pub use session::{FrameSession, TickReport};
