//! Authority Subsystem
//!
//! Exactly one participant per session is the authority (Host):
//! - Only the Host senses the environment
//! - Only the Host writes the shared anchor pose
//! - Followers consume replicated state, never produce it
//!
//! Authority is derived on demand from the session's live flags.
//! It is never persisted. Absence of a session is a normal outcome and
//! resolves to the configured fallback.

mod config;
mod resolver;
mod role;

pub use config::AuthorityConfig;
pub use resolver::{AuthorityResolver, ResolvePoll};
pub use role::{derive_authority, Authority};
