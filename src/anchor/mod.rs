//! Shared Anchor Subsystem
//!
//! All participants express content relative to one replicated anchor:
//! - The Host writes its reference pose into the anchor on localization
//! - Every participant keeps its content root parented under the anchor
//! - Followers never write the anchor; they follow its replicated pose

mod aligner;
mod binder;
mod config;

pub use aligner::{AlignOutcome, AnchorAligner};
pub use binder::{BindOutcome, ContentBinder};
pub use config::BinderConfig;
