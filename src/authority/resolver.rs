//! Authority Resolver
//!
//! Bounded wait for a running session, then on-demand re-evaluation:
//! - Polled once per scheduling tick
//! - A running session ends the wait immediately
//! - The wait never ends early without a session; on timeout the
//!   configured fallback applies
//! - After resolution, every `evaluate()` reads the session's live flags

use super::config::AuthorityConfig;
use super::role::{derive_authority, Authority};
use crate::collaborators::Session;
use crate::observability::{log_event, Event};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Result of one resolution poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePoll {
    /// Still waiting for a running session
    Pending,
    /// Resolution finished
    Resolved(Authority),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolvePhase {
    NotStarted,
    Waiting { since: Duration },
    Resolved,
}

/// Authority Resolver
///
/// Shared between the sensing controller, the anchor aligner and the
/// session; all methods take `&self`.
pub struct AuthorityResolver {
    session: Option<Rc<dyn Session>>,
    treat_no_session_as_host: bool,
    timeout: Duration,
    grace_window: Duration,
    phase: Cell<ResolvePhase>,
    last: Cell<Authority>,
}

impl AuthorityResolver {
    /// Create a resolver using the configured timeout and fallback.
    pub fn new(session: Option<Rc<dyn Session>>, config: &AuthorityConfig) -> Self {
        Self {
            session,
            treat_no_session_as_host: config.treat_no_session_as_host,
            timeout: config.resolve_timeout(),
            grace_window: config.role_grace_window(),
            phase: Cell::new(ResolvePhase::NotStarted),
            last: Cell::new(Authority::Unresolved),
        }
    }

    /// Override the resolution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// How long gating keeps following authority after first resolution.
    pub fn grace_window(&self) -> Duration {
        self.grace_window
    }

    /// Start the bounded wait at `now`. No-op once started.
    pub fn begin(&self, now: Duration) {
        if self.phase.get() == ResolvePhase::NotStarted {
            self.phase.set(ResolvePhase::Waiting { since: now });
            log_event(
                Event::AuthorityResolveBegin,
                &[("timeout_ms", &self.timeout.as_millis().to_string())],
            );
        }
    }

    /// Advance resolution by one tick.
    pub fn poll(&self, now: Duration) -> ResolvePoll {
        match self.phase.get() {
            ResolvePhase::NotStarted => {
                self.begin(now);
                self.poll(now)
            }
            ResolvePhase::Resolved => ResolvePoll::Resolved(self.evaluate()),
            ResolvePhase::Waiting { since } => {
                let elapsed = now.saturating_sub(since);
                if self.session_running() {
                    let authority = self.derive();
                    self.finish(authority);
                    log_event(
                        Event::AuthorityResolved,
                        &[
                            ("authority", authority.state_name()),
                            ("elapsed_ms", &elapsed.as_millis().to_string()),
                        ],
                    );
                    ResolvePoll::Resolved(authority)
                } else if elapsed >= self.timeout {
                    let authority = self.derive();
                    self.finish(authority);
                    log_event(
                        Event::AuthorityFallback,
                        &[
                            ("authority", authority.state_name()),
                            ("elapsed_ms", &elapsed.as_millis().to_string()),
                        ],
                    );
                    ResolvePoll::Resolved(authority)
                } else {
                    ResolvePoll::Pending
                }
            }
        }
    }

    /// Check if resolution has finished.
    pub fn is_resolved(&self) -> bool {
        self.phase.get() == ResolvePhase::Resolved
    }

    /// Recompute authority now.
    ///
    /// `Unresolved` until the wait has finished; afterwards the session's
    /// live flags decide, falling back when the session is gone.
    pub fn evaluate(&self) -> Authority {
        if !self.is_resolved() {
            return Authority::Unresolved;
        }
        let authority = self.derive();
        let previous = self.last.replace(authority);
        if previous != authority {
            log_event(
                Event::AuthorityChanged,
                &[
                    ("from", previous.state_name()),
                    ("to", authority.state_name()),
                ],
            );
        }
        authority
    }

    /// Authority from the most recent evaluation, without re-reading.
    pub fn last_known(&self) -> Authority {
        self.last.get()
    }

    fn finish(&self, authority: Authority) {
        self.phase.set(ResolvePhase::Resolved);
        self.last.set(authority);
    }

    fn session_running(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.is_running())
    }

    fn derive(&self) -> Authority {
        derive_authority(self.session.as_deref(), self.treat_no_session_as_host)
    }
}
