//! Observability for anchorframe
//!
//! - Structured logging (JSON lines through `tracing`)
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on coordination decisions
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use anchorframe::observability::{log_event, Event, Logger};
//!
//! log_event(Event::SnapCompleted, &[("target_y", "0.005")]);
//! Logger::warn("CUSTOM_EVENT", &[]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.default_severity(), event.as_str(), fields);
}

/// Log a lifecycle event at an explicit severity
pub fn log_event_at(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}

/// Render a float field with fixed precision so log lines stay comparable.
pub fn fmt_f32(value: f32) -> String {
    format!("{:.4}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic without a subscriber
        log_event(Event::SessionStart, &[]);
        log_event(Event::SessionShutdown, &[("reason", "test")]);
    }

    #[test]
    fn test_float_fields_fixed_precision() {
        assert_eq!(fmt_f32(0.005), "0.0050");
        assert_eq!(fmt_f32(-1.0), "-1.0000");
    }
}
