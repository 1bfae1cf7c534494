//! Frame Configuration
//!
//! One JSON document configures a whole session:
//! - Every section and field is optional and defaults to production values
//! - Durations are seconds as floats
//! - `validate()` rejects values the coordination core cannot act on

mod errors;

pub use errors::{ConfigError, ConfigResult};

use crate::anchor::BinderConfig;
use crate::authority::AuthorityConfig;
use crate::observability::Severity;
use crate::sensing::SensingConfig;
use crate::snap::SnapConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest wait any setting may ask for, seconds
pub const MAX_WAIT_SECS: f32 = 86_400.0;

/// Seconds to `Duration`, clamped to `[0, MAX_WAIT_SECS]`. NaN maps to zero.
pub fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(secs.clamp(0.0, MAX_WAIT_SECS))
}

/// Complete session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub authority: AuthorityConfig,
    pub sensing: SensingConfig,
    pub binder: BinderConfig,
    pub snap: SnapConfig,
    /// Minimum log severity name (`trace`, `info`, `warn`, `error`)
    pub log_level: Option<String>,
}

impl FrameConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: FrameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parsed minimum log severity, if configured.
    pub fn min_severity(&self) -> Option<Severity> {
        self.log_level.as_deref().and_then(Severity::parse)
    }

    /// Validate all sections.
    pub fn validate(&self) -> ConfigResult<()> {
        let authority = &self.authority;
        wait("authority.resolve_timeout_secs", authority.resolve_timeout_secs)?;
        wait("authority.role_grace_window_secs", authority.role_grace_window_secs)?;

        let sensing = &self.sensing;
        positive("sensing.bounds_size_xz", sensing.bounds_size_xz)?;
        positive("sensing.bounds_height", sensing.bounds_height)?;
        if !(0.05..=1.0).contains(&sensing.density) {
            return Err(ConfigError::Invalid(format!(
                "sensing.density must be within [0.05, 1], got {}",
                sensing.density
            )));
        }
        wait(
            "sensing.subsystem_wait_timeout_secs",
            sensing.subsystem_wait_timeout_secs,
        )?;

        let snap = &self.snap;
        positive("snap.cast_height", snap.cast_height)?;
        non_negative("snap.padding", snap.padding)?;
        positive("snap.snap_speed", snap.snap_speed)?;
        positive("snap.ground_search_radius", snap.ground_search_radius)?;
        positive("snap.converge_position_epsilon", snap.converge_position_epsilon)?;
        positive("snap.converge_yaw_epsilon_deg", snap.converge_yaw_epsilon_deg)?;
        wait("snap.converge_timeout_secs", snap.converge_timeout_secs)?;
        wait("snap.ground_wait_timeout_secs", snap.ground_wait_timeout_secs)?;
        wait("snap.localization_debounce_secs", snap.localization_debounce_secs)?;
        wait("snap.feedback_seconds", snap.feedback_seconds)?;

        if let Some(level) = &self.log_level {
            if Severity::parse(level).is_none() {
                return Err(ConfigError::Invalid(format!("unknown log_level '{}'", level)));
            }
        }
        Ok(())
    }
}

fn positive(field: &str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be positive, got {}", field, value)))
    }
}

fn non_negative(field: &str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must not be negative, got {}", field, value)))
    }
}

fn wait(field: &str, value: f32) -> ConfigResult<()> {
    non_negative(field, value)?;
    if value <= MAX_WAIT_SECS {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be at most {} seconds, got {}",
            field, MAX_WAIT_SECS, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FrameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FrameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, FrameConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = FrameConfig::from_json_str(
            r#"{
                "authority": { "treat_no_session_as_host": true },
                "snap": { "stop_sensing_after_snap": true, "padding": 0.01 },
                "log_level": "warn"
            }"#,
        )
        .unwrap();

        assert!(config.authority.treat_no_session_as_host);
        assert!(config.snap.stop_sensing_after_snap);
        assert_eq!(config.snap.padding, 0.01);
        assert_eq!(config.snap.cast_height, 2.0);
        assert_eq!(config.min_severity(), Some(Severity::Warn));
    }

    #[test]
    fn test_rejects_out_of_range_density() {
        let err = FrameConfig::from_json_str(r#"{"sensing": {"density": 0.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("sensing.density"));
    }

    #[test]
    fn test_rejects_non_positive_cast_height() {
        let err = FrameConfig::from_json_str(r#"{"snap": {"cast_height": -1.0}}"#).unwrap_err();
        assert!(err.to_string().contains("snap.cast_height"));
    }

    #[test]
    fn test_rejects_negative_timeout() {
        let err = FrameConfig::from_json_str(r#"{"authority": {"resolve_timeout_secs": -2}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("resolve_timeout_secs"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = FrameConfig::from_json_str(r#"{"log_level": "chatty"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = FrameConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_oversized_wait_rejected() {
        let err = FrameConfig::from_json_str(r#"{"snap": {"converge_timeout_secs": 1e20}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            FrameConfig::from_json_str(r#"{"authority": {"resolve_timeout_secs": 90000}}"#)
                .unwrap_err();
        assert!(err.to_string().contains("authority.resolve_timeout_secs"));

        assert!(FrameConfig::from_json_str(r#"{"snap": {"ground_wait_timeout_secs": 86400}}"#)
            .is_ok());
    }

    #[test]
    fn test_duration_conversion_never_panics() {
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f32::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(1e20), Duration::from_secs(86_400));
        assert_eq!(secs_to_duration(f32::INFINITY), Duration::from_secs(86_400));

        // Unvalidated configs still convert
        let mut snap = SnapConfig::default();
        snap.converge_timeout_secs = 1e20;
        assert_eq!(snap.converge_timeout(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"sensing": {{"density": 0.5}}}}"#).unwrap();

        let config = FrameConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sensing.density, 0.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FrameConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
