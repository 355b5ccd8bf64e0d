//! Configuration for the pipeline core.
//!
//! Every field has a serde default, so an empty JSON object is a complete
//! configuration.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Status-code re-execution settings.
    #[serde(default)]
    pub reexecute: ReExecuteConfig,
    /// Exception audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Static resource detection.
    #[serde(default)]
    pub static_resources: StaticResourceConfig,
    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reexecute.validate()?;
        regex::RegexSet::new(&self.static_resources.patterns)?;
        Ok(())
    }

    /// Sets the re-execution section.
    #[must_use]
    pub fn with_reexecute(mut self, reexecute: ReExecuteConfig) -> Self {
        self.reexecute = reexecute;
        self
    }

    /// Sets the audit section.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }

    /// Sets the static resource section.
    #[must_use]
    pub fn with_static_resources(mut self, static_resources: StaticResourceConfig) -> Self {
        self.static_resources = static_resources;
        self
    }

    /// Sets the logging section.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// Status-code re-execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReExecuteConfig {
    /// Whether 404s are rerouted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Status codes that trigger a reroute.
    #[serde(default = "default_status_codes")]
    pub status_codes: Vec<u16>,
    /// Internal path the request is rerouted to.
    #[serde(default = "default_target_path")]
    pub target_path: String,
}

/// Status codes a reroute may be configured for.
pub const REEXECUTABLE_STATUS_RANGE: std::ops::RangeInclusive<u16> = 400..=599;

/// Parses a triggering status code, rejecting anything outside 400..=599.
pub fn reexecutable_status(code: u16) -> Result<http::StatusCode, ConfigError> {
    if !REEXECUTABLE_STATUS_RANGE.contains(&code) {
        return Err(ConfigError::StatusCode(code));
    }
    http::StatusCode::from_u16(code).map_err(|_| ConfigError::StatusCode(code))
}

fn default_true() -> bool {
    true
}

fn default_status_codes() -> Vec<u16> {
    vec![404]
}

fn default_target_path() -> String {
    "/page-not-found".to_string()
}

impl Default for ReExecuteConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            status_codes: default_status_codes(),
            target_path: default_target_path(),
        }
    }
}

impl ReExecuteConfig {
    /// Sets the reroute target.
    #[must_use]
    pub fn with_target_path(mut self, target_path: impl Into<String>) -> Self {
        self.target_path = target_path.into();
        self
    }

    /// Sets the triggering status codes.
    #[must_use]
    pub fn with_status_codes(mut self, status_codes: Vec<u16>) -> Self {
        self.status_codes = status_codes;
        self
    }

    /// Enables or disables rerouting.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_path.starts_with('/') {
            return Err(ConfigError::TargetPath(self.target_path.clone()));
        }
        for &code in &self.status_codes {
            reexecutable_status(code)?;
        }
        if self.enabled && self.status_codes.is_empty() {
            return Err(ConfigError::NoStatusCodes);
        }
        Ok(())
    }
}

/// Exception audit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether browser faults are written to the audit log.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Header carrying the authenticated user ID, if the host sets one.
    #[serde(default)]
    pub actor_header: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            actor_header: None,
        }
    }
}

impl AuditConfig {
    /// Sets the actor header.
    #[must_use]
    pub fn with_actor_header(mut self, header: impl Into<String>) -> Self {
        self.actor_header = Some(header.into());
        self
    }
}

/// Static resource detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticResourceConfig {
    /// Regular expressions matched against the request path.
    #[serde(default = "default_static_patterns")]
    pub patterns: Vec<String>,
}

fn default_static_patterns() -> Vec<String> {
    vec![
        r"(?i)\.(css|js|mjs|map|json|xml|txt|png|jpe?g|gif|svg|webp|avif|ico|bmp|woff2?|ttf|otf|eot|mp3|mp4|webm|wav|pdf|zip)$"
            .to_string(),
        r"^/(static|assets)/".to_string(),
    ]
}

impl Default for StaticResourceConfig {
    fn default() -> Self {
        Self {
            patterns: default_static_patterns(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new();
        assert!(config.reexecute.enabled);
        assert_eq!(config.reexecute.status_codes, vec![404]);
        assert_eq!(config.reexecute.target_path, "/page-not-found");
        assert!(config.audit.enabled);
        assert!(config.audit.actor_header.is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "reexecute": { "target_path": "/errors/missing" },
                "audit": { "actor_header": "x-user-id" },
                "logging": { "format": "json", "filter": "reqflow=debug" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.reexecute.target_path, "/errors/missing");
        assert_eq!(config.reexecute.status_codes, vec![404]);
        assert_eq!(config.audit.actor_header.as_deref(), Some("x-user-id"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "reqflow=debug");
    }

    #[test]
    fn test_rejects_relative_target() {
        let err = PipelineConfig::from_json_str(r#"{"reexecute": {"target_path": "oops"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::TargetPath(_)));
    }

    #[test]
    fn test_rejects_success_status() {
        let config = PipelineConfig::new()
            .with_reexecute(ReExecuteConfig::default().with_status_codes(vec![404, 200]));
        assert!(matches!(config.validate(), Err(ConfigError::StatusCode(200))));
    }

    #[test]
    fn test_rejects_empty_status_codes_when_enabled() {
        let enabled = ReExecuteConfig::default().with_status_codes(Vec::new());
        assert!(matches!(enabled.validate(), Err(ConfigError::NoStatusCodes)));

        let disabled = enabled.with_enabled(false);
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let err = PipelineConfig::from_json_str(r#"{"static_resources": {"patterns": ["("]}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Pattern(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"reexecute": {{"status_codes": [404, 410]}}}}"#).unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.reexecute.status_codes, vec![404, 410]);
    }

    #[test]
    fn test_from_missing_file() {
        let err = PipelineConfig::from_file("/nonexistent/reqflow.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
