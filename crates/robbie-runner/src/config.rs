//! Session configuration.
//!
//! Settings come from an optional TOML file; every key may be left out.
//! The launcher applies its flags on top before calling [`SessionConfig::validate`].
//!
//! ```toml
//! address = "10.0.0.7"
//! port = 1024
//! grid = "maze"
//! message_timeout_ms = 2000
//! rotation_modulus = 3
//! ```

use robbie_parser::DEFAULT_MAX_CALL_DEPTH;
use robbie_protocol::{AdapterConfig, ConnectOptions, DEFAULT_PORT};
use robbie_types::{ErrorCode, RobbieError, DIRECTION_COUNT, LEGACY_ROTATION_MODULUS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Highest `max_call_depth` a session accepts.
pub const MAX_CALL_DEPTH_LIMIT: u32 = 2000;

/// Stack reserved per nested `call` by [`SessionConfig::interpreter_stack_size`].
const STACK_PER_CALL: usize = 32 * 1024;

/// Stack reserved for everything besides nested calls.
const STACK_BASE: usize = 1024 * 1024;

/// Everything a run needs to know besides the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Host the agent listens on.
    pub address: String,
    pub port: u16,
    /// Ask the remote side to display protocol traffic.
    pub show_messages: bool,
    /// Grid to load before the script starts.
    pub grid: Option<String>,
    /// Deadline for each response.
    pub message_timeout_ms: u64,
    /// Give up connecting after this long; `None` keeps trying.
    pub connect_timeout_ms: Option<u64>,
    /// Pause between connection attempts.
    pub retry_interval_ms: u64,
    /// Nested `call`s allowed before the run is aborted.
    pub max_call_depth: u32,
    /// 4 for the usual rotation, 3 for the legacy one.
    pub rotation_modulus: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            show_messages: false,
            grid: None,
            message_timeout_ms: 5000,
            connect_timeout_ms: None,
            retry_interval_ms: 250,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            rotation_modulus: DIRECTION_COUNT,
        }
    }
}

impl SessionConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Reject settings no session could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: "must not be 0".to_string(),
            });
        }
        if self.message_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "message_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_call_depth == 0 || self.max_call_depth > MAX_CALL_DEPTH_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "max_call_depth",
                reason: format!(
                    "must be between 1 and {MAX_CALL_DEPTH_LIMIT}, not {}",
                    self.max_call_depth
                ),
            });
        }
        if self.rotation_modulus != DIRECTION_COUNT
            && self.rotation_modulus != LEGACY_ROTATION_MODULUS
        {
            return Err(ConfigError::InvalidValue {
                field: "rotation_modulus",
                reason: format!(
                    "must be {DIRECTION_COUNT} or {LEGACY_ROTATION_MODULUS}, not {}",
                    self.rotation_modulus
                ),
            });
        }
        Ok(())
    }

    /// Stack size for a thread that runs the interpreter with this
    /// `max_call_depth`, so the depth limit is reached before the stack is.
    pub fn interpreter_stack_size(&self) -> usize {
        STACK_BASE + STACK_PER_CALL * self.max_call_depth as usize
    }

    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            message_timeout: Duration::from_millis(self.message_timeout_ms),
            rotation_modulus: self.rotation_modulus,
        }
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            address: self.address.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<ConfigError> for RobbieError {
    fn from(err: ConfigError) -> Self {
        RobbieError::new(ErrorCode::INVALID_CONFIG, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robbie_types::ErrorCategory;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 1024);
        assert!(!config.show_messages);
        assert_eq!(config.grid, None);
        assert_eq!(config.message_timeout_ms, 5000);
        assert_eq!(config.connect_timeout_ms, None);
        assert_eq!(config.retry_interval_ms, 250);
        assert_eq!(config.max_call_depth, 200);
        assert_eq!(config.rotation_modulus, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = SessionConfig::from_toml_str(
            r#"
            port = 4000
            grid = "maze"
            connect_timeout_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.grid.as_deref(), Some("maze"));
        assert_eq!(config.connect_timeout_ms, Some(1500));
        assert_eq!(config.address, "127.0.0.1");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SessionConfig::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let bad = [
            SessionConfig { port: 0, ..Default::default() },
            SessionConfig { message_timeout_ms: 0, ..Default::default() },
            SessionConfig { max_call_depth: 0, ..Default::default() },
            SessionConfig { max_call_depth: MAX_CALL_DEPTH_LIMIT + 1, ..Default::default() },
            SessionConfig { rotation_modulus: 5, ..Default::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidValue { .. })),
                "{config:?}"
            );
        }
        let legacy = SessionConfig { rotation_modulus: 3, ..Default::default() };
        assert!(legacy.validate().is_ok());
        let deepest = SessionConfig { max_call_depth: MAX_CALL_DEPTH_LIMIT, ..Default::default() };
        assert!(deepest.validate().is_ok());
    }

    #[test]
    fn test_stack_size_grows_with_call_depth() {
        let shallow = SessionConfig { max_call_depth: 10, ..Default::default() };
        let deep = SessionConfig { max_call_depth: 1000, ..Default::default() };
        assert!(deep.interpreter_stack_size() > shallow.interpreter_stack_size());
        assert_eq!(
            deep.interpreter_stack_size() - shallow.interpreter_stack_size(),
            990 * STACK_PER_CALL
        );
    }

    #[test]
    fn test_derived_settings() {
        let config = SessionConfig {
            address: "10.1.1.1".into(),
            port: 9000,
            message_timeout_ms: 750,
            connect_timeout_ms: Some(40),
            retry_interval_ms: 10,
            rotation_modulus: 3,
            ..Default::default()
        };
        let adapter = config.adapter_config();
        assert_eq!(adapter.message_timeout, Duration::from_millis(750));
        assert_eq!(adapter.rotation_modulus, 3);
        let connect = config.connect_options();
        assert_eq!(connect.address, "10.1.1.1");
        assert_eq!(connect.port, 9000);
        assert_eq!(connect.connect_timeout, Some(Duration::from_millis(40)));
        assert_eq!(connect.retry_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_into_robbie_error() {
        let err: RobbieError = ConfigError::InvalidValue {
            field: "port",
            reason: "must not be 0".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::INVALID_CONFIG);
        assert_eq!(err.category, ErrorCategory::Config);
        assert_eq!(err.message, "invalid config value for port: must not be 0");
    }
}
