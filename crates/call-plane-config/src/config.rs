// crates/call-plane-config/src/config.rs
// ============================================================================
// Module: Call Plane Configuration
// Description: Configuration loading and validation for the call service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: call-plane-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Missing or invalid configuration fails closed: the service is
//! never built from a file that did not validate in full.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use call_plane_core::CallAuditSink;
use call_plane_core::CallFileAuditSink;
use call_plane_core::CallNoopAuditSink;
use call_plane_core::CallStderrAuditSink;
use call_plane_core::ExecutionMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "call-plane.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "CALL_PLANE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of worker threads for pooled execution.
pub const MAX_SERVICE_WORKERS: usize = 256;
/// Maximum allowed per-batch operation limit.
pub const MAX_REQUESTS_PER_CALL_LIMIT: usize = 65_536;
/// Default worker count for pooled execution.
pub(crate) const DEFAULT_SERVICE_WORKERS: usize = 4;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Call Plane service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallPlaneConfig {
    /// Call service scheduling and limits.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Audit routing configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl CallPlaneConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path argument wins over the `CALL_PLANE_CONFIG` environment
    /// variable, which wins over the default filename in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.service.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Scheduling strategy label for batch evaluation.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionKind {
    /// Evaluate batch entries one after another.
    Sequential,
    /// Fan batch entries out across a bounded worker pool.
    Pooled,
}

/// Call service scheduling and limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Scheduling strategy for batch evaluation.
    #[serde(default = "default_execution")]
    pub execution: ExecutionKind,
    /// Worker thread bound for pooled execution.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-batch operation limit (0 = unbounded).
    #[serde(default)]
    pub max_requests_per_call: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            execution: default_execution(),
            workers: default_workers(),
            max_requests_per_call: 0,
        }
    }
}

impl ServiceConfig {
    /// Validates scheduling and limit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid(
                "service.workers must be greater than zero".to_string(),
            ));
        }
        if self.workers > MAX_SERVICE_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "service.workers exceeds limit ({MAX_SERVICE_WORKERS})"
            )));
        }
        if self.max_requests_per_call > MAX_REQUESTS_PER_CALL_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "service.max_requests_per_call exceeds limit ({MAX_REQUESTS_PER_CALL_LIMIT})"
            )));
        }
        Ok(())
    }

    /// Maps the validated configuration onto a service execution mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the worker bound is invalid.
    pub fn execution_mode(&self) -> Result<ExecutionMode, ConfigError> {
        match self.execution {
            ExecutionKind::Sequential => Ok(ExecutionMode::Sequential),
            ExecutionKind::Pooled => {
                let workers = NonZeroUsize::new(self.workers).ok_or_else(|| {
                    ConfigError::Invalid(
                        "service.workers must be greater than zero".to_string(),
                    )
                })?;
                Ok(ExecutionMode::Pooled {
                    workers,
                })
            }
        }
    }
}

/// Audit sink selection label.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Discard audit events.
    Off,
    /// Emit JSON lines to stderr.
    Stderr,
    /// Append JSON lines to a file.
    File,
}

/// Audit routing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Audit sink selection.
    #[serde(default = "default_audit_mode")]
    pub mode: AuditMode,
    /// Audit log path, required for file mode.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            mode: default_audit_mode(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit routing settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            AuditMode::Off | AuditMode::Stderr => Ok(()),
            AuditMode::File => {
                let Some(path) = &self.path else {
                    return Err(ConfigError::Invalid(
                        "audit.path must be set for file mode".to_string(),
                    ));
                };
                validate_path(path)
            }
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails or the audit log file
    /// cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn CallAuditSink>, ConfigError> {
        self.validate()?;
        match self.mode {
            AuditMode::Off => Ok(Arc::new(CallNoopAuditSink)),
            AuditMode::Stderr => Ok(Arc::new(CallStderrAuditSink)),
            AuditMode::File => {
                let Some(path) = &self.path else {
                    return Err(ConfigError::Invalid(
                        "audit.path must be set for file mode".to_string(),
                    ));
                };
                let sink = CallFileAuditSink::new(path)
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default scheduling strategy.
const fn default_execution() -> ExecutionKind {
    ExecutionKind::Sequential
}

/// Default worker bound for pooled execution.
const fn default_workers() -> usize {
    DEFAULT_SERVICE_WORKERS
}

/// Default audit sink selection.
const fn default_audit_mode() -> AuditMode {
    AuditMode::Off
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}
