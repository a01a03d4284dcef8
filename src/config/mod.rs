//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Editing sessions (loaded from separate file)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::models::{
    ResourceNode, ResourcePermissionGrant, RolePermissionResponse, STANDARD_PERMISSION_CODES,
};
use crate::services::matrix_edit::MatrixEdit;
use crate::utils::error::{MatrixError, MatrixResult};
use crate::utils::validation::{ensure_permission_code, ensure_resource_key};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub matrix: MatrixConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix (default: "permission-matrix")
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to stderr
    #[default]
    Console,
    /// Log to file with optional rotation
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/permission-matrix")
}

fn default_log_prefix() -> String {
    "permission-matrix".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

/// Permission matrix settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatrixConfig {
    /// Code universe used for diffs and change previews
    #[serde(default = "default_permission_codes")]
    pub permission_codes: Vec<String>,
    /// Reject subtree edits rooted at a resource missing from the resource tree
    #[serde(default)]
    pub strict_edits: bool,
    /// Check resource key and permission code formats when loading a session
    #[serde(default = "default_validate_keys")]
    pub validate_keys: bool,
}

fn default_permission_codes() -> Vec<String> {
    STANDARD_PERMISSION_CODES.iter().map(|c| c.to_string()).collect()
}

fn default_validate_keys() -> bool {
    true
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            permission_codes: default_permission_codes(),
            strict_edits: false,
            validate_keys: default_validate_keys(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. Configuration file (first found in standard locations)
    /// 3. Environment variables
    pub fn load() -> MatrixResult<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("PERMISSION_MATRIX_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => Self::from_file(path)?,
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => AppConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without applying overrides
    pub fn from_file(path: &Path) -> MatrixResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_norway::from_str(&contents)?)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Current directory
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            // System config directory
            PathBuf::from("/etc/permission-matrix/config.yaml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("permission-matrix/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PERMISSION_MATRIX_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(codes) = std::env::var("PERMISSION_MATRIX_CODES") {
            self.matrix.permission_codes = parse_code_list(&codes);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> MatrixResult<()> {
        let codes = &self.matrix.permission_codes;
        if codes.is_empty() {
            return Err(MatrixError::Config(
                "Permission code list cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for code in codes {
            ensure_permission_code(code)?;
            if !seen.insert(code.as_str()) {
                return Err(MatrixError::Config(format!(
                    "Duplicate permission code: {}",
                    code
                )));
            }
        }

        if self.logging.target != LogTarget::Console && self.logging.log_prefix.is_empty() {
            return Err(MatrixError::Config(
                "Log file prefix cannot be empty when logging to file".to_string(),
            ));
        }

        Ok(())
    }
}

/// Split a comma separated code list, dropping blanks
pub fn parse_code_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// An editing session: the catalog, the role's current grants and the edits to replay
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionFile {
    /// Flat resource list
    #[serde(default)]
    pub resources: Vec<ResourceNode>,
    /// Grants in the role permission response shape
    #[serde(default)]
    pub permissions: Vec<ResourcePermissionGrant>,
    /// Edits to apply, in order
    #[serde(default)]
    pub edits: Vec<MatrixEdit>,
}

impl SessionFile {
    /// Load a session from a YAML or JSON file
    pub fn load(path: &Path) -> MatrixResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_norway::from_str(&contents)?)
    }

    /// Grants as a role permission response
    pub fn response(&self) -> RolePermissionResponse {
        RolePermissionResponse {
            permissions: self.permissions.clone(),
        }
    }

    /// Check key and code formats across resources and grants
    pub fn validate(&self) -> MatrixResult<()> {
        for resource in &self.resources {
            ensure_resource_key(&resource.resource_key)?;
        }
        for grant in &self.permissions {
            ensure_resource_key(&grant.resource_key)?;
            for code in &grant.permission_codes {
                ensure_permission_code(code)?;
            }
        }
        Ok(())
    }
}
