//! Process-start configuration for the renderer and the demo server.
//!
//! # File layout
//!
//! ```yaml
//! renderer:
//!   template_dirs: ["templates/"]
//!   debug: false
//!   strict_undefined: false
//!   globals:
//!     site_name: "Trellis"
//! server:
//!   bind: "127.0.0.1:8000"
//!   csrf:
//!     cookie_name: "_csrf"
//!     cookie_max_age_secs: 31536000
//!     form_field: "csrfmiddlewaretoken"
//!     header_name: "X-CSRF-Token"
//! ```
//!
//! Every field is optional. Unknown fields are rejected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One year.
pub const DEFAULT_CSRF_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub renderer: RendererConfig,
    pub server: ServerConfig,
}

/// Template lookup and engine behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Search directories, tried in order before base-relative lookup.
    pub template_dirs: Vec<PathBuf>,
    /// Engine debug info and per-render recompilation of templates.
    pub debug: bool,
    /// Treat undefined variable access as an error.
    pub strict_undefined: bool,
    /// Named values visible to every template.
    pub globals: BTreeMap<String, serde_json::Value>,
}

/// Listener settings for the demo application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub csrf: CsrfConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            csrf: CsrfConfig::default(),
        }
    }
}

/// Cookie and lookup conventions for the CSRF token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub cookie_max_age_secs: u64,
    /// Form field checked on unsafe requests.
    pub form_field: String,
    /// Header checked when the form field is absent.
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "_csrf".to_string(),
            cookie_max_age_secs: DEFAULT_CSRF_MAX_AGE_SECS,
            form_field: "csrfmiddlewaretoken".to_string(),
            header_name: "X-CSRF-Token".to_string(),
        }
    }
}

impl CsrfConfig {
    pub fn cookie_max_age(&self) -> Duration {
        Duration::from_secs(self.cookie_max_age_secs)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Parse a YAML document. A document with no content yields the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        if is_blank_document(contents) {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Serialize back to YAML.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Load an [`AppConfig`] from `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_config_at(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    AppConfig::from_yaml_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_config_at`], but a missing path yields the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config_at(path),
        None => Ok(AppConfig::default()),
    }
}

fn is_blank_document(contents: &str) -> bool {
    contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}
