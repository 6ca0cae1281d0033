//! Trellis core library — configuration types, YAML loading, errors.
//!
//! Public API surface:
//! - [`config`] — [`AppConfig`] and its sections, [`config::load_config_at`]
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;

pub use config::{AppConfig, CsrfConfig, RendererConfig, ServerConfig};
pub use error::ConfigError;
