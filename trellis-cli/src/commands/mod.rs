pub mod render;
pub mod resolve;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use trellis_core::{config, AppConfig};

/// Load `--config` (or defaults) and append `--dir` values after the
/// configured search directories.
pub fn load_config(path: Option<&Path>, extra_dirs: &[PathBuf]) -> Result<AppConfig> {
    let mut config = config::load_config_or_default(path).with_context(|| match path {
        Some(path) => format!("could not load config {}", path.display()),
        None => "could not load config".to_string(),
    })?;
    config
        .renderer
        .template_dirs
        .extend(extra_dirs.iter().cloned());
    Ok(config)
}
