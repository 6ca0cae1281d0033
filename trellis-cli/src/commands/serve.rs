//! `trellis serve` — run the demo web application.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::load_config;

/// Arguments for `trellis serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// YAML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Additional search directory (repeatable, tried after config directories).
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let mut config = load_config(self.config.as_deref(), &self.dirs)?;
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if config.renderer.template_dirs.is_empty() {
            config.renderer.template_dirs.push(PathBuf::from("templates/"));
        }
        trellis_server::start_blocking(config).context("server exited with an error")
    }
}
