//! `trellis render` — render one template to stdout.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use trellis_renderer::Renderer;

use super::load_config;

/// Arguments for `trellis render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template name, resolved against the search directories.
    pub template: String,

    /// Additional search directory (repeatable, tried after config directories).
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Render payload as a JSON object.
    #[arg(long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file.
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// YAML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable engine debug mode.
    #[arg(long)]
    pub debug: bool,

    /// Fail on undefined variables.
    #[arg(long)]
    pub strict: bool,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let mut config = load_config(self.config.as_deref(), &self.dirs)?;
        config.renderer.debug |= self.debug;
        config.renderer.strict_undefined |= self.strict;

        let data = self.payload()?;
        let renderer: Renderer<()> = Renderer::from_config(&config.renderer);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        renderer
            .render(&mut out, &self.template, &data, &())
            .with_context(|| format!("failed to render '{}'", self.template))?;
        out.flush().context("failed to flush stdout")?;
        Ok(())
    }

    fn payload(&self) -> Result<Value> {
        let raw = match (&self.data, &self.data_file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("could not read data file {}", path.display()))?,
            (None, None) => return Ok(Value::Object(Default::default())),
        };
        serde_json::from_str(&raw).context("payload is not valid JSON")
    }
}
