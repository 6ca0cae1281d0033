//! `trellis resolve` — show where a template name resolves to.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use trellis_renderer::TemplateResolver;

use super::load_config;

/// Arguments for `trellis resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Requested template name.
    pub name: String,

    /// Path of the including template; the fallback is relative to its directory.
    #[arg(long, value_name = "PATH")]
    pub base: Option<PathBuf>,

    /// Additional search directory (repeatable, tried after config directories).
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// YAML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ResolveArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref(), &self.dirs)?;
        let resolver = TemplateResolver::with_dirs(config.renderer.template_dirs);
        let base = self.base.unwrap_or_default();
        let path = resolver.resolve(&base, &self.name);
        let marker = if path.exists() { "" } else { " (missing)" };
        println!("{}{marker}", path.display());
        Ok(())
    }
}
