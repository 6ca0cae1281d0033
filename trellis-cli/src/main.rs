//! Trellis — render minijinja views from the command line or serve the demo app.
//!
//! # Usage
//!
//! ```text
//! trellis render <template> [--dir <dir>]... [--data <json> | --data-file <path>] [--config <path>] [--debug] [--strict]
//! trellis resolve <name> [--base <path>] [--dir <dir>]... [--config <path>]
//! trellis serve [--config <path>] [--bind <addr>] [--dir <dir>]...
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{render::RenderArgs, resolve::ResolveArgs, serve::ServeArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "trellis",
    version,
    about = "Render minijinja views with search directories and context processors",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout.
    Render(RenderArgs),

    /// Print the path a template name resolves to.
    Resolve(ResolveArgs),

    /// Run the demo web application.
    Serve(ServeArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Resolve(args) => args.run(),
        Commands::Serve(args) => args.run(),
    }
}
