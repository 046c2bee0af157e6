use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod host_bridge;
mod manifest;
mod ui;

use commands::export::{ExportCommand, PlanCommand};
use commands::settings::{MergeCommand, ValidateCommand};

/// fbxport CLI - settings-driven FBX export pipeline
#[derive(Parser)]
#[command(
    name = "fbxport",
    version = env!("CARGO_PKG_VERSION"),
    about = "Settings-driven FBX export pipeline for DCC-to-Unreal asset delivery",
    long_about = None,
    arg_required_else_help = true
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical default settings document
    Defaults,

    /// Validate a settings document against the schema
    Validate(ValidateCommand),

    /// Merge partial documents onto a base settings document
    Merge(MergeCommand),

    /// Show what an export would do without touching a host
    Plan(PlanCommand),

    /// Export a scene manifest through an external exporter command
    Export(ExportCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize colored output
    colored::control::set_override(!cli.no_color);

    // Initialize logging
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Defaults => {
            commands::settings::print_defaults();
            Ok(())
        }
        Commands::Validate(cmd) => cmd.execute(),
        Commands::Merge(cmd) => cmd.execute(),
        Commands::Plan(cmd) => cmd.execute(),
        Commands::Export(cmd) => cmd.execute(),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(format!("fbxport_core={},fbxport={}", level, level))
        .with_target(false)
        .try_init();
}
