//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;

use crate::commands;

/// 🚀 CLI tool for deploying Cursor AI rules and templates
///
/// Sets up the directory structure and configuration files for using
/// Cursor AI with your project: rule templates, workflow docs and notes are
/// copied from a template repository (or one of its forks), and the
/// .cursorignore/.cursorindexingignore files are merged line by line.
#[derive(Parser, Debug)]
#[command(name = "cursor-rules-deploy")]
#[command(version, about, long_about)]
#[command(after_help = "Examples:\n  \
    $ cursor-rules-deploy my-project    → Create in 'my-project' directory\n  \
    $ cursor-rules-deploy .             → Create in current directory")]
pub struct Cli {
    #[command(flatten)]
    deploy: commands::deploy::DeployArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = cursor_rules_deploy::output::OutputConfig::from_env_and_flag(&self.color);
        commands::deploy::execute(self.deploy, &output)
    }
}

/// Installs `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level.to_lowercase());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
