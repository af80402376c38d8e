//! # Deploy Command Implementation
//!
//! Deploys the Cursor rules template into a single target directory.
//!
//! ## Process
//!
//! 1. **Validate arguments**: exactly one target directory is accepted.
//! 2. **Choose the source**: `--source` wins; otherwise the user picks the
//!    canonical template or one of its forks. Unattended runs use the
//!    canonical template without prompting.
//! 3. **Deploy**: fetch, resolve and reconcile via the library.
//! 4. **Report**: list copied, merged and skipped files, then point the
//!    user at the most useful deployed files.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cursor_rules_deploy::defaults::{DEFAULT_API_URL, DEFAULT_GIT_HOST};
use cursor_rules_deploy::deploy::{resolve_target, Deployment};
use cursor_rules_deploy::github::{DirectoryClient, HttpRepoApi};
use cursor_rules_deploy::output::{emoji, OutputConfig};
use cursor_rules_deploy::repo_id::RepoId;
use cursor_rules_deploy::report;
use cursor_rules_deploy::selector::TerminalPrompt;
use cursor_rules_deploy::snapshot::GitSnapshotSource;

/// Deploy rules and templates into a directory
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Target directory to deploy rules and templates
    #[arg(value_name = "TARGET_DIR")]
    pub targets: Vec<PathBuf>,

    /// Deploy from this repository (owner/name) without prompting
    #[arg(long, value_name = "OWNER/NAME", env = "CURSOR_RULES_SOURCE")]
    pub source: Option<String>,

    /// Base URL of the repository hosting API
    #[arg(long, value_name = "URL", env = "CURSOR_RULES_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL repositories are cloned from
    #[arg(long, value_name = "URL", env = "CURSOR_RULES_GIT_HOST", default_value = DEFAULT_GIT_HOST)]
    pub git_host: String,

    /// API token, raises the hosting API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, hide = true)]
    pub token: Option<String>,
}

/// Execute the deploy command.
pub fn execute(args: DeployArgs, output: &OutputConfig) -> Result<()> {
    let target = single_target(&args.targets, output)?;

    // Parse before touching the network so a typo fails fast.
    let source = args
        .source
        .as_deref()
        .map(str::parse::<RepoId>)
        .transpose()
        .context("Invalid --source")?;

    let target = resolve_target(target)?;
    println!(
        "{} Deploying to: {}",
        emoji(output, "ℹ", "i"),
        target.display()
    );

    let api = HttpRepoApi::new(&args.api_url, args.token.clone())?;
    let interactive = console::user_attended();
    let deployment = Deployment::new(
        DirectoryClient::new(Box::new(api)),
        Box::new(GitSnapshotSource::new(&args.git_host)),
        Box::new(TerminalPrompt::new()),
    )
    .with_progress(interactive);

    let repo = match source {
        Some(repo) => repo,
        None if interactive => deployment.select_source(),
        None => {
            log::info!("No terminal attached, using {}", deployment.canonical());
            deployment.canonical().clone()
        }
    };

    let spinner = spinner(&format!("Copying template from {}", repo), interactive);
    let result = deployment.materialize(&repo, &target);
    spinner.finish_and_clear();
    let outcome = result.with_context(|| format!("Deployment failed for {}", target.display()))?;

    for line in report::render(output, &outcome) {
        println!("{}", line);
    }
    println!();

    if outcome.changed_anything() {
        println!(
            "{}",
            output.paint(
                &format!(
                    "{} Deployment completed successfully!",
                    emoji(output, "🎉", "[ok]")
                ),
                Style::new().green().bold()
            )
        );
    } else {
        println!(
            "{} No new files were copied, everything is already in place.",
            emoji(output, "✔", "[ok]")
        );
    }

    print_pointers(&target);
    Ok(())
}

/// Enforces exactly one positional target.
fn single_target<'a>(targets: &'a [PathBuf], output: &OutputConfig) -> Result<&'a Path> {
    match targets {
        [target] => Ok(target.as_path()),
        [] => {
            eprintln!();
            eprintln!("{} Error: Missing required argument", emoji(output, "❌", "[x]"));
            eprintln!();
            eprintln!("{} Required:", emoji(output, "📌", "*"));
            eprintln!("  TARGET_DIR - Where to deploy rules and templates");
            eprintln!();
            print_usage_hints(output);
            eprintln!("  Use a dot (.) for current directory");
            eprintln!("  Run with --help for more information");
            eprintln!("  Directory will be created if it doesn't exist");
            bail!("Missing required argument: TARGET_DIR")
        }
        _ => {
            eprintln!("{} Too many arguments provided", emoji(output, "✖", "[x]"));
            eprintln!();
            print_usage_hints(output);
            bail!("Too many arguments provided")
        }
    }
}

fn print_usage_hints(output: &OutputConfig) {
    eprintln!("{} Correct usage:", emoji(output, "✨", "*"));
    eprintln!("  $ cursor-rules-deploy <TARGET_DIR>");
    eprintln!();
    eprintln!("{} Examples:", emoji(output, "💡", "*"));
    eprintln!("  $ cursor-rules-deploy my-project");
    eprintln!("  $ cursor-rules-deploy .");
    eprintln!();
}

fn print_pointers(target: &Path) {
    let pointers = [
        (
            "Core rule generator",
            target.join(".cursor/rules/core-rules/rule-generating-agent.mdc"),
        ),
        (
            "Sample subfolders and rules",
            target.join(".cursor/rules/{sub-folders}/"),
        ),
        (
            "Sample Agile Workflow Templates",
            target.join(".cursor/templates/"),
        ),
        ("Workflow Documentation", target.join("docs/workflow-rules.md")),
    ];

    for (label, path) in pointers {
        println!("  {}: {}", label, path.display());
    }
}

fn spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target_accepts_one() {
        let targets = vec![PathBuf::from("project")];
        let target = single_target(&targets, &OutputConfig::without_color()).unwrap();
        assert_eq!(target, Path::new("project"));
    }

    #[test]
    fn test_single_target_rejects_none() {
        let err = single_target(&[], &OutputConfig::without_color()).unwrap_err();
        assert!(err.to_string().contains("Missing required argument"));
    }

    #[test]
    fn test_single_target_rejects_many() {
        let targets = vec![PathBuf::from("a"), PathBuf::from("b")];
        let err = single_target(&targets, &OutputConfig::without_color()).unwrap_err();
        assert_eq!(err.to_string(), "Too many arguments provided");
    }
}
