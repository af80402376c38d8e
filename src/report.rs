//! Human-readable report of a reconciliation run.
//!
//! Paths are grouped by containing directory and directories are listed in
//! sorted order. Files at the target root come first, without a header.

use std::collections::BTreeMap;

use crate::output::{emoji, OutputConfig};
use crate::reconcile::{Outcome, ReconcileReport};

/// Strips one leading `./` or `/`.
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix("./")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(path)
}

/// Groups normalized paths by parent directory (`.` for the root).
pub fn group_by_directory<'a, I>(paths: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in paths {
        let path = normalize_path(path);
        let dir = match path.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir.to_string(),
            _ => ".".to_string(),
        };
        groups.entry(dir).or_default().push(path.to_string());
    }
    groups
}

fn marker(config: &OutputConfig, outcome: Outcome) -> (&'static str, &'static str) {
    match outcome {
        Outcome::Copied => (emoji(config, "📦", "[+]"), "Copied"),
        Outcome::Merged => (emoji(config, "🔀", "[~]"), "Merged"),
        Outcome::Skipped => (emoji(config, "⚠️", "[=]"), "Skipped existing"),
    }
}

fn heading(config: &OutputConfig, outcome: Outcome) -> String {
    let (icon, _) = marker(config, outcome);
    let title = match outcome {
        Outcome::Copied => "Copied files:",
        Outcome::Merged => "Merged files:",
        Outcome::Skipped => "Skipped files:",
    };
    format!("{} {}", icon, title)
}

/// Lines listing `paths` grouped by directory.
pub fn render_group(config: &OutputConfig, outcome: Outcome, paths: &[&str]) -> Vec<String> {
    let (icon, action) = marker(config, outcome);
    let mut lines = Vec::new();

    for (dir, files) in group_by_directory(paths.iter().copied()) {
        if dir == "." {
            for file in files {
                lines.push(format!("{} {}: {}", icon, action, file));
            }
        } else {
            lines.push(String::new());
            lines.push(format!("{}/", dir));
            for file in files {
                let name = file.rsplit('/').next().unwrap_or(&file);
                lines.push(format!("  {} {}: {}", icon, action, name));
            }
        }
    }
    lines
}

/// Full report: one section per non-empty outcome.
pub fn render(config: &OutputConfig, report: &ReconcileReport) -> Vec<String> {
    let sections = [
        (Outcome::Copied, report.copied()),
        (Outcome::Merged, report.merged()),
        (Outcome::Skipped, report.skipped()),
    ];

    let mut lines = Vec::new();
    for (outcome, paths) in sections {
        if paths.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading(config, outcome));
        lines.extend(render_group(config, outcome, &paths));
    }

    if !report.skipped().is_empty() {
        lines.push(String::new());
        lines.push("Some files were skipped because they already exist.".to_string());
        lines.push("To update these files, please back them up and remove them first.".to_string());
    }
    lines
}
