//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let Some(host) = TemplateHost::new() else { return };
//!     host.publish("owner/name", common::TEMPLATE_FILES);
//!     // ... run the binary with `--git-host host.url()`
//! }
//! ```

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, TemplateHost, TEMPLATE_FILES};
}

/// A small template repository: deployable files plus one that is not.
#[allow(dead_code)]
pub const TEMPLATE_FILES: &[(&str, &str)] = &[
    (
        ".cursor/rules/core-rules/rule-generating-agent.mdc",
        "# Rule generating agent\n",
    ),
    (".cursor/templates/story.md", "# Story\n"),
    ("docs/workflow-rules.md", "# Workflow\n"),
    ("xnotes/project-idea.md", "# Idea\n"),
    (".cursorignore", "node_modules\n.env\n"),
    (".cursorindexingignore", "dist\n"),
    ("README.md", "# Template readme\n"),
];

/// Whether a `git` binary is available; tests that clone are skipped otherwise.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// A directory laid out like a git host: `<root>/<owner>/<name>.git`.
#[allow(dead_code)]
pub struct TemplateHost {
    pub root: TempDir,
}

#[allow(dead_code)]
impl TemplateHost {
    /// Returns `None` when git is unavailable.
    pub fn new() -> Option<Self> {
        if !git_available() {
            eprintln!("skipping: git not available");
            return None;
        }
        Some(Self {
            root: TempDir::new().unwrap(),
        })
    }

    /// Commits `files` into a repository served as `full_name`.
    pub fn publish(&self, full_name: &str, files: &[(&str, &str)]) {
        let repo = self.root.child(format!("{}.git", full_name));
        repo.create_dir_all().unwrap();
        for (path, content) in files {
            repo.child(path).write_str(content).unwrap();
        }
        git(repo.path(), &["init", "--quiet"]);
        git(repo.path(), &["add", "-A"]);
        git(repo.path(), &["commit", "--quiet", "-m", "template"]);
    }

    /// Value for `--git-host`.
    pub fn url(&self) -> String {
        format!("file://{}", self.root.path().display())
    }
}
