//! # Snapshot Fetcher
//!
//! Materializes a disposable copy of a template repository in a fresh
//! temporary directory.
//!
//! ## Design
//!
//! Fetching goes through the [`SnapshotSource`] trait so the deployment flow
//! can be tested without network access. [`GitSnapshotSource`] is the
//! production implementation; it shells out to the system `git`, which
//! automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Any authentication configured in ~/.gitconfig
//!
//! Every fetch is a fresh clone of the remote's default branch. There is no
//! local mirror, so a run always reflects the remote's current contents.
//!
//! [`SnapshotWorkspace`] owns the temporary directory and removes it through
//! [`crate::cleanup::cleanup`] when dropped, on success and failure alike.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::cleanup;
use crate::defaults::WORKSPACE_PREFIX;
use crate::error::{Error, Result};
use crate::repo_id::RepoId;

/// Fetches repository contents into a directory - allows faking in tests
pub trait SnapshotSource: Send + Sync {
    /// Replaces the contents of `dest` with a full copy of `repo`.
    fn fetch_into(&self, repo: &RepoId, dest: &Path) -> Result<()>;
}

/// [`SnapshotSource`] backed by `git clone`.
pub struct GitSnapshotSource {
    host: String,
}

impl GitSnapshotSource {
    /// Creates a source that clones from `host` (e.g. `https://github.com`).
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn clone_url(&self, repo: &RepoId) -> String {
        format!("{}/{}/{}.git", self.host, repo.owner, repo.name)
    }
}

impl SnapshotSource for GitSnapshotSource {
    fn fetch_into(&self, repo: &RepoId, dest: &Path) -> Result<()> {
        clear_directory(dest)?;

        let url = self.clone_url(repo);
        debug!("Cloning {} into {}", url, dest.display());

        let output = Command::new("git")
            .args(["clone", "--depth=1", "--quiet"])
            .arg(&url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| Error::SnapshotFetch {
                repo: repo.full_name(),
                message: e.to_string(),
                hint: Some("Make sure git is installed and on your PATH".to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::SnapshotFetch {
                repo: repo.full_name(),
                message: stderr.trim().to_string(),
                hint: clone_failure_hint(&stderr),
            });
        }

        // The snapshot is not a working copy.
        cleanup::cleanup(&dest.join(".git"));
        Ok(())
    }
}

/// Suggests a fix for common `git clone` failures.
fn clone_failure_hint(stderr: &str) -> Option<String> {
    if stderr.contains("not found") || stderr.contains("does not exist") {
        Some("Check the owner/repo name; the repository may have been renamed or deleted".to_string())
    } else if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("could not read Username")
        || stderr.contains("Could not read from remote repository")
    {
        Some("Make sure you have access to the repository (SSH key, credential helper or token)".to_string())
    } else if stderr.contains("Could not resolve host") {
        Some("Check your network connection".to_string())
    } else {
        None
    }
}

/// Empties `dir`, creating it when missing.
fn clear_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// A uniquely named temporary directory removed on drop.
#[derive(Debug)]
pub struct SnapshotWorkspace {
    path: PathBuf,
}

impl SnapshotWorkspace {
    /// Creates a workspace under `parent`.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { path: dir.keep() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotWorkspace {
    fn drop(&mut self) {
        cleanup::cleanup(&self.path);
    }
}

/// Fetches `repo` into a new workspace under `parent`.
///
/// If the fetch fails, the workspace is removed before the error is returned.
pub fn fetch_in(
    source: &dyn SnapshotSource,
    repo: &RepoId,
    parent: &Path,
) -> Result<SnapshotWorkspace> {
    let workspace = SnapshotWorkspace::create_in(parent)?;
    source.fetch_into(repo, workspace.path())?;
    Ok(workspace)
}

/// Fetches `repo` into a new workspace under the system temporary directory.
pub fn fetch(source: &dyn SnapshotSource, repo: &RepoId) -> Result<SnapshotWorkspace> {
    fetch_in(source, repo, &std::env::temp_dir())
}
