//! # Deployment
//!
//! The top-level context of one run. A [`Deployment`] owns the collaborators
//! shared by every step (directory client, snapshot source, selection
//! prompt) and drives the flow:
//!
//! 1.  **Selection**: pick the source repository (canonical or a fork).
//! 2.  **Snapshot**: fetch it into a fresh temporary workspace.
//! 3.  **Resolution**: expand the template patterns inside the workspace.
//! 4.  **Reconciliation**: copy, merge or skip each file in the target.
//!
//! The workspace is removed when step 4 returns, whether it succeeded or not,
//! and also when step 2 or 3 fails.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::github::DirectoryClient;
use crate::reconcile::{self, ReconcileReport};
use crate::repo_id::RepoId;
use crate::resolver;
use crate::selector::{RepositorySelector, SelectionPrompt};
use crate::snapshot::{self, SnapshotSource};

/// Resolves `target` against the current directory when it is relative.
pub fn resolve_target(target: &Path) -> Result<PathBuf> {
    if target.is_absolute() {
        Ok(target.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(target))
    }
}

/// Collaborators and settings for one run.
pub struct Deployment {
    client: DirectoryClient,
    source: Box<dyn SnapshotSource>,
    prompt: Box<dyn SelectionPrompt>,
    canonical: RepoId,
    workspace_parent: PathBuf,
    show_progress: bool,
}

impl Deployment {
    pub fn new(
        client: DirectoryClient,
        source: Box<dyn SnapshotSource>,
        prompt: Box<dyn SelectionPrompt>,
    ) -> Self {
        Self {
            client,
            source,
            prompt,
            canonical: RepoId::canonical(),
            workspace_parent: std::env::temp_dir(),
            show_progress: false,
        }
    }

    /// Creates snapshot workspaces under `parent` instead of the system
    /// temporary directory.
    pub fn with_workspace_parent(mut self, parent: PathBuf) -> Self {
        self.workspace_parent = parent;
        self
    }

    /// Show spinners while talking to the network.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn canonical(&self) -> &RepoId {
        &self.canonical
    }

    /// Picks the source repository interactively. Never fails.
    pub fn select_source(&self) -> RepoId {
        RepositorySelector::new(&self.client, self.prompt.as_ref(), self.canonical.clone())
            .with_progress(self.show_progress)
            .select_source_repo()
    }

    /// Fetches `repo` and reconciles its template files into `target`.
    ///
    /// `target` is created when missing.
    pub fn materialize(&self, repo: &RepoId, target: &Path) -> Result<ReconcileReport> {
        fs::create_dir_all(target)?;

        let workspace = snapshot::fetch_in(self.source.as_ref(), repo, &self.workspace_parent)?;
        let paths = resolver::resolve(workspace.path())?;
        info!("Reconciling {} template files from {}", paths.len(), repo);

        reconcile::reconcile(&paths, workspace.path(), target)
    }

    /// Selection followed by [`Deployment::materialize`].
    pub fn run(&self, target: &Path) -> Result<(RepoId, ReconcileReport)> {
        let repo = self.select_source();
        let report = self.materialize(&repo, target)?;
        Ok((repo, report))
    }
}
