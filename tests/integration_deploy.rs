//! Integration tests for the deployment flow through the public library API.
//!
//! The directory, snapshot source and prompt are all replaced through their
//! traits, so selection and reconciliation are exercised end to end without
//! network access or a terminal.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use cursor_rules_deploy::cleanup;
use cursor_rules_deploy::deploy::Deployment;
use cursor_rules_deploy::error::{Error, Result};
use cursor_rules_deploy::github::{DirectoryClient, RepoApi, RepositoryDescriptor};
use cursor_rules_deploy::reconcile::Outcome;
use cursor_rules_deploy::repo_id::RepoId;
use cursor_rules_deploy::selector::{RepoCandidate, SelectionPrompt};
use cursor_rules_deploy::snapshot::SnapshotSource;

fn descriptor(name: &str, stars: u64) -> RepositoryDescriptor {
    RepositoryDescriptor {
        full_name: name.to_string(),
        description: String::new(),
        star_count: stars,
        updated_at: Utc::now(),
    }
}

/// Directory with a fixed fork list, or one that is down.
struct StaticDirectory {
    forks: Vec<&'static str>,
    online: bool,
}

impl RepoApi for StaticDirectory {
    fn get_repo(&self, repo: &RepoId) -> Result<RepositoryDescriptor> {
        if !self.online {
            return Err(Error::Network {
                url: format!("test://repos/{}", repo),
                message: "connection refused".to_string(),
            });
        }
        Ok(descriptor(&repo.full_name(), 7))
    }

    fn list_forks_page(
        &self,
        _repo: &RepoId,
        _per_page: usize,
        page: usize,
    ) -> Result<Vec<RepositoryDescriptor>> {
        if !self.online {
            return Err(Error::RateLimited {
                url: "test://forks".to_string(),
            });
        }
        if page > 1 {
            return Ok(Vec::new());
        }
        Ok(self.forks.iter().map(|name| descriptor(name, 1)).collect())
    }
}

/// Serves a different file tree per repository and records what was fetched.
struct TreeSource {
    fetched: FetchLog,
}

impl SnapshotSource for TreeSource {
    fn fetch_into(&self, repo: &RepoId, dest: &Path) -> Result<()> {
        self.fetched.lock().unwrap().push(repo.full_name());
        let files = [
            (".cursor/rules/origin.mdc", repo.full_name()),
            ("docs/workflow-rules.md", "workflow".to_string()),
            (".cursorignore", format!("{}\n", repo.owner)),
        ];
        for (relative, content) in files {
            let path = dest.join(relative);
            fs::create_dir_all(path.parent().unwrap())?;
            fs::write(path, content)?;
        }
        Ok(())
    }
}

/// Searches for `term`, then picks the first result.
struct SearchAndPick {
    term: &'static str,
}

impl SelectionPrompt for SearchAndPick {
    fn select(
        &self,
        initial: &[RepoCandidate],
        query: &dyn Fn(&str) -> Vec<RepoCandidate>,
    ) -> Result<String> {
        assert!(initial[0].label.contains("(Original)"));
        let results = query(self.term);
        Ok(results
            .iter()
            .find(|c| !c.label.contains("(Original)"))
            .unwrap_or(&results[0])
            .value
            .clone())
    }
}

type FetchLog = Arc<Mutex<Vec<String>>>;

fn deployment(api: StaticDirectory, prompt: SearchAndPick, workspaces: &Path) -> (Deployment, FetchLog) {
    let fetched = FetchLog::default();
    let source = TreeSource {
        fetched: Arc::clone(&fetched),
    };
    let deployment = Deployment::new(
        DirectoryClient::new(Box::new(api)),
        Box::new(source),
        Box::new(prompt),
    )
    .with_workspace_parent(workspaces.to_path_buf());
    (deployment, fetched)
}

fn directory(online: bool) -> StaticDirectory {
    StaticDirectory {
        forks: vec!["alice/cursor-custom-agents-rules-generator", "bob/rules"],
        online,
    }
}

#[test]
fn test_searched_fork_is_deployed() {
    let temp = TempDir::new().unwrap();
    let workspaces = temp.child("tmp");
    workspaces.create_dir_all().unwrap();
    let target = temp.child("project");

    let (deployment, fetched) = deployment(directory(true), SearchAndPick { term: "BOB" }, workspaces.path());
    let (repo, report) = deployment.run(target.path()).unwrap();

    assert_eq!(repo, RepoId::new("bob", "rules"));
    assert_eq!(*fetched.lock().unwrap(), vec!["bob/rules".to_string()]);
    target.child(".cursor/rules/origin.mdc").assert("bob/rules");
    target.child(".cursorignore").assert("bob\n");
    assert_eq!(report.merged(), vec![".cursorignore"]);
    assert_eq!(fs::read_dir(workspaces.path()).unwrap().count(), 0);
}

#[test]
fn test_directory_outage_falls_back_to_canonical() {
    let temp = TempDir::new().unwrap();
    let workspaces = temp.child("tmp");
    workspaces.create_dir_all().unwrap();

    let (deployment, fetched) = deployment(directory(false), SearchAndPick { term: "bob" }, workspaces.path());
    let (repo, _) = deployment.run(&temp.path().join("project")).unwrap();

    assert_eq!(repo, RepoId::canonical());
    assert_eq!(*fetched.lock().unwrap(), vec![RepoId::canonical().full_name()]);
}

#[test]
fn test_redeploy_from_other_fork_only_merges_ignore_file() {
    let temp = TempDir::new().unwrap();
    let workspaces = temp.child("tmp");
    workspaces.create_dir_all().unwrap();
    let target = temp.child("project");

    let (first, _) = deployment(directory(true), SearchAndPick { term: "alice" }, workspaces.path());
    first.run(target.path()).unwrap();

    let (second, _) = deployment(directory(true), SearchAndPick { term: "bob" }, workspaces.path());
    let (_, report) = second.run(target.path()).unwrap();

    assert!(report.copied().is_empty());
    assert_eq!(report.merged(), vec![".cursorignore"]);
    assert!(report
        .entries
        .iter()
        .filter(|e| e.relative_path != ".cursorignore")
        .all(|e| e.outcome == Outcome::Skipped));
    target
        .child(".cursor/rules/origin.mdc")
        .assert("alice/cursor-custom-agents-rules-generator");
    target.child(".cursorignore").assert("alice\nbob\n");
}

#[test]
fn test_cleanup_removes_read_only_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.child("snapshot");
    let file = root.child("nested/deeper/locked.txt");
    file.write_str("locked").unwrap();

    for path in [file.path(), root.child("nested/deeper").path(), root.child("nested").path()] {
        let mut permissions = fs::metadata(path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(path, permissions).unwrap();
    }

    cleanup::cleanup(root.path());

    root.assert(predicates::path::missing());
}
