//! Default values for cursor-rules-deploy.
//!
//! This module provides centralized constants used across the engine and the
//! CLI, ensuring consistency and avoiding duplication.

use std::time::Duration;

/// Owner of the canonical template repository, always offered first during
/// selection.
pub const DEFAULT_REPO_OWNER: &str = "bmadcode";

/// Name of the canonical template repository.
pub const DEFAULT_REPO_NAME: &str = "cursor-custom-agents-rules-generator";

/// Base URL of the repository directory REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Base URL that `owner/repo` identifiers are cloned from.
pub const DEFAULT_GIT_HOST: &str = "https://github.com";

/// How long a fork listing stays fresh in the directory client's cache.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Page size requested from the fork listing endpoint.
pub const FORKS_PER_PAGE: usize = 100;

/// Prefix of the temporary snapshot directory.
pub const WORKSPACE_PREFIX: &str = "cursor-rules-";

/// Glob patterns selected from the snapshot, relative to its root.
pub const TEMPLATE_PATTERNS: &[&str] = &[
    ".cursor/**/*",
    "docs/**/*",
    "xnotes/**/*",
    ".cursorignore",
    ".cursorindexingignore",
];

/// Base names of files reconciled by line merge instead of copy-if-absent.
pub const MERGEABLE_FILES: &[&str] = &[".cursorignore", ".cursorindexingignore"];

/// Whether a file with this base name is reconciled by line merge.
pub fn is_mergeable(file_name: &str) -> bool {
    MERGEABLE_FILES.contains(&file_name)
}
