//! # Error Handling
//!
//! This module defines the centralized error type for the deployment engine.
//! It uses the `thiserror` library to create an `Error` enum covering every
//! failure the library can surface, each with enough context to produce a
//! readable message for the user.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into three groups:
//!   - Discovery failures (`Network`, `Api`, `RateLimited`), which callers
//!     are expected to recover from with a fallback.
//!   - Deployment failures (`SnapshotFetch`, `PermissionDenied`, `Io`,
//!     `Glob`), which abort the current run.
//!   - Input and plumbing failures (`InvalidRepository`, `Prompt`,
//!     `LockPoisoned`).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for cursor-rules-deploy operations
#[derive(Error, Debug)]
pub enum Error {
    /// A repository identifier was not in `owner/repo` form.
    #[error("Invalid repository identifier '{input}': expected owner/repo")]
    InvalidRepository { input: String },

    /// A request to the repository directory could not be completed.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// The repository directory answered with a non-success status.
    #[error("API request failed for {url}: HTTP {status} - {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// The repository directory refused the request because of rate limiting.
    #[error("GitHub API rate limit exceeded for {url}")]
    RateLimited { url: String },

    /// The template repository could not be fetched into the workspace.
    #[error("Failed to fetch {repo}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    SnapshotFetch {
        repo: String,
        message: String,
        /// Optional hint for how to resolve the fetch issue
        hint: Option<String>,
    },

    /// A destination file or directory could not be written.
    #[error("Permission denied: Unable to write to {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// The interactive selection prompt failed or was cancelled.
    #[error("Selection prompt failed: {message}")]
    Prompt { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Whether this error is the directory's rate-limit signal.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Prompt {
            message: err.to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_repository() {
        let error = Error::InvalidRepository {
            input: "not-a-repo".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid repository identifier"));
        assert!(display.contains("not-a-repo"));
    }

    #[test]
    fn test_error_display_snapshot_fetch() {
        let error = Error::SnapshotFetch {
            repo: "owner/repo".to_string(),
            message: "Repository not found".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to fetch owner/repo"));
        assert!(display.contains("Repository not found"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_snapshot_fetch_with_hint() {
        let error = Error::SnapshotFetch {
            repo: "owner/repo".to_string(),
            message: "Authentication failed".to_string(),
            hint: Some("Check SSH keys".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("Check SSH keys"));
    }

    #[test]
    fn test_error_display_permission_denied() {
        let error = Error::PermissionDenied {
            path: PathBuf::from("/target/.cursorignore"),
        };
        let display = format!("{}", error);
        assert_eq!(
            display,
            "Permission denied: Unable to write to /target/.cursorignore"
        );
    }

    #[test]
    fn test_error_display_api() {
        let error = Error::Api {
            url: "https://api.github.com/repos/a/b".to_string(),
            status: 404,
            message: "Not Found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("HTTP 404"));
        assert!(display.contains("Not Found"));
    }

    #[test]
    fn test_rate_limit_detection() {
        let limited = Error::RateLimited {
            url: "https://api.github.com".to_string(),
        };
        let network = Error::Network {
            url: "https://api.github.com".to_string(),
            message: "Connection reset".to_string(),
        };
        assert!(limited.is_rate_limit());
        assert!(!network.is_rate_limit());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_glob_error() {
        let glob_error = glob::Pattern::new("[").unwrap_err();
        let error: Error = glob_error.into();
        assert!(format!("{}", error).contains("Glob pattern error"));
    }
}
