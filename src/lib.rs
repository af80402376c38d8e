//! # Cursor Rules Deploy Library
//!
//! This library provides the template materialization engine behind the
//! `cursor-rules-deploy` command-line tool: it fetches a Cursor rules
//! template repository (or one of its forks) and lays its rule, docs and
//! notes files into a target project without clobbering anything already
//! there.
//!
//! ## Quick Example
//!
//! ```
//! use cursor_rules_deploy::reconcile::merge_lines;
//!
//! // Only lines the destination lacks are appended.
//! let merged = merge_lines("node_modules\ndist\n", "node_modules\n");
//! assert_eq!(merged.as_deref(), Some("node_modules\ndist\n"));
//!
//! // Nothing new means nothing to write.
//! assert_eq!(merge_lines("dist\n", "  dist  \n"), None);
//! ```
//!
//! ## Core Concepts
//!
//! - **Directory client (`github`, `cache`)**: Lists a repository's forks
//!   through the hosting platform's API, with pagination, a five-minute
//!   cache and partial results on rate limiting.
//! - **Selection (`selector`)**: Offers the canonical repository plus its
//!   forks and resolves the user's choice, falling back to the canonical
//!   repository on any failure.
//! - **Snapshots (`snapshot`, `cleanup`)**: Fetches a repository into a
//!   temporary workspace that is always removed afterwards, read-only files
//!   included.
//! - **Resolution (`resolver`)**: Expands the fixed template patterns.
//! - **Reconciliation (`reconcile`, `report`)**: Copies new files, merges the
//!   two ignore files line by line, skips the rest, and reports the result.
//!
//! ## Execution Flow
//!
//! [`deploy::Deployment`] ties the pieces together: select, fetch, resolve,
//! reconcile, clean up.

pub mod cache;
pub mod cleanup;
pub mod defaults;
pub mod deploy;
pub mod error;
pub mod github;
pub mod output;
pub mod reconcile;
pub mod repo_id;
pub mod report;
pub mod resolver;
pub mod selector;
pub mod snapshot;

#[cfg(test)]
mod merge_proptest;
