//! # Reconciliation Engine
//!
//! Decides, for every resolved template path, how it lands in the target
//! directory, and carries that decision out.
//!
//! ## Policy
//!
//! - **Mergeable files** (see [`crate::defaults::MERGEABLE_FILES`]) are merged
//!   line by line: lines of the template that the destination does not
//!   already contain (compared trimmed) are appended. Existing destination
//!   lines are never removed or reordered.
//! - **Everything else** is copied only when the destination does not exist.
//!   Existing destinations are never read, compared or overwritten.
//!
//! Paths are processed one at a time in input order, so no two paths touch
//! the target concurrently. The first failure aborts the run; paths already
//! reconciled stay as they are.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::debug;

use crate::defaults::is_mergeable;
use crate::error::{Error, Result};

/// What happened to one template path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file did not exist in the target and was copied.
    Copied,
    /// New lines were written into a mergeable file.
    Merged,
    /// The target already had the file (or every line of it).
    Skipped,
}

/// One reconciled path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileEntry {
    /// Path relative to both the snapshot and the target, `/`-separated
    pub relative_path: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: Outcome,
}

/// Outcomes of one reconciliation run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub entries: Vec<ReconcileEntry>,
}

impl ReconcileReport {
    fn paths_with(&self, outcome: Outcome) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome == outcome)
            .map(|e| e.relative_path.as_str())
            .collect()
    }

    pub fn copied(&self) -> Vec<&str> {
        self.paths_with(Outcome::Copied)
    }

    pub fn merged(&self) -> Vec<&str> {
        self.paths_with(Outcome::Merged)
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.paths_with(Outcome::Skipped)
    }

    /// Whether anything was written to the target.
    pub fn changed_anything(&self) -> bool {
        self.entries.iter().any(|e| e.outcome != Outcome::Skipped)
    }
}

/// Reconciles each of `relative_paths` from `source_root` into `target_root`.
pub fn reconcile(
    relative_paths: &[String],
    source_root: &Path,
    target_root: &Path,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    for relative_path in relative_paths {
        let source = source_root.join(relative_path);
        let destination = target_root.join(relative_path);

        let mergeable = Path::new(relative_path)
            .file_name()
            .is_some_and(|name| is_mergeable(&name.to_string_lossy()));

        let outcome = if mergeable {
            merge_file(&source, &destination)?
        } else {
            copy_if_absent(&source, &destination)?
        };
        debug!("{:?}: {}", outcome, relative_path);

        report.entries.push(ReconcileEntry {
            relative_path: relative_path.clone(),
            source,
            destination,
            outcome,
        });
    }

    Ok(report)
}

/// Maps a write failure on `destination` to the error reported to the user.
fn write_error(err: io::Error, destination: &Path) -> Error {
    if err.kind() == ErrorKind::PermissionDenied {
        Error::PermissionDenied {
            path: destination.to_path_buf(),
        }
    } else {
        Error::Io(err)
    }
}

fn ensure_parent(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| write_error(e, destination))?;
    }
    Ok(())
}

/// Copies `source` to `destination` unless something already exists there.
pub fn copy_if_absent(source: &Path, destination: &Path) -> Result<Outcome> {
    if destination.exists() {
        return Ok(Outcome::Skipped);
    }
    ensure_parent(destination)?;

    let mut reader = fs::File::open(source)?;
    let mut writer = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(Outcome::Skipped),
        Err(e) => return Err(write_error(e, destination)),
    };
    io::copy(&mut reader, &mut writer).map_err(|e| write_error(e, destination))?;
    drop(writer);

    if let Ok(metadata) = fs::metadata(source) {
        if let Err(e) = fs::set_permissions(destination, metadata.permissions()) {
            debug!(
                "Could not mirror permissions onto {}: {}",
                destination.display(),
                e
            );
        }
    }

    Ok(Outcome::Copied)
}

/// Trimmed, non-empty lines of `content`.
fn comparable_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Trimmed lines of `source` that `destination` lacks, in source order.
fn missing_lines<'a>(source: &'a str, destination: &str) -> Vec<&'a str> {
    let existing: HashSet<&str> = comparable_lines(destination).into_iter().collect();
    comparable_lines(source)
        .into_iter()
        .filter(|line| !existing.contains(line))
        .collect()
}

/// The result of merging template `source` text into existing `destination`
/// text, or `None` when the destination already has every line.
pub fn merge_lines(source: &str, destination: &str) -> Option<String> {
    let new_lines = missing_lines(source, destination);
    if new_lines.is_empty() {
        return None;
    }

    let kept = destination.trim();
    let appended = new_lines.join("\n");
    Some(if kept.is_empty() {
        format!("{}\n", appended)
    } else {
        format!("{}\n{}\n", kept, appended)
    })
}

/// [`merge_lines`] over raw file contents.
///
/// Invalid UTF-8 is compared lossily. Destination bytes are written back
/// untouched apart from trimming surrounding ASCII whitespace.
fn merge_bytes(source: &[u8], destination: &[u8]) -> Option<Vec<u8>> {
    let source = String::from_utf8_lossy(source);
    if let Ok(destination) = std::str::from_utf8(destination) {
        return merge_lines(&source, destination).map(String::into_bytes);
    }

    let new_lines = missing_lines(&source, &String::from_utf8_lossy(destination));
    if new_lines.is_empty() {
        return None;
    }

    let kept = destination.trim_ascii();
    let mut merged = Vec::with_capacity(kept.len() + source.len() + 2);
    if !kept.is_empty() {
        merged.extend_from_slice(kept);
        merged.push(b'\n');
    }
    merged.extend_from_slice(new_lines.join("\n").as_bytes());
    merged.push(b'\n');
    Some(merged)
}

/// Merges the lines of `source` into `destination`.
///
/// A missing destination receives the source content verbatim.
pub fn merge_file(source: &Path, destination: &Path) -> Result<Outcome> {
    let source_content = fs::read(source)?;

    if !destination.exists() {
        ensure_parent(destination)?;
        fs::write(destination, &source_content).map_err(|e| write_error(e, destination))?;
        return Ok(Outcome::Merged);
    }

    let destination_content = fs::read(destination)?;
    match merge_bytes(&source_content, &destination_content) {
        Some(merged) => {
            fs::write(destination, merged).map_err(|e| write_error(e, destination))?;
            Ok(Outcome::Merged)
        }
        None => Ok(Outcome::Skipped),
    }
}
