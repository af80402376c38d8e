//! Best-effort removal of temporary snapshot directories.
//!
//! Clone trees can contain read-only files and directories, which a single
//! recursive delete does not always get through. Removal therefore first
//! grants full access to every entry, then tries several removal methods in
//! turn, and finally makes one bare attempt. Nothing here ever fails the
//! caller; problems are only logged at debug level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use rayon::prelude::*;
use walkdir::WalkDir;

type RemovalMethod = fn(&Path) -> io::Result<()>;

const REMOVAL_METHODS: &[(&str, RemovalMethod)] = &[
    ("remove_dir_all", remove_recursive),
    ("bottom-up walk", remove_bottom_up),
    ("system rm", remove_with_system_command),
];

/// Removes `path` and everything below it. Never fails.
pub fn cleanup(path: &Path) {
    if let Err(e) = try_cleanup(path) {
        debug!("Cleanup of {} failed: {}", path.display(), e);
        if let Err(e) = fs::remove_dir_all(path) {
            debug!("Final removal attempt failed: {}", e);
        }
    }
}

fn try_cleanup(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path).is_err() {
        return Ok(());
    }

    make_tree_writable(path);
    set_full_access(path)?;

    for (name, remove) in REMOVAL_METHODS {
        match remove(path) {
            Ok(()) => {
                debug!("Cleaned up temporary directory {}", path.display());
                return Ok(());
            }
            Err(e) => debug!("Removal method '{}' failed: {}", name, e),
        }
    }

    Err(io::Error::other("every removal method failed"))
}

/// Grants full access to every entry below `dir`.
///
/// Siblings are processed in parallel. A failure on one entry is logged and
/// does not stop the others. Symlinks are left alone so nothing outside the
/// tree is touched.
fn make_tree_writable(dir: &Path) {
    let entries: Vec<(PathBuf, io::Result<fs::FileType>)> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| (entry.path(), entry.file_type()))
            .collect(),
        Err(e) => {
            debug!("Unable to read directory {}: {}", dir.display(), e);
            return;
        }
    };

    entries.par_iter().for_each(|(path, file_type)| {
        let file_type = match file_type {
            Ok(file_type) => file_type,
            Err(e) => {
                debug!("Unable to stat {}: {}", path.display(), e);
                return;
            }
        };
        if file_type.is_symlink() {
            return;
        }

        if let Err(e) = set_full_access(path) {
            debug!("Unable to chmod {}: {}", path.display(), e);
            return;
        }
        if file_type.is_dir() {
            make_tree_writable(path);
        }
    });
}

#[cfg(unix)]
fn set_full_access(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o777))
}

#[cfg(not(unix))]
fn set_full_access(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}

fn remove_recursive(path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
}

fn remove_bottom_up(path: &Path) -> io::Result<()> {
    for entry in WalkDir::new(path).contents_first(true) {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn remove_with_system_command(path: &Path) -> io::Result<()> {
    let status = if cfg!(windows) {
        Command::new("cmd")
            .args(["/C", "rmdir", "/S", "/Q"])
            .arg(path)
            .status()?
    } else {
        Command::new("rm").arg("-rf").arg(path).status()?
    };

    if status.success() && fs::symlink_metadata(path).is_err() {
        Ok(())
    } else {
        Err(io::Error::other(format!("removal exited with {}", status)))
    }
}
