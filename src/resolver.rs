//! Path Resolver: expands the template patterns against a snapshot.

use std::collections::HashSet;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use log::debug;

use crate::defaults::TEMPLATE_PATTERNS;
use crate::error::Result;

/// Relative paths of the regular files in `root` matched by the template
/// patterns.
pub fn resolve(root: &Path) -> Result<Vec<String>> {
    resolve_patterns(root, TEMPLATE_PATTERNS)
}

/// Relative paths of the regular files in `root` matched by `patterns`.
///
/// Dot-files match wildcards. Results follow pattern order, sorted within
/// each pattern; a file matched twice is listed once.
/// Paths always use `/` separators.
pub fn resolve_patterns(root: &Path, patterns: &[&str]) -> Result<Vec<String>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let escaped_root = Pattern::escape(&root.to_string_lossy());

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in patterns {
        let full_pattern = format!("{}/{}", escaped_root, pattern);
        let mut matched = Vec::new();
        for entry in glob::glob_with(&full_pattern, options)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    debug!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            matched.push(relative);
        }
        matched.sort();
        for relative in matched {
            if seen.insert(relative.clone()) {
                files.push(relative);
            }
        }
    }

    debug!("Resolved {} template files in {}", files.len(), root.display());
    Ok(files)
}
