//! Package discovery: glob expansion over the workspace root.
//!
//! Patterns are expanded one at a time, in list order, and the results are
//! flattened preserving each pattern's internal match order. The resulting
//! package ordering is therefore a function of the declared patterns, never
//! of filesystem enumeration order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::workspace::Package;

/// Dependency-cache directories that never contain workspace packages.
const IGNORED_DIRS: &[&str] = &["node_modules", "__pycache__", "dist", "build"];

fn is_ignored(rel: &Path) -> bool {
    rel.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        IGNORED_DIRS.contains(&name.as_ref()) || name.ends_with(".egg-info")
    })
}

/// Expands `patterns` against `root` into candidate package directories.
///
/// Returns root-relative paths, deduplicated keeping the first occurrence.
/// Invalid patterns and unreadable paths propagate; they are collaborator
/// failures, not per-candidate ones.
pub fn find_package_dirs(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for pattern in patterns {
        let full_pattern = root.join(pattern);
        for entry in glob::glob(&full_pattern.to_string_lossy())? {
            let path = entry?;
            if !path.is_dir() {
                continue;
            }
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            if is_ignored(rel) {
                continue;
            }
            let rel = rel.to_path_buf();
            if seen.insert(rel.clone()) {
                dirs.push(rel);
            }
        }
    }

    log::debug!(
        "Expanded {} pattern(s) into {} candidate dir(s) under {}",
        patterns.len(),
        dirs.len(),
        root.display()
    );
    Ok(dirs)
}

/// Expands `patterns` and maps every candidate directory through one
/// manifest reader, discarding non-matches.
pub fn find_packages_from_patterns<F>(
    root: &Path,
    patterns: &[String],
    try_load: F,
) -> Result<Vec<Package>>
where
    F: Fn(&Path, &Path) -> Option<Package>,
{
    let dirs = find_package_dirs(root, patterns)?;
    Ok(dirs.iter().filter_map(|dir| try_load(root, dir)).collect())
}
