//! `package.json` reader.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::manifest::{read_json_file, relative_path_str};
use crate::workspace::{DependencyKind, DependencySpec, Package};

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: IndexMap<String, String>,
}

/// Loads a package from `dir/package.json`, if one exists and parses.
///
/// `dependencies` is merged before `devDependencies`; on a name collision the
/// dev entry overwrites the prod entry (observable merge order, kept as-is).
pub fn try_load_node(root: &Path, dir: &Path) -> Option<Package> {
    let manifest_path = root.join(dir).join("package.json");
    if !manifest_path.exists() {
        return None;
    }

    let manifest: PackageJson = match read_json_file(&manifest_path) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("Skipping {}: {}", manifest_path.display(), e);
            return None;
        }
    };

    let name = manifest.name.filter(|n| !n.is_empty())?;
    let version = manifest.version.unwrap_or_else(|| "0.0.0".to_string());

    let mut dependencies = IndexMap::new();
    for (deps, kind) in [
        (manifest.dependencies, DependencyKind::Prod),
        (manifest.dev_dependencies, DependencyKind::Dev),
    ] {
        for (dep_name, range) in deps {
            dependencies.insert(
                dep_name.clone(),
                DependencySpec {
                    name: dep_name,
                    version: range,
                    kind,
                },
            );
        }
    }

    Some(Package {
        name,
        version,
        relative_path: relative_path_str(dir),
        dependencies,
    })
}
