//! `Cargo.toml` package reader.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::manifest::{read_toml_file, relative_path_str};
use crate::workspace::{DependencyKind, DependencySpec, Package};

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
    #[serde(default)]
    dependencies: IndexMap<String, CargoDependency>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: IndexMap<String, CargoDependency>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: Option<String>,
    version: Option<VersionField>,
}

/// `version = "1.0"` or the inherited form `version.workspace = true`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionField {
    Plain(String),
    Inherited { workspace: bool },
}

/// Dependency values are either a bare range string or a table with an
/// optional `version` key (path/git/workspace deps may carry none).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CargoDependency {
    Range(String),
    Table { version: Option<String> },
}

impl CargoDependency {
    fn range(&self) -> String {
        match self {
            CargoDependency::Range(r) => r.clone(),
            CargoDependency::Table { version } => {
                version.clone().unwrap_or_else(|| "*".to_string())
            }
        }
    }
}

/// Loads a crate from `dir/Cargo.toml`, if one exists and parses.
///
/// `workspace_version` resolves `version.workspace = true` inheritance; when
/// it is unavailable the version falls back to `"0.0.0"`.
pub fn try_load_cargo(root: &Path, dir: &Path, workspace_version: Option<&str>) -> Option<Package> {
    let manifest_path = root.join(dir).join("Cargo.toml");
    if !manifest_path.exists() {
        return None;
    }

    let manifest: CargoManifest = match read_toml_file(&manifest_path) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("Skipping {}: {}", manifest_path.display(), e);
            return None;
        }
    };

    let package = manifest.package?;
    let name = package.name.filter(|n| !n.is_empty())?;

    let version = match package.version {
        Some(VersionField::Plain(v)) => v,
        Some(VersionField::Inherited { workspace: true }) => workspace_version
            .map(str::to_string)
            .unwrap_or_else(|| "0.0.0".to_string()),
        _ => "0.0.0".to_string(),
    };

    let mut dependencies = IndexMap::new();
    for (deps, kind) in [
        (&manifest.dependencies, DependencyKind::Prod),
        (&manifest.dev_dependencies, DependencyKind::Dev),
    ] {
        for (dep_name, value) in deps {
            dependencies.insert(
                dep_name.clone(),
                DependencySpec {
                    name: dep_name.clone(),
                    version: value.range(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("Cargo.toml"), content).unwrap();
    }

    #[test]
    fn test_load_basic() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            &temp.path().join("core"),
            r#"
[package]
name = "core"
version = "0.4.2"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
log = "0.4"

[dev-dependencies]
tempfile = "3"
"#,
        );

        let pkg = try_load_cargo(temp.path(), &PathBuf::from("core"), None).unwrap();
        assert_eq!(pkg.name, "core");
        assert_eq!(pkg.version, "0.4.2");
        assert_eq!(pkg.dependencies["serde"].version, "1.0");
        assert_eq!(pkg.dependencies["log"].version, "0.4");
        assert_eq!(pkg.dependencies["tempfile"].kind, DependencyKind::Dev);
    }

    #[test]
    fn test_inherited_version() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            &temp.path().join("member"),
            "[package]\nname = \"member\"\nversion.workspace = true\n",
        );

        let pkg =
            try_load_cargo(temp.path(), &PathBuf::from("member"), Some("3.1.0")).unwrap();
        assert_eq!(pkg.version, "3.1.0");

        let pkg = try_load_cargo(temp.path(), &PathBuf::from("member"), None).unwrap();
        assert_eq!(pkg.version, "0.0.0");
    }

    #[test]
    fn test_path_dep_without_version() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            &temp.path().join("app"),
            r#"
[package]
name = "app"
version = "1.0.0"

[dependencies]
core = { path = "../core" }
"#,
        );

        let pkg = try_load_cargo(temp.path(), &PathBuf::from("app"), None).unwrap();
        assert_eq!(pkg.dependencies["core"].version, "*");
    }

    #[test]
    fn test_workspace_only_manifest_is_none() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            &temp.path().join("root"),
            "[workspace]\nmembers = [\"crates/*\"]\n",
        );
        assert!(try_load_cargo(temp.path(), &PathBuf::from("root"), None).is_none());
    }

    #[test]
    fn test_malformed_manifest_is_none() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("bad"), "[package\nname =");
        assert!(try_load_cargo(temp.path(), &PathBuf::from("bad"), None).is_none());
    }
}
