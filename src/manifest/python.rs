//! Python package reader: `pyproject.toml` (PEP 621 or Poetry) with a
//! `setup.py` fallback.
//!
//! The fallback chain is strictly best-effort. A `pyproject.toml` that fails
//! to parse, or parses but yields no package name under either schema, falls
//! through to `setup.py`; a `setup.py` is probed with single-assignment
//! regexes only. Dependency extraction from `setup.py` is unsupported:
//! general Python source needs a real parser to do that correctly, so the
//! dependency mapping stays empty there.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::manifest::{read_toml_file, relative_path_str};
use crate::workspace::{DependencyKind, DependencySpec, Package};

#[derive(Debug, Deserialize)]
struct PyProject {
    project: Option<Pep621Project>,
    tool: Option<ToolTable>,
}

#[derive(Debug, Deserialize)]
struct Pep621Project {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ToolTable {
    poetry: Option<PoetryTable>,
}

#[derive(Debug, Deserialize)]
struct PoetryTable {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, PoetryDependency>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: IndexMap<String, PoetryDependency>,
}

/// Poetry dependency values are either a bare range string or a table with
/// an optional `version` key (`{ version = "^1.0", extras = [...] }`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PoetryDependency {
    Range(String),
    Table { version: Option<String> },
}

impl PoetryDependency {
    fn range(&self) -> String {
        match self {
            PoetryDependency::Range(r) => r.clone(),
            PoetryDependency::Table { version } => {
                version.clone().unwrap_or_else(|| "*".to_string())
            }
        }
    }
}

/// Loads a package from `dir`, trying `pyproject.toml` schemas first and
/// falling back to `setup.py`.
pub fn try_load_python(root: &Path, dir: &Path) -> Option<Package> {
    let dir_path = root.join(dir);
    let relative_path = relative_path_str(dir);

    let pyproject_path = dir_path.join("pyproject.toml");
    if pyproject_path.exists() {
        match read_toml_file::<PyProject>(&pyproject_path) {
            Ok(manifest) => {
                if let Some(pkg) = package_from_pyproject(manifest, &relative_path) {
                    return Some(pkg);
                }
            }
            Err(e) => {
                log::debug!("Skipping {}: {}", pyproject_path.display(), e);
            }
        }
        // No resolvable name in pyproject.toml: try setup.py next.
    }

    package_from_setup_py(&dir_path, &relative_path)
}

fn package_from_pyproject(manifest: PyProject, relative_path: &str) -> Option<Package> {
    // PEP 621 [project] table takes precedence over [tool.poetry].
    if let Some(project) = manifest.project
        && let Some(name) = project.name.filter(|n| !n.is_empty())
    {
        let mut dependencies = IndexMap::new();
        for spec in &project.dependencies {
            let (dep_name, range) = split_requirement(spec);
            if dep_name.is_empty() {
                continue;
            }
            dependencies.insert(
                dep_name.clone(),
                DependencySpec {
                    name: dep_name,
                    version: range,
                    kind: DependencyKind::Prod,
                },
            );
        }

        return Some(Package {
            name,
            version: project.version.unwrap_or_else(|| "0.0.0".to_string()),
            relative_path: relative_path.to_string(),
            dependencies,
        });
    }

    let poetry = manifest.tool?.poetry?;
    let name = poetry.name.filter(|n| !n.is_empty())?;

    let mut dependencies = IndexMap::new();
    for (deps, kind) in [
        (&poetry.dependencies, DependencyKind::Prod),
        (&poetry.dev_dependencies, DependencyKind::Dev),
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
        version: poetry.version.unwrap_or_else(|| "0.0.0".to_string()),
        relative_path: relative_path.to_string(),
        dependencies,
    })
}

/// Splits a PEP 508-style requirement into its leading identifier and the
/// trailing constraint suffix. An empty suffix becomes the wildcard range.
fn split_requirement(spec: &str) -> (String, String) {
    let spec = spec.trim();
    let split = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(spec.len());

    let name = spec[..split].to_string();
    let suffix = spec[split..].trim();
    let range = if suffix.is_empty() {
        "*".to_string()
    } else {
        suffix.to_string()
    };
    (name, range)
}

fn package_from_setup_py(dir_path: &Path, relative_path: &str) -> Option<Package> {
    let setup_path = dir_path.join("setup.py");
    let source = fs::read_to_string(&setup_path).ok()?;

    let name = extract_assignment(&source, "name")?;
    let version =
        extract_assignment(&source, "version").unwrap_or_else(|| "0.0.0".to_string());

    Some(Package {
        name,
        version,
        relative_path: relative_path.to_string(),
        dependencies: IndexMap::new(),
    })
}

/// Matches the first `key = "value"` / `key = 'value'` assignment in Python
/// source. Best-effort by design.
fn extract_assignment(source: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"{key}\s*=\s*["']([^"']+)["']"#);
    let re = Regex::new(&pattern).ok()?;
    re.captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_pep621() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp.path().join("api"),
            "pyproject.toml",
            r#"
[project]
name = "api"
version = "1.4.0"
dependencies = ["requests>=2.28", "flask", "uvicorn[standard]>=0.20"]
"#,
        );

        let pkg = try_load_python(temp.path(), &PathBuf::from("api")).unwrap();
        assert_eq!(pkg.name, "api");
        assert_eq!(pkg.version, "1.4.0");
        assert_eq!(pkg.dependencies["requests"].version, ">=2.28");
        assert_eq!(pkg.dependencies["flask"].version, "*");
        assert_eq!(pkg.dependencies["uvicorn"].version, "[standard]>=0.20");
        assert_eq!(pkg.dependencies["requests"].kind, DependencyKind::Prod);
    }

    #[test]
    fn test_poetry() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp.path().join("worker"),
            "pyproject.toml",
            r#"
[tool.poetry]
name = "worker"
version = "0.3.1"

[tool.poetry.dependencies]
requests = "^2.28"
pydantic = { version = "^2.0", extras = ["email"] }

[tool.poetry.dev-dependencies]
pytest = "^7.0"
requests = "^2.30"
"#,
        );

        let pkg = try_load_python(temp.path(), &PathBuf::from("worker")).unwrap();
        assert_eq!(pkg.name, "worker");
        assert_eq!(pkg.version, "0.3.1");
        assert_eq!(pkg.dependencies["pydantic"].version, "^2.0");
        assert_eq!(pkg.dependencies["pytest"].kind, DependencyKind::Dev);
        // dev entry overwrites the prod one
        assert_eq!(pkg.dependencies["requests"].version, "^2.30");
        assert_eq!(pkg.dependencies["requests"].kind, DependencyKind::Dev);
    }

    #[test]
    fn test_pep621_preferred_over_poetry() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp.path().join("both"),
            "pyproject.toml",
            r#"
[project]
name = "modern-name"
version = "2.0.0"

[tool.poetry]
name = "legacy-name"
version = "1.0.0"
"#,
        );

        let pkg = try_load_python(temp.path(), &PathBuf::from("both")).unwrap();
        assert_eq!(pkg.name, "modern-name");
        assert_eq!(pkg.version, "2.0.0");
    }

    #[test]
    fn test_missing_version_defaults() {
        let temp = TempDir::new().unwrap();
        write_file(
            &temp.path().join("unversioned"),
            "pyproject.toml",
            "[project]\nname = \"unversioned\"\n",
        );

        let pkg = try_load_python(temp.path(), &PathBuf::from("unversioned")).unwrap();
        assert_eq!(pkg.version, "0.0.0");
    }

    #[test]
    fn test_malformed_pyproject_falls_back_to_setup_py() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("legacy");
        write_file(&dir, "pyproject.toml", "[[[[ not toml");
        write_file(
            &dir,
            "setup.py",
            r#"
from setuptools import setup

setup(
    name="legacy",
    version="0.9.2",
    install_requires=["six>=1.0"],
)
"#,
        );

        let pkg = try_load_python(temp.path(), &PathBuf::from("legacy")).unwrap();
        assert_eq!(pkg.name, "legacy");
        assert_eq!(pkg.version, "0.9.2");
        // setup.py dependency extraction is unsupported
        assert!(pkg.dependencies.is_empty());
    }

    #[test]
    fn test_nameless_pyproject_falls_back_to_setup_py() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("partial");
        write_file(&dir, "pyproject.toml", "[build-system]\nrequires = []\n");
        write_file(&dir, "setup.py", "setup(name='partial')\n");

        let pkg = try_load_python(temp.path(), &PathBuf::from("partial")).unwrap();
        assert_eq!(pkg.name, "partial");
        assert_eq!(pkg.version, "0.0.0");
    }

    #[test]
    fn test_no_manifest_is_none() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        assert!(try_load_python(temp.path(), &PathBuf::from("empty")).is_none());
    }

    #[test]
    fn test_malformed_pyproject_without_setup_py_is_none() {
        let temp = TempDir::new().unwrap();
        write_file(&temp.path().join("broken"), "pyproject.toml", "not toml at all [");
        assert!(try_load_python(temp.path(), &PathBuf::from("broken")).is_none());
    }

    #[test]
    fn test_split_requirement() {
        assert_eq!(
            split_requirement("requests>=2.0"),
            ("requests".to_string(), ">=2.0".to_string())
        );
        assert_eq!(split_requirement("flask"), ("flask".to_string(), "*".to_string()));
        assert_eq!(
            split_requirement("pkg-name.sub~=1.0"),
            ("pkg-name.sub".to_string(), "~=1.0".to_string())
        );
    }
}
