//! Per-dialect manifest readers.
//!
//! Each reader implements the same shape: `try_load(root, dir)` inspects one
//! candidate directory and returns `Some(Package)` when it holds a resolvable
//! manifest. Everything that can go wrong inside a candidate (missing file,
//! parse failure, missing name) yields `None`; discovery is best-effort over
//! a superset of directories and a single malformed manifest must not abort
//! the scan.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Result;

pub mod cargo;
pub mod node;
pub mod python;

pub use cargo::try_load_cargo;
pub use node::try_load_node;
pub use python::try_load_python;

/// Reads and parses a JSON file into a typed value.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Reads and parses a TOML file into a typed value.
pub fn read_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Reads and parses a YAML file into a typed value.
pub fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Normalizes a workspace-root-relative directory to a slash-separated string.
///
/// The root itself maps to `"."` so that joining it back onto the root is a
/// no-op on every platform.
pub(crate) fn relative_path_str(rel: &Path) -> String {
    if rel.as_os_str().is_empty() {
        ".".to_string()
    } else {
        rel.to_string_lossy().replace('\\', "/")
    }
}
