//! Shared fixtures for polyver integration tests.
//!
//! Each helper builds a small but realistic workspace in a temp directory
//! and returns the `TempDir` guard; tests drive the CLI against it.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// npm workspace: root `package.json` with two members under `packages/`.
#[allow(unused)]
pub fn npm_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();

    write(
        &temp.path().join("package.json"),
        r#"{
  "name": "acme",
  "private": true,
  "workspaces": ["packages/*"]
}
"#,
    );
    write(
        &temp.path().join("packages/pkg-a/package.json"),
        r#"{
  "name": "pkg-a",
  "version": "1.0.0",
  "dependencies": {
    "pkg-b": "^1.0.0"
  }
}
"#,
    );
    write(
        &temp.path().join("packages/pkg-b/package.json"),
        r#"{
  "name": "pkg-b",
  "version": "1.0.0"
}
"#,
    );

    temp
}

/// Python monorepo: two PEP 621 packages and one Poetry package.
#[allow(unused)]
pub fn python_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();

    write(&temp.path().join("requirements.txt"), "");
    write(
        &temp.path().join("api/pyproject.toml"),
        r#"[project]
name = "api"
version = "1.0.0"
dependencies = ["shared>=1.0", "requests>=2.28"]
"#,
    );
    write(
        &temp.path().join("shared/pyproject.toml"),
        r#"[project]
name = "shared"
version = "1.0.0"
"#,
    );
    write(
        &temp.path().join("worker/pyproject.toml"),
        r#"[tool.poetry]
name = "worker"
version = "0.5.0"

[tool.poetry.dependencies]
shared = "1.0.0"
"#,
    );

    temp
}

/// Cargo workspace with two member crates.
#[allow(unused)]
pub fn cargo_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();

    write(
        &temp.path().join("Cargo.toml"),
        "[workspace]\nmembers = [\"crates/core\", \"crates/app\"]\nresolver = \"2\"\n",
    );
    write(
        &temp.path().join("crates/core/Cargo.toml"),
        "[package]\nname = \"core\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
    );
    write(
        &temp.path().join("crates/app/Cargo.toml"),
        r#"[package]
name = "app"
version = "0.1.0"
edition = "2021"

[dependencies]
core = { path = "../core", version = "0.1.0" }
"#,
    );

    temp
}

/// Rush workspace with two declared projects.
#[allow(unused)]
pub fn rush_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();

    write(
        &temp.path().join("rush.json"),
        r#"{
  // Comments are allowed in rush.json
  "rushVersion": "5.100.0",
  "projects": [
    { "packageName": "app", "projectFolder": "apps/app" },
    { "packageName": "ui", "projectFolder": "libs/ui" }
  ]
}
"#,
    );
    write(
        &temp.path().join("apps/app/package.json"),
        r#"{"name": "app", "version": "1.0.0"}"#,
    );
    write(
        &temp.path().join("libs/ui/package.json"),
        r#"{"name": "ui", "version": "1.0.0"}"#,
    );

    temp
}
