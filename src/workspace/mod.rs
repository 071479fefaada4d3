//! Workspace model and per-ecosystem managers.
//!
//! A [`WorkspaceManager`] bundles everything polyver knows about one
//! package-manager ecosystem: how to recognize its workspace markers, how to
//! enumerate its packages, and how to rewrite a package manifest in place.
//! Exactly one manager exists per ecosystem; all of them live in a fixed,
//! priority-ordered registry that is never mutated after startup.
//!
//! Detection order matters. A directory can satisfy several predicates at
//! once (a `package.json` with a `workspaces` field next to a `setup.py`),
//! so [`resolve`] walks the registry front to back and the most specific
//! markers are registered first: Rush, pnpm, npm, Cargo, Python.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, WorkspaceError};
use crate::fs::Transaction;

pub mod cargo;
pub mod npm;
pub mod pnpm;
pub mod python;
pub mod rush;

pub use cargo::CargoManager;
pub use npm::NpmManager;
pub use pnpm::PnpmManager;
pub use python::PythonManager;
pub use rush::RushManager;

/// A supported package-manager ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Rush,
    Pnpm,
    Npm,
    Cargo,
    Python,
}

impl Ecosystem {
    /// Canonical name, as accepted by `--ecosystem` and printed in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Rush => "rush",
            Ecosystem::Pnpm => "pnpm",
            Ecosystem::Npm => "npm",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Python => "python",
        }
    }

    /// Alternative names accepted when forcing an ecosystem.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Rush => &[],
            Ecosystem::Pnpm => &[],
            Ecosystem::Npm => &["node", "javascript", "js"],
            Ecosystem::Cargo => &["rust", "crates"],
            Ecosystem::Python => &["pip", "py"],
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a dependency was declared in a production or development section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Prod,
    Dev,
}

/// A single declared dependency with its raw, ecosystem-native range string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySpec {
    pub name: String,
    /// Raw range string as written in the manifest (`^1.2.0`, `>=2.0`, `*`).
    pub version: String,
    pub kind: DependencyKind,
}

/// One package discovered inside a workspace.
///
/// Immutable snapshot of on-disk state at `load()` time. Patching rewrites
/// the manifest on disk, not this record; reload to observe the change.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Workspace-root-relative path, slash-separated on every platform.
    pub relative_path: String,
    /// Merged prod + dev dependencies, keyed by name in insertion order.
    /// On a name collision the later insertion wins (dev overwrites prod).
    pub dependencies: IndexMap<String, DependencySpec>,
}

impl Package {
    /// Absolute directory of this package under `root`.
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.relative_path)
    }
}

/// A resolved workspace: root directory, ecosystem tag, and packages in
/// discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct Workspace {
    pub ecosystem: Ecosystem,
    pub root: PathBuf,
    pub packages: Vec<Package>,
}

impl Workspace {
    /// Looks up a package by name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Caller-supplied load configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    /// Glob patterns overriding the ecosystem's default/declared patterns.
    pub package_patterns: Option<Vec<String>>,
}

/// A version/dependency update request for a single package.
#[derive(Debug, Clone, Default)]
pub struct VersionPatch {
    /// New version for the package itself; `None` leaves the field alone.
    pub new_version: Option<String>,
    /// Dependency name → new version.
    pub dependencies: BTreeMap<String, String>,
}

impl VersionPatch {
    pub fn is_empty(&self) -> bool {
        self.new_version.is_none() && self.dependencies.is_empty()
    }
}

/// Capability object for one ecosystem.
///
/// Managers hold no state; they are unit structs registered once in
/// [`managers`].
pub trait WorkspaceManager: Send + Sync {
    /// Identity tag of this manager.
    fn ecosystem(&self) -> Ecosystem;

    /// True iff at least one of the ecosystem's marker files is present.
    ///
    /// Marker presence only; the file content is not validated here.
    fn is_workspace(&self, root: &Path) -> bool;

    /// Discovers the full workspace under `root`.
    fn load(&self, root: &Path, config: &LoadConfig) -> Result<Workspace>;

    /// Stages a rewrite of `package`'s manifest into `txn`.
    ///
    /// Re-reads the manifest from disk; a patch that matches nothing stages
    /// no write and is not an error. Returns
    /// [`WorkspaceError::NotImplemented`] for ecosystems without patch
    /// support.
    fn update_versions(
        &self,
        workspace: &Workspace,
        package: &Package,
        patch: &VersionPatch,
        txn: &mut Transaction,
    ) -> Result<()>;
}

/// The fixed, priority-ordered registry of known managers.
///
/// Most specific workspace markers come first so that auto-detection is
/// deterministic when a root satisfies several predicates.
pub fn managers() -> &'static [&'static dyn WorkspaceManager] {
    static MANAGERS: [&dyn WorkspaceManager; 5] = [
        &RushManager,
        &PnpmManager,
        &NpmManager,
        &CargoManager,
        &PythonManager,
    ];
    &MANAGERS
}

/// Auto-detects the workspace ecosystem at `root`.
pub fn detect(root: &Path) -> Result<&'static dyn WorkspaceManager> {
    for manager in managers() {
        if manager.is_workspace(root) {
            log::debug!("Detected {} workspace at {}", manager.ecosystem(), root.display());
            return Ok(*manager);
        }
    }
    Err(WorkspaceError::NoWorkspaceDetected(root.to_path_buf()))
}

/// Resolves a manager from an ecosystem name, alias, or `"auto"`.
///
/// Forcing a concrete ecosystem never calls `is_workspace`; detection is
/// bypassed so a caller can load an atypical layout.
pub fn resolve(root: &Path, selector: Option<&str>) -> Result<&'static dyn WorkspaceManager> {
    match selector {
        None => detect(root),
        Some(name) if name.eq_ignore_ascii_case("auto") => detect(root),
        Some(name) => by_name(name).ok_or_else(|| WorkspaceError::UnknownEcosystem(name.to_string())),
    }
}

fn by_name(name: &str) -> Option<&'static dyn WorkspaceManager> {
    managers().iter().copied().find(|m| {
        let eco = m.ecosystem();
        eco.as_str().eq_ignore_ascii_case(name)
            || eco.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
    })
}
