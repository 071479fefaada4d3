//! Cargo workspace manager.
//!
//! `[workspace].members` globs drive discovery. A manifest without a
//! `[workspace]` table but with a `[package]` table loads as a
//! single-package workspace rooted at the manifest's own directory.

use std::path::Path;

use serde::Deserialize;

use crate::discovery::find_packages_from_patterns;
use crate::error::{Result, WorkspaceError};
use crate::fs::Transaction;
use crate::manifest::{read_toml_file, try_load_cargo};
use crate::patch::update_cargo_manifest;
use crate::workspace::{Ecosystem, LoadConfig, Package, VersionPatch, Workspace, WorkspaceManager};

#[derive(Debug, Deserialize)]
struct RootManifest {
    workspace: Option<WorkspaceTable>,
    package: Option<PackageTable>,
}

#[derive(Debug, Deserialize)]
struct WorkspaceTable {
    #[serde(default)]
    members: Vec<String>,
    package: Option<WorkspacePackage>,
}

/// `[workspace.package]` keys shared with members via inheritance.
#[derive(Debug, Deserialize)]
struct WorkspacePackage {
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PackageTable {
    #[allow(dead_code)]
    name: Option<String>,
}

pub struct CargoManager;

impl WorkspaceManager for CargoManager {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    fn is_workspace(&self, root: &Path) -> bool {
        root.join("Cargo.toml").exists()
    }

    fn load(&self, root: &Path, config: &LoadConfig) -> Result<Workspace> {
        let manifest_path = root.join("Cargo.toml");
        if !manifest_path.exists() {
            return Err(WorkspaceError::ManifestMissing(
                manifest_path,
                "no Cargo.toml".to_string(),
            ));
        }

        let manifest: RootManifest = read_toml_file(&manifest_path)?;
        let workspace_version = manifest
            .workspace
            .as_ref()
            .and_then(|w| w.package.as_ref())
            .and_then(|p| p.version.clone());

        let patterns = config
            .package_patterns
            .clone()
            .or_else(|| manifest.workspace.as_ref().map(|w| w.members.clone()));

        let packages = match patterns {
            Some(patterns) => find_packages_from_patterns(root, &patterns, |r, d| {
                try_load_cargo(r, d, workspace_version.as_deref())
            })?,
            None if manifest.package.is_some() => {
                // Single-package repository
                try_load_cargo(root, Path::new(""), None)
                    .into_iter()
                    .collect()
            }
            None => {
                return Err(WorkspaceError::ManifestMissing(
                    manifest_path,
                    "no [workspace] or [package] table".to_string(),
                ));
            }
        };

        Ok(Workspace {
            ecosystem: Ecosystem::Cargo,
            root: root.to_path_buf(),
            packages,
        })
    }

    fn update_versions(
        &self,
        workspace: &Workspace,
        package: &Package,
        patch: &VersionPatch,
        txn: &mut Transaction,
    ) -> Result<()> {
        let manifest_path = package.dir(&workspace.root).join("Cargo.toml");
        update_cargo_manifest(&manifest_path, patch, txn)
    }
}
