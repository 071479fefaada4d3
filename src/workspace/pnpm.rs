//! pnpm workspace manager.
//!
//! Marker and declaration file is `pnpm-workspace.yaml`; member packages are
//! ordinary `package.json` packages, so loading and patching share the node
//! reader and patcher with the npm manager.

use std::path::Path;

use serde::Deserialize;

use crate::discovery::find_packages_from_patterns;
use crate::error::{Result, WorkspaceError};
use crate::fs::Transaction;
use crate::manifest::{read_yaml_file, try_load_node};
use crate::patch::update_package_json;
use crate::workspace::{Ecosystem, LoadConfig, Package, VersionPatch, Workspace, WorkspaceManager};

#[derive(Debug, Deserialize)]
struct PnpmWorkspace {
    packages: Option<Vec<String>>,
}

pub struct PnpmManager;

impl WorkspaceManager for PnpmManager {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pnpm
    }

    fn is_workspace(&self, root: &Path) -> bool {
        root.join("pnpm-workspace.yaml").exists()
    }

    fn load(&self, root: &Path, config: &LoadConfig) -> Result<Workspace> {
        let manifest_path = root.join("pnpm-workspace.yaml");
        if !manifest_path.exists() {
            return Err(WorkspaceError::ManifestMissing(
                manifest_path,
                "no pnpm-workspace.yaml".to_string(),
            ));
        }

        let manifest: PnpmWorkspace = read_yaml_file(&manifest_path)?;
        let declared = manifest.packages.ok_or_else(|| {
            WorkspaceError::ManifestMissing(manifest_path, "no `packages` list".to_string())
        })?;

        let patterns = config.package_patterns.clone().unwrap_or(declared);
        let packages = find_packages_from_patterns(root, &patterns, |r, d| try_load_node(r, d))?;

        Ok(Workspace {
            ecosystem: Ecosystem::Pnpm,
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
        let manifest_path = package.dir(&workspace.root).join("package.json");
        update_package_json(&manifest_path, patch, txn)
    }
}
