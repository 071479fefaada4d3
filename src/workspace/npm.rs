//! npm workspace manager.
//!
//! An npm workspace is a root `package.json` with a `workspaces` field, in
//! either the plain array form or the `{ "packages": [...] }` object form.

use std::path::Path;

use serde::Deserialize;

use crate::discovery::find_packages_from_patterns;
use crate::error::{Result, WorkspaceError};
use crate::fs::Transaction;
use crate::manifest::{read_json_file, try_load_node};
use crate::patch::update_package_json;
use crate::workspace::{Ecosystem, LoadConfig, Package, VersionPatch, Workspace, WorkspaceManager};

#[derive(Debug, Deserialize)]
struct RootManifest {
    workspaces: Option<WorkspacesField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    Patterns(Vec<String>),
    Detailed { packages: Vec<String> },
}

impl WorkspacesField {
    fn into_patterns(self) -> Vec<String> {
        match self {
            WorkspacesField::Patterns(patterns) => patterns,
            WorkspacesField::Detailed { packages } => packages,
        }
    }
}

pub struct NpmManager;

impl WorkspaceManager for NpmManager {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn is_workspace(&self, root: &Path) -> bool {
        root.join("package.json").exists()
    }

    fn load(&self, root: &Path, config: &LoadConfig) -> Result<Workspace> {
        let manifest_path = root.join("package.json");
        if !manifest_path.exists() {
            return Err(WorkspaceError::ManifestMissing(
                manifest_path,
                "no package.json".to_string(),
            ));
        }

        let manifest: RootManifest = read_json_file(&manifest_path)?;
        let declared = manifest
            .workspaces
            .map(WorkspacesField::into_patterns)
            .ok_or_else(|| {
                WorkspaceError::ManifestMissing(
                    manifest_path,
                    "no `workspaces` field".to_string(),
                )
            })?;

        let patterns = config.package_patterns.clone().unwrap_or(declared);
        let packages = find_packages_from_patterns(root, &patterns, |r, d| try_load_node(r, d))?;

        Ok(Workspace {
            ecosystem: Ecosystem::Npm,
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
