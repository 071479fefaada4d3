//! Rush workspace manager.
//!
//! `rush.json` enumerates member projects explicitly (no globs) and allows
//! comments, so it is parsed as JSONC. Version updates go through Rush's own
//! change-file tooling, not this crate; `update_versions` reports that as a
//! distinct error kind.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::discovery::find_packages_from_patterns;
use crate::error::{Result, WorkspaceError};
use crate::fs::Transaction;
use crate::manifest::try_load_node;
use crate::workspace::{Ecosystem, LoadConfig, Package, VersionPatch, Workspace, WorkspaceManager};

#[derive(Debug, Deserialize)]
struct RushConfig {
    #[serde(default)]
    projects: Vec<RushProject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RushProject {
    package_name: String,
    project_folder: String,
}

pub struct RushManager;

impl WorkspaceManager for RushManager {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Rush
    }

    fn is_workspace(&self, root: &Path) -> bool {
        root.join("rush.json").exists()
    }

    fn load(&self, root: &Path, config: &LoadConfig) -> Result<Workspace> {
        let manifest_path = root.join("rush.json");
        if !manifest_path.exists() {
            return Err(WorkspaceError::ManifestMissing(
                manifest_path,
                "no rush.json".to_string(),
            ));
        }

        // Explicit pattern override takes precedence over declared projects.
        if let Some(patterns) = &config.package_patterns {
            let packages = find_packages_from_patterns(root, patterns, |r, d| try_load_node(r, d))?;
            return Ok(Workspace {
                ecosystem: Ecosystem::Rush,
                root: root.to_path_buf(),
                packages,
            });
        }

        let content = fs::read_to_string(&manifest_path)?;
        let value = jsonc_parser::parse_to_serde_value(&content, &Default::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse rush.json: {e}"))?
            .ok_or_else(|| {
                WorkspaceError::ManifestMissing(manifest_path, "empty rush.json".to_string())
            })?;
        let rush: RushConfig = serde_json::from_value(value)?;

        let mut packages = Vec::new();
        for project in &rush.projects {
            let Some(pkg) = try_load_node(root, Path::new(&project.project_folder)) else {
                log::debug!("Skipping rush project without manifest: {}", project.project_folder);
                continue;
            };
            if pkg.name != project.package_name {
                log::warn!(
                    "rush.json declares '{}' for {} but the manifest says '{}'",
                    project.package_name,
                    project.project_folder,
                    pkg.name
                );
            }
            packages.push(pkg);
        }

        Ok(Workspace {
            ecosystem: Ecosystem::Rush,
            root: root.to_path_buf(),
            packages,
        })
    }

    fn update_versions(
        &self,
        _workspace: &Workspace,
        _package: &Package,
        _patch: &VersionPatch,
        _txn: &mut Transaction,
    ) -> Result<()> {
        Err(WorkspaceError::NotImplemented(Ecosystem::Rush))
    }
}
