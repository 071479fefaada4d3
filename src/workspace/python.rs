//! Python workspace manager.
//!
//! Python has no workspace-declaration file, so the manager treats the root
//! directory itself plus its immediate subdirectories (default pattern `*`)
//! as candidates. Both single-package repositories and flat monorepos load
//! without configuration; anything else needs a `package_patterns` override.

use std::path::Path;

use crate::discovery::find_packages_from_patterns;
use crate::error::Result;
use crate::fs::Transaction;
use crate::manifest::try_load_python;
use crate::patch::update_python_manifest;
use crate::workspace::{Ecosystem, LoadConfig, Package, VersionPatch, Workspace, WorkspaceManager};

const MARKERS: &[&str] = &["pyproject.toml", "setup.py", "requirements.txt"];

pub struct PythonManager;

impl WorkspaceManager for PythonManager {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }

    fn is_workspace(&self, root: &Path) -> bool {
        MARKERS.iter().any(|marker| root.join(marker).exists())
    }

    fn load(&self, root: &Path, config: &LoadConfig) -> Result<Workspace> {
        let patterns = config
            .package_patterns
            .clone()
            .unwrap_or_else(|| vec!["*".to_string()]);

        // The root may itself be a package; it is considered first.
        let mut packages: Vec<Package> = try_load_python(root, Path::new(""))
            .into_iter()
            .collect();
        packages.extend(find_packages_from_patterns(root, &patterns, |r, d| {
            try_load_python(r, d)
        })?);

        Ok(Workspace {
            ecosystem: Ecosystem::Python,
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
        let package_dir = package.dir(&workspace.root);
        update_python_manifest(&package_dir, patch, txn)
    }
}
