use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::error::{Result, WorkspaceError};
use crate::fs::Transaction;
use crate::workspace::{self, LoadConfig, VersionPatch};

#[derive(Parser, Debug, Clone)]
pub struct SetArgs {
    /// Name of the package to update
    pub package: String,

    /// New version for the package itself
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Dependency update in NAME=VERSION form (repeatable)
    #[arg(long = "dep", value_name = "NAME=VERSION", value_parser = parse_dep)]
    pub deps: Vec<(String, String)>,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Ecosystem to load, or "auto" to detect
    #[arg(long, short = 'e', default_value = "auto")]
    pub ecosystem: String,

    /// Glob pattern overriding the ecosystem's package patterns (repeatable)
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,

    /// Show what would change without applying any modifications
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

fn parse_dep(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .filter(|(name, version)| !name.is_empty() && !version.is_empty())
        .map(|(name, version)| (name.to_string(), version.to_string()))
        .ok_or_else(|| format!("expected NAME=VERSION, got '{s}'"))
}

impl SetArgs {
    fn patch(&self) -> VersionPatch {
        VersionPatch {
            new_version: self.version.clone(),
            dependencies: self.deps.iter().cloned().collect(),
        }
    }

    fn load_config(&self) -> LoadConfig {
        LoadConfig {
            package_patterns: if self.patterns.is_empty() {
                None
            } else {
                Some(self.patterns.clone())
            },
        }
    }
}

pub fn execute(args: SetArgs) -> Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        return Err(WorkspaceError::EmptyPatch);
    }

    let manager = workspace::resolve(&args.root, Some(args.ecosystem.as_str()))?;
    let ws = manager.load(&args.root, &args.load_config())?;

    let package = ws
        .package(&args.package)
        .ok_or_else(|| WorkspaceError::PackageNotFound(args.package.clone()))?;

    log::debug!(
        "Patching {} ({} at {})",
        package.name,
        package.version,
        package.relative_path
    );

    let mut txn = Transaction::new(args.dry_run);
    manager.update_versions(&ws, package, &patch, &mut txn)?;
    txn.commit()?;

    txn.print_summary(&ws.root);

    if !args.dry_run && !txn.is_empty() {
        if let Some(version) = &patch.new_version {
            println!(
                "{} {} → {}",
                "✓ Updated".green().bold(),
                args.package.yellow(),
                version.green().bold()
            );
        }
    }

    Ok(())
}
