//! Error types for polyver.
//!
//! All operations return `Result<T>` which aliases `Result<T, WorkspaceError>`.

use std::path::PathBuf;
use thiserror::Error;

use crate::workspace::Ecosystem;

/// Errors from workspace discovery and manifest patching.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Auto-detection exhausted the registry without a match.
    #[error("No workspace detected at {0}")]
    NoWorkspaceDetected(PathBuf),

    /// Forced ecosystem name or alias is not registered.
    #[error("Unknown ecosystem '{0}'")]
    UnknownEcosystem(String),

    /// A required workspace-declaration file or field is absent.
    #[error("Workspace manifest missing at {0}: {1}")]
    ManifestMissing(PathBuf, String),

    /// Patch operation is not wired up for this ecosystem.
    ///
    /// Distinguishable from a generic failure so callers can skip or warn.
    #[error("Version updates are not implemented for {0} workspaces")]
    NotImplemented(Ecosystem),

    /// Package not found in the loaded workspace.
    #[error("Package '{0}' not found in workspace")]
    PackageNotFound(String),

    /// Patch request carries neither a version nor dependency updates.
    #[error("Nothing to update: specify --version and/or --dep")]
    EmptyPatch,

    /// Rollback failed after a commit error.
    #[error("Rollback failed: {0}")]
    RollbackFailed(String),

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON parse error in a workspace-declaration file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error in a workspace-declaration file.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML edit error while patching a manifest.
    #[error("TOML error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    /// YAML parse error in a workspace-declaration file.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid glob pattern.
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Glob expansion hit an unreadable path.
    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// Regex compilation failed (indicates bug).
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for polyver operations.
pub type Result<T> = std::result::Result<T, WorkspaceError>;
