//! Atomic manifest writes with rollback support.
//!
//! Coordinates the file updates produced by a patch operation so they
//! succeed or fail as a unit.
//!
//! ## Phases
//!
//! 1. **Build**: stage updates via `update_file()`
//! 2. **Validate**: targets exist, are writable, no duplicates
//! 3. **Execute**: apply updates
//! 4. **Rollback** (on failure): restore original content in LIFO order
//!
//! Writes across *separate* transactions stay independent: patching several
//! packages uses one transaction per package, and a crash mid-batch leaves
//! the earlier packages updated.

use crate::error::{Result, WorkspaceError};

use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A staged file update that can be committed or rolled back.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Update file contents. Stores original content for rollback.
    UpdateFile {
        path: PathBuf,
        original: String,
        new: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    /// Staging operations.
    Building,
    /// All operations succeeded.
    Committed,
    /// Manually rolled back after commit.
    RolledBack,
    /// Validation failed; nothing executed.
    Failed,
}

/// Transaction coordinating manifest writes.
///
/// Must be explicitly committed. When `dry_run = true`, operations are
/// staged and validated but never executed.
#[must_use = "Transaction must be committed or rolled back"]
pub struct Transaction {
    operations: Vec<Operation>,
    dry_run: bool,
    state: TransactionState,
    executed_indices: Vec<usize>,
}

impl Transaction {
    /// Creates a new transaction.
    pub fn new(dry_run: bool) -> Self {
        Self {
            operations: Vec::new(),
            dry_run,
            state: TransactionState::Building,
            executed_indices: Vec::new(),
        }
    }

    /// Stages a file update.
    ///
    /// Reads current content and compares it to `new_content`. If identical,
    /// the update is skipped (idempotent). Otherwise it is staged for commit.
    pub fn update_file(&mut self, path: PathBuf, new_content: String) -> Result<()> {
        if self.state != TransactionState::Building {
            return Err(WorkspaceError::Other(anyhow::anyhow!(
                "Cannot modify transaction after commit/rollback"
            )));
        }

        log::debug!("Staging update for: {}", path.display());

        let original = fs::read_to_string(&path).map_err(|e| {
            WorkspaceError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))
        })?;

        if original == new_content {
            log::debug!("Content unchanged, skipping: {}", path.display());
            return Ok(());
        }

        if self.dry_run {
            log::info!("Would update: {}", path.display());
        }

        self.operations.push(Operation::UpdateFile {
            path,
            original,
            new: new_content,
        });

        Ok(())
    }

    /// Validates all staged operations.
    fn validate(&self) -> Result<()> {
        let mut file_paths = HashSet::new();

        for op in &self.operations {
            let Operation::UpdateFile { path, .. } = op;

            if !file_paths.insert(path.clone()) {
                return Err(WorkspaceError::Other(anyhow::anyhow!(
                    "Duplicate file operation: {}",
                    path.display()
                )));
            }

            if !path.exists() {
                return Err(WorkspaceError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File no longer exists: {}", path.display()),
                )));
            }

            if let Ok(metadata) = fs::metadata(path)
                && metadata.permissions().readonly()
            {
                return Err(WorkspaceError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("File is read-only: {}", path.display()),
                )));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns true if successfully committed.
    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    /// Returns human-readable preview of operations.
    pub fn preview(&self) -> Vec<String> {
        self.operations
            .iter()
            .map(|op| {
                let Operation::UpdateFile { path, .. } = op;
                format!("Update: {}", path.display())
            })
            .collect()
    }

    /// Commits all staged operations atomically.
    ///
    /// On a mid-commit failure the already-executed writes are rolled back.
    pub fn commit(&mut self) -> Result<()> {
        if self.state != TransactionState::Building {
            return Err(WorkspaceError::Other(anyhow::anyhow!(
                "Transaction already committed/rolled back"
            )));
        }

        if self.dry_run {
            self.state = TransactionState::Committed;
            return Ok(());
        }

        if let Err(e) = self.validate() {
            self.state = TransactionState::Failed;
            return Err(e);
        }

        for idx in 0..self.operations.len() {
            let Operation::UpdateFile { path, new, .. } = &self.operations[idx];
            let write_result = fs::write(path, new).map_err(|e| {
                WorkspaceError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write {}: {}", path.display(), e),
                ))
            });

            if let Err(e) = write_result {
                log::error!("Commit failed at {}, rolling back", path.display());
                self.rollback_partial()?;
                return Err(e);
            }

            self.executed_indices.push(idx);
            log::debug!("Updated: {}", path.display());
        }

        self.state = TransactionState::Committed;
        Ok(())
    }

    /// Manually rolls back a committed transaction.
    pub fn rollback(&mut self) -> Result<()> {
        match self.state {
            TransactionState::Building => Ok(()),
            TransactionState::Committed if self.dry_run => Ok(()),
            TransactionState::Committed => {
                self.executed_indices = (0..self.operations.len()).collect();
                self.rollback_partial()
            }
            TransactionState::Failed => Err(WorkspaceError::Other(anyhow::anyhow!(
                "Transaction failed; rollback already attempted"
            ))),
            TransactionState::RolledBack => Err(WorkspaceError::Other(anyhow::anyhow!(
                "Transaction already rolled back"
            ))),
        }
    }

    /// Rolls back executed operations only, in LIFO order.
    fn rollback_partial(&mut self) -> Result<()> {
        let mut errors = Vec::new();

        for &idx in self.executed_indices.iter().rev() {
            let Operation::UpdateFile { path, original, .. } = &self.operations[idx];
            if let Err(e) = fs::write(path, original) {
                errors.push(format!("Failed to restore {}: {}", path.display(), e));
            }
        }

        if errors.is_empty() {
            self.state = TransactionState::RolledBack;
            log::info!("Rollback completed");
            Ok(())
        } else {
            Err(WorkspaceError::RollbackFailed(errors.join("; ")))
        }
    }

    /// Prints a summary of updated manifests to stdout.
    ///
    /// Paths are shown relative to `workspace_root` with forward slashes.
    pub fn print_summary(&self, workspace_root: &Path) {
        if self.operations.is_empty() {
            println!("\n{}", "No changes needed".yellow());
            return;
        }

        let display_path = |path: &Path| -> String {
            let relative =
                pathdiff::diff_paths(path, workspace_root).unwrap_or_else(|| path.to_path_buf());
            relative.to_string_lossy().replace('\\', "/")
        };

        if self.dry_run {
            println!("\n{}", "DRY RUN - No changes will be made".yellow().bold());
        } else {
            println!("\n{}", "Changes applied:".green().bold());
        }

        for op in &self.operations {
            let Operation::UpdateFile { path, .. } = op;
            if self.dry_run {
                println!("   • {}", display_path(path).dimmed());
            } else {
                println!("   {} {}", "✓".green(), display_path(path).dimmed());
            }
        }

        println!();
        let num_ops = self.operations.len();
        if self.dry_run {
            println!(
                "{} {} would be modified. Run without {} to apply.",
                num_ops.to_string().cyan().bold(),
                if num_ops > 1 { "manifests" } else { "manifest" },
                "--dry-run".cyan()
            );
        } else {
            println!(
                "{} Updated {} {}",
                "✓".green().bold(),
                num_ops,
                if num_ops > 1 { "manifests" } else { "manifest" },
            );
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Building && !self.operations.is_empty() && !self.dry_run
        {
            log::warn!("Transaction dropped without commit");
        }
    }
}
