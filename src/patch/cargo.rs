//! `Cargo.toml` patching via `toml_edit`.

use std::fs;
use std::path::Path;

use toml_edit::{DocumentMut, Item, value};

use crate::error::Result;
use crate::fs::Transaction;
use crate::workspace::VersionPatch;

const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Applies `patch` to a crate's `Cargo.toml`, preserving formatting and
/// comments.
///
/// - `package.version` is set unless it is inherited
///   (`version.workspace = true`), which is left alone.
/// - Patched dependencies are updated across all dependency tables: string
///   values are replaced, table values get their `version` key rewritten,
///   `workspace = true` entries without a `version` key are skipped.
pub fn update_cargo_manifest(path: &Path, patch: &VersionPatch, txn: &mut Transaction) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let mut doc: DocumentMut = content.parse()?;

    if let Some(version) = &patch.new_version
        && let Some(package) = doc.get_mut("package").and_then(Item::as_table_like_mut)
    {
        let inherited = package
            .get("version")
            .is_some_and(|item| item.as_table_like().is_some());
        if inherited {
            log::debug!("Skipping inherited version in {}", path.display());
        } else {
            package.insert("version", value(version.as_str()));
        }
    }

    for (name, version) in &patch.dependencies {
        for table_name in DEPENDENCY_TABLES {
            let Some(deps) = doc.get_mut(table_name).and_then(Item::as_table_like_mut) else {
                continue;
            };
            let Some(entry) = deps.get_mut(name) else {
                continue;
            };

            if entry.as_str().is_some() {
                *entry = value(version.as_str());
            } else if let Some(dep_table) = entry.as_table_like_mut()
                && dep_table.contains_key("version")
            {
                dep_table.insert("version", value(version.as_str()));
            }
        }
    }

    let updated = doc.to_string();
    if updated != content {
        txn.update_file(path.to_path_buf(), updated)?;
    }
    Ok(())
}
