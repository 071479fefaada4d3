//! `package.json` patching.
//!
//! JSON is rewritten textually rather than re-serialized so that key order,
//! indentation, and trailing newlines survive the edit untouched.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::Result;
use crate::fs::Transaction;
use crate::workspace::VersionPatch;

/// Applies `patch` to a `package.json`.
///
/// The package's own `"version"` field is rewritten at its first occurrence
/// only; dependency entries (`"name": "range"`) are rewritten wherever they
/// appear, which covers both `dependencies` and `devDependencies`. A patch
/// that matches nothing stages no write.
pub fn update_package_json(path: &Path, patch: &VersionPatch, txn: &mut Transaction) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let mut updated = content.clone();

    if let Some(version) = &patch.new_version {
        let re = Regex::new(r#""version"(\s*:\s*")[^"]*(")"#)?;
        updated = re
            .replace(&updated, format!("\"version\"${{1}}{version}${{2}}"))
            .into_owned();
    }

    for (name, version) in &patch.dependencies {
        let escaped = regex::escape(name);
        let re = Regex::new(&format!(r#""{escaped}"(\s*:\s*")[^"]*(")"#))?;
        updated = re
            .replace_all(&updated, format!("\"{name}\"${{1}}{version}${{2}}"))
            .into_owned();
    }

    if updated != content {
        txn.update_file(path.to_path_buf(), updated)?;
    }
    Ok(())
}
