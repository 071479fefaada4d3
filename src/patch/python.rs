//! Python manifest patching: `pyproject.toml` and `setup.py`.
//!
//! `pyproject.toml` comes in two logical schemas (PEP 621 `[project]` table,
//! Poetry `[tool.poetry]` tables) and the fixtures this tool is pointed at
//! also use a YAML-flavored `key: value` encoding, so every rewrite is tried
//! against each physical form in a fixed order. All substitutions are
//! literal-text regex rewrites over the whole file content, not structural
//! edits.
//!
//! Known-lossy behavior, kept on purpose: a PEP 621 dependency-array entry
//! is rewritten to the normalized `"name>=version"` form regardless of the
//! original comparator.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::Result;
use crate::fs::Transaction;
use crate::workspace::VersionPatch;

/// Rewrites the manifest of the package at `package_dir` in place.
///
/// Targets `pyproject.toml` when present, else `setup.py`. The file content
/// is re-read from disk on every call; there is no in-memory manifest cache.
pub fn update_python_manifest(
    package_dir: &Path,
    patch: &VersionPatch,
    txn: &mut Transaction,
) -> Result<()> {
    let pyproject_path = package_dir.join("pyproject.toml");
    if pyproject_path.exists() {
        return update_pyproject(&pyproject_path, patch, txn);
    }

    let setup_path = package_dir.join("setup.py");
    if setup_path.exists() {
        return update_setup_py(&setup_path, patch, txn);
    }

    log::warn!("No patchable manifest in {}", package_dir.display());
    Ok(())
}

/// Applies `patch` to a `pyproject.toml`.
pub fn update_pyproject(path: &Path, patch: &VersionPatch, txn: &mut Transaction) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let mut updated = content.clone();

    if let Some(version) = &patch.new_version {
        updated = rewrite_version(&updated, version)?;
    }
    for (name, version) in &patch.dependencies {
        updated = rewrite_dependency(&updated, name, version)?;
    }

    if updated != content {
        txn.update_file(path.to_path_buf(), updated)?;
    }
    Ok(())
}

/// Applies `patch` to a `setup.py`, mirroring the pyproject rewrites with
/// the same best-effort caveat.
pub fn update_setup_py(path: &Path, patch: &VersionPatch, txn: &mut Transaction) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let mut updated = content.clone();

    if let Some(version) = &patch.new_version {
        let re = Regex::new(r#"(version\s*=\s*["'])[^"']*(["'])"#)?;
        updated = re
            .replace(&updated, format!("${{1}}{version}${{2}}"))
            .into_owned();
    }
    for (name, version) in &patch.dependencies {
        updated = rewrite_requirement_entries(&updated, name, version)?;
    }

    if updated != content {
        txn.update_file(path.to_path_buf(), updated)?;
    }
    Ok(())
}

/// Rewrites the package's own version field.
///
/// Fallback chain: YAML-flavored `version: x` (first match only), then
/// TOML-flavored `version = "x"` scoped to `[project]`, then scoped to
/// `[tool.poetry]`. Scoping keeps the substitution away from a same-named
/// key in a different table.
fn rewrite_version(content: &str, new_version: &str) -> Result<String> {
    let yaml_re = Regex::new(r#"(?m)^(\s*["']?version["']?\s*:\s*).*$"#)?;
    if let Cow::Owned(updated) = yaml_re.replace(content, format!("${{1}}{new_version}")) {
        return Ok(updated);
    }

    if let Some(updated) = rewrite_version_in_table(content, "project", new_version)? {
        return Ok(updated);
    }
    if let Some(updated) = rewrite_version_in_table(content, "tool.poetry", new_version)? {
        return Ok(updated);
    }

    Ok(content.to_string())
}

/// Replaces `version = "..."` inside one named table region only.
fn rewrite_version_in_table(
    content: &str,
    table: &str,
    new_version: &str,
) -> Result<Option<String>> {
    let Some((start, end)) = table_span(content, table)? else {
        return Ok(None);
    };

    let re = Regex::new(r#"(?m)^(\s*version\s*=\s*["'])[^"']*(["'])"#)?;
    match re.replace(&content[start..end], format!("${{1}}{new_version}${{2}}")) {
        Cow::Borrowed(_) => Ok(None),
        Cow::Owned(region) => {
            let mut updated = String::with_capacity(content.len() + new_version.len());
            updated.push_str(&content[..start]);
            updated.push_str(&region);
            updated.push_str(&content[end..]);
            Ok(Some(updated))
        }
    }
}

/// Byte span of a table's body: from the end of its header line to the next
/// table header (or end of file).
fn table_span(content: &str, table: &str) -> Result<Option<(usize, usize)>> {
    let header = Regex::new(&format!(r"(?m)^\[{}\]\s*$", regex::escape(table)))?;
    let Some(m) = header.find(content) else {
        return Ok(None);
    };

    let start = m.end();
    let next_header = Regex::new(r"(?m)^\[")?;
    let end = next_header
        .find_at(content, start)
        .map_or(content.len(), |m| m.start());
    Ok(Some((start, end)))
}

/// Rewrites every occurrence of one dependency's version string.
///
/// Three independent passes: YAML-flavored `name: x`, Poetry-style
/// `name = "x"` assignment, PEP 621 array entry `"name<constraint>"` (the
/// last normalized to `"name>=x"`).
fn rewrite_dependency(content: &str, name: &str, new_version: &str) -> Result<String> {
    let escaped = regex::escape(name);

    let yaml_re = Regex::new(&format!(r#"(?m)^(\s*["']?{escaped}["']?\s*:\s*).*$"#))?;
    let mut updated = yaml_re
        .replace_all(content, format!("${{1}}{new_version}"))
        .into_owned();

    let assign_re = Regex::new(&format!(
        r#"(?m)^(\s*["']?{escaped}["']?\s*=\s*["'])[^"']*(["'])"#
    ))?;
    updated = assign_re
        .replace_all(&updated, format!("${{1}}{new_version}${{2}}"))
        .into_owned();

    rewrite_requirement_entries(&updated, name, new_version)
}

/// Rewrites quoted requirement entries (`"name>=1.0"`) to `"name>=new"`.
fn rewrite_requirement_entries(content: &str, name: &str, new_version: &str) -> Result<String> {
    let escaped = regex::escape(name);
    let entry_re = Regex::new(&format!(r#"(["']){escaped}\s*[<>=!~^][^"']*(["'])"#))?;
    Ok(entry_re
        .replace_all(content, format!("${{1}}{name}>={new_version}${{2}}"))
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn apply_pyproject(content: &str, patch: &VersionPatch) -> String {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pyproject.toml");
        fs::write(&path, content).unwrap();

        let mut txn = Transaction::new(false);
        update_pyproject(&path, patch, &mut txn).unwrap();
        txn.commit().unwrap();

        fs::read_to_string(&path).unwrap()
    }

    fn version_patch(version: &str) -> VersionPatch {
        VersionPatch {
            new_version: Some(version.to_string()),
            dependencies: BTreeMap::new(),
        }
    }

    fn dep_patch(name: &str, version: &str) -> VersionPatch {
        VersionPatch {
            new_version: None,
            dependencies: BTreeMap::from([(name.to_string(), version.to_string())]),
        }
    }

    #[test]
    fn test_version_only_leaves_dependencies_untouched() {
        let input = r#"[project]
name = "api"
version = "1.0.0"
dependencies = ["requests>=2.0"]
"#;
        let result = apply_pyproject(input, &version_patch("2.0.0"));
        assert!(result.contains(r#"version = "2.0.0""#));
        assert!(result.contains(r#""requests>=2.0""#));
    }

    #[test]
    fn test_version_scoped_to_project_table() {
        let input = r#"[build-system]
requires = ["hatchling"]

[project]
name = "api"
version = "1.0.0"

[tool.other]
version = "9.9.9"
"#;
        let result = apply_pyproject(input, &version_patch("2.0.0"));
        assert!(result.contains("version = \"2.0.0\""));
        // The same-named key in an unrelated table is untouched
        assert!(result.contains("version = \"9.9.9\""));
    }

    #[test]
    fn test_version_poetry_table_fallback() {
        let input = r#"[tool.poetry]
name = "worker"
version = "0.3.1"
"#;
        let result = apply_pyproject(input, &version_patch("0.4.0"));
        assert!(result.contains(r#"version = "0.4.0""#));
    }

    #[test]
    fn test_version_yaml_flavor_first_match_only() {
        let input = "name: pkg\nversion: 1.0.0\nnested:\n  version: 5.5.5\n";
        let result = apply_pyproject(input, &version_patch("2.0.0"));
        assert!(result.contains("version: 2.0.0"));
        // Only the first occurrence is rewritten
        assert!(result.contains("version: 5.5.5"));
    }

    #[test]
    fn test_no_match_is_byte_identical() {
        let input = r#"[project]
name = "api"
version = "1.0.0"
dependencies = ["requests>=2.0"]
"#;
        let result = apply_pyproject(input, &dep_patch("absent-dep", "2.0.0"));
        assert_eq!(result, input);
    }

    #[test]
    fn test_poetry_yaml_flavor_dependency() {
        let input = "tool:\n  poetry:\n    dependencies:\n      \"pkg-b\": \"1.0.0\"\n";
        let result = apply_pyproject(input, &dep_patch("pkg-b", "2.0.0"));
        assert!(result.contains("pkg-b"));
        assert!(result.contains("2.0.0"));
        assert!(!result.contains("1.0.0"));
    }

    #[test]
    fn test_poetry_toml_dependency_assignment() {
        let input = r#"[tool.poetry]
name = "worker"
version = "0.1.0"

[tool.poetry.dependencies]
pkg-b = "1.0.0"
requests = "^2.28"
"#;
        let result = apply_pyproject(input, &dep_patch("pkg-b", "2.0.0"));
        assert!(result.contains(r#"pkg-b = "2.0.0""#));
        assert!(result.contains(r#"requests = "^2.28""#));
        assert!(result.contains(r#"version = "0.1.0""#));
    }

    #[test]
    fn test_pep621_entry_normalized_to_ge() {
        let input = r#"[project]
name = "api"
version = "1.0.0"
dependencies = ["pkg-b~=1.0", "requests>=2.0"]
"#;
        let result = apply_pyproject(input, &dep_patch("pkg-b", "2.0.0"));
        // Comparator is normalized regardless of the original operator
        assert!(result.contains(r#""pkg-b>=2.0.0""#));
        assert!(result.contains(r#""requests>=2.0""#));
    }

    #[test]
    fn test_dependency_name_is_not_a_prefix_match() {
        let input = r#"[tool.poetry.dependencies]
pkg = "1.0.0"
pkg-extra = "3.0.0"
"#;
        let result = apply_pyproject(input, &dep_patch("pkg", "2.0.0"));
        assert!(result.contains(r#"pkg = "2.0.0""#));
        assert!(result.contains(r#"pkg-extra = "3.0.0""#));
    }

    #[test]
    fn test_setup_py_rewrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("setup.py");
        fs::write(
            &path,
            r#"setup(
    name="legacy",
    version="0.9.2",
    install_requires=["six>=1.0", "attrs"],
)
"#,
        )
        .unwrap();

        let patch = VersionPatch {
            new_version: Some("1.0.0".to_string()),
            dependencies: BTreeMap::from([("six".to_string(), "2.0.0".to_string())]),
        };
        let mut txn = Transaction::new(false);
        update_setup_py(&path, &patch, &mut txn).unwrap();
        txn.commit().unwrap();

        let result = fs::read_to_string(&path).unwrap();
        assert!(result.contains(r#"version="1.0.0""#));
        assert!(result.contains(r#""six>=2.0.0""#));
        assert!(result.contains(r#""attrs""#));
    }

    #[test]
    fn test_dispatch_prefers_pyproject() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"x\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();
        fs::write(temp.path().join("setup.py"), "setup(version='1.0.0')\n").unwrap();

        let mut txn = Transaction::new(false);
        update_python_manifest(temp.path(), &version_patch("2.0.0"), &mut txn).unwrap();
        txn.commit().unwrap();

        let pyproject = fs::read_to_string(temp.path().join("pyproject.toml")).unwrap();
        let setup = fs::read_to_string(temp.path().join("setup.py")).unwrap();
        assert!(pyproject.contains("2.0.0"));
        assert!(setup.contains("1.0.0"));
    }

    #[test]
    fn test_quote_style_preserved() {
        let input = "[tool.poetry]\nname = 'worker'\nversion = '0.3.1'\n";
        let result = apply_pyproject(input, &version_patch("0.4.0"));
        assert!(result.contains("version = '0.4.0'"));
    }
}
