//! Best-effort manifest patchers.
//!
//! Each patcher rewrites version/dependency strings inside one manifest
//! dialect without a full parser for that dialect. Substitutions are
//! isolated, narrowly scoped pattern-match-and-replace steps with explicit
//! did-it-match checks; fallbacks are chained explicitly. A rewrite that
//! matches nothing leaves the file byte-for-byte unchanged and is not an
//! error, so callers must not assume a successful call implies a textual
//! change occurred.
//!
//! The Cargo patcher is the exception: `Cargo.toml` has a stable grammar and
//! `toml_edit` preserves formatting, so it edits structurally.

pub mod cargo;
pub mod node;
pub mod python;

pub use cargo::update_cargo_manifest;
pub use node::update_package_json;
pub use python::update_python_manifest;
