//! Consistency checks for a plugin marketplace checkout.
//!
//! A marketplace is a directory holding one index document
//! (`.claude-plugin/marketplace.json` by default) and a `plugins/` directory
//! whose immediate children are plugin roots, each carrying its own manifest.
//! [`Validator`] loads the index, validates every plugin directory, then
//! reconciles the two views and returns a [`Report`] with a [`Verdict`].

pub mod consistency;
pub mod loader;
pub mod outcome;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod validator;

pub use consistency::ConsistencyEngine;
pub use loader::{Document, LoadError, load_document, read_document};
pub use outcome::{Category, Counts, Note, Outcome, Outcomes, Pass, Report, Severity, Verdict};
pub use resolver::{Component, locate_manifest, plugin_directories, detect_components};
pub use schema::{FieldKind, FieldSpec, INDEX_SCHEMA, MANIFEST_SCHEMA, PLUGIN_ENTRY_SCHEMA};
pub use validator::{Validator, ValidatorOptions};

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Environment variable consulted when no explicit root is given.
pub const ROOT_ENV: &str = "REGISTRY_CHECK_ROOT";

/// Index location used when none is configured.
pub const DEFAULT_INDEX_PATH: &str = ".claude-plugin/marketplace.json";
/// Plugins root used when none is configured.
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";
const DEFAULT_MANIFEST_CANDIDATES: [&str; 2] = [".claude-plugin/plugin.json", "plugin.json"];
const DEFAULT_RESERVED_PREFIX: &str = ".";

/// Where the index, the plugins root and per-plugin manifests live,
/// relative to the registry root (or to each plugin directory for manifests).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryLayout {
    pub index_path: PathBuf,
    pub plugins_dir: PathBuf,
    /// Tried in order; the first existing candidate wins.
    pub manifest_candidates: Vec<PathBuf>,
    /// Directory names under the plugins root starting with this prefix are
    /// not plugins.
    pub reserved_prefix: String,
}

impl Default for RegistryLayout {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            manifest_candidates: DEFAULT_MANIFEST_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .collect(),
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
        }
    }
}

impl RegistryLayout {
    pub fn index_file(&self, root: &Path) -> PathBuf {
        root.join(&self.index_path)
    }

    pub fn plugins_root(&self, root: &Path) -> PathBuf {
        root.join(&self.plugins_dir)
    }

    /// Short name used to prefix index messages, e.g. `marketplace.json`.
    pub fn index_label(&self) -> String {
        file_label(&self.index_path)
    }

    /// Short name used to prefix manifest messages, e.g. `plugin.json`.
    pub fn manifest_label(&self) -> String {
        self.manifest_candidates
            .first()
            .map(|candidate| file_label(candidate))
            .unwrap_or_else(|| "manifest".to_string())
    }

    pub fn plugins_label(&self) -> String {
        format!("{}/", self.plugins_dir.display())
    }

    pub fn is_reserved(&self, dir_name: &str) -> bool {
        !self.reserved_prefix.is_empty() && dir_name.starts_with(&self.reserved_prefix)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render `path` relative to `root` when possible.
pub fn relative_to_root(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

/// Resolve an index `source` string against the registry root.
///
/// Leading `./` segments are dropped so `./plugins/alpha` and `plugins/alpha`
/// name the same directory.
pub fn resolve_source(root: &Path, source: &str) -> PathBuf {
    let mut trimmed = source;
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    if trimmed == "." {
        return root.to_path_buf();
    }
    root.join(trimmed)
}

fn is_registry_root(candidate: &Path, layout: &RegistryLayout) -> bool {
    layout.index_file(candidate).is_file()
}

fn root_from_hint(hint: &str, layout: &RegistryLayout) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.is_dir() || !is_registry_root(&hint_path, layout) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path, layout: &RegistryLayout) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_registry_root(&dir, layout) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the registry root.
///
/// An explicit root is taken as-is (the run reports a missing index itself).
/// Otherwise `REGISTRY_CHECK_ROOT` is honoured when it points at a directory
/// holding the index, then the current directory and its ancestors are
/// searched.
pub fn find_registry_root(explicit: Option<&Path>, layout: &RegistryLayout) -> Result<PathBuf> {
    if let Some(root) = explicit {
        if !root.is_dir() {
            bail!("registry root {} is not a directory", root.display());
        }
        return Ok(root.to_path_buf());
    }

    if let Ok(env_root) = env::var(ROOT_ENV) {
        if let Some(root) = root_from_hint(&env_root, layout) {
            return Ok(root);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(root) = search_upwards(&cwd, layout) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate a plugin registry: no {} in the current directory or its parents. \
         Pass --root or set {ROOT_ENV}.",
        layout.index_path.display()
    );
}
