//! Reconciliation of the index against the plugins root and plugin manifests.
//!
//! The engine joins three views keyed by plugin name: index entries, plugin
//! directories on disk, and each resolved manifest. Disk-only plugins are
//! advisory; an index entry whose source path is missing, or whose version
//! differs from its manifest, is an error. Versions are compared as exact
//! strings, so `1.0` and `1.0.0` disagree.

use crate::loader::{Document, read_document};
use crate::outcome::{Category, Outcomes};
use crate::registry::{PluginEntry, plugin_entries};
use crate::resolver::{locate_manifest, plugin_dir_name, plugin_directories};
use crate::validator::ValidatorOptions;
use crate::{RegistryLayout, resolve_source};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub struct ConsistencyEngine<'a> {
    root: &'a Path,
    layout: &'a RegistryLayout,
    options: ValidatorOptions,
}

impl<'a> ConsistencyEngine<'a> {
    pub fn new(root: &'a Path, layout: &'a RegistryLayout) -> Self {
        Self {
            root,
            layout,
            options: ValidatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Run both directions of the check against an already loaded index.
    pub fn reconcile(&self, index: &Document, outcomes: &mut Outcomes) {
        if !index.contains_key("plugins") {
            return;
        }

        let registered = self.registered_entries(index, outcomes);
        let on_disk = self.directories_on_disk();

        let unregistered: Vec<&String> = on_disk
            .iter()
            .filter(|name| !registered.contains_key(name.as_str()))
            .collect();
        for name in &unregistered {
            outcomes.warning(
                Category::Consistency,
                format!(
                    "{name}: exists in {} but is not registered in {}",
                    self.layout.plugins_label(),
                    self.layout.index_label()
                ),
            );
        }

        for entry in plugin_entries(index) {
            self.check_entry(&entry, outcomes);
        }

        if !unregistered.is_empty() {
            outcomes.note(format!(
                "{} plugin(s) not registered; add them to {} to publish them",
                unregistered.len(),
                self.layout.index_label()
            ));
        }
    }

    /// Entries keyed by name; the first entry with a given name wins.
    fn registered_entries<'d>(
        &self,
        index: &'d Document,
        outcomes: &mut Outcomes,
    ) -> BTreeMap<&'d str, PluginEntry<'d>> {
        let mut registered: BTreeMap<&'d str, PluginEntry<'d>> = BTreeMap::new();
        for entry in plugin_entries(index) {
            let Some(name) = entry.name.filter(|name| !name.is_empty()) else {
                continue;
            };
            if let Some(first) = registered.get(name) {
                if self.options.warn_on_duplicate_names {
                    outcomes.warning(
                        Category::Consistency,
                        format!(
                            "{name}: registered more than once in {} (plugins[{}] shadowed by plugins[{}])",
                            self.layout.index_label(),
                            entry.position,
                            first.position
                        ),
                    );
                }
                continue;
            }
            registered.insert(name, entry);
        }
        registered
    }

    fn directories_on_disk(&self) -> BTreeSet<String> {
        let plugins_root = self.layout.plugins_root(self.root);
        if !plugins_root.is_dir() {
            return BTreeSet::new();
        }
        match plugin_directories(&plugins_root, self.layout) {
            Ok(dirs) => dirs.iter().map(|dir| plugin_dir_name(dir)).collect(),
            Err(err) => {
                // The plugins pass already recorded the listing failure.
                tracing::warn!(error = %err, "could not list plugin directories");
                BTreeSet::new()
            }
        }
    }

    fn check_entry(&self, entry: &PluginEntry<'_>, outcomes: &mut Outcomes) {
        let name = entry.name.filter(|name| !name.is_empty());
        let declared = entry.version.filter(|version| !version.is_empty());
        let (Some(name), Some(declared)) = (name, declared) else {
            return;
        };
        let source = entry.source.unwrap_or_default();
        let plugin_path = resolve_source(self.root, source);
        let index_label = self.layout.index_label();

        if !plugin_path.exists() {
            outcomes.error(
                Category::Reference,
                format!("{name}: registered in {index_label} but path '{source}' does not exist"),
            );
            return;
        }

        let Some(manifest_path) = locate_manifest(&plugin_path, self.layout) else {
            return;
        };

        let manifest_label = self.layout.manifest_label();
        let manifest = match read_document(&manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                outcomes.warning(
                    Category::Syntax,
                    format!("{name}: could not read {manifest_label}: {err}"),
                );
                return;
            }
        };

        match manifest.get("version") {
            Some(Value::String(found)) if found == declared => {
                outcomes.success(
                    Category::Consistency,
                    format!("{name}: version consistent ({found})"),
                );
            }
            other => {
                let found = match other {
                    Some(Value::String(found)) => found.clone(),
                    Some(value) => value.to_string(),
                    None => "<missing>".to_string(),
                };
                outcomes.error(
                    Category::Consistency,
                    format!(
                        "{name}: version mismatch - {index_label}={declared}, {manifest_label}={found}"
                    ),
                );
            }
        }
    }
}
