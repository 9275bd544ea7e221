//! Per-plugin directory validation.

use crate::RegistryLayout;
use crate::loader::load_document;
use crate::outcome::{Category, Outcomes};
use crate::resolver::{
    check_components, check_readme, locate_manifest, plugin_dir_name, plugin_directories,
};
use crate::schema::{MANIFEST_SCHEMA, check_fields};
use std::path::Path;

/// Validate every plugin directory under the plugins root.
pub fn check_plugins(root: &Path, layout: &RegistryLayout, outcomes: &mut Outcomes) {
    let plugins_root = layout.plugins_root(root);
    let plugins_label = layout.plugins_label();
    if !plugins_root.is_dir() {
        outcomes.error(
            Category::Layout,
            format!("{plugins_label} directory not found"),
        );
        return;
    }

    let plugin_dirs = match plugin_directories(&plugins_root, layout) {
        Ok(dirs) => dirs,
        Err(err) => {
            outcomes.error(
                Category::Layout,
                format!("could not list {plugins_label}: {err}"),
            );
            return;
        }
    };

    if plugin_dirs.is_empty() {
        outcomes.warning(
            Category::Layout,
            format!("no plugins found in {plugins_label}"),
        );
        return;
    }

    outcomes.note(format!("found {} plugins", plugin_dirs.len()));
    for plugin_dir in &plugin_dirs {
        check_plugin(root, plugin_dir, layout, outcomes);
    }
}

/// Validate one plugin directory: manifest, its fields, components, README.
///
/// A missing or unparsable manifest skips the field checks only; the layout
/// checks still run.
pub fn check_plugin(
    root: &Path,
    plugin_dir: &Path,
    layout: &RegistryLayout,
    outcomes: &mut Outcomes,
) {
    let plugin_name = plugin_dir_name(plugin_dir);
    let manifest_label = layout.manifest_label();
    tracing::debug!(plugin = %plugin_name, "checking plugin directory");

    match locate_manifest(plugin_dir, layout) {
        None => {
            outcomes.error(
                Category::Layout,
                format!("{plugin_name}: {manifest_label} not found"),
            );
        }
        Some(manifest_path) => {
            if let Some(manifest) = load_document(&manifest_path, root, outcomes) {
                let scope = format!("{plugin_name}/{manifest_label}");
                check_fields(&manifest, MANIFEST_SCHEMA, &scope, outcomes);
            }
        }
    }

    check_components(&plugin_name, plugin_dir, outcomes);
    check_readme(&plugin_name, plugin_dir, outcomes);
}
