//! Filesystem probing for plugin directories.
//!
//! Locates a plugin's manifest (metadata subdirectory first, then the plugin
//! root), lists plugin directories under the plugins root, and derives the
//! component set from conventional subdirectories.

use crate::RegistryLayout;
use crate::outcome::{Category, Outcomes};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const README: &str = "README.md";

/// A kind of plugin content, detected by a conventional path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    Commands,
    Agents,
    Hooks,
    Skills,
    Mcp,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Commands,
        Component::Agents,
        Component::Hooks,
        Component::Skills,
        Component::Mcp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Commands => "commands",
            Component::Agents => "agents",
            Component::Hooks => "hooks",
            Component::Skills => "skills",
            Component::Mcp => "mcp",
        }
    }

    fn marker_path(&self) -> &'static str {
        match self {
            Component::Commands => "commands",
            Component::Agents => "agents",
            Component::Hooks => "hooks",
            Component::Skills => "skills",
            Component::Mcp => ".mcp.json",
        }
    }

    pub fn is_present(&self, plugin_dir: &Path) -> bool {
        let path = plugin_dir.join(self.marker_path());
        match self {
            Component::Mcp => path.is_file(),
            _ => path.is_dir(),
        }
    }
}

/// First existing manifest candidate under `plugin_dir`.
pub fn locate_manifest(plugin_dir: &Path, layout: &RegistryLayout) -> Option<PathBuf> {
    layout
        .manifest_candidates
        .iter()
        .map(|candidate| plugin_dir.join(candidate))
        .find(|path| path.is_file())
}

/// Every component present in `plugin_dir`; each component is checked independently.
pub fn detect_components(plugin_dir: &Path) -> Vec<Component> {
    Component::ALL
        .into_iter()
        .filter(|component| component.is_present(plugin_dir))
        .collect()
}

pub fn has_readme(plugin_dir: &Path) -> bool {
    plugin_dir.join(README).is_file()
}

/// Plugin directories directly under `plugins_root`, sorted by name, skipping
/// reserved names and plain files.
pub fn plugin_directories(
    plugins_root: &Path,
    layout: &RegistryLayout,
) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(plugins_root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        // Non-UTF-8 names are kept; they are reported under their lossy form.
        if layout.is_reserved(&entry.file_name().to_string_lossy()) {
            continue;
        }
        dirs.push(path);
    }
    dirs.sort();
    Ok(dirs)
}

/// Directory name used as the plugin's on-disk identity.
pub fn plugin_dir_name(plugin_dir: &Path) -> String {
    plugin_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| plugin_dir.display().to_string())
}

pub(crate) fn check_components(plugin_name: &str, plugin_dir: &Path, outcomes: &mut Outcomes) {
    let found = detect_components(plugin_dir);
    if found.is_empty() {
        let expected = Component::ALL.map(|c| c.as_str()).join("/");
        outcomes.error(
            Category::Layout,
            format!("{plugin_name}: no component found ({expected})"),
        );
    } else {
        let names: Vec<&str> = found.iter().map(Component::as_str).collect();
        outcomes.success(
            Category::Layout,
            format!("{plugin_name}: components found: {}", names.join(", ")),
        );
    }
}

pub(crate) fn check_readme(plugin_name: &str, plugin_dir: &Path, outcomes: &mut Outcomes) {
    if has_readme(plugin_dir) {
        outcomes.success(Category::Layout, format!("{plugin_name}: {README} present"));
    } else {
        outcomes.warning(Category::Layout, format!("{plugin_name}: {README} not found"));
    }
}
