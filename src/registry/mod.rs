//! Validation passes over the two halves of a registry.
//!
//! `index` checks the marketplace index and its plugin entries; `plugins`
//! walks the plugins root and checks each directory's manifest and layout.
//! Both passes only record outcomes; reconciling them is the job of
//! [`crate::consistency`].

pub mod index;
pub mod plugins;

pub use index::{PluginEntry, check_index, plugin_entries, plugin_list};
pub use plugins::{check_plugin, check_plugins};
