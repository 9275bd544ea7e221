#![allow(dead_code)]

// Throwaway marketplace checkouts for integration tests.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FixtureRegistry {
    dir: TempDir,
}

impl FixtureRegistry {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("allocating fixture registry")?;
        fs::create_dir_all(dir.path().join("plugins"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a well-formed index listing `plugins`.
    pub fn write_index(&self, plugins: Vec<Value>) -> Result<()> {
        self.write_json(
            ".claude-plugin/marketplace.json",
            &json!({
                "name": "fixture-marketplace",
                "version": "1.0.0",
                "description": "Fixture marketplace",
                "owner": {"name": "Fixture Owner", "email": "owner@example.com"},
                "plugins": plugins
            }),
        )
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> Result<()> {
        self.write_raw(relative, &serde_json::to_string_pretty(value)?)
    }

    pub fn write_raw(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
    }

    /// Create a complete plugin: manifest under `.claude-plugin/`, a
    /// `commands/` directory and a README.
    pub fn add_plugin(&self, name: &str, version: &str) -> Result<PathBuf> {
        let dir = self.path(&format!("plugins/{name}"));
        fs::create_dir_all(dir.join("commands"))?;
        fs::write(dir.join("README.md"), format!("# {name}\n"))?;
        self.write_json(
            &format!("plugins/{name}/.claude-plugin/plugin.json"),
            &manifest(name, version),
        )?;
        Ok(dir)
    }

    pub fn set_manifest_version(&self, name: &str, version: &str) -> Result<()> {
        self.write_json(
            &format!("plugins/{name}/.claude-plugin/plugin.json"),
            &manifest(name, version),
        )
    }
}

pub fn manifest(name: &str, version: &str) -> Value {
    json!({
        "name": name,
        "version": version,
        "description": format!("{name} plugin"),
        "author": {"name": "Fixture Author"},
        "license": "MIT"
    })
}

pub fn entry(name: &str, version: &str, source: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} plugin"),
        "source": source,
        "version": version
    })
}
