//! One full validation run over a registry root.

use crate::RegistryLayout;
use crate::consistency::ConsistencyEngine;
use crate::outcome::{Outcomes, Pass, Report};
use crate::registry::{check_index, check_plugins};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Warn when the index registers the same plugin name twice. Off by
    /// default: the first entry silently shadows later ones.
    pub warn_on_duplicate_names: bool,
}

#[derive(Clone, Debug)]
pub struct Validator {
    root: PathBuf,
    layout: RegistryLayout,
    options: ValidatorOptions,
}

impl Validator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: RegistryLayout::default(),
            options: ValidatorOptions::default(),
        }
    }

    pub fn with_layout(mut self, layout: RegistryLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Index pass, plugins pass, then reconciliation.
    ///
    /// Only an index that cannot be loaded stops the run early; every other
    /// failure is recorded and the run continues.
    pub fn run(&self) -> Report {
        let mut outcomes = Outcomes::new();
        tracing::info!(root = %self.root.display(), "validating plugin registry");

        outcomes.enter(Pass::Index);
        let Some(index) = check_index(&self.root, &self.layout, &mut outcomes) else {
            tracing::info!("index unavailable, stopping early");
            return outcomes.into_report(true);
        };

        outcomes.enter(Pass::Plugins);
        check_plugins(&self.root, &self.layout, &mut outcomes);

        outcomes.enter(Pass::Consistency);
        ConsistencyEngine::new(&self.root, &self.layout)
            .with_options(self.options)
            .reconcile(&index, &mut outcomes);

        let report = outcomes.into_report(false);
        tracing::info!(
            verdict = %report.verdict,
            errors = report.counts.errors,
            warnings = report.counts.warnings,
            "validation finished"
        );
        report
    }
}
