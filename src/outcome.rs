//! Validation outcomes and the run verdict.
//!
//! Every check records exactly one [`Outcome`] into an [`Outcomes`] collector
//! that the caller owns and passes down by `&mut`. Outcomes are immutable once
//! recorded; the collector is turned into a [`Report`] at the end of a run.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// What kind of check produced an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Document could not be read or is not well-formed.
    Syntax,
    /// Required field missing or mis-typed.
    Schema,
    /// A declared path does not exist.
    Reference,
    /// Two sources of truth disagree (versions, registration).
    Consistency,
    /// Filesystem conventions: manifest location, components, README.
    Layout,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Syntax => "syntax",
            Category::Schema => "schema",
            Category::Reference => "reference",
            Category::Consistency => "consistency",
            Category::Layout => "layout",
        }
    }
}

/// Validation stage an outcome was recorded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    #[default]
    Index,
    Plugins,
    Consistency,
}

impl Pass {
    pub const ALL: [Pass; 3] = [Pass::Index, Pass::Plugins, Pass::Consistency];

    pub fn title(&self) -> &'static str {
        match self {
            Pass::Index => "Marketplace index",
            Pass::Plugins => "Plugins",
            Pass::Consistency => "Consistency",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub pass: Pass,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
}

/// Informational line; never counted as a check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Note {
    pub pass: Pass,
    pub message: String,
}

/// Collector for one validation run.
#[derive(Debug, Default)]
pub struct Outcomes {
    current: Pass,
    successes: Vec<Outcome>,
    warnings: Vec<Outcome>,
    errors: Vec<Outcome>,
    // Recording order across the three collections.
    order: Vec<(Severity, usize)>,
    notes: Vec<Note>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tagging subsequent outcomes with `pass`.
    pub fn enter(&mut self, pass: Pass) {
        tracing::info!(pass = ?pass, "entering validation pass");
        self.current = pass;
    }

    pub fn success(&mut self, category: Category, message: impl Into<String>) {
        self.record(Severity::Success, category, message.into());
    }

    pub fn warning(&mut self, category: Category, message: impl Into<String>) {
        self.record(Severity::Warning, category, message.into());
    }

    pub fn error(&mut self, category: Category, message: impl Into<String>) {
        self.record(Severity::Error, category, message.into());
    }

    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(pass = ?self.current, "{message}");
        self.notes.push(Note {
            pass: self.current,
            message,
        });
    }

    fn record(&mut self, severity: Severity, category: Category, message: String) {
        tracing::debug!(
            severity = severity.as_str(),
            category = category.as_str(),
            "{message}"
        );
        let outcome = Outcome {
            pass: self.current,
            severity,
            category,
            message,
        };
        let bucket = match severity {
            Severity::Success => &mut self.successes,
            Severity::Warning => &mut self.warnings,
            Severity::Error => &mut self.errors,
        };
        let idx = bucket.len();
        bucket.push(outcome);
        self.order.push((severity, idx));
    }

    pub fn successes(&self) -> &[Outcome] {
        &self.successes
    }

    pub fn warnings(&self) -> &[Outcome] {
        &self.warnings
    }

    pub fn errors(&self) -> &[Outcome] {
        &self.errors
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn counts(&self) -> Counts {
        Counts {
            successes: self.successes.len(),
            warnings: self.warnings.len(),
            errors: self.errors.len(),
        }
    }

    /// All outcomes in the order they were recorded.
    pub fn in_order(&self) -> impl Iterator<Item = &Outcome> {
        self.order.iter().map(|(severity, idx)| match severity {
            Severity::Success => &self.successes[*idx],
            Severity::Warning => &self.warnings[*idx],
            Severity::Error => &self.errors[*idx],
        })
    }

    pub fn into_report(self, aborted: bool) -> Report {
        let counts = self.counts();
        let outcomes = self.in_order().cloned().collect();
        Report {
            verdict: Verdict::from_counts(counts.errors, counts.warnings),
            counts,
            aborted,
            outcomes,
            notes: self.notes,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub successes: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.successes + self.warnings + self.errors
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    PassWithWarnings,
    Fail,
}

impl Verdict {
    /// Errors dominate; warnings only downgrade an otherwise clean run.
    pub fn from_counts(errors: usize, warnings: usize) -> Self {
        if errors > 0 {
            Verdict::Fail
        } else if warnings > 0 {
            Verdict::PassWithWarnings
        } else {
            Verdict::Pass
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Pass => "PASS",
            Verdict::PassWithWarnings => "PASS WITH WARNINGS",
            Verdict::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

/// Summary of one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub verdict: Verdict,
    pub counts: Counts,
    /// Set when the index could not be loaded and the run stopped early.
    pub aborted: bool,
    pub outcomes: Vec<Outcome>,
    pub notes: Vec<Note>,
}

impl Report {
    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Outcome> {
        self.with_severity(Severity::Warning)
    }

    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.with_severity(Severity::Success)
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Outcome> {
        self.outcomes
            .iter()
            .filter(move |outcome| outcome.severity == severity)
    }

    pub fn in_category(
        &self,
        severity: Severity,
        category: Category,
    ) -> impl Iterator<Item = &Outcome> {
        self.with_severity(severity)
            .filter(move |outcome| outcome.category == category)
    }
}
