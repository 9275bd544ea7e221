//! Validate a plugin marketplace checkout.
//!
//! Usage:
//!   registry-check                      # search upwards for the index
//!   registry-check --root path/to/repo --verbose
//!   registry-check --format json
//!
//! Exit status: 0 pass, 2 pass with warnings, 1 failure.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use registry_check::{
    DEFAULT_INDEX_PATH, DEFAULT_PLUGINS_DIR, Pass, RegistryLayout, Report, Severity, Validator,
    ValidatorOptions, Verdict, find_registry_root,
};
use std::fmt::{self, Write as _};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXIT_FAILED: i32 = 1;
const EXIT_WARNINGS: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "registry-check")]
#[command(about = "Check that a plugin marketplace index agrees with its plugin directories")]
struct Cli {
    /// Registry root; defaults to REGISTRY_CHECK_ROOT or the nearest ancestor holding the index.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Index document, relative to the root.
    #[arg(long, default_value = DEFAULT_INDEX_PATH)]
    index: PathBuf,
    /// Plugins directory, relative to the root.
    #[arg(long, default_value = DEFAULT_PLUGINS_DIR)]
    plugins_dir: PathBuf,
    /// Show successful checks and informational notes.
    #[arg(short, long)]
    verbose: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,
    /// Warn when the index registers the same plugin name more than once.
    #[arg(long)]
    warn_duplicates: bool,
    /// Exit with failure when warnings were recorded.
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(EXIT_FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let layout = RegistryLayout {
        index_path: cli.index.clone(),
        plugins_dir: cli.plugins_dir.clone(),
        ..RegistryLayout::default()
    };
    let root = find_registry_root(cli.root.as_deref(), &layout).context("locating registry root")?;

    let report = Validator::new(root)
        .with_layout(layout)
        .with_options(ValidatorOptions {
            warn_on_duplicate_names: cli.warn_duplicates,
        })
        .run();

    match cli.format {
        Format::Human => print!(
            "{}",
            render_human(&report, cli.verbose).context("rendering report")?
        ),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        ),
    }

    Ok(exit_code(report.verdict, cli.deny_warnings))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "registry_check=debug"
    } else {
        "registry_check=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(verdict: Verdict, deny_warnings: bool) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::PassWithWarnings if deny_warnings => EXIT_FAILED,
        Verdict::PassWithWarnings => EXIT_WARNINGS,
        Verdict::Fail => EXIT_FAILED,
    }
}

fn render_human(report: &Report, verbose: bool) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let rule = "=".repeat(60);

    for pass in Pass::ALL {
        let outcomes: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.pass == pass)
            .filter(|o| verbose || o.severity != Severity::Success)
            .collect();
        let notes: Vec<_> = report
            .notes
            .iter()
            .filter(|n| verbose && n.pass == pass)
            .collect();
        if outcomes.is_empty() && notes.is_empty() {
            continue;
        }
        writeln!(out, "\n{}\n{rule}", pass.title())?;
        for outcome in outcomes {
            writeln!(out, "  {}: {}", outcome.severity.as_str(), outcome.message)?;
        }
        for note in notes {
            writeln!(out, "  note: {}", note.message)?;
        }
    }

    if report.aborted {
        writeln!(out, "\nindex could not be loaded; remaining checks skipped")?;
    }

    let counts = report.counts;
    writeln!(out, "\nSummary\n{rule}")?;
    writeln!(out, "  successes: {}", counts.successes)?;
    writeln!(out, "  warnings:  {}", counts.warnings)?;
    writeln!(out, "  errors:    {}", counts.errors)?;
    writeln!(out, "  total checks: {}", counts.total())?;
    writeln!(out, "\nverdict: {}", report.verdict)?;
    Ok(out)
}
