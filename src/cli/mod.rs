//! Credit-approval CLI module
//!
//! Command-line interface for running the workflow, generating data and
//! inspecting CSV inputs.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifacts::DirectorySink;
use crate::config::{DataSource, OutputLayout, PipelineConfig};
use crate::eda::EdaReport;
use crate::preprocessing::{ColumnKind, UnknownCategoryPolicy};
use crate::runner::{PipelineRunner, RunSummary};
use crate::synthetic::CreditDataGenerator;
use crate::training::{ClassWeight, Solver};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("  {} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-approval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Credit approval with logistic regression: synthetic data, EDA, training and evaluation")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full workflow and write figures and artifacts
    Run(RunArgs),

    /// Write a synthetic credit dataset to CSV
    Generate {
        /// Number of rows
        #[arg(long, default_value = "4000")]
        rows: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output CSV file [default: <output-dir>/data/credit.csv]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Root directory whose data/ receives the CSV when --output is not given
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show schema and column statistics for a CSV file
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long, default_value = "approved")]
        target: String,
    },
}

/// Data source selector for `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Synthetic,
    Csv,
}

/// Flags for `run`. Anything given here overrides the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where the data comes from
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// CSV input, used with --mode csv
    #[arg(long)]
    pub input_path: Option<PathBuf>,

    /// Target column name
    #[arg(long)]
    pub target: Option<String>,

    /// Synthetic row count
    #[arg(long)]
    pub rows: Option<usize>,

    /// Held-out fraction
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for generation and split
    #[arg(long)]
    pub random_state: Option<u64>,

    /// Weight classes inversely to their frequency
    #[arg(long)]
    pub class_weight_balanced: bool,

    /// Inverse regularization strength
    #[arg(long = "C", alias = "c")]
    pub c: Option<f64>,

    /// Optimizer (lbfgs, gd)
    #[arg(long)]
    pub solver: Option<String>,

    /// Maximum optimizer iterations
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Gradient tolerance for convergence
    #[arg(long)]
    pub tol: Option<f64>,

    /// Root directory for figures/, artifacts/ and data/
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Skip EDA figures and summary
    #[arg(long)]
    pub no_eda: bool,

    /// Unseen categories at predict time (ignore, error)
    #[arg(long)]
    pub unknown_categories: Option<String>,
}

impl RunArgs {
    /// Build the effective configuration: defaults, then the config file, then flags
    pub fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output = OutputLayout::under(dir);
        }

        match self.mode {
            Some(Mode::Csv) => {
                let path = match (&self.input_path, &config.source) {
                    (Some(path), _) => path.clone(),
                    (None, DataSource::Csv { path }) => path.clone(),
                    (None, DataSource::Synthetic { .. }) => config.output.dataset_path(),
                };
                config.source = DataSource::Csv { path };
            }
            Some(Mode::Synthetic) => {
                let rows = match (self.rows, &config.source) {
                    (Some(rows), _) => rows,
                    (None, DataSource::Synthetic { rows }) => *rows,
                    (None, DataSource::Csv { .. }) => 4000,
                };
                config.source = DataSource::Synthetic { rows };
            }
            None => match &mut config.source {
                DataSource::Synthetic { rows } => {
                    if let Some(n) = self.rows {
                        *rows = n;
                    }
                }
                DataSource::Csv { path } => {
                    if let Some(p) = &self.input_path {
                        *path = p.clone();
                    }
                }
            },
        }

        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(seed) = self.random_state {
            config.random_state = seed;
        }
        if self.class_weight_balanced {
            config.model.class_weight = ClassWeight::Balanced;
        }
        if let Some(c) = self.c {
            config.model.c = c;
        }
        if let Some(solver) = &self.solver {
            config.model.solver = solver.parse::<Solver>()?;
        }
        if let Some(max_iter) = self.max_iter {
            config.model.max_iter = max_iter;
        }
        if let Some(tol) = self.tol {
            config.model.tol = tol;
        }
        if self.no_eda {
            config.run_eda = false;
        }
        if let Some(policy) = &self.unknown_categories {
            config.preprocessing.unknown_categories = policy
                .parse::<UnknownCategoryPolicy>()
                .map_err(anyhow::Error::msg)?;
        }

        config.validate()?;
        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(args: &RunArgs) -> anyhow::Result<()> {
    section("Run");

    let config = args.to_config()?;
    let source = match &config.source {
        DataSource::Synthetic { rows } => format!("synthetic ({} rows)", rows),
        DataSource::Csv { path } => format!("csv ({})", path.display()),
    };
    println!("  {}", kv(&format!("{:<14}", "Data"), &source));
    println!("  {}", kv(&format!("{:<14}", "Target"), &config.target));
    println!("  {}", kv(&format!("{:<14}", "Test size"), &config.test_size.to_string()));
    println!("  {}", kv(&format!("{:<14}", "Seed"), &config.random_state.to_string()));
    println!(
        "  {}",
        kv(
            &format!("{:<14}", "Model"),
            &format!("C={} solver={} max_iter={}", config.model.c, config.model.solver, config.model.max_iter)
        )
    );
    println!();

    step_run("Running pipeline");
    let start = Instant::now();
    let mut sink = DirectorySink::new(config.output.clone())?;
    let summary = PipelineRunner::new(config).run(&mut sink)?;
    step_done(&format!("{} files in {:?}", sink.written().len(), start.elapsed()));

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let m = &summary.metrics;
    let cm = &summary.confusion;

    section("Results");
    println!("  {:<16} {}", muted("Train / test"), format!("{} / {}", summary.n_train, summary.n_test).white());
    println!("  {:<16} {}", muted("Features"), summary.n_features.to_string().white());
    if let Some(report) = &summary.fit_report {
        let status = if report.converged { ok("converged") } else { "not converged".yellow() };
        println!("  {:<16} {} {}", muted("Optimizer"), status, dim(&format!("({} iterations)", report.n_iter)));
    }
    println!();

    for (name, value) in [
        ("Accuracy", m.accuracy),
        ("Precision", m.precision),
        ("Recall", m.recall),
        ("F1", m.f1),
        ("ROC AUC", m.roc_auc),
    ] {
        println!("  {:<16} {}", muted(name), format!("{:.4}", value).white().bold());
    }

    println!();
    println!("  {:<16} {:>8} {:>8}", "", muted("pred 0"), muted("pred 1"));
    println!("  {:<16} {:>8} {:>8}", muted("actual 0"), cm.tn, cm.fp);
    println!("  {:<16} {:>8} {:>8}", muted("actual 1"), cm.fn_, cm.tp);

    let output = &summary.config.output;
    println!();
    line_box_top();
    line_box(&kv("Figures  ", &output.figures_dir.display().to_string()));
    line_box_sep();
    line_box(&kv("Artifacts", &output.artifacts_dir.display().to_string()));
    line_box_bottom();
    println!();
}

/// Destination for `generate`: an explicit file, else the dataset path of the layout
pub fn generate_path(output: Option<PathBuf>, output_dir: Option<&Path>) -> PathBuf {
    output.unwrap_or_else(|| match output_dir {
        Some(dir) => OutputLayout::under(dir).dataset_path(),
        None => OutputLayout::default().dataset_path(),
    })
}

pub fn cmd_generate(rows: usize, seed: u64, output: &Path) -> anyhow::Result<()> {
    section("Generate");

    step_run(&format!("Generating {} rows (seed {})", rows, seed));
    let start = Instant::now();
    let mut df = CreditDataGenerator::new(rows).with_seed(seed).generate()?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    DataSaver::save_csv(&mut df, output)?;
    step_ok(&format!("Saved → {}", output.display()));
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path, target: &str) -> anyhow::Result<()> {
    section("Data Info");

    let (df, info) = DataLoader::new().load_with_info(data_path)?;
    let report = EdaReport::compute(&df, target)?;

    println!("  {:<12} {}", muted("File"), info.path.display());
    println!("  {:<12} {}", muted("Rows"), info.n_rows);
    println!("  {:<12} {}", muted("Columns"), info.n_cols);
    println!("  {:<12} {:.2} KB", muted("Size"), info.file_size as f64 / 1024.0);
    println!();

    println!(
        "  {:<18} {:<12} {:>8} {:>12} {:>12}",
        muted("Column"),
        muted("Kind"),
        muted("Missing"),
        muted("Mean/Top"),
        muted("Std/Unique")
    );
    println!("  {}", dim(&"─".repeat(66)));

    for stats in &report.stats {
        let (center, spread) = match stats.kind {
            ColumnKind::Numeric => (
                stats.mean.map(|v| format!("{:.3}", v)).unwrap_or_default(),
                stats.std.map(|v| format!("{:.3}", v)).unwrap_or_default(),
            ),
            ColumnKind::Categorical => (
                stats.top.clone().unwrap_or_default(),
                stats.unique_count.map(|u| u.to_string()).unwrap_or_default(),
            ),
        };
        println!(
            "  {:<18} {:<12} {:>8} {:>12} {:>12}",
            stats.name,
            stats.kind.to_string().truecolor(140, 140, 140),
            stats.null_count,
            center,
            spread
        );
    }

    if let Some(balance) = &report.class_balance {
        println!();
        let counts: Vec<String> = balance.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!("  {:<12} {}", muted("Classes"), counts.join("  "));
    }

    println!();
    Ok(())
}
