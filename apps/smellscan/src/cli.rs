//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "smellscan",
    version,
    about = "Rule-based code smell scanner for fixture trees",
    long_about = "smellscan walks a directory of source files, applies a registry of pattern rules to each file and to the import graph, and reports findings.\n\nConfiguration precedence: CLI > smellscan.toml > defaults.",
    after_help = "Examples:\n  smellscan scan fixtures/\n  smellscan scan src --ext .ts,.tsx --format json\n  smellscan scan . --fail-on error --jobs 4\n  smellscan rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current smellscan version."
    )]
    Version,
    /// Scan a directory
    #[command(
        about = "Scan a directory for code smells",
        long_about = "Load every matching file under ROOT, run all enabled rules and print the report. Exits 1 when any finding reaches the --fail-on severity, 2 on run-level errors.",
        after_help = "Examples:\n  smellscan scan fixtures/\n  smellscan scan fixtures/ --format json --fail-on error"
    )]
    Scan {
        #[arg(help = "Root directory to scan")]
        root: PathBuf,
        #[arg(long, help = "Comma-separated extensions (default: .ts,.js)")]
        ext: Option<String>,
        #[arg(long, help = "Output mode: plain|json (default: plain)")]
        format: Option<String>,
        #[arg(long, help = "Minimum severity that fails the run: info|warning|error (default: warning)")]
        fail_on: Option<String>,
        #[arg(long, help = "Path to config file (default: smellscan.toml in ROOT)")]
        config: Option<PathBuf>,
        #[arg(long, help = "Worker threads (default: available parallelism)")]
        jobs: Option<usize>,
    },
    /// List registered rules
    #[command(
        about = "List registered rules",
        long_about = "Print every built-in rule with its default severity, scope and description."
    )]
    Rules,
}
