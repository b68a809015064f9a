//! smellscan CLI binary entry point.
//! Builds config and registry, runs the scan and prints results.

use clap::Parser;
use smellscan::cli::{Cli, Commands};
use smellscan::engine::{self, CancelToken};
use smellscan::error::ScanError;
use smellscan::output::{self, OutputStyle};
use smellscan::registry::Registry;
use smellscan::{config, loader, utils};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(err: &dyn std::fmt::Display, json: bool) -> ! {
    eprintln!("{} {}", utils::error_prefix(utils::use_colors(json)), err);
    std::process::exit(2);
}

fn main() {
    let cli = Cli::parse();
    init_logging();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules => match Registry::builtin() {
            Ok(reg) => print!("{}", output::format_rules(&reg)),
            Err(e) => fail(&e, false),
        },
        Commands::Scan {
            root,
            ext,
            format,
            fail_on,
            config: config_path,
            jobs,
        } => {
            let json_requested = format.as_deref() == Some("json");
            let cfg = match config::resolve_effective(
                &root,
                config_path.as_deref(),
                ext.as_deref(),
                format.as_deref(),
                fail_on.as_deref(),
                jobs,
            ) {
                Ok(c) => c,
                Err(e) => fail(&ScanError::from(e), json_requested),
            };
            let json = cfg.format == OutputStyle::Json;
            tracing::debug!(root = %root.display(), jobs = cfg.jobs, "effective config resolved");

            let mut registry = match Registry::builtin() {
                Ok(r) => r,
                Err(e) => fail(&ScanError::from(e), json),
            };
            if let Err(e) = registry.retain_enabled(&cfg) {
                fail(&ScanError::from(e), json);
            }

            let loaded = match loader::load_all(&root, &cfg) {
                Ok(l) => l,
                Err(e) => fail(&e, json),
            };
            if loaded.units.is_empty() && !json {
                eprintln!(
                    "{} no files matching [{}] under {}",
                    utils::note_prefix(utils::use_colors(false)),
                    cfg.extensions.join(", "),
                    root.display()
                );
            }

            let outcome = match engine::scan(&loaded.units, &registry, &cfg, &CancelToken::new())
            {
                Ok(o) => o,
                Err(e) => fail(&e, json),
            };
            output::print_diagnostics(&loaded.errors, &outcome.rule_errors, cfg.format);
            output::print_report(&outcome.report, cfg.format);
            if outcome.report.summary().at_or_above(cfg.fail_on) > 0 {
                std::process::exit(1);
            }
        }
    }
}
