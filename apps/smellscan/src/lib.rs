//! smellscan core library.
//!
//! This crate exposes programmatic APIs for scanning a tree of source files
//! with a registry of pattern rules and reporting the findings.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `loader`: Walks the scan root and reads files into source units.
//! - `registry`: Rule registry keyed by id.
//! - `rules`: Built-in unit-scoped and graph-scoped rules.
//! - `engine`: Runs rules over units on a worker pool with timeouts.
//! - `graph`: Import extraction, resolution and cycle detection.
//! - `lex`: Comment/string masking, block and span detection.
//! - `models`: Source units, findings and the scan report.
//! - `output`: Plain/JSON report rendering.
//! - `error`: Error taxonomy.
//! - `watchdog`: Timeout wrapper for reads and rule execution.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod lex;
pub mod loader;
pub mod models;
pub mod output;
pub mod registry;
pub mod rules;
pub mod utils;
pub mod watchdog;
