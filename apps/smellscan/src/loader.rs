//! Fixture loader: walks the scan root and reads matching files into units.
//!
//! Loading has partial-failure semantics. A file that cannot be read,
//! decoded or sized is recorded as a `LoadError` and the rest still load.
//! Symlinks are followed; loops surface as errors from the walker.

use crate::config::ScanConfig;
use crate::error::{LoadError, ScanError};
use crate::models::SourceUnit;
use crate::watchdog::{self, Outcome};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Sorted by id.
    pub units: Vec<Arc<SourceUnit>>,
    /// Sorted by path.
    pub errors: Vec<LoadError>,
}

/// Root-relative, `/`-separated id for `path`.
pub fn unit_id(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Load every file under `root` accepted by `config`.
pub fn load_all(root: &Path, config: &ScanConfig) -> Result<LoadOutcome, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::Root(root.to_path_buf()));
    }
    let pool = crate::engine::worker_pool(config.jobs)?;
    let mut errors = Vec::new();
    let mut candidates: Vec<(String, PathBuf)> = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                tracing::warn!(path = %path.display(), error = %e, "walk error");
                errors.push(LoadError {
                    path,
                    cause: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !config.accepts_extension(path) {
            continue;
        }
        let id = unit_id(root, path);
        if config.is_excluded(&id) {
            tracing::debug!(unit = %id, "excluded");
            continue;
        }
        candidates.push((id, path.to_path_buf()));
    }

    let results: Vec<Result<SourceUnit, LoadError>> = pool.install(|| {
        candidates
            .into_par_iter()
            .map(|(id, path)| read_unit(id, path, config))
            .collect()
    });

    let mut units = Vec::new();
    for r in results {
        match r {
            Ok(u) => units.push(Arc::new(u)),
            Err(e) => {
                tracing::warn!(path = %e.path.display(), cause = %e.cause, "load error");
                errors.push(e);
            }
        }
    }
    units.sort_by(|a, b| a.id.cmp(&b.id));
    errors.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(units = units.len(), errors = errors.len(), "loaded");
    Ok(LoadOutcome { units, errors })
}

fn read_unit(id: String, path: PathBuf, config: &ScanConfig) -> Result<SourceUnit, LoadError> {
    let fail = |cause: String| LoadError {
        path: path.clone(),
        cause,
    };
    let meta = fs::metadata(&path).map_err(|e| fail(e.to_string()))?;
    if meta.len() > config.max_file_bytes {
        return Err(fail(format!(
            "file is {} bytes, limit is {}",
            meta.len(),
            config.max_file_bytes
        )));
    }
    let reader_path = path.clone();
    let bytes = match watchdog::run_with_timeout(config.read_timeout_ms, move || {
        fs::read(&reader_path)
    }) {
        Outcome::Done(Ok(b)) => b,
        Outcome::Done(Err(e)) => return Err(fail(e.to_string())),
        Outcome::Panicked(msg) => return Err(fail(format!("reader panicked: {}", msg))),
        Outcome::TimedOut => {
            return Err(fail(format!(
                "read timed out after {}ms",
                config.read_timeout_ms
            )))
        }
    };
    if bytes.contains(&0) {
        return Err(fail("binary content".into()));
    }
    let text = String::from_utf8(bytes).map_err(|_| fail("content is not valid UTF-8".into()))?;
    Ok(SourceUnit::new(id, path.clone(), text))
}
