//! Configuration discovery and effective settings resolution.
//!
//! smellscan reads `smellscan.toml|yaml|yml` from the scan root, or the file
//! given by `--config`, and merges it with CLI flags to produce a
//! `ScanConfig`.
//! Defaults:
//! - `extensions`: `[".ts", ".js"]`
//! - `godObjectThreshold`: 20
//! - `ruleTimeoutMs` / `readTimeoutMs`: 2000 (0 disables the watchdog)
//! - `failOn`: `warning`
//! - `format`: `plain`
//! - `maxFileBytes`: 2000000
//! - `jobs`: available parallelism
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::models::Severity;
use crate::output::OutputStyle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILES: [&str; 3] = ["smellscan.toml", "smellscan.yaml", "smellscan.yml"];

const DEFAULT_GOD_OBJECT_THRESHOLD: usize = 20;
const DEFAULT_TIMEOUT_MS: u64 = 2000;
const DEFAULT_MAX_FILE_BYTES: u64 = 2_000_000;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Root configuration as written in `smellscan.toml|yaml`.
pub struct FileConfig {
    pub extensions: Option<Vec<String>>,
    pub god_object_threshold: Option<usize>,
    pub rule_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub fail_on: Option<String>,
    pub format: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub max_file_bytes: Option<u64>,
    pub jobs: Option<usize>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleToggle>, // [rules.<id>].enabled
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RuleToggle {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration shared by loader, engine and rules.
pub struct ScanConfig {
    pub extensions: Vec<String>,
    pub god_object_threshold: usize,
    pub rule_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub fail_on: Severity,
    pub format: OutputStyle,
    pub exclude: Vec<glob::Pattern>,
    pub max_file_bytes: u64,
    pub jobs: usize,
    pub rules: BTreeMap<String, bool>, // id -> enabled
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            extensions: vec![".ts".into(), ".js".into()],
            god_object_threshold: DEFAULT_GOD_OBJECT_THRESHOLD,
            rule_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            fail_on: Severity::Warning,
            format: OutputStyle::Plain,
            exclude: Vec::new(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            jobs: default_jobs(),
            rules: BTreeMap::new(),
        }
    }
}

impl ScanConfig {
    /// Whether `path` carries one of the configured extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return false,
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Whether a root-relative id matches an `exclude` glob.
    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(id))
    }

    pub fn rule_enabled(&self, id: &str) -> bool {
        self.rules.get(id).copied().unwrap_or(true)
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Normalize extension tokens to a leading-dot form, dropping blanks and duplicates.
pub fn normalize_extensions<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tok in raw {
        let t = tok.as_ref().trim();
        if t.is_empty() {
            continue;
        }
        let ext = if t.starts_with('.') {
            t.to_string()
        } else {
            format!(".{}", t)
        };
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// Find the config file for `root`: the explicit path if given, otherwise
/// the first of `smellscan.toml|yaml|yml` present in `root`.
pub fn discover_config(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

/// Parse a config file; YAML by extension, TOML otherwise.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&s).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    } else {
        toml::from_str(&s).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Resolve `ScanConfig` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    root: &Path,
    cli_config: Option<&Path>,
    cli_ext: Option<&str>,
    cli_format: Option<&str>,
    cli_fail_on: Option<&str>,
    cli_jobs: Option<usize>,
) -> Result<ScanConfig, ConfigError> {
    let cfg = match discover_config(root, cli_config) {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading config");
            load_config(&path)?
        }
        None => FileConfig::default(),
    };
    let defaults = ScanConfig::default();

    let extensions = match cli_ext {
        Some(s) => normalize_extensions(s.split(',')),
        None => match cfg.extensions {
            Some(v) => normalize_extensions(v),
            None => defaults.extensions,
        },
    };
    if extensions.is_empty() {
        return Err(ConfigError::Invalid {
            key: "extensions",
            message: "at least one extension is required".into(),
        });
    }

    let god_object_threshold = cfg
        .god_object_threshold
        .unwrap_or(defaults.god_object_threshold);
    if god_object_threshold == 0 {
        return Err(ConfigError::Invalid {
            key: "godObjectThreshold",
            message: "must be at least 1".into(),
        });
    }

    let fail_on = match cli_fail_on.map(str::to_string).or(cfg.fail_on) {
        Some(s) => s.parse::<Severity>().map_err(|message| ConfigError::Invalid {
            key: "failOn",
            message,
        })?,
        None => defaults.fail_on,
    };

    let format = match cli_format.map(str::to_string).or(cfg.format) {
        Some(s) => s
            .parse::<OutputStyle>()
            .map_err(|message| ConfigError::Invalid {
                key: "format",
                message,
            })?,
        None => defaults.format,
    };

    let jobs = cli_jobs.or(cfg.jobs).unwrap_or(defaults.jobs);
    if jobs == 0 {
        return Err(ConfigError::Invalid {
            key: "jobs",
            message: "must be at least 1".into(),
        });
    }

    let exclude = cfg
        .exclude
        .unwrap_or_default()
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| ConfigError::Invalid {
                key: "exclude",
                message: format!("'{}': {}", p, e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rules = cfg
        .rules
        .into_iter()
        .map(|(id, t)| (id, t.enabled.unwrap_or(true)))
        .collect();

    Ok(ScanConfig {
        extensions,
        god_object_threshold,
        rule_timeout_ms: cfg.rule_timeout_ms.unwrap_or(defaults.rule_timeout_ms),
        read_timeout_ms: cfg.read_timeout_ms.unwrap_or(defaults.read_timeout_ms),
        fail_on,
        format,
        exclude,
        max_file_bytes: cfg.max_file_bytes.unwrap_or(defaults.max_file_bytes),
        jobs,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempdir().unwrap();
        let eff = resolve_effective(dir.path(), None, None, None, None, None).unwrap();
        assert_eq!(eff.extensions, vec![".ts", ".js"]);
        assert_eq!(eff.god_object_threshold, 20);
        assert_eq!(eff.rule_timeout_ms, 2000);
        assert_eq!(eff.fail_on, Severity::Warning);
        assert_eq!(eff.format, OutputStyle::Plain);
        assert!(eff.jobs >= 1);
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("smellscan.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
extensions = ["ts", ".py"]
godObjectThreshold = 12
failOn = "error"
format = "json"
exclude = ["vendor/**"]
[rules.magic-number]
enabled = false
    "#
        )
        .unwrap();

        let eff = resolve_effective(root, None, None, None, None, None).unwrap();
        assert_eq!(eff.extensions, vec![".ts", ".py"]);
        assert_eq!(eff.god_object_threshold, 12);
        assert_eq!(eff.fail_on, Severity::Error);
        assert_eq!(eff.format, OutputStyle::Json);
        assert!(eff.is_excluded("vendor/lib/x.ts"));
        assert!(!eff.rule_enabled("magic-number"));
        assert!(eff.rule_enabled("circular-import"));
    }

    #[test]
    fn test_load_yaml_and_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("smellscan.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
extensions: [".js"]
failOn: info
format: json
jobs: 3
            "#
        )
        .unwrap();

        let eff = resolve_effective(
            root,
            None,
            Some(".ts, .tsx"),
            Some("plain"),
            Some("error"),
            None,
        )
        .unwrap();
        assert_eq!(eff.extensions, vec![".ts", ".tsx"]);
        assert_eq!(eff.format, OutputStyle::Plain);
        assert_eq!(eff.fail_on, Severity::Error);
        assert_eq!(eff.jobs, 3);
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = resolve_effective(dir.path(), Some(&missing), None, None, None, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("smellscan.toml"), "godObjectThreshold = 0\n").unwrap();
        let err = resolve_effective(root, None, None, None, None, None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "godObjectThreshold",
                ..
            }
        ));

        fs::write(root.join("smellscan.toml"), "failOn = \"loud\"\n").unwrap();
        let err = resolve_effective(root, None, None, None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "failOn", .. }));

        fs::write(root.join("smellscan.toml"), "bogus = 1\n").unwrap();
        let err = resolve_effective(root, None, None, None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        fs::write(root.join("smellscan.toml"), "").unwrap();
        let err = resolve_effective(root, None, Some(" , "), None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "extensions", .. }));
    }

    #[test]
    fn test_accepts_extension_matches_suffix() {
        let cfg = ScanConfig::default();
        assert!(cfg.accepts_extension(Path::new("a/b/user.ts")));
        assert!(cfg.accepts_extension(Path::new("magic-numbers.js")));
        assert!(!cfg.accepts_extension(Path::new("n-plus-one.py")));
        assert!(!cfg.accepts_extension(Path::new("notes.tsx")));
    }
}
