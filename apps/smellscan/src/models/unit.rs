//! In-memory source unit produced by the loader.

use crate::lex::{self, Dialect};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
/// An immutable loaded source file.
pub struct SourceUnit {
    /// Path relative to the scan root, always `/`-separated.
    pub id: String,
    pub path: PathBuf,
    pub text: String,
    lines: Vec<String>,
    /// `lines` with comments and string contents blanked out.
    code: Vec<String>,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let id = id.into();
        let lines = text.lines().map(str::to_string).collect();
        let code = lex::mask(&text, Dialect::for_id(&id));
        SourceUnit {
            id,
            path: path.into(),
            text,
            lines,
            code,
        }
    }

    /// Build a unit whose path equals its id. Handy for in-memory scans.
    pub fn from_text(id: &str, text: &str) -> Self {
        SourceUnit::new(id, id, text)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn code(&self) -> &[String] {
        &self.code
    }

    /// Line by 1-indexed number.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Directory portion of `id` (empty for root-level units).
    pub fn dir(&self) -> &str {
        match self.id.rfind('/') {
            Some(i) => &self.id[..i],
            None => "",
        }
    }
}
