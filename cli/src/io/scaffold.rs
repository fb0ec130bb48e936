//! Validation of documentation scaffold files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::frontmatter::{REQUIRED_SCAFFOLD_KEYS, missing_keys, parse_frontmatter};
use crate::settings::Settings;

/// Result of checking one scaffold's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterReport {
    pub path: PathBuf,
    pub missing: Vec<&'static str>,
}

impl FrontmatterReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// The scaffold shipped with the tool.
pub fn default_scaffold_path(settings: &Settings) -> PathBuf {
    settings
        .ecosystem_assist_root
        .join("architecture")
        .join("ascii")
        .join("scaffolds")
        .join("claude-objects.md")
}

/// Read `path` and report which required frontmatter keys it lacks.
///
/// Missing keys are reported, not raised. A missing file or a document without
/// a well-formed frontmatter block is an error.
pub fn validate_scaffold(path: &Path) -> Result<FrontmatterReport> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let frontmatter =
        parse_frontmatter(&contents).with_context(|| format!("frontmatter of {}", path.display()))?;
    let missing = missing_keys(&frontmatter, REQUIRED_SCAFFOLD_KEYS);
    debug!(path = %path.display(), missing = missing.len(), "validated scaffold");
    Ok(FrontmatterReport {
        path: path.to_path_buf(),
        missing,
    })
}
