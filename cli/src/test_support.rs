//! Test-only helpers for host paths, hook scripts, and scaffold documents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::io::host::{HostPaths, install_root};

/// Host paths with a fixed home directory, the real install root, and the
/// system temp dir as the base for relative overrides.
pub fn fake_host(home: impl Into<PathBuf>) -> HostPaths {
    HostPaths {
        home_dir: home.into(),
        install_root: install_root(),
        current_dir: Some(std::env::temp_dir()),
    }
}

/// Scratch directory for hook and scaffold fixtures.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the scratch root, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write a shell script and optionally mark it executable.
    pub fn write_script(&self, relative: &str, body: &str, executable: bool) -> Result<PathBuf> {
        let path = self.write(relative, body)?;
        if executable {
            set_executable(&path)?;
        }
        Ok(path)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms).with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Frontmatter block carrying every required scaffold key.
pub const COMPLETE_SCAFFOLD: &str = "---
entity_id: scaffold-example
entity_name: Example Scaffold
entity_type: scaffold
entity_language: markdown
entity_status: active
entity_path: architecture/ascii/scaffolds/example.md
entity_dependencies: []
entity_health_check: manual
---

# Example Scaffold
";
