//! Host facts that settings defaults are derived from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Filesystem locations taken from the host rather than the environment
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// The invoking user's home directory.
    pub home_dir: PathBuf,
    /// Workspace root of this tool.
    pub install_root: PathBuf,
    /// Base for relative path overrides. `None` means the process working
    /// directory, read only when a relative override needs it.
    pub current_dir: Option<PathBuf>,
}

impl HostPaths {
    /// Detect host paths for the running process.
    ///
    /// Does not read the working directory unless `HOME` itself is relative.
    pub fn detect() -> Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
        let home_dir = if home_dir.is_absolute() {
            home_dir
        } else {
            process_dir()?.join(home_dir)
        };
        let paths = Self {
            home_dir,
            install_root: install_root(),
            current_dir: None,
        };
        debug!(
            home_dir = %paths.home_dir.display(),
            install_root = %paths.install_root.display(),
            "detected host paths"
        );
        Ok(paths)
    }

    /// Directory that relative path overrides are resolved against.
    pub fn relative_base(&self) -> Result<PathBuf> {
        match &self.current_dir {
            Some(dir) => Ok(dir.clone()),
            None => process_dir(),
        }
    }
}

fn process_dir() -> Result<PathBuf> {
    std::env::current_dir().context("read current directory")
}

/// Root of the `jade-ecosystem-assist` workspace.
///
/// Fixed at compile time from this crate's manifest location, so it does not
/// depend on the current directory.
pub fn install_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(manifest_dir).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_root_is_workspace_root() {
        let root = install_root();
        assert!(root.is_absolute());
        assert!(root.join("cli").join("Cargo.toml").is_file());
        assert!(root.join("Cargo.toml").is_file());
    }

    #[test]
    fn detect_yields_absolute_paths() {
        let host = HostPaths::detect().expect("detect");
        assert!(host.home_dir.is_absolute());
        assert!(host.install_root.is_absolute());
        assert_eq!(host.current_dir, None);
    }

    #[test]
    fn relative_base_prefers_fixed_dir() {
        let fixed = std::env::temp_dir();
        let host = HostPaths {
            current_dir: Some(fixed.clone()),
            ..HostPaths::detect().expect("detect")
        };
        assert_eq!(host.relative_base().expect("base"), fixed);
    }
}
