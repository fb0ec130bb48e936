//! Checks for the session-start hook script.
//!
//! The hook must exist, be executable, load settings through `jade-assist
//! settings`, and exit 0 when run (either after loading settings or after
//! skipping because the binary is unavailable).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::io::process::{Exit, run_bounded};
use crate::settings::Settings;

/// Text the hook must contain to show it loads settings through the resolver.
pub const SETTINGS_MARKER: &str = "jade-assist settings";
/// Variable through which the checker hands the hook a `jade-assist` binary.
pub const ASSIST_BIN_ENV: &str = "JADE_ASSIST_BIN";
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);
/// Kept per output stream; only the stderr tail is ever reported.
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCheckKind {
    Exists,
    Executable,
    SourcesSettings,
    Runs,
}

impl HookCheckKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HookCheckKind::Exists => "exists",
            HookCheckKind::Executable => "executable",
            HookCheckKind::SourcesSettings => "sources_settings",
            HookCheckKind::Runs => "runs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCheck {
    pub kind: HookCheckKind,
    pub passed: bool,
    pub detail: String,
}

impl HookCheck {
    fn pass(kind: HookCheckKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(kind: HookCheckKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Outcome of [`check_hook`]. Checks appear in the order they ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub path: PathBuf,
    pub checks: Vec<HookCheck>,
}

impl HookReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn check(&self, kind: HookCheckKind) -> Option<&HookCheck> {
        self.checks.iter().find(|check| check.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct HookCheckOptions {
    /// Execute the hook after the static checks.
    pub run: bool,
    /// Working directory for the hook process.
    pub workdir: PathBuf,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
    /// Exported to the hook as `JADE_ASSIST_BIN` when set.
    pub assist_bin: Option<PathBuf>,
}

impl HookCheckOptions {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            run: true,
            workdir: workdir.into(),
            timeout: DEFAULT_HOOK_TIMEOUT,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
            assist_bin: None,
        }
    }
}

/// The hook shipped with the tool.
pub fn default_hook_path(settings: &Settings) -> PathBuf {
    settings
        .ecosystem_assist_root
        .join(".claude")
        .join("hooks")
        .join("session-start.sh")
}

/// Run every hook check against `path`.
///
/// Failed checks are reported in the returned [`HookReport`]; only I/O errors
/// while inspecting the file are returned as `Err`. When the file is missing,
/// no further checks run.
pub fn check_hook(path: &Path, options: &HookCheckOptions) -> Result<HookReport> {
    let mut checks = Vec::new();

    if !path.is_file() {
        checks.push(HookCheck::fail(
            HookCheckKind::Exists,
            format!("missing file {}", path.display()),
        ));
        return Ok(HookReport {
            path: path.to_path_buf(),
            checks,
        });
    }
    checks.push(HookCheck::pass(HookCheckKind::Exists, "file present"));

    let executable = is_executable(path)?;
    checks.push(if executable {
        HookCheck::pass(HookCheckKind::Executable, "execute bit set")
    } else {
        HookCheck::fail(HookCheckKind::Executable, "execute bit not set")
    });

    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let contents = String::from_utf8_lossy(&contents);
    checks.push(if contents.contains(SETTINGS_MARKER) {
        HookCheck::pass(HookCheckKind::SourcesSettings, "loads settings")
    } else {
        HookCheck::fail(
            HookCheckKind::SourcesSettings,
            format!("does not reference '{SETTINGS_MARKER}'"),
        )
    });

    if options.run && executable {
        checks.push(run_hook(path, options));
    }

    let report = HookReport {
        path: path.to_path_buf(),
        checks,
    };
    info!(
        path = %report.path.display(),
        passed = report.passed(),
        "checked session hook"
    );
    Ok(report)
}

fn run_hook(path: &Path, options: &HookCheckOptions) -> HookCheck {
    // The child starts in `workdir`, so a relative program path must be
    // anchored to our own directory first.
    let program = match std::path::absolute(path) {
        Ok(program) => program,
        Err(err) => {
            return HookCheck::fail(
                HookCheckKind::Runs,
                format!("resolve {}: {err}", path.display()),
            );
        }
    };
    let mut cmd = Command::new(&program);
    cmd.current_dir(&options.workdir);
    if let Some(bin) = &options.assist_bin {
        cmd.env(ASSIST_BIN_ENV, bin);
    }
    debug!(path = %program.display(), workdir = %options.workdir.display(), "running hook");

    let output = match run_bounded(cmd, options.timeout, options.output_limit_bytes) {
        Ok(output) => output,
        Err(err) => return HookCheck::fail(HookCheckKind::Runs, format!("{err:#}")),
    };

    let status = match output.exit {
        Exit::TimedOut => {
            return HookCheck::fail(
                HookCheckKind::Runs,
                format!("timed out after {}s", options.timeout.as_secs()),
            );
        }
        Exit::Finished(status) if status.success() => {
            return HookCheck::pass(HookCheckKind::Runs, "exit 0");
        }
        Exit::Finished(status) => status,
    };

    let code = status
        .code()
        .map_or_else(|| "signal".to_string(), |code| code.to_string());
    let stderr = output.stderr.tail(5);
    if stderr.is_empty() {
        HookCheck::fail(HookCheckKind::Runs, format!("exit {code}"))
    } else {
        HookCheck::fail(HookCheckKind::Runs, format!("exit {code}: {stderr}"))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    Ok(metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool> {
    Ok(true)
}
