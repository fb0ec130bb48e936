//! Centralized settings for jade-ecosystem-assist.
//!
//! Every overridable value follows one rule: if the environment defines the
//! variable (with any value, empty included), that raw value is coerced to the
//! field's type; otherwise the default is computed from the host. The table in
//! [`ENV_OVERRIDES`] lists every variable, and [`Settings::resolve`] walks the
//! same variables through a single generic resolver.
//!
//! Settings are built once per process by [`get_settings`] and never
//! re-resolved. Commands receive `&Settings` explicitly; the shared instance is
//! only looked up once, at startup.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::coerce::{absolutize, parse_integer, truthy};
use crate::io::env::{EnvSource, ProcessEnv};
use crate::io::host::HostPaths;

pub const ENVIRONMENT: &str = "ENVIRONMENT";
pub const CI: &str = "CI";
pub const PROJECTS_BASE: &str = "PROJECTS_BASE";
pub const JADE_CONTEXT_FILE: &str = "JADE_CONTEXT_FILE";
pub const SUBMODULES_PATH: &str = "SUBMODULES_PATH";
pub const HEALTH_REPORTS_DIR: &str = "HEALTH_REPORTS_DIR";
pub const CONTEXT_TOKEN_BUDGET: &str = "CONTEXT_TOKEN_BUDGET";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_CONTEXT_TOKEN_BUDGET: i64 = 15_000;

/// One environment override: variable name, the field it sets, and how the
/// default is derived when the variable is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvOverride {
    pub var: &'static str,
    pub field: &'static str,
    pub default: &'static str,
}

/// Every environment variable the resolver reads, in field order.
pub const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        var: ENVIRONMENT,
        field: "environment",
        default: "development",
    },
    EnvOverride {
        var: CI,
        field: "is_ci",
        default: "false",
    },
    EnvOverride {
        var: PROJECTS_BASE,
        field: "projects_base",
        default: "<home_dir>/projects",
    },
    EnvOverride {
        var: JADE_CONTEXT_FILE,
        field: "jade_context_file",
        default: "<home_dir>/.jade/context.md",
    },
    EnvOverride {
        var: SUBMODULES_PATH,
        field: "submodules_path",
        default: "<ecosystem_assist_root>/modules",
    },
    EnvOverride {
        var: HEALTH_REPORTS_DIR,
        field: "health_reports_dir",
        default: "<ecosystem_assist_root>/docs/health-reports",
    },
    EnvOverride {
        var: CONTEXT_TOKEN_BUDGET,
        field: "context_token_budget",
        default: "15000",
    },
    EnvOverride {
        var: GITHUB_TOKEN,
        field: "github_token",
        default: "unset",
    },
];

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Env,
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Env => f.write_str("env"),
            Origin::Default => f.write_str("default"),
        }
    }
}

/// Resolved configuration. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub environment: String,
    pub is_ci: bool,
    pub home_dir: PathBuf,
    pub projects_base: PathBuf,
    pub jade_context_file: PathBuf,
    pub ecosystem_assist_root: PathBuf,
    pub submodules_path: PathBuf,
    pub health_reports_dir: PathBuf,
    pub context_token_budget: i64,
    pub github_token: Option<String>,
    origins: BTreeMap<&'static str, Origin>,
}

impl Settings {
    /// Resolve settings from `env`, deriving defaults from `host`.
    ///
    /// Fails when `CONTEXT_TOKEN_BUDGET` is set but is not an integer. The
    /// working directory is only consulted for relative path overrides, so an
    /// unreadable one fails resolution only in that case.
    pub fn resolve<E: EnvSource + ?Sized>(env: &E, host: &HostPaths) -> Result<Self> {
        let mut r = Resolver::new(env);
        let home_dir = host.home_dir.clone();
        let root = host.install_root.clone();

        let environment = r.resolve(
            ENVIRONMENT,
            || DEFAULT_ENVIRONMENT.to_string(),
            |raw| Ok(lossy(raw)),
        )?;
        let is_ci = r.resolve(CI, || false, |raw| Ok(truthy(&lossy(raw))))?;
        let projects_base = r.resolve(
            PROJECTS_BASE,
            || home_dir.join("projects"),
            |raw| path(host, raw),
        )?;
        let jade_context_file = r.resolve(
            JADE_CONTEXT_FILE,
            || home_dir.join(".jade").join("context.md"),
            |raw| path(host, raw),
        )?;
        let submodules_path = r.resolve(
            SUBMODULES_PATH,
            || root.join("modules"),
            |raw| path(host, raw),
        )?;
        let health_reports_dir = r.resolve(
            HEALTH_REPORTS_DIR,
            || root.join("docs").join("health-reports"),
            |raw| path(host, raw),
        )?;
        let context_token_budget = r.resolve(
            CONTEXT_TOKEN_BUDGET,
            || DEFAULT_CONTEXT_TOKEN_BUDGET,
            |raw| parse_integer(CONTEXT_TOKEN_BUDGET, &lossy(raw)),
        )?;
        let github_token = r.resolve(GITHUB_TOKEN, || None, |raw| Ok(Some(lossy(raw))))?;

        Ok(Self {
            environment,
            is_ci,
            home_dir,
            projects_base,
            jade_context_file,
            ecosystem_assist_root: root,
            submodules_path,
            health_reports_dir,
            context_token_budget,
            github_token,
            origins: r.origins,
        })
    }

    /// Resolve settings from the process environment and detected host paths.
    pub fn from_process() -> Result<Self> {
        let host = HostPaths::detect().context("detect host paths")?;
        Self::resolve(&ProcessEnv, &host).context("resolve settings")
    }

    /// Origin of the value behind environment variable `var`, if the resolver
    /// reads that variable.
    pub fn origin(&self, var: &str) -> Option<Origin> {
        self.origins.get(var).copied()
    }

    pub fn github_token_set(&self) -> bool {
        self.github_token.is_some()
    }

    /// All path-typed fields as `(field, path)` pairs.
    pub fn paths(&self) -> [(&'static str, &Path); 6] {
        [
            ("home_dir", self.home_dir.as_path()),
            ("projects_base", self.projects_base.as_path()),
            ("jade_context_file", self.jade_context_file.as_path()),
            ("ecosystem_assist_root", self.ecosystem_assist_root.as_path()),
            ("submodules_path", self.submodules_path.as_path()),
            ("health_reports_dir", self.health_reports_dir.as_path()),
        ]
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("environment", &self.environment)
            .field("is_ci", &self.is_ci)
            .field("home_dir", &self.home_dir)
            .field("projects_base", &self.projects_base)
            .field("jade_context_file", &self.jade_context_file)
            .field("ecosystem_assist_root", &self.ecosystem_assist_root)
            .field("submodules_path", &self.submodules_path)
            .field("health_reports_dir", &self.health_reports_dir)
            .field("context_token_budget", &self.context_token_budget)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Shared settings for this process, resolved on first call.
///
/// Later calls return the same instance. A failed first resolution is not
/// cached; the next call tries again.
pub fn get_settings() -> Result<&'static Settings> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }
    let resolved = Settings::from_process()?;
    Ok(SETTINGS.get_or_init(|| resolved))
}

struct Resolver<'a, E: ?Sized> {
    env: &'a E,
    origins: BTreeMap<&'static str, Origin>,
}

impl<'a, E: EnvSource + ?Sized> Resolver<'a, E> {
    fn new(env: &'a E) -> Self {
        Self {
            env,
            origins: BTreeMap::new(),
        }
    }

    fn resolve<T>(
        &mut self,
        var: &'static str,
        default: impl FnOnce() -> T,
        coerce: impl FnOnce(OsString) -> Result<T>,
    ) -> Result<T> {
        match self.env.var_os(var) {
            Some(raw) => {
                debug!(var, origin = %Origin::Env, "resolved setting");
                self.origins.insert(var, Origin::Env);
                coerce(raw)
            }
            None => {
                debug!(var, origin = %Origin::Default, "resolved setting");
                self.origins.insert(var, Origin::Default);
                Ok(default())
            }
        }
    }
}

fn lossy(raw: OsString) -> String {
    raw.into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
}

fn path(host: &HostPaths, raw: OsString) -> Result<PathBuf> {
    let raw = PathBuf::from(raw);
    if raw.is_absolute() {
        return Ok(raw);
    }
    let base = host.relative_base().context("resolve relative path override")?;
    Ok(absolutize(&base, &raw))
}
