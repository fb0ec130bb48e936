//! Output formats for `jade-assist settings`.
//!
//! None of the formats include the GitHub token; they only say whether one is
//! set.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::settings::{ENV_OVERRIDES, Origin, Settings};

/// Serializable view of [`Settings`] with the token reduced to a flag.
#[derive(Debug, Serialize)]
pub struct SettingsView<'a> {
    pub environment: &'a str,
    pub is_ci: bool,
    pub home_dir: &'a Path,
    pub projects_base: &'a Path,
    pub jade_context_file: &'a Path,
    pub ecosystem_assist_root: &'a Path,
    pub submodules_path: &'a Path,
    pub health_reports_dir: &'a Path,
    pub context_token_budget: i64,
    pub github_token_set: bool,
    /// Origin per overridable field, keyed by field name.
    pub origins: BTreeMap<&'static str, Origin>,
}

impl<'a> From<&'a Settings> for SettingsView<'a> {
    fn from(settings: &'a Settings) -> Self {
        let origins = ENV_OVERRIDES
            .iter()
            .filter_map(|entry| settings.origin(entry.var).map(|origin| (entry.field, origin)))
            .collect();
        Self {
            environment: &settings.environment,
            is_ci: settings.is_ci,
            home_dir: &settings.home_dir,
            projects_base: &settings.projects_base,
            jade_context_file: &settings.jade_context_file,
            ecosystem_assist_root: &settings.ecosystem_assist_root,
            submodules_path: &settings.submodules_path,
            health_reports_dir: &settings.health_reports_dir,
            context_token_budget: settings.context_token_budget,
            github_token_set: settings.github_token_set(),
            origins,
        }
    }
}

/// Pretty-printed JSON with a trailing newline.
pub fn render_json(settings: &Settings) -> Result<String> {
    let mut payload =
        serde_json::to_string_pretty(&SettingsView::from(settings)).context("serialize settings")?;
    payload.push('\n');
    Ok(payload)
}

/// One aligned line per field, annotated with where the value came from.
pub fn render_text(settings: &Settings) -> String {
    let token = if settings.github_token_set() {
        "<set>"
    } else {
        "<unset>"
    };
    let rows = [
        ("environment", settings.environment.clone()),
        ("is_ci", settings.is_ci.to_string()),
        ("home_dir", settings.home_dir.display().to_string()),
        ("projects_base", settings.projects_base.display().to_string()),
        (
            "jade_context_file",
            settings.jade_context_file.display().to_string(),
        ),
        (
            "ecosystem_assist_root",
            settings.ecosystem_assist_root.display().to_string(),
        ),
        (
            "submodules_path",
            settings.submodules_path.display().to_string(),
        ),
        (
            "health_reports_dir",
            settings.health_reports_dir.display().to_string(),
        ),
        (
            "context_token_budget",
            settings.context_token_budget.to_string(),
        ),
        ("github_token", token.to_string()),
    ];

    let mut out = String::new();
    for (field, value) in rows {
        let source = match ENV_OVERRIDES.iter().find(|entry| entry.field == field) {
            Some(entry) => match settings.origin(entry.var) {
                Some(origin) => format!("{origin}: {}", entry.var),
                None => entry.var.to_string(),
            },
            None => "host".to_string(),
        };
        let _ = writeln!(out, "{field:<22} {value}  [{source}]");
    }
    out
}

/// Shell-sourceable `export` lines for the session hook.
pub fn render_env(settings: &Settings) -> String {
    let vars = [
        ("ENVIRONMENT", settings.environment.clone()),
        ("CI", settings.is_ci.to_string()),
        ("PROJECTS_BASE", lossy(&settings.projects_base)),
        ("JADE_CONTEXT_FILE", lossy(&settings.jade_context_file)),
        ("ECOSYSTEM_ASSIST_ROOT", lossy(&settings.ecosystem_assist_root)),
        ("SUBMODULES_PATH", lossy(&settings.submodules_path)),
        ("HEALTH_REPORTS_DIR", lossy(&settings.health_reports_dir)),
        (
            "CONTEXT_TOKEN_BUDGET",
            settings.context_token_budget.to_string(),
        ),
    ];

    let mut out = String::new();
    for (name, value) in vars {
        let _ = writeln!(out, "export {name}={}", shell_quote(&value));
    }
    out
}

/// Single-quote `value` for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::env::MapEnv;
    use crate::settings::{CI, GITHUB_TOKEN};
    use crate::test_support::fake_host;

    fn settings(env: MapEnv) -> Settings {
        Settings::resolve(&env, &fake_host("/home/alice")).expect("resolve")
    }

    #[test]
    fn json_reports_values_and_origins() {
        let settings = settings(MapEnv::new().with(CI, "True"));
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&settings).expect("json")).expect("parse");
        assert_eq!(json["environment"], "development");
        assert_eq!(json["is_ci"], true);
        assert_eq!(json["context_token_budget"], 15000);
        assert_eq!(json["projects_base"], "/home/alice/projects");
        assert_eq!(json["github_token_set"], false);
        assert_eq!(json["origins"]["is_ci"], "env");
        assert_eq!(json["origins"]["environment"], "default");
    }

    #[test]
    fn no_format_leaks_the_token() {
        let settings = settings(MapEnv::new().with(GITHUB_TOKEN, "ghp_secret"));
        let json = render_json(&settings).expect("json");
        assert!(!json.contains("ghp_secret"));
        assert!(json.contains("\"github_token_set\": true"));
        assert!(!render_text(&settings).contains("ghp_secret"));
        assert!(!render_env(&settings).contains("ghp_secret"));
    }

    #[test]
    fn text_marks_origin_per_field() {
        let text = render_text(&settings(MapEnv::new().with(CI, "true")));
        let ci_line = text
            .lines()
            .find(|line| line.starts_with("is_ci"))
            .expect("is_ci line");
        assert!(ci_line.contains("[env: CI]"), "{ci_line}");
        let home_line = text
            .lines()
            .find(|line| line.starts_with("home_dir"))
            .expect("home_dir line");
        assert!(home_line.contains("[host]"), "{home_line}");
        assert!(text.contains("<unset>"));
    }

    #[test]
    fn env_lines_are_exported_and_quoted() {
        let env = render_env(&settings(MapEnv::new().with("ENVIRONMENT", "it's prod")));
        assert!(env.contains("export ENVIRONMENT='it'\\''s prod'\n"), "{env}");
        assert!(env.contains("export CI='false'\n"));
        assert!(env.contains("export CONTEXT_TOKEN_BUDGET='15000'\n"));
        assert!(env.contains("export PROJECTS_BASE='/home/alice/projects'\n"));
        assert_eq!(env.lines().count(), 8);
    }

    #[test]
    fn shell_quote_wraps_plain_values() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote(""), "''");
    }
}
