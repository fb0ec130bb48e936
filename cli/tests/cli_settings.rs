//! CLI tests for `jade-assist settings`.
//!
//! Spawns the binary with a scrubbed override environment and checks the
//! resolved values, override coercion, and exit codes.

mod common;

use std::path::PathBuf;

use jade_assist::exit_codes;
use serde_json::Value;

use common::{assist, scrub_env};

fn settings_json(cmd: &mut std::process::Command) -> Value {
    let output = cmd
        .args(["settings", "--format", "json"])
        .output()
        .expect("jade-assist settings");
    assert_eq!(
        output.status.code(),
        Some(exit_codes::OK),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("parse settings json")
}

#[test]
fn defaults_without_overrides() {
    let home = tempfile::tempdir().expect("tempdir");
    let json = settings_json(&mut assist(home.path()));

    assert_eq!(json["environment"], "development");
    assert_eq!(json["is_ci"], false);
    assert_eq!(json["context_token_budget"], 15000);
    assert_eq!(json["github_token_set"], false);
}

#[cfg(unix)]
#[test]
fn home_derived_paths_follow_home() {
    let home = tempfile::tempdir().expect("tempdir");
    let json = settings_json(&mut assist(home.path()));

    let projects = PathBuf::from(json["projects_base"].as_str().expect("projects_base"));
    let context = PathBuf::from(json["jade_context_file"].as_str().expect("context file"));
    assert_eq!(projects, home.path().join("projects"));
    assert_eq!(context, home.path().join(".jade").join("context.md"));
}

#[test]
fn root_is_install_dir_regardless_of_cwd() {
    let home = tempfile::tempdir().expect("tempdir");
    let elsewhere = tempfile::tempdir().expect("tempdir");
    let json = settings_json(assist(home.path()).current_dir(elsewhere.path()));

    let root = PathBuf::from(json["ecosystem_assist_root"].as_str().expect("root"));
    let expected = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .to_path_buf();
    assert_eq!(root, expected);
    assert_eq!(
        PathBuf::from(json["submodules_path"].as_str().expect("submodules")),
        expected.join("modules")
    );
}

#[test]
fn overrides_are_coerced() {
    let home = tempfile::tempdir().expect("tempdir");
    let json = settings_json(
        assist(home.path())
            .env("ENVIRONMENT", "staging")
            .env("CI", "TRUE")
            .env("CONTEXT_TOKEN_BUDGET", "5000")
            .env("GITHUB_TOKEN", "ghp_secret"),
    );

    assert_eq!(json["environment"], "staging");
    assert_eq!(json["is_ci"], true);
    assert_eq!(json["context_token_budget"], 5000);
    assert!(json["context_token_budget"].is_i64());
    assert_eq!(json["github_token_set"], true);
    assert_eq!(json["origins"]["context_token_budget"], "env");
}

#[test]
fn ci_only_accepts_true() {
    let home = tempfile::tempdir().expect("tempdir");
    for raw in ["1", "yes"] {
        let json = settings_json(assist(home.path()).env("CI", raw));
        assert_eq!(json["is_ci"], false, "CI={raw}");
    }
}

#[test]
fn non_numeric_budget_fails_startup() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = assist(home.path())
        .env("CONTEXT_TOKEN_BUDGET", "notanumber")
        .arg("settings")
        .output()
        .expect("jade-assist settings");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CONTEXT_TOKEN_BUDGET"), "{stderr}");
    assert!(stderr.contains("notanumber"), "{stderr}");
}

#[test]
fn token_never_printed() {
    let home = tempfile::tempdir().expect("tempdir");
    for format in ["text", "json", "env"] {
        let output = assist(home.path())
            .env("GITHUB_TOKEN", "ghp_secret")
            .env("RUST_LOG", "debug")
            .args(["settings", "--format", format])
            .output()
            .expect("jade-assist settings");
        assert_eq!(output.status.code(), Some(exit_codes::OK));
        assert!(!String::from_utf8_lossy(&output.stdout).contains("ghp_secret"));
        assert!(!String::from_utf8_lossy(&output.stderr).contains("ghp_secret"));
    }
}

/// Runs `jade-assist <args>` from inside a directory that is removed before
/// the binary starts.
#[cfg(unix)]
fn run_in_removed_dir(
    home: &std::path::Path,
    envs: &[(&str, &str)],
    args: &[&str],
) -> std::process::Output {
    let parent = tempfile::tempdir().expect("tempdir");
    let gone = parent.path().join("gone");
    std::fs::create_dir(&gone).expect("mkdir");

    let mut cmd = std::process::Command::new("/bin/sh");
    scrub_env(&mut cmd, home);
    cmd.args(["-c", "cd \"$1\" && rmdir \"$1\" && shift && exec \"$@\"", "sh"])
        .arg(&gone)
        .arg(env!("CARGO_BIN_EXE_jade-assist"))
        .args(args)
        .envs(envs.iter().copied());
    cmd.output().expect("spawn jade-assist")
}

#[cfg(unix)]
#[test]
fn settings_resolve_when_cwd_was_removed() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = run_in_removed_dir(home.path(), &[], &["settings", "--format", "json"]);
    assert_eq!(
        output.status.code(),
        Some(exit_codes::OK),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("parse settings json");
    assert_eq!(
        PathBuf::from(json["projects_base"].as_str().expect("projects_base")),
        home.path().join("projects")
    );
}

#[cfg(unix)]
#[test]
fn relative_override_needs_a_readable_cwd() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = run_in_removed_dir(
        home.path(),
        &[("PROJECTS_BASE", "relative/projects")],
        &["settings"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("current directory"), "{stderr}");
}

#[test]
fn grouped_digit_budget_is_accepted() {
    let home = tempfile::tempdir().expect("tempdir");
    let json = settings_json(assist(home.path()).env("CONTEXT_TOKEN_BUDGET", "5_000"));
    assert_eq!(json["context_token_budget"], 5000);
}
