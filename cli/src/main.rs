//! `jade-assist`: settings and repository checks for jade-ecosystem-assist.
//!
//! Settings are resolved once at startup and passed to every command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use jade_assist::exit_codes;
use jade_assist::io::hook::{HookCheckOptions, check_hook, default_hook_path};
use jade_assist::io::scaffold::{default_scaffold_path, validate_scaffold};
use jade_assist::logging;
use jade_assist::render::{render_env, render_json, render_text};
use jade_assist::settings::{Settings, get_settings};

#[derive(Parser)]
#[command(
    name = "jade-assist",
    version,
    about = "Settings and repository checks for jade-ecosystem-assist"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print resolved settings.
    Settings {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Check the session-start hook: exists, executable, loads settings, exits 0.
    CheckHook {
        /// Hook script to check (defaults to `.claude/hooks/session-start.sh`).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Skip executing the hook.
        #[arg(long)]
        no_run: bool,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Check that scaffold documents carry the required frontmatter keys.
    ///
    /// Every file is checked even after one cannot be read.
    CheckScaffold {
        /// Scaffold files (defaults to `architecture/ascii/scaffolds/claude-objects.md`).
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Env,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let settings = get_settings()?;
    debug!(?settings, "settings resolved");
    match cli.command {
        Command::Settings { format } => cmd_settings(settings, format),
        Command::CheckHook {
            path,
            no_run,
            timeout_secs,
        } => cmd_check_hook(settings, path, !no_run, timeout_secs),
        Command::CheckScaffold { paths } => cmd_check_scaffold(settings, paths),
    }
}

fn cmd_settings(settings: &Settings, format: Format) -> Result<i32> {
    let out = match format {
        Format::Text => render_text(settings),
        Format::Json => render_json(settings)?,
        Format::Env => render_env(settings),
    };
    print!("{out}");
    Ok(exit_codes::OK)
}

fn cmd_check_hook(
    settings: &Settings,
    path: Option<PathBuf>,
    run: bool,
    timeout_secs: u64,
) -> Result<i32> {
    let path = path.unwrap_or_else(|| default_hook_path(settings));
    let options = HookCheckOptions {
        run,
        timeout: Duration::from_secs(timeout_secs),
        assist_bin: std::env::current_exe().ok(),
        ..HookCheckOptions::new(&settings.ecosystem_assist_root)
    };
    let report = check_hook(&path, &options)
        .with_context(|| format!("check hook {}", path.display()))?;

    println!("{}", report.path.display());
    for check in &report.checks {
        let mark = if check.passed { "ok" } else { "FAIL" };
        println!("  {mark:<4} {:<16} {}", check.kind.as_str(), check.detail);
    }
    Ok(if report.passed() {
        exit_codes::OK
    } else {
        exit_codes::CHECK_FAILED
    })
}

fn cmd_check_scaffold(settings: &Settings, paths: Vec<PathBuf>) -> Result<i32> {
    let paths = if paths.is_empty() {
        vec![default_scaffold_path(settings)]
    } else {
        paths
    };

    let mut all_valid = true;
    let mut had_error = false;
    for path in &paths {
        let report = match validate_scaffold(path) {
            Ok(report) => report,
            Err(err) => {
                had_error = true;
                eprintln!("ERROR {}: {err:#}", path.display());
                continue;
            }
        };
        if report.is_valid() {
            println!("ok   {}", report.path.display());
        } else {
            all_valid = false;
            println!(
                "FAIL {} missing: {}",
                report.path.display(),
                report.missing.join(", ")
            );
        }
    }
    Ok(if had_error {
        exit_codes::INVALID
    } else if all_valid {
        exit_codes::OK
    } else {
        exit_codes::CHECK_FAILED
    })
}
