//! Shared helpers for spawning the `jade-assist` binary.

use std::path::Path;
use std::process::Command;

use jade_assist::settings::ENV_OVERRIDES;

/// `jade-assist` with every settings override removed and `HOME` pointed at
/// `home`, so output depends only on what the test sets.
pub fn assist(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jade-assist"));
    scrub_env(&mut cmd, home);
    cmd
}

/// Remove every settings override from `cmd` and point `HOME` at `home`.
pub fn scrub_env(cmd: &mut Command, home: &Path) {
    for entry in ENV_OVERRIDES {
        cmd.env_remove(entry.var);
    }
    cmd.env_remove("RUST_LOG").env("HOME", home);
}
