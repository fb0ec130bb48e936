//! Bounded execution for hook scripts.
//!
//! A hook gets no stdin, a wall-clock limit, and a cap on how much of each
//! output stream is kept. Both pipes are drained while it runs, so a hook that
//! floods its output can neither block on a full pipe nor grow memory without
//! bound.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Finished(ExitStatus),
    /// Killed after outliving its time limit.
    TimedOut,
}

/// The kept head of one output stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Captured {
    pub bytes: Vec<u8>,
    /// Bytes read past the cap and thrown away.
    pub dropped: u64,
}

impl Captured {
    /// Last `max_lines` lines, lossily decoded.
    pub fn tail(&self, max_lines: usize) -> String {
        let text = String::from_utf8_lossy(&self.bytes);
        let lines: Vec<&str> = text.lines().collect();
        lines[lines.len().saturating_sub(max_lines)..].join("\n")
    }
}

#[derive(Debug)]
pub struct BoundedOutput {
    pub exit: Exit,
    pub stdout: Captured,
    pub stderr: Captured,
}

/// Run `cmd` with stdin closed, killing it once `timeout` elapses.
///
/// At most `cap_bytes` of each stream is kept.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), cap_bytes))]
pub fn run_bounded(
    mut cmd: Command,
    timeout: Duration,
    cap_bytes: usize,
) -> Result<BoundedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(program = ?cmd.get_program(), "spawning");
    let mut child = cmd.spawn().map_err(|err| {
        error!(%err, program = ?cmd.get_program(), "spawn failed");
        anyhow!(err).context(format!("spawn {}", cmd.get_program().to_string_lossy()))
    })?;

    let stdout = drain(child.stdout.take(), cap_bytes).context("take stdout")?;
    let stderr = drain(child.stderr.take(), cap_bytes).context("take stderr")?;
    let exit = wait_or_kill(&mut child, timeout)?;

    let output = BoundedOutput {
        exit,
        stdout: collect(stdout).context("collect stdout")?,
        stderr: collect(stderr).context("collect stderr")?,
    };
    if output.stdout.dropped > 0 || output.stderr.dropped > 0 {
        warn!(
            stdout_dropped = output.stdout.dropped,
            stderr_dropped = output.stderr.dropped,
            "output capped"
        );
    }
    debug!(exit = ?output.exit, "finished");
    Ok(output)
}

fn wait_or_kill(child: &mut Child, timeout: Duration) -> Result<Exit> {
    if let Some(status) = child.wait_timeout(timeout).context("wait for child")? {
        return Ok(Exit::Finished(status));
    }
    warn!(timeout_secs = timeout.as_secs(), "time limit reached, killing");
    child.kill().context("kill child")?;
    child.wait().context("reap killed child")?;
    Ok(Exit::TimedOut)
}

fn drain<R>(stream: Option<R>, cap: usize) -> Result<JoinHandle<io::Result<Captured>>>
where
    R: Read + Send + 'static,
{
    let stream = stream.ok_or_else(|| anyhow!("stream was not piped"))?;
    Ok(thread::spawn(move || read_capped(stream, cap)))
}

fn collect(handle: JoinHandle<io::Result<Captured>>) -> Result<Captured> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader panicked"))?
        .context("read output")
}

fn read_capped<R: Read>(mut reader: R, cap: usize) -> io::Result<Captured> {
    let mut bytes = Vec::new();
    (&mut reader).take(cap as u64).read_to_end(&mut bytes)?;
    let dropped = io::copy(&mut reader, &mut io::sink())?;
    Ok(Captured { bytes, dropped })
}
