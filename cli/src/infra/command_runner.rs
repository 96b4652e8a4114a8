//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` drives `tokio::process` on a current-thread runtime so
//! the rest of the workflow stays synchronous. The deadline covers both the
//! child's exit and the collection of its output.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;

use crate::application::ports::CommandRunner;

/// Default timeout for short-lived helper commands.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to keep reading after the child exits. A daemonizing child can
/// leave a background process holding its stdout open indefinitely.
const PIPE_GRACE: Duration = Duration::from_millis(250);

/// Production `CommandRunner`: spawns with `kill_on_drop` and kills the child
/// explicitly when the deadline fires.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>, buf: &mut Vec<u8>) {
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(buf).await;
    }
}

/// Wait for the child while draining both pipes.
///
/// Returns once the pipes close, or `PIPE_GRACE` after the child exits,
/// whichever comes first.
async fn collect(
    child: &mut Child,
    stdout: &mut Vec<u8>,
    stderr: &mut Vec<u8>,
) -> std::io::Result<ExitStatus> {
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let reads = async {
        tokio::join!(read_pipe(stdout_pipe, stdout), read_pipe(stderr_pipe, stderr));
    };
    tokio::pin!(reads);

    let exited = tokio::select! {
        () = &mut reads => None,
        status = child.wait() => Some(status),
    };
    match exited {
        Some(status) => {
            if tokio::time::timeout(PIPE_GRACE, &mut reads).await.is_err() {
                tracing::debug!("child exited with its output pipes still held open");
            }
            status
        }
        None => child.wait().await,
    }
}

async fn run_child(program: &str, args: &[&str], timeout: Duration) -> Result<Output> {
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    tokio::select! {
        status = collect(&mut child, &mut stdout, &mut stderr) => Ok(Output {
            status: status.with_context(|| format!("waiting for {program}"))?,
            stdout,
            stderr,
        }),
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
        }
    }
}

impl CommandRunner for TokioCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout)
    }

    fn run_with_timeout(&self, program: &str, args: &[&str], timeout: Duration) -> Result<Output> {
        tracing::debug!(program, args = args.len(), "spawning");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start process runtime")?;
        runtime.block_on(run_child(program, args, timeout))
    }
}
