//! `git` subprocess execution with deadlines and cancellation.

use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::cancel::CancelToken;

/// How often a running child is checked for exit, deadline and cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why a `git` invocation did not produce output.
#[derive(Debug, Error)]
pub enum GitError {
    /// The process could not be started or waited on.
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// The process exited unsuccessfully.
    #[error("{status}, output: {output}")]
    Exit { status: ExitStatus, output: String },

    /// The process ran past its deadline and was killed.
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    /// The run was cancelled and the process was killed.
    #[error("cancelled")]
    Cancelled,
}

/// Limits applied to one `git` invocation.
#[derive(Debug, Clone, Default)]
pub struct GitLimits {
    /// Kill the process after this long.
    pub timeout: Option<Duration>,
    /// Kill the process when this trips.
    pub cancel: CancelToken,
}

/// Run `git` with `args`, returning its stdout.
///
/// Prompts are disabled so unreachable or private repositories fail fast
/// instead of waiting for credentials.
pub fn run<I, S>(args: I, cwd: Option<&Path>, limits: &GitLimits) -> Result<String, GitError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new("git");
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Own process group; `kill` signals git and its helpers together.
        cmd.process_group(0);
    }

    let mut child = cmd.spawn()?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_handle = thread::spawn(move || drain(stdout));
    let stderr_handle = thread::spawn(move || drain(stderr));

    let deadline = limits.timeout.map(|t| Instant::now() + t);

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if limits.cancel.is_cancelled() {
            kill(&mut child);
            return Err(GitError::Cancelled);
        }
        if let (Some(deadline), Some(timeout)) = (deadline, limits.timeout) {
            if Instant::now() >= deadline {
                kill(&mut child);
                return Err(GitError::TimedOut(timeout));
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    if status.success() {
        Ok(stdout)
    } else {
        let mut output = stdout;
        output.push_str(&stderr);
        Err(GitError::Exit {
            status,
            output: output.trim().to_string(),
        })
    }
}

/// Kill a child together with its helpers, then reap it.
///
/// Helpers spawned by git (`git-remote-https`, `index-pack`) share the
/// child's process group, so none of them keeps writing into the clone
/// directory after this returns.
fn kill(child: &mut Child) {
    kill_group(child);
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(child: &mut Child) {
    match libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg only sends a signal; the group id is the child's
        // pid because it was spawned with `process_group(0)`.
        Ok(pgid) => unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        },
        Err(_) => {
            let _ = child.kill();
        }
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    let _ = child.kill();
}

fn drain(pipe: Option<impl Read>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
