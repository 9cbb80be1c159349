//! External command execution.
//!
//! All child processes (git and the manifest generator) go through
//! [`CommandExecutor`] so tests can substitute a stub. The system
//! implementation enforces a timeout to avoid hangs.

use crate::error::{Result, UpdaterError};
use camino::Utf8Path;
use std::io::{self, Read};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default timeout for external commands (5 minutes).
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs `program` with `args`, optionally inside `working_dir`, and
    /// returns the captured output.
    ///
    /// A non-zero exit status is not an error at this level; callers inspect
    /// [`Output::status`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or does not finish
    /// in time.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gmaven_updater::exec::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor::default();
    /// let output = executor.run("git", &["--version"], None)?;
    /// assert!(output.status.success());
    /// # Ok::<(), gmaven_updater::error::UpdaterError>(())
    /// ```
    fn run(&self, program: &str, args: &[&str], working_dir: Option<&Utf8Path>) -> Result<Output>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn run(&self, program: &str, args: &[&str], working_dir: Option<&Utf8Path>) -> Result<Output> {
        (**self).run(program, args, working_dir)
    }
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandExecutor {
    timeout: Duration,
}

impl SystemCommandExecutor {
    /// Create an executor that kills commands running longer than `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::with_timeout(COMMAND_TIMEOUT)
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &str, args: &[&str], working_dir: Option<&Utf8Path>) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = working_dir {
            cmd.current_dir(dir.as_std_path());
        }

        let mut child = cmd.spawn()?;
        // Drain both pipes while waiting so a chatty child cannot block on a
        // full pipe buffer.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        match child.wait_timeout(self.timeout)? {
            Some(status) => Ok(Output {
                status,
                stdout: collect(stdout)?,
                stderr: collect(stderr)?,
            }),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(UpdaterError::ExternalTool {
                    tool: program.to_owned(),
                    message: format!("timed out after {} seconds", self.timeout.as_secs()),
                })
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut reader) = pipe {
            reader.read_to_end(&mut buffer)?;
        }
        Ok(buffer)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    let bytes = handle
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))??;
    Ok(bytes)
}
