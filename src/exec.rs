//! External process execution behind the [`Executor`] trait.
use anyhow::{Context as _, Result, anyhow};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl ExecResult {
    /// A successful result with the given stdout (test and fake helper).
    #[must_use]
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    /// A failed result with the given exit code and stderr.
    #[must_use]
    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success: false,
            code: Some(code),
        }
    }

    /// Describe a failure: exit status plus stderr, or stdout when stderr is empty.
    #[must_use]
    pub fn failure_message(&self) -> String {
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let status = self
            .code
            .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"));
        if detail.is_empty() {
            status
        } else {
            format!("{status}: {detail}")
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// A `bash -c` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// Working directory.
    pub dir: PathBuf,
    /// Script passed to `bash -c`.
    pub script: String,
    /// Text fed to the process on standard input.
    pub stdin: Option<String>,
}

/// Runs external programs.
///
/// Implementations return `Err` only when the process could not be started;
/// a non-zero exit is reported through [`ExecResult::success`].
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run `program` with `args` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run(&self, dir: &Path, program: &str, args: &[String]) -> Result<ExecResult>;

    /// Run a shell script through `bash -c`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned or stdin cannot be written.
    fn run_shell(&self, request: &ShellRequest) -> Result<ExecResult>;

    /// Whether `program` is found on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, dir: &Path, program: &str, args: &[String]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_shell(&self, request: &ShellRequest) -> Result<ExecResult> {
        let mut cmd = Command::new("bash");
        cmd.arg("-c")
            .arg(&request.script)
            .current_dir(&request.dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.stdin(if request.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = cmd.spawn().context("failed to execute: bash")?;
        // Stdin is fed from its own thread while the output pipes drain; a
        // child that exits without reading it is not an error.
        let writer = match (request.stdin.clone(), child.stdin.take()) {
            (Some(input), Some(mut pipe)) => Some(std::thread::spawn(move || {
                match pipe.write_all(input.as_bytes()) {
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                }
            })),
            _ => None,
        };
        let output = child
            .wait_with_output()
            .context("failed to wait for bash")?;
        if let Some(handle) = writer {
            handle
                .join()
                .map_err(|_| anyhow!("stdin writer thread panicked"))?
                .context("failed to write command stdin")?;
        }
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
