//! Shell commands and hook scripts, run through `bash -c`.
use anyhow::{Context as _, Result, bail};

use crate::config::ShellCommand;
use crate::exec::ShellRequest;
use crate::logging::Severity;
use crate::tasks::Context;

/// What happened to one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command exited successfully.
    Executed,
    /// The command could not start or exited non-zero.
    Failed(String),
}

impl CommandOutcome {
    /// How this outcome counts in the run tally.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Executed => Severity::Success,
            Self::Failed(_) => Severity::Error,
        }
    }
}

/// Run `script` in the execution directory and fail on a non-zero exit.
fn run_script(ctx: &Context, script: &str, stdin: Option<&str>) -> Result<String> {
    let result = ctx.executor.run_shell(&ShellRequest {
        dir: ctx.env.exec_dir.clone(),
        script: script.to_string(),
        stdin: stdin.map(String::from),
    })?;
    if !result.success {
        bail!("{}", result.failure_message());
    }
    Ok(result.stdout)
}

/// Run one configured shell command.
pub fn run_shell_command(ctx: &Context, cmd: &ShellCommand) -> CommandOutcome {
    let label = cmd.label();
    ctx.log.info(&format!("Running: {label}"));
    ctx.log.debug(&format!("Command: {}", cmd.command));

    let ran = ctx.execute(|| {
        let stdout = run_script(ctx, &cmd.command, cmd.stdin.as_deref())?;
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            ctx.log.debug(&format!("Output: {stdout}"));
        }
        Ok(())
    });
    match ran {
        Ok(()) => {
            ctx.log.success(&format!("Executed: {label}"));
            CommandOutcome::Executed
        }
        Err(e) => {
            let reason = format!("Command failed: {e:#}");
            ctx.log.error(&reason);
            CommandOutcome::Failed(reason)
        }
    }
}

/// Run hook scripts in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first hook's failure; later hooks are not run.
pub fn run_hooks(ctx: &Context, hooks: &[String]) -> Result<()> {
    for hook in hooks {
        ctx.log.debug(&format!("Running hook: {hook}"));
        ctx.execute(|| run_script(ctx, hook, None).map(|_| ()))
            .with_context(|| format!("hook `{hook}`"))?;
    }
    Ok(())
}
