//! Shell command stage.
use anyhow::Result;

use super::{Context, Task};
use crate::config::Section;
use crate::logging::Tally;
use crate::resources::shell::run_shell_command;

/// Run the section's shell commands in order.
///
/// A failing command is counted and the next one still runs.
#[derive(Debug)]
pub struct RunShellCommands;

impl Task for RunShellCommands {
    fn name(&self) -> &'static str {
        "Running shell commands..."
    }

    fn should_run(&self, section: &Section) -> bool {
        !section.shell.is_empty()
    }

    fn run(&self, ctx: &Context, section: &Section, tally: &mut Tally) -> Result<()> {
        for cmd in &section.shell {
            tally.record(run_shell_command(ctx, cmd).severity());
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ShellCommand;
    use crate::exec::{ExecResult, MockExecutor};
    use crate::tasks::test_helpers::TestEnv;

    fn cmd(command: &str) -> ShellCommand {
        ShellCommand {
            command: command.to_string(),
            ..ShellCommand::default()
        }
    }

    #[test]
    fn failure_does_not_stop_later_commands() {
        let env = TestEnv::new();
        let mut mock = MockExecutor::new();
        mock.expect_run_shell()
            .withf(|req| req.script == "bad")
            .times(1)
            .returning(|_| Ok(ExecResult::failed(1, "")));
        mock.expect_run_shell()
            .withf(|req| req.script == "good")
            .times(1)
            .returning(|_| Ok(ExecResult::ok("")));
        let section = Section {
            shell: vec![cmd("bad"), cmd("good")],
            ..Section::default()
        };
        let mut tally = Tally::default();

        RunShellCommands
            .run(&env.context_with(mock), &section, &mut tally)
            .unwrap();

        assert_eq!(
            tally,
            Tally {
                success: 1,
                warnings: 0,
                errors: 1
            }
        );
    }
}
