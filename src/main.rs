//! `hidedot` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use hidedot::cli::{BackupAction, Cli, Command, GlobalOpts};
use hidedot::commands::{self, CommandSetup};
use hidedot::exec::{Executor, SystemExecutor};
use hidedot::logging::{self, ConsoleOpts, Log, Logger};
use hidedot::tasks::Environment;

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.selected_command();

    match &command {
        Command::Version => {
            let version = option_env!("HIDEDOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("hidedot {version}");
            Ok(())
        }
        Command::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "hidedot",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        _ => run(&args.global, &command),
    }
}

#[allow(clippy::print_stdout)]
fn run(global: &GlobalOpts, command: &Command) -> Result<()> {
    let color = logging::supports_color() && !global.no_color;
    logging::init_subscriber(
        ConsoleOpts {
            verbose: global.verbose,
            quiet: global.quiet,
            color,
            dry_run: global.dry_run,
        },
        command.name(),
    );
    let logger = Arc::new(Logger::new(command.name()));
    let log = Arc::clone(&logger) as Arc<dyn Log>;
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let env = Environment::detect()?;

    match command {
        Command::Link => {
            let setup = CommandSetup::init(global, env, log, executor)?;
            logger.print_summary(&commands::link::run(&setup));
        }
        Command::Status { json } => {
            let setup = CommandSetup::init(global, env, log, executor)?;
            commands::status::run(&setup, *json, color)?;
        }
        Command::Unlink { restore } => {
            let setup = CommandSetup::init(global, env, log, executor)?;
            logger.print_summary(&commands::unlink::run(&setup, *restore));
        }
        Command::Backup(BackupAction::Create) => {
            let setup = CommandSetup::init(global, env, log, executor)?;
            logger.print_summary(&commands::backup::create(&setup)?);
        }
        Command::Backup(BackupAction::List) => {
            let ctx = commands::context(global, env, log, executor);
            print!("{}", commands::backup::list(&ctx)?);
        }
        Command::Completions { .. } | Command::Version => {}
    }
    Ok(())
}
