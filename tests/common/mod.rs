// Shared helpers for integration tests.
//
// Provides a temporary home and dotfiles directory, a fluent builder for the
// configuration file and source tree, and an in-process executor that records
// external commands instead of running them.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;

use hidedot::cli::Cli;
use hidedot::commands::CommandSetup;
use hidedot::config::DEFAULT_CONFIG_FILE;
use hidedot::exec::{ExecResult, Executor, ShellRequest};
use hidedot::logging::{Log, MemoryLog};
use hidedot::tasks::Environment;

/// [`Executor`] that records every call and always succeeds.
///
/// `git clone <url> <dest>` creates `dest` so that a second run sees the
/// repository as present.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    git_missing: bool,
}

impl RecordingExecutor {
    /// An executor that reports `git` as not installed.
    pub fn without_git() -> Self {
        Self {
            git_missing: true,
            ..Self::default()
        }
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, _dir: &Path, program: &str, args: &[String]) -> Result<ExecResult> {
        self.record(format!("{program} {}", args.join(" ")));
        if program == "git"
            && let [verb, _url, dest] = args
            && verb == "clone"
        {
            std::fs::create_dir_all(dest)?;
        }
        Ok(ExecResult::ok(""))
    }

    fn run_shell(&self, request: &ShellRequest) -> Result<ExecResult> {
        self.record(format!("bash -c {}", request.script));
        Ok(ExecResult::ok(""))
    }

    fn which(&self, _program: &str) -> bool {
        !self.git_missing
    }
}

/// An isolated home directory and dotfiles tree backed by a
/// [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    root: tempfile::TempDir,
    executor: Arc<RecordingExecutor>,
}

impl IntegrationTestContext {
    /// Create `home/` and `dotfiles/` under a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_executor(RecordingExecutor::default())
    }

    fn with_executor(executor: RecordingExecutor) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        std::fs::create_dir_all(root.path().join("dotfiles")).expect("create dotfiles");
        Self {
            root,
            executor: Arc::new(executor),
        }
    }

    /// The sandbox home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// The dotfiles directory; sources and the config file live here.
    pub fn dotfiles(&self) -> PathBuf {
        self.root.path().join("dotfiles")
    }

    /// Commands recorded by the executor so far.
    pub fn calls(&self) -> Vec<String> {
        self.executor.calls()
    }

    /// Load the configuration as the CLI would for `args` (without the
    /// program name), narrating into a fresh in-memory log.
    pub fn setup(&self, args: &[&str]) -> (CommandSetup, Arc<MemoryLog>) {
        let cli = Cli::parse_from(std::iter::once("hidedot").chain(args.iter().copied()));
        let log = Arc::new(MemoryLog::new());
        let env = Environment::new(self.home(), self.dotfiles());
        let setup = CommandSetup::init(
            &cli.global,
            env,
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::clone(&self.executor) as Arc<dyn Executor>,
        )
        .expect("load configuration");
        (setup, log)
    }
}

/// Whether `path` is a symlink pointing at `dest`.
pub fn links_to(path: &Path, dest: &Path) -> bool {
    std::fs::read_link(path).is_ok_and(|current| current == dest)
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new, empty context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Begin building a context whose executor reports `git` as missing.
    pub fn without_git() -> Self {
        Self {
            ctx: IntegrationTestContext::with_executor(RecordingExecutor::without_git()),
        }
    }

    /// Write the configuration file into the dotfiles directory.
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(self.ctx.dotfiles().join(DEFAULT_CONFIG_FILE), content)
            .expect("write config file");
        self
    }

    /// Create a source file under the dotfiles directory.
    pub fn with_source(self, name: &str, content: &str) -> Self {
        let path = self.ctx.dotfiles().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parent");
        }
        std::fs::write(&path, content).expect("write source file");
        self
    }

    /// Create a file under the home directory.
    pub fn with_home_file(self, name: &str, content: &str) -> Self {
        let path = self.ctx.home().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create home parent");
        }
        std::fs::write(&path, content).expect("write home file");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
