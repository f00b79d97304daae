//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Event target used for section headings.
pub(super) const STAGE_TARGET: &str = "hidedot::stage";
/// Event target used for success narration.
pub(super) const SUCCESS_TARGET: &str = "hidedot::success";

const RESET: &str = "\x1b[0m";

/// Console presentation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ConsoleOpts {
    /// Show debug narration.
    pub verbose: bool,
    /// Only show errors.
    pub quiet: bool,
    /// Emit ANSI colours.
    pub color: bool,
    /// Prefix every line with `[DRY RUN]`.
    pub dry_run: bool,
}

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` and above regardless of console
/// verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
    dry_run: bool,
}

impl FileLayer {
    /// Open (or create) the log file for `command` and write a run header.
    ///
    /// Returns `None` if the cache directory or the file is unavailable.
    pub(super) fn new(command: &str, dry_run: bool) -> Option<Self> {
        Self::open(&log_file_path(command)?, dry_run)
    }

    /// Open the log file at an explicit path.
    pub(super) fn open(path: &Path, dry_run: bool) -> Option<Self> {
        let version =
            option_env!("HIDEDOT_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             hidedot {version} {}\n\
             ==========================================\n",
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
            dry_run,
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = strip_ansi(&extractor.message);
        let ts = format_utc_time();
        let dry = if self.dry_run { " [dry run]" } else { "" };

        let line = match (level, target) {
            (tracing::Level::INFO, STAGE_TARGET) => format!("[{ts}]{dry} ## {msg}"),
            (tracing::Level::INFO, SUCCESS_TARGET) => format!("[{ts}]{dry} [ok] {msg}"),
            (tracing::Level::ERROR, _) => format!("[{ts}]{dry} [error] {msg}"),
            (tracing::Level::WARN, _) => format!("[{ts}]{dry} [warn] {msg}"),
            (tracing::Level::DEBUG, _) => format!("[{ts}]{dry} [debug] {msg}"),
            _ => format!("[{ts}]{dry} {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits the `==>` console style.
struct HidedotFormatter {
    color: bool,
    dry_run: bool,
}

impl HidedotFormatter {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn prefix(&self) -> String {
        let arrow = self.paint("\x1b[1;36m", "==>");
        if self.dry_run {
            format!("{} {arrow}", self.paint("\x1b[1;33m", "[DRY RUN]"))
        } else {
            arrow
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for HidedotFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        if level == tracing::Level::INFO && target == STAGE_TARGET {
            return writeln!(writer, "\n{}", self.paint("\x1b[1;36m", msg));
        }

        let body = match level {
            tracing::Level::ERROR => self.paint("\x1b[31m", msg),
            tracing::Level::WARN => self.paint("\x1b[33m", msg),
            tracing::Level::INFO if target == SUCCESS_TARGET => self.paint("\x1b[32m", msg),
            tracing::Level::INFO => self.paint("\x1b[34m", msg),
            _ => self.paint("\x1b[35m", &format!("[DEBUG] {msg}")),
        };
        writeln!(writer, "{} {body}", self.prefix())
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output follows [`ConsoleOpts`]; the file layer writes every
/// event (including `debug`) to `$XDG_CACHE_HOME/hidedot/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(opts: ConsoleOpts, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if opts.quiet {
        LevelFilter::ERROR
    } else if opts.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(HidedotFormatter {
            color: opts.color,
            dry_run: opts.dry_run,
        })
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command, opts.dry_run).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
