//! Utility functions for log paths, ANSI stripping, colour detection and time formatting.
use std::ffi::OsString;
use std::fs;
use std::io::IsTerminal as _;
use std::path::PathBuf;

/// Remove ANSI escape sequences, keeping the visible text.
///
/// A CSI sequence (`ESC [` ... final byte in `@`..=`~`) is dropped whole;
/// any other escape drops only the character after `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'[').is_some() {
            let _ = chars.find(|ch| ('@'..='~').contains(ch));
        } else {
            chars.next();
        }
    }
    out
}

/// Cache root for a given environment lookup: `XDG_CACHE_HOME`, else
/// `<home>/.cache`, else `./.cache`.
fn cache_root(var: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    if let Some(xdg) = var("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    let home = var("HOME")
        .or_else(|| var("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".cache")
}

/// `<cache root>/hidedot/`, created on demand.
pub(super) fn cache_dir() -> Option<PathBuf> {
    let dir = cache_root(|name| std::env::var_os(name)).join("hidedot");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Return the log file path under `$XDG_CACHE_HOME/hidedot/` (or `~/.cache/hidedot/`).
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{command}.log")))
}

/// Whether stdout should receive ANSI colours.
///
/// Honours `NO_COLOR` and requires stdout to be a terminal.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
