//! `{{ .Name }}` placeholder expansion applied to the raw config text.
use std::path::Path;

/// Values available to configuration templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    /// Machine host name.
    pub hostname: String,
    /// Current user name.
    pub username: String,
    /// Home directory.
    pub home_dir: String,
    /// Operating system (`linux`, `macos`, `windows`, ...).
    pub os: String,
    /// CPU architecture (`x86_64`, `aarch64`, ...).
    pub arch: String,
    /// Local date as `YYYY-MM-DD`.
    pub date: String,
}

impl TemplateVars {
    /// Gather values from the running system.
    #[must_use]
    pub fn detect(home: &Path) -> Self {
        Self {
            hostname: detect_hostname(),
            username: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_default(),
            home_dir: home.display().to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "Hostname" => Some(&self.hostname),
            "Username" => Some(&self.username),
            "HomeDir" => Some(&self.home_dir),
            "OS" => Some(&self.os),
            "Arch" => Some(&self.arch),
            "Date" => Some(&self.date),
            _ => None,
        }
    }
}

fn detect_hostname() -> String {
    if let Ok(name) = std::fs::read_to_string("/etc/hostname") {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_default()
}

/// Replace every known `{{ .Name }}` placeholder in `content`.
///
/// Whitespace inside the braces is optional.  Unknown names and unterminated
/// `{{` are copied through unchanged.
#[must_use]
pub fn expand(content: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(open) = rest.find("{{") {
        let (before, after_open) = rest.split_at(open);
        out.push_str(before);
        let Some(close) = after_open.find("}}") else {
            out.push_str(after_open);
            return out;
        };
        let (placeholder, tail) = after_open.split_at(close + 2);
        let inner = placeholder
            .trim_start_matches("{{")
            .trim_end_matches("}}")
            .trim();
        match inner.strip_prefix('.').and_then(|name| vars.lookup(name)) {
            Some(value) => out.push_str(value),
            None => out.push_str(placeholder),
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}
