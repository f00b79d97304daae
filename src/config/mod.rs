//! Configuration loading: template expansion, TOML parsing, validation and
//! profile selection.
pub mod ordered;
pub mod section;
pub mod shell;
pub mod template;
pub mod validation;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::logging::Log;

pub use section::{Defaults, GitRepo, Hooks, LinkDefaults, Section};
pub use shell::ShellCommand;
pub use template::TemplateVars;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hidedot.conf.toml";

/// On-disk document shape: a list of `[[section]]` tables.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    section: Vec<Section>,
}

/// A loaded and validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File the configuration was read from.
    pub path: PathBuf,
    /// Every section in file order, before profile filtering.
    pub sections: Vec<Section>,
}

impl Config {
    /// Read, expand, parse and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid TOML,
    /// does not match the schema, or has empty required fields.
    pub fn load(path: &Path, vars: &TemplateVars) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path, vars)
    }

    /// Expand, parse and validate configuration text.
    ///
    /// `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on syntax, schema or validation failures.
    pub fn parse(content: &str, path: &Path, vars: &TemplateVars) -> Result<Self, ConfigError> {
        let expanded = template::expand(content, vars);
        let file: ConfigFile = toml::from_str(&expanded).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        validation::validate(&file.section)?;
        Ok(Self {
            path: path.to_path_buf(),
            sections: file.section,
        })
    }

    /// Sections that apply to `profile`, in file order.
    ///
    /// Skipped sections are reported at debug level.
    #[must_use]
    pub fn select<'a>(&'a self, profile: Option<&str>, log: &dyn Log) -> Vec<&'a Section> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(idx, section)| {
                let keep = section.matches_profile(profile);
                if !keep {
                    log.debug(&format!(
                        "Skipping {} (current profile: '{}')",
                        section.label(idx + 1),
                        profile.unwrap_or_default()
                    ));
                }
                keep
            })
            .map(|(_, section)| section)
            .collect()
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_helpers::write_temp_config;
    use super::*;
    use crate::logging::{Level, MemoryLog};

    fn vars() -> TemplateVars {
        TemplateVars {
            hostname: "devbox".to_string(),
            home_dir: "/home/u".to_string(),
            ..TemplateVars::default()
        }
    }

    #[test]
    fn load_full_document() {
        let (_dir, path) = write_temp_config(
            r#"
[[section]]
create = ["~/.cache/zsh"]

[section.link]
"~/.zshrc" = "zsh/zshrc"
"~/.config/nvim" = "nvim"

[section.hooks]
pre_link = ["echo before"]

[[section]]
profile = "work"
shell = [["echo {{ .Hostname }}", "Greet host"]]

[section.defaults.link]
force = true
"#,
        );
        let config = Config::load(&path, &vars()).unwrap();
        assert_eq!(config.sections.len(), 2);
        assert_eq!(config.sections[0].link.len(), 2);
        assert_eq!(config.sections[0].create, vec!["~/.cache/zsh"]);
        assert_eq!(config.sections[0].hooks.pre_link, vec!["echo before"]);
        assert_eq!(config.sections[1].shell[0].command, "echo devbox");
        assert!(config.sections[1].defaults.as_ref().unwrap().link.force);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml"), &vars()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let (_dir, path) = write_temp_config("[[section]\n");
        let err = Config::load(&path, &vars()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_top_level_key_is_parse_error() {
        let (_dir, path) = write_temp_config("[[sections]]\n");
        let err = Config::load(&path, &vars()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validation_error_is_surfaced() {
        let (_dir, path) = write_temp_config("[[section]]\n[section.link]\n\"~/.x\" = \"\"\n");
        let err = Config::load(&path, &vars()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyLinkSource { section: 1, .. }));
    }

    #[test]
    fn empty_document_has_no_sections() {
        let config = Config::parse("", Path::new("x.toml"), &vars()).unwrap();
        assert!(config.sections.is_empty());
    }

    #[test]
    fn select_filters_by_profile_and_logs_skips() {
        let config = Config::parse(
            "[[section]]\n\n[[section]]\nprofile = \"work\"\n\n[[section]]\nprofile = \"home\"\n",
            Path::new("x.toml"),
            &vars(),
        )
        .unwrap();
        let log = MemoryLog::new();

        let work = config.select(Some("work"), &log);
        assert_eq!(work.len(), 2);
        assert_eq!(work[1].profile.as_deref(), Some("work"));
        assert_eq!(log.at(Level::Debug).len(), 1);
        assert!(log.contains("section 3 (home)"));

        let all = config.select(None, &log);
        assert_eq!(all.len(), 3);
    }
}
