//! Schema of one `[[section]]` table.
use serde::Deserialize;

use super::ordered::OrderedMap;
use super::shell::ShellCommand;

/// One configuration section, processed as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Section {
    /// Per-section policy defaults.
    pub defaults: Option<Defaults>,
    /// Only process this section when the active profile matches.
    pub profile: Option<String>,
    /// Link target -> link source, in declaration order.
    pub link: OrderedMap<String>,
    /// Directories to create.
    pub create: Vec<String>,
    /// Repository path -> repository, in declaration order.
    pub git: OrderedMap<GitRepo>,
    /// Shell commands, in order.
    pub shell: Vec<ShellCommand>,
    /// Hook scripts around the link and shell phases.
    pub hooks: Hooks,
}

impl Section {
    /// Whether this section applies to the active profile.
    ///
    /// A section without a profile always applies; so does every section
    /// when no profile is active.
    #[must_use]
    pub fn matches_profile(&self, active: Option<&str>) -> bool {
        match (active, self.profile.as_deref()) {
            (Some(active), Some(own)) if !active.is_empty() && !own.is_empty() => active == own,
            _ => true,
        }
    }

    /// Short label for narration: the profile name when set.
    #[must_use]
    pub fn label(&self, number: usize) -> String {
        match self.profile.as_deref() {
            Some(p) if !p.is_empty() => format!("section {number} ({p})"),
            _ => format!("section {number}"),
        }
    }
}

/// The `[section.defaults]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Link policy fields.
    pub link: LinkDefaults,
}

/// `[section.defaults.link]`; every missing field reads as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkDefaults {
    /// Replace an existing symlink that points elsewhere.
    pub relink: bool,
    /// Replace an existing non-symlink.
    pub force: bool,
    /// Back up a non-symlink before replacing it.
    pub backup: bool,
}

/// A repository to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitRepo {
    /// Clone URL.
    pub url: String,
    /// Human-readable label; the URL is shown when absent.
    pub description: Option<String>,
}

impl GitRepo {
    /// Label used in narration.
    #[must_use]
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.url)
    }
}

/// Hook script lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hooks {
    /// Before links are created.
    pub pre_link: Vec<String>,
    /// After links are created.
    pub post_link: Vec<String>,
    /// Before shell commands run.
    pub pre_shell: Vec<String>,
    /// After shell commands run.
    pub post_shell: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Section {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn empty_section_has_no_defaults() {
        let s = parse("");
        assert_eq!(s.defaults, None);
        assert!(s.link.is_empty());
        assert!(s.hooks.pre_link.is_empty());
    }

    #[test]
    fn defaults_block_missing_fields_are_false() {
        let s = parse("[defaults.link]\nforce = true\n");
        let link = s.defaults.unwrap().link;
        assert!(link.force);
        assert!(!link.relink);
        assert!(!link.backup);
    }

    #[test]
    fn git_entries_keep_order_and_labels() {
        let s = parse(
            r#"
[git."~/.oh-my-zsh"]
url = "https://example.com/ohmyzsh.git"
description = "oh-my-zsh"

[git."~/src/tool"]
url = "https://example.com/tool.git"
"#,
        );
        let repos: Vec<(&str, &GitRepo)> = s.git.iter().collect();
        assert_eq!(repos[0].0, "~/.oh-my-zsh");
        assert_eq!(repos[0].1.label(), "oh-my-zsh");
        assert_eq!(repos[1].1.label(), "https://example.com/tool.git");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result: Result<Section, _> = toml::from_str("linkz = {}");
        assert!(result.is_err());
    }

    #[test]
    fn profile_matching() {
        let work = Section {
            profile: Some("work".to_string()),
            ..Section::default()
        };
        let any = Section::default();
        assert!(work.matches_profile(Some("work")));
        assert!(!work.matches_profile(Some("home")));
        assert!(work.matches_profile(None));
        assert!(any.matches_profile(Some("home")));
    }

    #[test]
    fn label_includes_profile() {
        let work = Section {
            profile: Some("work".to_string()),
            ..Section::default()
        };
        assert_eq!(work.label(2), "section 2 (work)");
        assert_eq!(Section::default().label(1), "section 1");
    }
}
