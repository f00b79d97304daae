//! Required-field checks run after parsing.
use crate::error::ConfigError;

use super::section::Section;

/// Check every section for empty required fields.
///
/// Sections are numbered from one in file order.  All sections are checked,
/// including those a profile filter would later skip.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found.
pub fn validate(sections: &[Section]) -> Result<(), ConfigError> {
    for (idx, section) in sections.iter().enumerate() {
        validate_section(idx + 1, section)?;
    }
    Ok(())
}

fn validate_section(number: usize, section: &Section) -> Result<(), ConfigError> {
    for (target, source) in section.link.iter() {
        if target.trim().is_empty() {
            return Err(ConfigError::EmptyLinkTarget { section: number });
        }
        if source.trim().is_empty() {
            return Err(ConfigError::EmptyLinkSource {
                section: number,
                target: target.to_string(),
            });
        }
    }

    for (path, repo) in section.git.iter() {
        if path.trim().is_empty() {
            return Err(ConfigError::EmptyRepoPath { section: number });
        }
        if repo.url.trim().is_empty() {
            return Err(ConfigError::EmptyRepoUrl {
                section: number,
                path: path.to_string(),
            });
        }
    }

    for (index, cmd) in section.shell.iter().enumerate() {
        if cmd.command.trim().is_empty() {
            return Err(ConfigError::EmptyShellCommand {
                section: number,
                index,
            });
        }
    }

    Ok(())
}
