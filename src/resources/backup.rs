//! Deterministic backup locations, backup and restore copies.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};
use sha2::{Digest as _, Sha256};

use super::BestEffort;
use super::fs::{copy_dir_recursive, copy_file, remove_all};
use super::probe::{self, PathState};
use crate::error::BackupError;
use crate::tasks::Context;

/// Hex characters of the path digest kept in a backup name.
///
/// Eight characters give 32 bits: collisions become likely only around
/// 65 000 distinct targets sharing one base name.
pub const BACKUP_HASH_LEN: usize = 8;

/// One entry in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    /// File or directory name.
    pub name: String,
    /// Last modification time.
    pub modified: DateTime<Local>,
}

/// Computes backup paths and copies content in and out of the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupManager {
    dir: PathBuf,
}

impl BackupManager {
    /// Create a manager rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Backup directory root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<basename>_<first BACKUP_HASH_LEN hex chars of sha256(target)>`.
    #[must_use]
    pub fn backup_path_for(&self, target: &Path) -> PathBuf {
        let digest = Sha256::digest(target.to_string_lossy().as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        let short = hex.get(..BACKUP_HASH_LEN).unwrap_or(&hex);
        let base = target
            .file_name()
            .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().to_string());
        self.dir.join(format!("{base}_{short}"))
    }

    /// Create the backup directory root.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::CreateDir`] if it cannot be created.
    pub fn ensure_dir(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| BackupError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Copy `target` into its backup slot, replacing any earlier backup.
    ///
    /// Not gated by dry-run; callers wrap it in [`Context::execute`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backup directory cannot be created, an old
    /// backup cannot be removed, or the copy fails.
    pub fn create_backup(&self, target: &Path, is_dir: bool) -> Result<PathBuf> {
        let backup = self.backup_path_for(target);
        self.ensure_dir()?;
        if probe::exists(&backup)
            .with_context(|| format!("inspecting {}", backup.display()))?
            .exists
        {
            remove_all(&backup)?;
        }
        if is_dir {
            copy_dir_recursive(target, &backup)?;
        } else {
            copy_file(target, &backup)?;
        }
        Ok(backup)
    }

    /// Copy the backup of `target` back into place.  The backup is kept.
    ///
    /// Returns [`BestEffort::Skipped`] when no backup exists.  The copy runs
    /// through `ctx`'s dry-run gate; it refuses to write through a symlink
    /// left at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup cannot be inspected or the copy fails.
    pub fn restore_backup(&self, ctx: &Context, target: &Path) -> Result<BestEffort<PathBuf>> {
        let backup = self.backup_path_for(target);
        let presence = probe::exists(&backup)
            .with_context(|| format!("inspecting {}", backup.display()))?;
        if !presence.exists {
            return Ok(BestEffort::Skipped(format!(
                "No backup found for: {}",
                target.display()
            )));
        }

        ctx.log.info(&format!(
            "Restoring backup: {} → {}",
            backup.display(),
            target.display()
        ));
        ctx.execute(|| {
            if let PathState::Symlink(_) = probe::probe(target)? {
                return Err(BackupError::TargetIsSymlink(target.to_path_buf()).into());
            }
            if presence.is_dir {
                copy_dir_recursive(&backup, target)
            } else {
                copy_file(&backup, target)
            }
        })?;
        Ok(BestEffort::Done(backup))
    }

    /// List backups sorted by name, or `None` when the directory does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Option<Vec<BackupEntry>>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading backup directory {}", self.dir.display()));
            }
        };

        let mut list: Vec<BackupEntry> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
                Some(BackupEntry {
                    name: entry.file_name().to_string_lossy().to_string(),
                    modified: DateTime::<Local>::from(modified),
                })
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(list))
    }
}

/// Render a backup listing, one `  <time>  <name>` line per entry.
#[must_use]
pub fn render_list(entries: Option<&[BackupEntry]>) -> String {
    match entries {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(|e| format!("  {}  {}\n", e.modified.format("%Y-%m-%d %H:%M:%S"), e.name))
            .collect(),
        _ => "No backups found.\n".to_string(),
    }
}
