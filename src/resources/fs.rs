//! Raw filesystem mutations.
//!
//! Nothing here checks dry-run; callers route every call through
//! [`Context::execute`](crate::tasks::Context::execute).
use anyhow::{Context as _, Result};
use std::path::Path;

use crate::error::LinkError;

/// Create a symlink at `target` whose destination is `source`.
///
/// # Errors
///
/// Returns [`LinkError::Create`] with the OS error.
pub fn create_symlink(source: &Path, target: &Path) -> Result<(), LinkError> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(source, target);

    #[cfg(windows)]
    let result = if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    };

    result.map_err(|source_err| LinkError::Create {
        target: target.to_path_buf(),
        source_path: source.to_path_buf(),
        source: source_err,
    })
}

/// Remove a symlink without touching what it points to.
///
/// On Windows, directory symlinks must be removed with `remove_dir`.
///
/// # Errors
///
/// Returns an error if the link cannot be removed.
pub fn remove_symlink(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
            .with_context(|| format!("removing directory link: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("removing link: {}", path.display()))?;
    }
    Ok(())
}

/// Remove whatever is at `path`; directories are removed recursively.
///
/// # Errors
///
/// Returns an error if the path cannot be inspected or removed.
pub fn remove_all(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory: {}", path.display()))?;
    } else if meta.file_type().is_symlink() {
        remove_symlink(path)?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("removing file: {}", path.display()))?;
    }
    Ok(())
}

/// Create `path` and any missing ancestors.
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("creating directory {}", path.display()))
}

/// Copy one file, creating `dst`'s parent and keeping `src`'s permission bits.
///
/// # Errors
///
/// Returns an error if reading, writing or setting permissions fails.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(src, dst)
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    let perms = std::fs::metadata(src)
        .with_context(|| format!("reading metadata: {}", src.display()))?
        .permissions();
    std::fs::set_permissions(dst, perms)
        .with_context(|| format!("setting permissions: {}", dst.display()))?;
    Ok(())
}

/// Recursively copy a directory tree, depth-first.
///
/// Symlinks inside the tree are followed: their content is copied, not the
/// link. The top-level permission bits of `src` are applied to `dst` once
/// its contents are in place.
///
/// # Errors
///
/// Returns an error if the destination cannot be created, a source entry
/// cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    create_dir_all(dst)?;
    let mut entries = std::fs::read_dir(src)
        .with_context(|| format!("reading directory {}", src.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("reading entry in {}", src.display()))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }

    let perms = std::fs::metadata(src)
        .with_context(|| format!("reading metadata: {}", src.display()))?
        .permissions();
    std::fs::set_permissions(dst, perms)
        .with_context(|| format!("setting permissions: {}", dst.display()))?;
    Ok(())
}

/// On Windows, `symlink_metadata().is_dir()` is `false` for directory
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
