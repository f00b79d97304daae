//! Non-dereferencing filesystem inspection.
use std::io;
use std::path::{Path, PathBuf};

use super::paths::clean;

/// What currently occupies a path. Computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathState {
    /// Nothing exists at the path.
    Absent,
    /// A real directory.
    Directory,
    /// A regular file, socket, device or other non-link entry.
    RegularOrOther,
    /// A symbolic link, with its destination resolved to an absolute path.
    Symlink(PathBuf),
}

impl PathState {
    /// Whether anything exists at the path.
    #[must_use]
    pub const fn exists(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Existence and directory-ness of a path, without following a final symlink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    /// Something exists at the path.
    pub exists: bool,
    /// It is a real directory.
    pub is_dir: bool,
}

/// Classify `path` without following a final symlink.
///
/// # Errors
///
/// Returns any error other than `NotFound` from `lstat`, or an error from
/// reading the link.
pub fn probe(path: &Path) -> io::Result<PathState> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PathState::Absent),
        Err(e) => return Err(e),
    };
    let file_type = meta.file_type();
    if file_type.is_symlink() {
        Ok(PathState::Symlink(resolve_link(path)?))
    } else if file_type.is_dir() {
        Ok(PathState::Directory)
    } else {
        Ok(PathState::RegularOrOther)
    }
}

/// Existence check with the same semantics as [`probe`].
///
/// # Errors
///
/// Returns any error other than `NotFound` from `lstat`.
pub fn exists(path: &Path) -> io::Result<Presence> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => Ok(Presence {
            exists: true,
            is_dir: meta.is_dir(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Presence::default()),
        Err(e) => Err(e),
    }
}

/// Read the link at `link` and return its destination as an absolute,
/// cleaned path. Relative destinations are anchored at the link's parent.
///
/// # Errors
///
/// Returns an error if `link` is not a symlink or cannot be read.
pub fn resolve_link(link: &Path) -> io::Result<PathBuf> {
    let dest = std::fs::read_link(link)?;
    if dest.is_absolute() {
        return Ok(clean(&dest));
    }
    let parent = link.parent().unwrap_or_else(|| Path::new("/"));
    Ok(clean(&parent.join(dest)))
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn absent_path() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(probe(&tmp.path().join("nope")).unwrap(), PathState::Absent);
        assert_eq!(exists(&tmp.path().join("nope")).unwrap(), Presence::default());
    }

    #[test]
    fn file_and_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(probe(&file).unwrap(), PathState::RegularOrOther);
        assert_eq!(probe(tmp.path()).unwrap(), PathState::Directory);
        assert_eq!(
            exists(tmp.path()).unwrap(),
            Presence {
                exists: true,
                is_dir: true
            }
        );
    }

    #[test]
    fn absolute_symlink_is_resolved() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("l");
        symlink("/somewhere/else", &link).unwrap();
        assert_eq!(
            probe(&link).unwrap(),
            PathState::Symlink(PathBuf::from("/somewhere/else"))
        );
    }

    #[test]
    fn relative_symlink_anchors_at_parent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let link = tmp.path().join("sub/l");
        symlink("../target", &link).unwrap();
        assert_eq!(
            probe(&link).unwrap(),
            PathState::Symlink(clean(&tmp.path().join("target")))
        );
    }

    #[test]
    fn dangling_symlink_still_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("dangling");
        symlink(tmp.path().join("missing"), &link).unwrap();
        let presence = exists(&link).unwrap();
        assert!(presence.exists);
        assert!(!presence.is_dir);
        assert!(probe(&link).unwrap().exists());
    }

    #[test]
    fn symlink_to_directory_is_not_a_directory_for_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("dirlink");
        symlink(tmp.path(), &link).unwrap();
        let presence = exists(&link).unwrap();
        assert!(presence.exists);
        assert!(!presence.is_dir);
    }

    #[test]
    fn probe_below_a_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f");
        std::fs::write(&file, "x").unwrap();
        assert!(probe(&file.join("child")).is_err());
    }
}
