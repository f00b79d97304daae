//! Home-alias expansion and absolute path resolution.
use std::path::{Component, Path, PathBuf};

/// Resolves configured path strings against a home and an execution directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    home: PathBuf,
    exec_dir: PathBuf,
}

impl PathResolver {
    /// Create a resolver.
    #[must_use]
    pub const fn new(home: PathBuf, exec_dir: PathBuf) -> Self {
        Self { home, exec_dir }
    }

    /// Home directory used for `~`.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Expand `~` without making the path absolute.
    #[must_use]
    pub fn expand_home(&self, path: &str) -> PathBuf {
        expand_home(path, &self.home)
    }

    /// Absolute form of a link source.
    #[must_use]
    pub fn resolve_source(&self, path: &str) -> PathBuf {
        resolve(path, &self.home, &self.exec_dir)
    }

    /// Absolute form of a link target, directory or repository path.
    #[must_use]
    pub fn resolve_target(&self, path: &str) -> PathBuf {
        resolve(path, &self.home, &self.exec_dir)
    }
}

/// Expand a leading `~` to `home`.
///
/// `"~"` becomes `home`, `"~/rest"` becomes `home/rest` (cleaned); any other
/// string is returned unchanged.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use hidedot::resources::paths::expand_home;
///
/// let home = Path::new("/home/u");
/// assert_eq!(expand_home("~", home), PathBuf::from("/home/u"));
/// assert_eq!(expand_home("~/x", home), PathBuf::from("/home/u/x"));
/// assert_eq!(expand_home("/abs/x", home), PathBuf::from("/abs/x"));
/// ```
#[must_use]
pub fn expand_home(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    let rest = path
        .strip_prefix("~/")
        .or_else(|| path.strip_prefix(concat!("~", '\\')).filter(|_| cfg!(windows)));
    rest.map_or_else(|| PathBuf::from(path), |rest| clean(&home.join(rest)))
}

/// Expand `~`, then anchor relative paths at `exec_dir`. Always absolute
/// when `home` and `exec_dir` are.
#[must_use]
pub fn resolve(path: &str, home: &Path, exec_dir: &Path) -> PathBuf {
    let expanded = expand_home(path, home);
    if expanded.is_absolute() {
        clean(&expanded)
    } else {
        clean(&exec_dir.join(expanded))
    }
}

/// Lexically normalise a path: drop `.` components and fold `..` into the
/// preceding component. Never touches the filesystem.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Compare two absolute paths, ignoring Windows verbatim prefixes.
#[must_use]
pub fn same_path(a: &Path, b: &Path) -> bool {
    dunce::simplified(a) == dunce::simplified(b)
}
