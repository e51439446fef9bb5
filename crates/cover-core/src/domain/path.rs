//! Target path validation.
//!
//! A target path is only trusted when all four checks pass, evaluated in this
//! order and short-circuiting on the first failure:
//!
//! 1. The parent directory is in a writable location.
//! 2. The parent directory exists.
//! 3. The filename component is non-empty.
//! 4. The path is not an existing directory.
//!
//! Validation never creates, modifies or deletes anything; it only stats
//! and asks the OS for write access.

use std::fs;
use std::path::{is_separator, Component, Path, PathBuf, MAIN_SEPARATOR_STR};

use thiserror::Error;

/// Why a target path was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// The parent directory is outside every writable root, or is read-only.
    #[error("path not in a writable location: {}", path.display())]
    NotWritable { path: PathBuf },

    /// The parent directory does not exist on disk.
    #[error("path does not exist: {}", path.display())]
    ParentMissing { path: PathBuf },

    /// The path has no filename component (empty, or ends in a separator).
    #[error("missing filename: {}", path.display())]
    MissingFilename { path: PathBuf },

    /// Something already exists at the path and it is a directory.
    #[error("path points to a directory, not a file: {}", path.display())]
    IsDirectory { path: PathBuf },
}

impl PathError {
    /// The path that failed validation, as the user entered it.
    pub fn path(&self) -> &Path {
        match self {
            PathError::NotWritable { path }
            | PathError::ParentMissing { path }
            | PathError::MissingFilename { path }
            | PathError::IsDirectory { path } => path,
        }
    }

    /// Short human-readable reason, without the path.
    pub fn reason(&self) -> &'static str {
        match self {
            PathError::NotWritable { .. } => "path not in a writable location",
            PathError::ParentMissing { .. } => "path does not exist",
            PathError::MissingFilename { .. } => "missing filename",
            PathError::IsDirectory { .. } => "path points to a directory, not a file",
        }
    }
}

/// Validates candidate target paths.
///
/// With no writable roots configured, any directory whose permission bits
/// allow writing counts as a writable location.  With roots configured the
/// parent must additionally lie under one of them.
#[derive(Debug, Clone, Default)]
pub struct PathValidator {
    writable_roots: Vec<PathBuf>,
}

impl PathValidator {
    /// Creates a validator that accepts any writable directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator restricted to the given root directories.
    pub fn with_writable_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            writable_roots: roots
                .into_iter()
                .map(|root| absolute_lexical(&root.into()))
                .collect(),
        }
    }

    /// Returns the configured writable roots (normalised to absolute paths).
    pub fn writable_roots(&self) -> &[PathBuf] {
        &self.writable_roots
    }

    /// Checks `path` against the four target path rules.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule as a [`PathError`].
    pub fn validate(&self, path: impl AsRef<Path>) -> Result<(), PathError> {
        let path = path.as_ref();
        let (parent, file_name) = split_target(path);
        let rejected = path.to_path_buf();

        if !self.is_writable_location(&parent) {
            return Err(PathError::NotWritable { path: rejected });
        }
        if !parent.is_dir() {
            return Err(PathError::ParentMissing { path: rejected });
        }
        if file_name.is_empty() {
            return Err(PathError::MissingFilename { path: rejected });
        }
        if path.is_dir() {
            return Err(PathError::IsDirectory { path: rejected });
        }
        Ok(())
    }

    fn is_writable_location(&self, dir: &Path) -> bool {
        if !self.writable_roots.is_empty() {
            let absolute = absolute_lexical(dir);
            if !self.writable_roots.iter().any(|root| absolute.starts_with(root)) {
                return false;
            }
        }
        match fs::metadata(dir) {
            Ok(meta) => !meta.permissions().readonly() && process_can_write(dir),
            // A missing parent is reported by the existence check.
            Err(_) => true,
        }
    }
}

/// Asks the OS whether this process may create entries in `dir`.
///
/// Unlike the mode bits this accounts for ownership, group membership and
/// read-only mounts: a `0755` directory owned by another user is rejected.
#[cfg(unix)]
fn process_can_write(dir: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};

    access(dir, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn process_can_write(_dir: &Path) -> bool {
    true
}

/// Returns `true` if `path` is non-empty, names a regular file, and that file
/// can be opened for reading.
pub fn is_readable_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return false;
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => fs::File::open(path).is_ok(),
        _ => false,
    }
}

/// Splits a target path into (parent directory, filename).
///
/// A trailing separator means the user named a directory, so the filename is
/// empty and the parent is the path with the separators trimmed.
fn split_target(path: &Path) -> (PathBuf, String) {
    let raw = path.to_string_lossy();
    if raw.is_empty() {
        return (PathBuf::from("."), String::new());
    }
    if raw.ends_with(is_separator) {
        let trimmed = raw.trim_end_matches(is_separator);
        let parent = if trimmed.is_empty() {
            PathBuf::from(MAIN_SEPARATOR_STR)
        } else {
            PathBuf::from(trimmed)
        };
        return (parent, String::new());
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
            (parent, name.to_string_lossy().into_owned())
        }
        _ => (path.to_path_buf(), String::new()),
    }
}

/// Makes `path` absolute against the working directory and folds `.`/`..`
/// without touching the file system.
fn absolute_lexical(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalised = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalised.pop();
            }
            other => normalised.push(other.as_os_str()),
        }
    }
    normalised
}
