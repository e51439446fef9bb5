//! File operations on the target image.
//!
//! Each function performs exactly one operation on the target path.  Writes
//! and copies go to a hidden temporary file in the target's directory and
//! are then renamed over the target, so the screensaver never reads a torn
//! image.  A crash between the two steps can leave the temporary file behind
//! but never a partial target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat};
use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

use super::cover_image::CoverImage;

/// Error type for target file operations.
#[derive(Debug, Error)]
pub enum TargetFileError {
    /// A file-system call failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cover could not be encoded.
    #[error("failed to encode cover image to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// Encodes `cover` as PNG and atomically replaces `target` with it.
///
/// # Errors
///
/// Returns [`TargetFileError::Encode`] when encoding fails and
/// [`TargetFileError::Io`] when the temporary file cannot be created or the
/// rename fails.
pub fn write_cover(cover: &CoverImage, target: &Path) -> Result<(), TargetFileError> {
    let tmp = temp_sibling(target);
    if let Err(err) = cover.write_as_file(&tmp, ImageFormat::Png) {
        discard(&tmp);
        let path = target.to_path_buf();
        return Err(match err {
            ImageError::IoError(source) => TargetFileError::Io { path, source },
            source => TargetFileError::Encode { path, source },
        });
    }
    rename_into_place(&tmp, target)
}

/// Atomically replaces `target` with a copy of `source`.
///
/// # Errors
///
/// Returns [`TargetFileError::Io`] if the copy or the rename fails.
pub fn copy_into_place(source: &Path, target: &Path) -> Result<(), TargetFileError> {
    let tmp = temp_sibling(target);
    if let Err(err) = fs::copy(source, &tmp) {
        discard(&tmp);
        return Err(TargetFileError::Io {
            path: source.to_path_buf(),
            source: err,
        });
    }
    rename_into_place(&tmp, target)
}

/// Deletes `target`.  A missing file counts as success.
///
/// # Errors
///
/// Returns [`TargetFileError::Io`] for any failure other than "not found".
pub fn remove(target: &Path) -> Result<(), TargetFileError> {
    match fs::remove_file(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(path = %target.display(), "target already absent");
            Ok(())
        }
        Err(source) => Err(TargetFileError::Io {
            path: target.to_path_buf(),
            source,
        }),
    }
}

fn rename_into_place(tmp: &Path, target: &Path) -> Result<(), TargetFileError> {
    fs::rename(tmp, target).map_err(|source| {
        discard(tmp);
        TargetFileError::Io {
            path: target.to_path_buf(),
            source,
        }
    })
}

fn discard(tmp: &Path) {
    let _ = fs::remove_file(tmp);
}

/// `dir/.name.<uuid>.tmp` next to `target`.
fn temp_sibling(target: &Path) -> PathBuf {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cover_sync_file_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_cover_replaces_existing_file_without_leftovers() {
        let dir = scratch_dir();
        let target = dir.join("cover.png");
        fs::write(&target, b"stale").unwrap();
        let cover = CoverImage::from_rgba(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]).unwrap();

        write_cover(&cover, &target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), cover.encode(ImageFormat::Png).unwrap());
        assert_eq!(entries(&dir), vec!["cover.png".to_string()]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_cover_into_missing_directory_is_io_error() {
        let dir = scratch_dir();
        let target = dir.join("missing").join("cover.png");
        let cover = CoverImage::from_rgba(1, 1, vec![0, 0, 0, 255]).unwrap();

        let result = write_cover(&cover, &target);

        match result {
            Err(TargetFileError::Io { path, source }) => {
                assert_eq!(path, target);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(entries(&dir).is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_copy_into_place_copies_bytes() {
        let dir = scratch_dir();
        let fallback = dir.join("fb.png");
        let target = dir.join("cover.png");
        fs::write(&fallback, b"FALLBACK").unwrap();

        copy_into_place(&fallback, &target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"FALLBACK");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_copy_into_place_missing_source_leaves_target_untouched() {
        let dir = scratch_dir();
        let target = dir.join("cover.png");
        fs::write(&target, b"X").unwrap();

        let result = copy_into_place(&dir.join("missing.png"), &target);

        assert!(matches!(result, Err(TargetFileError::Io { .. })));
        assert_eq!(fs::read(&target).unwrap(), b"X");
        assert_eq!(entries(&dir), vec!["cover.png".to_string()]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_remove_tolerates_missing_file() {
        let dir = scratch_dir();
        let target = dir.join("cover.png");

        assert!(remove(&target).is_ok());
        fs::write(&target, b"X").unwrap();
        assert!(remove(&target).is_ok());
        assert!(!target.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_temp_sibling_stays_in_target_directory() {
        let tmp = temp_sibling(Path::new("/mnt/us/cover.png"));
        assert_eq!(tmp.parent(), Some(Path::new("/mnt/us")));
        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".cover.png."));
        assert!(name.ends_with(".tmp"));

        let relative = temp_sibling(Path::new("cover.png"));
        assert_eq!(relative.parent(), Some(Path::new(".")));
    }
}
