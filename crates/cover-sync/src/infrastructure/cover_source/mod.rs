//! Cover extraction.
//!
//! [`SidecarCoverSource`] finds a document's cover without parsing the
//! document format:
//!
//! - A document that is itself an image (a scanned page, a comic cover) is
//!   its own cover.
//! - Otherwise the first of `cover.png`, `cover.jpg`, ... found in the
//!   document's sidecar directory (`<stem>.sdr/`) is used.
//!
//! Files that exist but fail to decode count as "no cover".

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::cover_image::CoverImage;
use crate::application::sync_cover::{CoverSource, DocumentHandle};
use crate::infrastructure::storage::document::sidecar_dir;

pub mod mock;

/// Image extensions recognised for covers, in lookup order.
const COVER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Base name of cover files inside the sidecar directory.
const COVER_STEM: &str = "cover";

/// Looks covers up next to the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarCoverSource;

impl SidecarCoverSource {
    pub fn new() -> Self {
        Self
    }
}

impl CoverSource for SidecarCoverSource {
    fn cover_image(&self, document: &DocumentHandle) -> Option<CoverImage> {
        let Some(path) = find_cover_file(&document.path) else {
            debug!(document = %document.id, "no cover file found");
            return None;
        };
        match image::open(&path) {
            Ok(image) => Some(CoverImage::new(image)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cover file could not be decoded");
                None
            }
        }
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| COVER_EXTENSIONS.contains(&ext.as_str()))
}

fn find_cover_file(document: &Path) -> Option<PathBuf> {
    if is_image_path(document) && document.is_file() {
        return Some(document.to_path_buf());
    }
    let dir = sidecar_dir(document);
    COVER_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{COVER_STEM}.{ext}")))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStore;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::fs;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cover_sync_source_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn handle(path: &Path) -> DocumentHandle {
        DocumentHandle::new("doc", path, Box::new(MemoryStore::new()))
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_sidecar_cover_is_decoded() {
        // Arrange
        let dir = scratch_dir();
        let doc = dir.join("moby.epub");
        fs::write(&doc, b"epub").unwrap();
        fs::create_dir_all(dir.join("moby.sdr")).unwrap();
        write_png(&dir.join("moby.sdr").join("cover.png"), 3, 4);

        // Act
        let cover = SidecarCoverSource::new().cover_image(&handle(&doc));

        // Assert
        assert_eq!(cover.map(|c| c.dimensions()), Some((3, 4)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_image_document_is_its_own_cover() {
        let dir = scratch_dir();
        let doc = dir.join("page.PNG");
        write_png(&doc, 5, 2);

        let cover = SidecarCoverSource::new().cover_image(&handle(&doc));

        assert_eq!(cover.map(|c| c.dimensions()), Some((5, 2)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_cover_is_none() {
        let dir = scratch_dir();
        let doc = dir.join("plain.txt");
        fs::write(&doc, b"text").unwrap();

        assert!(SidecarCoverSource::new().cover_image(&handle(&doc)).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_undecodable_cover_is_none() {
        let dir = scratch_dir();
        let doc = dir.join("broken.epub");
        fs::create_dir_all(dir.join("broken.sdr")).unwrap();
        fs::write(dir.join("broken.sdr").join("cover.png"), b"not a png").unwrap();

        assert!(SidecarCoverSource::new().cover_image(&handle(&doc)).is_none());
        fs::remove_dir_all(&dir).ok();
    }
}
