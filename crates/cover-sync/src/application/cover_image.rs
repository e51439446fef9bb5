//! Rendered cover pixels.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};

/// A cover image produced by a [`CoverSource`](super::sync_cover::CoverSource).
#[derive(Debug, Clone)]
pub struct CoverImage {
    image: DynamicImage,
}

impl CoverImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Builds a cover from raw RGBA8 pixels.
    ///
    /// Returns `None` when `pixels` does not hold exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, pixels).map(|buf| Self::new(DynamicImage::ImageRgba8(buf)))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Encodes the cover to `path` in `format`, regardless of the path's
    /// extension.
    pub fn write_as_file(&self, path: &Path, format: ImageFormat) -> Result<(), ImageError> {
        self.image.save_with_format(path, format)
    }

    /// Encodes the cover into memory.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, format)?;
        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_rejects_wrong_buffer_length() {
        assert!(CoverImage::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_encode_png_produces_png_signature() {
        let cover = CoverImage::from_rgba(1, 1, vec![255, 0, 0, 255]).unwrap();

        let bytes = cover.encode(ImageFormat::Png).unwrap();

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(cover.dimensions(), (1, 1));
    }
}
