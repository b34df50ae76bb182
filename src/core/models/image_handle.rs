use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;

use crate::global_constants;

#[derive(Clone)]
pub struct ImageHandle {
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    source_path: Option<PathBuf>,
    pixels: Arc<DynamicImage>,
    encoded_bytes: Arc<[u8]>,
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dpi", &self.dpi)
            .field("source_path", &self.source_path)
            .field("encoded_len", &self.encoded_bytes.len())
            .finish()
    }
}

impl ImageHandle {
    /// Builds a handle for a file as loaded from disk; `encoded_bytes` is what
    /// gets uploaded to the remote service.
    pub fn build_from_file_data(
        source_path: &Path,
        encoded_bytes: Vec<u8>,
        pixels: DynamicImage,
        dpi: f64,
    ) -> Self {
        let dpi = sanitize_dpi(dpi);

        log::debug!(
            "[IMAGE_HANDLE] building handle for {:?}: {}x{}, dpi={}",
            source_path,
            pixels.width(),
            pixels.height(),
            dpi
        );

        Self {
            width: pixels.width(),
            height: pixels.height(),
            dpi,
            source_path: Some(source_path.to_path_buf()),
            pixels: Arc::new(pixels),
            encoded_bytes: Arc::from(encoded_bytes),
        }
    }

    /// Builds a handle for an image produced in memory, such as a rendered
    /// overlay. It has no encoded form and no source path.
    pub fn build_from_pixels(pixels: DynamicImage, dpi: f64) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            dpi: sanitize_dpi(dpi),
            source_path: None,
            pixels: Arc::new(pixels),
            encoded_bytes: Arc::from(Vec::new()),
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded_bytes
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// True when both handles point at the same pixel allocation.
    #[cfg(test)]
    pub fn shares_pixels_with(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

fn sanitize_dpi(dpi: f64) -> f64 {
    if dpi.is_finite() && dpi > 0.0 {
        dpi
    } else {
        log::warn!(
            "[IMAGE_HANDLE] invalid dpi {}, falling back to {}",
            dpi,
            global_constants::DEFAULT_SOURCE_DPI
        );
        global_constants::DEFAULT_SOURCE_DPI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn create_test_pixels(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
    }

    #[test]
    fn test_build_from_file_data_keeps_dimensions_and_bytes() {
        let handle = ImageHandle::build_from_file_data(
            Path::new("/tmp/photo.jpg"),
            vec![1, 2, 3],
            create_test_pixels(40, 30),
            72.0,
        );

        assert_eq!(handle.width, 40);
        assert_eq!(handle.height, 30);
        assert_eq!(handle.dpi, 72.0);
        assert_eq!(handle.encoded_bytes(), &[1, 2, 3]);
        assert_eq!(handle.source_path(), Some(Path::new("/tmp/photo.jpg")));
    }

    #[test]
    fn test_invalid_dpi_falls_back_to_default() {
        let handle = ImageHandle::build_from_pixels(create_test_pixels(2, 2), 0.0);

        assert_eq!(handle.dpi, global_constants::DEFAULT_SOURCE_DPI);
    }

    #[test]
    fn test_clone_shares_pixel_allocation() {
        let handle = ImageHandle::build_from_pixels(create_test_pixels(2, 2), 96.0);
        let cloned = handle.clone();

        assert!(handle.shares_pixels_with(&cloned));
    }

    #[test]
    fn test_debug_output_omits_pixel_data() {
        let handle = ImageHandle::build_from_pixels(create_test_pixels(3, 4), 96.0);
        let debug_str = format!("{:?}", handle);

        assert!(debug_str.contains("width: 3"));
        assert!(debug_str.contains("encoded_len: 0"));
    }
}
