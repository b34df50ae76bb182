use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::ImageFormat;

use crate::core::interfaces::ports::ImageSource;
use crate::core::models::ImageHandle;
use crate::global_constants;

const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Gif,
];

const RESOLUTION_UNIT_CENTIMETER: u32 = 3;
const CENTIMETERS_PER_INCH: f64 = 2.54;
const INCHES_PER_METER: f64 = 0.0254;

const JPEG_START_OF_IMAGE: [u8; 2] = [0xFF, 0xD8];
const JPEG_APP0: u8 = 0xE0;
const JPEG_START_OF_SCAN: u8 = 0xDA;
const JFIF_IDENTIFIER: &[u8] = b"JFIF\0";
const JFIF_UNIT_DOTS_PER_INCH: u8 = 1;
const JFIF_UNIT_DOTS_PER_CENTIMETER: u8 = 2;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_UNIT_METER: u8 = 1;

pub struct FileImageSource;

impl FileImageSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn load_image(&self, path: &Path) -> Result<ImageHandle> {
        log::debug!("[IMAGE_SOURCE] reading {:?}", path);

        let encoded_bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Unable to read {}", path.display()))?;

        let format = image::guess_format(&encoded_bytes)
            .with_context(|| format!("Unrecognized image data in {}", path.display()))?;

        if !SUPPORTED_FORMATS.contains(&format) {
            anyhow::bail!(
                "Unsupported image format {:?} in {}",
                format,
                path.display()
            );
        }

        let pixels = image::load_from_memory_with_format(&encoded_bytes, format)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        let dpi = read_source_dpi(&encoded_bytes, format)
            .unwrap_or(global_constants::DEFAULT_SOURCE_DPI);

        log::info!(
            "[IMAGE_SOURCE] loaded {:?} as {:?}: {}x{} at {} dpi",
            path,
            format,
            pixels.width(),
            pixels.height(),
            dpi
        );

        Ok(ImageHandle::build_from_file_data(
            path,
            encoded_bytes,
            pixels,
            dpi,
        ))
    }
}

/// Horizontal resolution stored in the file, in dots per inch. EXIF wins over
/// the format's own density header.
pub fn read_source_dpi(bytes: &[u8], format: ImageFormat) -> Option<f64> {
    let dpi = read_exif_dpi(bytes).or_else(|| match format {
        ImageFormat::Jpeg => read_jfif_dpi(bytes),
        ImageFormat::Png => read_png_dpi(bytes),
        _ => None,
    });

    log::debug!("[IMAGE_SOURCE] stored resolution: {:?}", dpi);
    dpi
}

/// Horizontal resolution recorded in the file's EXIF block, in dots per inch.
pub fn read_exif_dpi(bytes: &[u8]) -> Option<f64> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let resolution = exif
        .get_field(exif::Tag::XResolution, exif::In::PRIMARY)
        .and_then(|field| match &field.value {
            exif::Value::Rational(values) => values.first().map(|value| value.to_f64()),
            _ => None,
        })?;

    let unit = exif
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(2);

    let dpi = if unit == RESOLUTION_UNIT_CENTIMETER {
        resolution * CENTIMETERS_PER_INCH
    } else {
        resolution
    };

    positive_dpi(dpi)
}

/// Density from a JPEG's JFIF APP0 segment. Aspect-ratio-only headers
/// (unit 0) carry no resolution.
pub fn read_jfif_dpi(bytes: &[u8]) -> Option<f64> {
    if !bytes.starts_with(&JPEG_START_OF_IMAGE) {
        return None;
    }

    let mut offset = JPEG_START_OF_IMAGE.len();
    while offset + 4 <= bytes.len() {
        if bytes[offset] != 0xFF {
            return None;
        }

        let marker = bytes[offset + 1];
        if marker == JPEG_START_OF_SCAN {
            return None;
        }

        let length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
        let segment = bytes.get(offset + 4..offset + 2 + length)?;

        if marker == JPEG_APP0 && segment.starts_with(JFIF_IDENTIFIER) && segment.len() >= 12 {
            let density = u16::from_be_bytes([segment[8], segment[9]]) as f64;
            return match segment[7] {
                JFIF_UNIT_DOTS_PER_INCH => positive_dpi(density),
                JFIF_UNIT_DOTS_PER_CENTIMETER => positive_dpi(density * CENTIMETERS_PER_INCH),
                _ => None,
            };
        }

        offset += 2 + length;
    }

    None
}

/// Density from a PNG `pHYs` chunk, which stores pixels per metre.
pub fn read_png_dpi(bytes: &[u8]) -> Option<f64> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return None;
    }

    let mut offset = PNG_SIGNATURE.len();
    while offset + 8 <= bytes.len() {
        let length = u32::from_be_bytes(bytes[offset..offset + 4].try_into().ok()?) as usize;
        let data_start = offset + 8;
        let data_end = data_start.checked_add(length)?;
        let data = bytes.get(data_start..data_end)?;

        match &bytes[offset + 4..offset + 8] {
            b"pHYs" if data.len() >= 9 => {
                if data[8] != PNG_UNIT_METER {
                    return None;
                }
                let pixels_per_meter = u32::from_be_bytes(data[0..4].try_into().ok()?) as f64;
                return positive_dpi(pixels_per_meter * INCHES_PER_METER);
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        // chunk data is followed by a 4-byte CRC
        offset = data_end + 4;
    }

    None
}

fn positive_dpi(dpi: f64) -> Option<f64> {
    (dpi.is_finite() && dpi > 0.0).then_some(dpi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::{JpegEncoder, PixelDensity};
    use image::{DynamicImage, RgbImage, RgbaImage};

    fn write_image(dir: &Path, name: &str, format: ImageFormat) -> std::path::PathBuf {
        let path = dir.join(name);
        let image = DynamicImage::ImageRgba8(RgbaImage::new(12, 7));
        let image = match format {
            ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => image,
        };
        image.save_with_format(&path, format).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_png_uses_default_dpi() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "photo.png", ImageFormat::Png);

        let handle = FileImageSource::new().load_image(&path).await.unwrap();

        assert_eq!(handle.width, 12);
        assert_eq!(handle.height, 7);
        assert_eq!(handle.dpi, global_constants::DEFAULT_SOURCE_DPI);
        assert_eq!(handle.source_path(), Some(path.as_path()));
        assert!(!handle.encoded_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_load_jpeg_keeps_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "photo.jpg", ImageFormat::Jpeg);
        let on_disk = std::fs::read(&path).unwrap();

        let handle = FileImageSource::new().load_image(&path).await.unwrap();

        assert_eq!(handle.encoded_bytes(), on_disk.as_slice());
    }

    #[tokio::test]
    async fn test_load_rejects_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "scan.tiff", ImageFormat::Tiff);

        let result = FileImageSource::new().load_image(&path).await;

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Unsupported"));
    }

    #[tokio::test]
    async fn test_load_rejects_garbage_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        assert!(FileImageSource::new().load_image(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = FileImageSource::new()
            .load_image(&dir.path().join("missing.png"))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_read_exif_dpi_without_exif_block() {
        assert_eq!(read_exif_dpi(b"plain bytes"), None);
    }

    fn create_tiff_with_resolution(numerator: u32, denominator: u32, unit: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II*\0");
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        // XResolution: one RATIONAL stored after the IFD
        tiff.extend_from_slice(&0x011Au16.to_le_bytes());
        tiff.extend_from_slice(&5u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&38u32.to_le_bytes());
        // ResolutionUnit: one SHORT stored inline
        tiff.extend_from_slice(&0x0128u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&unit.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&numerator.to_le_bytes());
        tiff.extend_from_slice(&denominator.to_le_bytes());
        tiff
    }

    fn create_png_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut chunk = Vec::new();
        chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
        chunk.extend_from_slice(kind);
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(&[0, 0, 0, 0]);
        chunk
    }

    fn create_png_header_with_phys(pixels_per_unit: u32, unit: u8) -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&16u32.to_be_bytes());
        ihdr.extend_from_slice(&16u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);

        let mut phys = Vec::new();
        phys.extend_from_slice(&pixels_per_unit.to_be_bytes());
        phys.extend_from_slice(&pixels_per_unit.to_be_bytes());
        phys.push(unit);

        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(create_png_chunk(b"IHDR", &ihdr));
        png.extend(create_png_chunk(b"pHYs", &phys));
        png.extend(create_png_chunk(b"IEND", &[]));
        png
    }

    #[test]
    fn test_read_exif_dpi_in_inches() {
        let tiff = create_tiff_with_resolution(300, 1, 2);

        assert_eq!(read_exif_dpi(&tiff), Some(300.0));
    }

    #[test]
    fn test_read_exif_dpi_converts_centimeters() {
        let tiff = create_tiff_with_resolution(236, 2, 3);

        let dpi = read_exif_dpi(&tiff).unwrap();

        assert!((dpi - 118.0 * 2.54).abs() < 1e-9);
    }

    #[test]
    fn test_read_exif_dpi_rejects_zero_resolution() {
        let tiff = create_tiff_with_resolution(0, 1, 2);

        assert_eq!(read_exif_dpi(&tiff), None);
    }

    #[tokio::test]
    async fn test_load_jpeg_uses_jfif_density() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new(&mut bytes);
            encoder.set_pixel_density(PixelDensity::dpi(72));
            encoder.encode_image(&RgbImage::new(16, 16)).unwrap();
        }
        std::fs::write(&path, &bytes).unwrap();

        let handle = FileImageSource::new().load_image(&path).await.unwrap();

        assert_eq!(handle.dpi, 72.0);
    }

    #[test]
    fn test_read_jfif_dpi_converts_centimeters() {
        let mut jpeg = JPEG_START_OF_IMAGE.to_vec();
        jpeg.extend_from_slice(&[0xFF, JPEG_APP0, 0x00, 0x10]);
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[1, 1, JFIF_UNIT_DOTS_PER_CENTIMETER, 0, 118, 0, 118, 0, 0]);
        jpeg.extend_from_slice(&[0xFF, JPEG_START_OF_SCAN]);

        let dpi = read_jfif_dpi(&jpeg).unwrap();

        assert!((dpi - 299.72).abs() < 1e-9);
    }

    #[test]
    fn test_read_jfif_dpi_ignores_aspect_ratio_header() {
        let mut jpeg = JPEG_START_OF_IMAGE.to_vec();
        jpeg.extend_from_slice(&[0xFF, JPEG_APP0, 0x00, 0x10]);
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);

        assert_eq!(read_jfif_dpi(&jpeg), None);
    }

    #[test]
    fn test_read_png_dpi_from_phys_chunk() {
        let png = create_png_header_with_phys(2835, PNG_UNIT_METER);

        let dpi = read_png_dpi(&png).unwrap();

        assert!((dpi - 72.0).abs() < 0.01);
        assert_eq!(read_source_dpi(&png, ImageFormat::Png), Some(dpi));
    }

    #[test]
    fn test_read_png_dpi_ignores_unitless_phys() {
        let png = create_png_header_with_phys(2835, 0);

        assert_eq!(read_png_dpi(&png), None);
    }

    #[test]
    fn test_read_source_dpi_ignores_density_headers_of_other_formats() {
        let png = create_png_header_with_phys(2835, PNG_UNIT_METER);

        assert_eq!(read_source_dpi(&png, ImageFormat::Bmp), None);
    }
}
