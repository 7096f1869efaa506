use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate.
///
/// Any format the crate was built with is accepted; pixels are converted
/// to 8-bit RGB regardless of the source color type.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let rgb = image::open(path)
            .map_err(|e| format!("Failed to load {}: {e}", path.display()))?
            .into_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(format!("Image {} has zero size", path.display()).into());
        }
        log::debug!("Decoded {} ({width}x{height})", path.display());
        Ok(Frame::new(rgb.into_raw(), width, height, 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_returns_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 100, 80);

        let frame = ImageFileReader::new().read(&path).unwrap();

        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 80);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data().len(), 100 * 80 * 3);
    }

    #[test]
    fn test_read_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 10, 10);

        let frame = ImageFileReader::new().read(&path).unwrap();
        let arr = frame.as_ndarray();

        assert_eq!(arr[[3, 7, 0]], 7);
        assert_eq!(arr[[3, 7, 1]], 3);
        assert_eq!(arr[[3, 7, 2]], 128);
    }

    #[test]
    fn test_read_converts_grayscale_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(4, 4, image::Luma([200])).save(&path).unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();

        assert_eq!(frame.channels(), 3);
        assert!(frame.data().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageFileReader::new().read(&dir.path().join("missing.jpg"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("missing.jpg"));
    }

    #[test]
    fn test_read_zero_width_image_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ppm");
        std::fs::write(&path, b"P6\n0 5\n255\n").unwrap();

        let err = ImageFileReader::new().read(&path).unwrap_err().to_string();

        assert!(err.contains("zero size"));
    }

    #[test]
    fn test_read_undecodable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(ImageFileReader::new().read(&path).is_err());
    }
}
