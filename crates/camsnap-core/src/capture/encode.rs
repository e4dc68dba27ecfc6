//! Frame encoding; the output extension picks the format.

use super::CaptureError;
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// Encode `image` into `path`, choosing JPEG or PNG from the extension.
pub(super) fn save_frame(image: &RgbImage, path: &Path) -> Result<(), CaptureError> {
    image.save(path).map_err(|e| CaptureError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(
        width = image.width(),
        height = image.height(),
        path = %path.display(),
        "Frame written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn grey_frame() -> RgbImage {
        RgbImage::from_pixel(2, 2, Rgb([128, 128, 128]))
    }

    #[test]
    fn test_jpeg_and_png_are_readable() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        for name in ["frame.jpg", "frame.png"] {
            let path = dir.path().join(name);
            save_frame(&grey_frame(), &path)?;

            assert!(std::fs::metadata(&path)?.len() > 0, "{name} is empty");
            let decoded = image::open(&path)?;
            assert_eq!((decoded.width(), decoded.height()), (2, 2));
        }
        Ok(())
    }

    #[test]
    fn test_unknown_extension_is_write_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("frame.xyz");
        let res = save_frame(&grey_frame(), &path);
        assert!(matches!(res, Err(CaptureError::Write { path: p, .. }) if p == path));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_write_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent").join("frame.jpg");
        assert!(matches!(
            save_frame(&grey_frame(), &path),
            Err(CaptureError::Write { .. })
        ));
        Ok(())
    }
}
