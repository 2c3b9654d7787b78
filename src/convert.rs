use image::DynamicImage;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use webp::Encoder;

/// A per-file conversion failure. These are returned as values so the batch
/// loop can continue with the remaining files.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to decode {}: {}", path.display(), source)]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode {}: {}", path.display(), reason)]
    Encode { path: PathBuf, reason: String },
    #[error("failed to write {}: {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convert a single image to WebP at the given quality, writing
/// `<stem>.webp` into `output_dir`. An existing output file with the same
/// name is overwritten.
pub fn convert_to_webp(
    input: &Path,
    output_dir: &Path,
    quality: i32,
) -> Result<PathBuf, ConvertError> {
    let output_path = output_dir.join(webp_file_name(input));

    let decoded = image::open(input).map_err(|source| ConvertError::Decode {
        path: input.to_path_buf(),
        source,
    })?;

    // The webp encoder only accepts 8-bit RGB/RGBA buffers
    let image = match decoded {
        img @ (DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)) => img,
        other => DynamicImage::ImageRgba8(other.to_rgba8()),
    };

    let encoder = Encoder::from_image(&image).map_err(|reason| ConvertError::Encode {
        path: input.to_path_buf(),
        reason: reason.to_string(),
    })?;

    let data = encoder
        .encode_simple(false, quality as f32)
        .map_err(|err| ConvertError::Encode {
            path: input.to_path_buf(),
            reason: format!("{:?}", err),
        })?;

    fs::write(&output_path, &*data).map_err(|source| ConvertError::Write {
        path: output_path.clone(),
        source,
    })?;

    Ok(output_path)
}

/// Output file name for an input: its stem with a `.webp` extension
pub fn webp_file_name(input: &Path) -> OsString {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".webp");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webp_file_name() {
        assert_eq!(webp_file_name(Path::new("photos/a.png")), "a.webp");
        assert_eq!(webp_file_name(Path::new("b.JPEG")), "b.webp");
        assert_eq!(webp_file_name(Path::new("archive.tar.bmp")), "archive.tar.webp");
    }

    #[test]
    fn test_decode_failure_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.jpg");
        std::fs::write(&input, b"not a jpeg at all").unwrap();

        let err = convert_to_webp(&input, dir.path(), 85).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
        assert!(err.to_string().contains("broken.jpg"));
    }
}
