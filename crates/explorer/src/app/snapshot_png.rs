use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use super::persist::persist_bytes;
use super::AppError;

pub(crate) fn write_png(path: &Path, width: u32, height: u32, rgba: Vec<u8>) -> Result<(), AppError> {
    let image =
        RgbaImage::from_raw(width, height, rgba).ok_or(AppError::FrameSize { width, height })?;
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(|source| AppError::Png {
            path: path.to_path_buf(),
            source,
        })?;
    persist_bytes(path, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_png_decodes_to_same_pixels() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fog.png");
        let mut rgba = vec![0u8; 2 * 2 * 4];
        rgba[4..8].copy_from_slice(&[10, 20, 30, 255]);

        write_png(&path, 2, 2, rgba.clone()).expect("write");

        let decoded = image::open(&path).expect("open").to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), rgba);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = write_png(&dir.path().join("fog.png"), 4, 4, vec![0u8; 8]).expect_err("short");
        assert!(matches!(err, AppError::FrameSize { width: 4, height: 4 }), "{err}");
    }
}
