use crate::error::Result;
use image::imageops::FilterType;
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const THUMBNAIL_FOLDER: &str = "thumbnails";

/// Height for `width` that keeps the source aspect ratio, at least 1px
pub fn scaled_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    if src_width == 0 {
        return 1;
    }
    let height = (width as f64 * src_height as f64 / src_width as f64).round() as u32;
    height.max(1)
}

/// Write a `width`-wide copy of `source` into `{dest}/thumbnails/`, same file name
pub fn write_thumbnail(source: &Path, dest: &Path, width: u32) -> Result<PathBuf> {
    let image = ImageReader::open(source)?.with_guessed_format()?.decode()?;
    let height = scaled_height(image.width(), image.height(), width);
    let thumb = image.resize_exact(width, height, FilterType::Lanczos3);

    let folder = dest.join(THUMBNAIL_FOLDER);
    std::fs::create_dir_all(&folder)?;
    let target = match source.file_name() {
        Some(name) => folder.join(name),
        None => folder.join("thumbnail.png"),
    };
    thumb.save(&target)?;
    debug!("thumbnail {}x{} -> {}", width, height, target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_scaled_height() {
        assert_eq!(scaled_height(400, 200, 100), 50);
        assert_eq!(scaled_height(300, 200, 100), 67);
        assert_eq!(scaled_height(1000, 1, 10), 1);
    }

    #[test]
    fn test_write_thumbnail() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("shell.png");
        RgbImage::from_pixel(40, 20, Rgb([200, 100, 50])).save(&source).unwrap();

        let thumb = write_thumbnail(&source, dir.path(), 10).unwrap();
        assert_eq!(thumb, dir.path().join("thumbnails").join("shell.png"));

        let decoded = image::open(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 5));
    }
}
