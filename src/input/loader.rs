//! Texture loading from a directory.

use super::texture::load_rectangle_from_bytes;
use super::{Rectangle, ResizeSpec};
use crate::error::{AtlasError, Result};
use image::ImageFormat;
use std::path::Path;

/// Textures read from an input directory.
#[derive(Debug, Default)]
pub struct LoadedTextures {
    /// Decoded and resized images, ordered by file name.
    pub rectangles: Vec<Rectangle>,
    /// File names that were skipped because their format is not supported.
    pub skipped: Vec<String>,
}

/// Whether a file name has an extension the image codec can decode.
pub fn is_supported(path: &Path) -> bool {
    ImageFormat::from_path(path)
        .map(|format| format.reading_enabled())
        .unwrap_or(false)
}

/// Load every supported image in `dir` (non-recursive), resized by `resize`.
///
/// Files are visited in file name order so repeated runs pack identically.
/// Unsupported files are skipped and reported; a supported file that fails
/// to decode aborts the load.
pub fn load_from_directory<P: AsRef<Path>>(dir: P, resize: ResizeSpec) -> Result<LoadedTextures> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(AtlasError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();

    let total = entries.len();
    let mut loaded = LoadedTextures::default();

    for (i, path) in entries.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !is_supported(path) {
            log::debug!("Skipping unsupported file: {}", name);
            loaded.skipped.push(name);
            continue;
        }

        let data = std::fs::read(path)?;
        let rect = load_rectangle_from_bytes(&name, &data)?;
        let (source_w, source_h) = (rect.width, rect.height);
        let rect = resize.apply_to(rect)?;

        log::debug!(
            "[{} / {}] Texture read: {} ({}x{} -> {}x{})",
            i + 1,
            total,
            name,
            source_w,
            source_h,
            rect.width,
            rect.height
        );
        loaded.rectangles.push(rect);
    }

    if !loaded.skipped.is_empty() {
        log::info!("Skipped {} unsupported file(s)", loaded.skipped.len());
    }

    if loaded.rectangles.is_empty() {
        return Err(AtlasError::EmptyInput);
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let result = load_from_directory(&missing, ResizeSpec::default());
        assert!(matches!(result, Err(AtlasError::DirectoryNotFound(p)) if p == missing));
    }

    #[test]
    fn test_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load_from_directory(tmp.path(), ResizeSpec::default());
        assert!(matches!(result, Err(AtlasError::EmptyInput)));
    }

    #[test]
    fn test_only_unsupported_files_is_empty_input() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        let result = load_from_directory(tmp.path(), ResizeSpec::default());
        assert!(matches!(result, Err(AtlasError::EmptyInput)));
    }

    #[test]
    fn test_loads_sorted_and_skips_unsupported() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "b.png", 8, 4);
        write_png(tmp.path(), "a.png", 2, 2);
        std::fs::write(tmp.path().join("readme.md"), "# textures").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();

        let loaded = load_from_directory(tmp.path(), ResizeSpec::default()).unwrap();
        let names: Vec<_> = loaded.rectangles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
        assert_eq!(loaded.skipped, ["readme.md"]);
        assert_eq!((loaded.rectangles[1].width, loaded.rectangles[1].height), (8, 4));
    }

    #[test]
    fn test_resize_applied_before_packing() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "big.png", 200, 200);

        let loaded = load_from_directory(tmp.path(), ResizeSpec::Percentage(0.5)).unwrap();
        let rect = &loaded.rectangles[0];
        assert_eq!((rect.width, rect.height), (100, 100));
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("a.png")));
        assert!(is_supported(Path::new("a.JPG")));
        assert!(!is_supported(Path::new("a.txt")));
        assert!(!is_supported(Path::new("no_extension")));
    }
}
