//! Decoded source textures.

use crate::error::{AtlasError, Result};

/// One source image, decoded to RGBA8 and already resized.
///
/// This is the packing unit: the packer only looks at the dimensions,
/// the atlas builder copies the pixels.
#[derive(Debug, Clone)]
pub struct Rectangle {
    /// File name the image was loaded from (e.g. `"wood.png"`).
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel), row-major.
    pub pixels: Vec<u8>,
}

impl Rectangle {
    /// Create a rectangle from RGBA data.
    pub fn new(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels,
        }
    }

    /// Create a rectangle filled with a single colour.
    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (0..width * height)
            .flat_map(|_| color.iter().copied())
            .collect();
        Self::new(name, width, height, pixels)
    }

    /// The name with everything from the first `.` removed (`"a.b.png"` -> `"a"`).
    ///
    /// This is the key used to match atlas entries against scene image URIs.
    pub fn stem(&self) -> &str {
        base_stem(&self.name)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Reject zero-area rectangles and buffers that do not match the dimensions.
    pub fn validate(&self) -> Result<()> {
        let expected = self.area() * 4;
        if self.area() == 0 || self.pixels.len() as u64 != expected {
            return Err(self.invalid());
        }
        Ok(())
    }

    pub(crate) fn invalid(&self) -> AtlasError {
        AtlasError::InvalidRectangle {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Strip directories and everything from the first `.` of a file name or URI.
pub fn base_stem(path: &str) -> &str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file_name.split('.').next().unwrap_or(file_name)
}

/// Decode image bytes into a rectangle.
pub fn load_rectangle_from_bytes(name: &str, data: &[u8]) -> Result<Rectangle> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Rectangle::new(name, width, height, rgba.into_raw()))
}
