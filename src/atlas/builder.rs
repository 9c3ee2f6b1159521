//! Atlas composition: paints every rectangle into one canvas.

use super::packer::{pack, AtlasLayout};
use crate::error::{AtlasError, Result};
use crate::input::Rectangle;
use image::{DynamicImage, ImageEncoder, ImageFormat, RgbaImage};
use std::path::Path;

/// A composed texture atlas.
#[derive(Debug)]
pub struct TextureAtlas {
    /// Width of the atlas in pixels.
    pub width: u32,
    /// Height of the atlas in pixels.
    pub height: u32,
    /// RGBA pixel data.
    pub pixels: Vec<u8>,
}

impl TextureAtlas {
    /// Create a fully transparent atlas.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Export the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }

    /// Encode the atlas to `path`, picking the format from its extension.
    ///
    /// JPEG has no alpha channel, so it is dropped for `.jpg`/`.jpeg`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let buffer = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| AtlasError::InvalidRectangle {
                name: path.display().to_string(),
                width: self.width,
                height: self.height,
            })?;

        let image = DynamicImage::ImageRgba8(buffer);
        match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path, format)?,
            _ => image.save_with_format(path, format)?,
        }
        Ok(())
    }
}

/// Copy every rectangle into a blank canvas at its placement.
///
/// Pixels are written verbatim: no blending, resampling or colour change.
/// Placements never overlap, so the copy order does not matter.
pub fn compose(layout: &AtlasLayout, rectangles: &[Rectangle]) -> Result<TextureAtlas> {
    let mut atlas = TextureAtlas::blank(layout.width, layout.height);
    let atlas_stride = layout.width as usize * 4;

    for placement in &layout.placements {
        let rect = rectangles
            .get(placement.index)
            .ok_or_else(|| AtlasError::InvalidRectangle {
                name: placement.name.clone(),
                width: placement.width,
                height: placement.height,
            })?;
        rect.validate()?;
        if (rect.width, rect.height) != (placement.width, placement.height)
            || placement.right() > layout.width
            || placement.bottom() > layout.height
        {
            return Err(rect.invalid());
        }

        let row_bytes = rect.width as usize * 4;
        for row in 0..rect.height as usize {
            let src = row * row_bytes;
            let dst = (placement.y as usize + row) * atlas_stride + placement.x as usize * 4;
            atlas.pixels[dst..dst + row_bytes].copy_from_slice(&rect.pixels[src..src + row_bytes]);
        }
    }

    Ok(atlas)
}

/// Builder that packs and composes in one go.
#[derive(Debug, Default)]
pub struct AtlasBuilder {
    rectangles: Vec<Rectangle>,
}

impl AtlasBuilder {
    /// Create a new atlas builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a texture to the atlas.
    pub fn add_texture(&mut self, rect: Rectangle) {
        self.rectangles.push(rect);
    }

    /// Pack and compose, returning the layout alongside the atlas.
    pub fn build(self) -> Result<(AtlasLayout, TextureAtlas, Vec<Rectangle>)> {
        let layout = pack(&self.rectangles)?;
        let atlas = compose(&layout, &self.rectangles)?;
        log::debug!("Atlas size: {}x{}", atlas.width, atlas.height);
        Ok((layout, atlas, self.rectangles))
    }
}

impl FromIterator<Rectangle> for AtlasBuilder {
    fn from_iter<I: IntoIterator<Item = Rectangle>>(iter: I) -> Self {
        Self {
            rectangles: iter.into_iter().collect(),
        }
    }
}
