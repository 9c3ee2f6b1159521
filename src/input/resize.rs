//! Uniform resize applied to every source image before packing.

use super::Rectangle;
use crate::error::{AtlasError, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use std::fmt;
use std::str::FromStr;

const DEFAULT_PIXELS: u32 = 1024;

/// How source images are scaled before they are packed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeSpec {
    /// Scale both dimensions by a factor (`"50%"` is `0.5`).
    Percentage(f64),
    /// Fix the width to this many pixels and keep the aspect ratio.
    Pixels(u32),
}

impl Default for ResizeSpec {
    fn default() -> Self {
        ResizeSpec::Percentage(1.0)
    }
}

impl FromStr for ResizeSpec {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || AtlasError::InvalidResize(s.to_string());

        if let Some(number) = trimmed.strip_suffix('%') {
            if number.trim().is_empty() {
                return Ok(ResizeSpec::default());
            }
            let percent: f64 = number.trim().parse().map_err(|_| invalid())?;
            if !percent.is_finite() || percent <= 0.0 {
                return Err(invalid());
            }
            Ok(ResizeSpec::Percentage(percent / 100.0))
        } else if let Some(number) = trimmed.strip_suffix("px") {
            if number.trim().is_empty() {
                return Ok(ResizeSpec::Pixels(DEFAULT_PIXELS));
            }
            let pixels: u32 = number.trim().parse().map_err(|_| invalid())?;
            if pixels == 0 {
                return Err(invalid());
            }
            Ok(ResizeSpec::Pixels(pixels))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeSpec::Percentage(factor) => write!(f, "{}%", factor * 100.0),
            ResizeSpec::Pixels(pixels) => write!(f, "{}px", pixels),
        }
    }
}

impl ResizeSpec {
    /// Target dimensions for a source image of `width` x `height`.
    ///
    /// Dimensions are rounded to the nearest pixel and may come out as zero
    /// for tiny sources; the packer rejects those.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            ResizeSpec::Percentage(factor) => (
                (width as f64 * factor).round() as u32,
                (height as f64 * factor).round() as u32,
            ),
            ResizeSpec::Pixels(pixels) => {
                if width == 0 {
                    return (pixels, 0);
                }
                let height = (height as f64 * pixels as f64 / width as f64).round() as u32;
                (pixels, height)
            }
        }
    }

    /// Resize a rectangle, keeping its name.
    pub fn apply_to(&self, rect: Rectangle) -> Result<Rectangle> {
        let (target_w, target_h) = self.target_size(rect.width, rect.height);
        if target_w == 0 || target_h == 0 {
            return Err(AtlasError::InvalidRectangle {
                name: rect.name,
                width: target_w,
                height: target_h,
            });
        }
        if (target_w, target_h) == (rect.width, rect.height) {
            return Ok(rect);
        }

        let Rectangle {
            name,
            width,
            height,
            pixels,
        } = rect;
        let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            AtlasError::InvalidRectangle {
                name: name.clone(),
                width,
                height,
            }
        })?;
        let resized = image::imageops::resize(&image, target_w, target_h, FilterType::Triangle);
        Ok(Rectangle::new(name, target_w, target_h, resized.into_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percentage() {
        assert_eq!("50%".parse::<ResizeSpec>().unwrap(), ResizeSpec::Percentage(0.5));
        assert_eq!("100%".parse::<ResizeSpec>().unwrap(), ResizeSpec::Percentage(1.0));
        assert_eq!("%".parse::<ResizeSpec>().unwrap(), ResizeSpec::Percentage(1.0));
    }

    #[test]
    fn test_parse_pixels() {
        assert_eq!("512px".parse::<ResizeSpec>().unwrap(), ResizeSpec::Pixels(512));
        assert_eq!("px".parse::<ResizeSpec>().unwrap(), ResizeSpec::Pixels(1024));
    }

    #[test]
    fn test_parse_rejects_other_units() {
        assert!(matches!("50".parse::<ResizeSpec>(), Err(AtlasError::InvalidResize(_))));
        assert!("2em".parse::<ResizeSpec>().is_err());
        assert!("abc%".parse::<ResizeSpec>().is_err());
        assert!("0px".parse::<ResizeSpec>().is_err());
        assert!("-10%".parse::<ResizeSpec>().is_err());
    }

    #[test]
    fn test_target_size() {
        assert_eq!(ResizeSpec::Percentage(0.5).target_size(200, 200), (100, 100));
        assert_eq!(ResizeSpec::Pixels(256).target_size(512, 128), (256, 64));
        assert_eq!(ResizeSpec::Pixels(100).target_size(300, 200), (100, 67));
    }

    #[test]
    fn test_half_size_rectangle() {
        let rect = Rectangle::solid("big.png", 200, 200, [255, 0, 0, 255]);
        let resized = "50%".parse::<ResizeSpec>().unwrap().apply_to(rect).unwrap();
        assert_eq!((resized.width, resized.height), (100, 100));
        assert_eq!(resized.pixels.len(), 100 * 100 * 4);
        let [r, g, _, a] = resized.get_pixel(50, 50);
        assert!(r >= 254 && g <= 1 && a >= 254);
    }

    #[test]
    fn test_identity_keeps_pixels() {
        let rect = Rectangle::solid("same.png", 3, 3, [1, 2, 3, 4]);
        let spec = ResizeSpec::default();
        let out = spec.apply_to(rect.clone()).unwrap();
        assert_eq!(out.pixels, rect.pixels);
    }

    #[test]
    fn test_shrinking_to_nothing_is_invalid() {
        let rect = Rectangle::solid("dot.png", 1, 1, [0, 0, 0, 255]);
        let result = ResizeSpec::Percentage(0.1).apply_to(rect);
        assert!(matches!(result, Err(AtlasError::InvalidRectangle { .. })));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for spec in [ResizeSpec::Percentage(0.25), ResizeSpec::Pixels(64)] {
            assert_eq!(spec.to_string().parse::<ResizeSpec>().unwrap(), spec);
        }
    }
}
