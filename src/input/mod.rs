//! Source texture input.
//!
//! Reads a directory of images, decodes them to RGBA8 and applies the
//! uniform resize before anything is packed.

pub mod loader;
pub mod resize;
pub mod texture;

pub use loader::{load_from_directory, LoadedTextures};
pub use resize::ResizeSpec;
pub use texture::{base_stem, Rectangle};
