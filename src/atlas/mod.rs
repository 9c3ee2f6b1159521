//! Texture atlas building.
//!
//! This module packs source rectangles into a single canvas and paints
//! their pixels at the chosen positions.

mod builder;
pub mod packer;

pub use builder::{compose, AtlasBuilder, TextureAtlas};
pub use packer::{pack, pack_sizes, AtlasLayout, Placement};
