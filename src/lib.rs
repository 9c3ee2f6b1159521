//! # glTF Atlas
//!
//! A Rust library for merging a folder of textures into a single atlas.
//!
//! ## Overview
//!
//! Source images are packed into one canvas, and a mapping file records the
//! pixel placement and normalized UV offset/repeat of every image. When a glTF
//! document is supplied, its materials are cross-referenced against the atlas
//! and a rewritten copy is produced whose only image is the atlas.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gltf_atlas::{AtlasConfig, ResizeSpec};
//!
//! let config = AtlasConfig::default()
//!     .with_input("model/textures")
//!     .with_output("model/output")
//!     .with_resize("50%".parse::<ResizeSpec>()?)
//!     .with_scene("model/scene.gltf", false);
//!
//! let summary = gltf_atlas::run(&config)?;
//! println!("{}x{} atlas", summary.width, summary.height);
//! ```
//!
//! ## Library Integration
//!
//! The stages can be driven individually when the images come from
//! somewhere other than a directory:
//!
//! ```ignore
//! use gltf_atlas::{build_map, compose, pack, Rectangle};
//!
//! let rects = vec![Rectangle::new("wood.png", 64, 64, pixels)];
//! let layout = pack(&rects)?;
//! let atlas = compose(&layout, &rects)?;
//! let map = build_map(&layout, None);
//! ```

pub mod error;
pub mod input;
pub mod atlas;
pub mod map;
pub mod scene;
pub mod export;
pub mod pipeline;

// Re-export main types for convenience
pub use error::{AtlasError, Result};
pub use input::{load_from_directory, Rectangle, ResizeSpec};
pub use atlas::{compose, pack, pack_sizes, AtlasBuilder, AtlasLayout, Placement, TextureAtlas};
pub use map::{build_map, AtlasMap, MapEntry, SceneMap};
pub use scene::{cross_reference, rewrite, CrossReference, SceneDoc, TextureSlot};
pub use pipeline::{run, AtlasConfig, RunSummary};
