//! Error types for atlas generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AtlasError.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Main error type for atlas packing, mapping and scene rewriting.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// The texture input directory does not exist.
    #[error("Could not find directory '{}'", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The scene document passed explicitly does not exist.
    #[error("Could not find the file '{}'", .0.display())]
    SceneNotFound(PathBuf),

    /// No images of a supported format were found.
    #[error("No texture images found in the texture folder")]
    EmptyInput,

    /// A rectangle has zero area or a pixel buffer that does not match its size.
    #[error("Invalid rectangle '{name}' ({width}x{height})")]
    InvalidRectangle {
        name: String,
        width: u32,
        height: u32,
    },

    /// The scene document lacks one of the images/textures/materials collections.
    #[error("Malformed scene document: {0}")]
    MalformedScene(String),

    /// The output directory could not be created.
    #[error("Could not create output directory '{}': {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The atlas file extension names a format the encoder cannot write.
    #[error("Unsupported atlas format '{0}': expected bmp, gif, jpeg, png or tiff")]
    UnsupportedAtlasFormat(String),

    /// The resize specification is neither `<n>%` nor `<n>px`.
    #[error("Invalid resize '{0}': expected '<percentage>%' or '<pixels>px'")]
    InvalidResize(String),

    /// Failed to parse or write JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read, encode or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
