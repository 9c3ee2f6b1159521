//! Image → texture → material linkage tables.

use super::{material_name, texture_name, SceneDoc, TextureSlot};
use crate::error::{AtlasError, Result};
use crate::input::base_stem;
use serde::Serialize;
use std::collections::BTreeMap;

/// Multimap from a string key to an ordered list of unique values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiMap<V> {
    entries: BTreeMap<String, Vec<V>>,
}

impl<V> Default for MultiMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: PartialEq> MultiMap<V> {
    /// Append `value` under `key` unless it is already there.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let values = self.entries.entry(key.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Values for `key` in insertion order (empty when absent).
    pub fn get(&self, key: &str) -> &[V] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A material using a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureUse {
    pub material: String,
    pub slot: TextureSlot,
}

/// A texture used by a material, as written to the mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialTexture {
    /// Texture name.
    pub name: String,
    /// Slot the texture is bound to.
    #[serde(rename = "type")]
    pub slot: TextureSlot,
    /// Index into the document's `textures` collection.
    pub index: usize,
}

/// Lookup tables linking the images of a scene document to its textures
/// and materials.
#[derive(Debug, Clone, Default)]
pub struct CrossReference {
    /// Join key of each image (base name without extension), by image index.
    pub image_names: Vec<String>,
    /// Name of each texture (explicit or synthetic), by texture index.
    pub texture_names: Vec<String>,
    /// Join key of the image each texture samples, by texture index.
    pub texture_images: Vec<Option<String>>,
    /// Name of each material (explicit or synthetic), by material index.
    pub material_names: Vec<String>,
    pub image_to_textures: MultiMap<String>,
    pub texture_to_materials: MultiMap<TextureUse>,
    pub material_to_textures: MultiMap<MaterialTexture>,
}

impl CrossReference {
    /// Whether the scene-aware mapping can be built from these tables.
    pub fn is_usable(&self) -> bool {
        !self.image_names.is_empty()
            && !self.texture_names.is_empty()
            && !self.material_names.is_empty()
    }

    /// Materials using any texture that samples the image `image_name`.
    pub fn materials_for_image(&self, image_name: &str) -> Vec<String> {
        let mut materials: Vec<String> = Vec::new();
        for texture in self.image_to_textures.get(image_name) {
            for usage in self.texture_to_materials.get(texture) {
                if !materials.contains(&usage.material) {
                    materials.push(usage.material.clone());
                }
            }
        }
        materials
    }
}

/// Build the cross-reference tables for a scene document.
///
/// Fails when the document has no `images`, `textures` or `materials`
/// collection. Indices pointing outside their collection are skipped.
pub fn cross_reference(doc: &SceneDoc) -> Result<CrossReference> {
    let missing = |what: &str| AtlasError::MalformedScene(format!("missing '{}' collection", what));
    let images = doc.images.as_ref().ok_or_else(|| missing("images"))?;
    let textures = doc.textures.as_ref().ok_or_else(|| missing("textures"))?;
    let materials = doc.materials.as_ref().ok_or_else(|| missing("materials"))?;

    let mut xref = CrossReference::default();

    xref.image_names = images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            image
                .uri
                .as_deref()
                .or(image.name.as_deref())
                .map(|s| base_stem(s).to_string())
                .unwrap_or_else(|| format!("Image{}", i))
        })
        .collect();

    for (i, texture) in textures.iter().enumerate() {
        let name = texture_name(i, texture);
        let image = match texture.source {
            Some(source) => match xref.image_names.get(source) {
                Some(image) => Some(image.clone()),
                None => {
                    log::warn!("Texture {} references missing image {}", name, source);
                    None
                }
            },
            None => None,
        };
        if let Some(image) = &image {
            xref.image_to_textures.insert(image.clone(), name.clone());
        }
        xref.texture_names.push(name);
        xref.texture_images.push(image);
    }

    for (i, material) in materials.iter().enumerate() {
        let material_name = material_name(i, material);
        for (slot, index) in material.texture_slots() {
            let Some(texture) = xref.texture_names.get(index).cloned() else {
                log::warn!(
                    "Material {} references missing texture {} in {}",
                    material_name,
                    index,
                    slot
                );
                continue;
            };
            xref.texture_to_materials.insert(
                texture.clone(),
                TextureUse {
                    material: material_name.clone(),
                    slot,
                },
            );
            xref.material_to_textures.insert(
                material_name.clone(),
                MaterialTexture {
                    name: texture,
                    slot,
                    index,
                },
            );
        }
        xref.material_names.push(material_name);
    }

    log::debug!(
        "Cross reference: {} images, {} textures, {} materials",
        xref.image_names.len(),
        xref.texture_names.len(),
        xref.material_names.len()
    );

    Ok(xref)
}
