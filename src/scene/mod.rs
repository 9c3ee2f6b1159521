//! glTF scene documents.
//!
//! Only the parts of the document the atlas cares about are typed: the
//! `images`, `textures` and `materials` collections and the texture slots of
//! each material. Everything else round-trips through flattened JSON maps so
//! a rewritten document keeps meshes, nodes, buffers and extensions intact.

pub mod cross_ref;
pub mod rewrite;

pub use cross_ref::{cross_reference, CrossReference, MaterialTexture, MultiMap, TextureUse};
pub use rewrite::rewrite;

use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// A glTF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textures: Option<Vec<Texture>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<Material>>,
    /// Every other top-level property (asset, meshes, nodes, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SceneDoc {
    /// Read a document from a `.gltf` / `.json` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AtlasError::SceneNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Serialize the document, pretty-printed or compact.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl std::str::FromStr for SceneDoc {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// An entry of the `images` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Image {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }
}

/// An entry of the `textures` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reference from a material slot to a texture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub index: usize,
    /// texCoord, scale, strength, KHR_texture_transform, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextureInfo {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An entry of the `materials` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureInfo>,
    /// Material extensions, keyed by extension name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    /// Texture index held in `slot`, if any.
    pub fn texture_index(&self, slot: TextureSlot) -> Option<usize> {
        let core = |info: &Option<TextureInfo>| info.as_ref().map(|t| t.index);
        let pbr = self.pbr_metallic_roughness.as_ref();

        match slot {
            TextureSlot::BaseColor => pbr.and_then(|p| core(&p.base_color_texture)),
            TextureSlot::MetallicRoughness => pbr.and_then(|p| core(&p.metallic_roughness_texture)),
            TextureSlot::Normal => core(&self.normal_texture),
            TextureSlot::Occlusion => core(&self.occlusion_texture),
            TextureSlot::Emissive => core(&self.emissive_texture),
            _ => {
                let extension = slot.extension()?;
                self.extensions
                    .as_ref()?
                    .get(extension)?
                    .get(slot.key())?
                    .get("index")?
                    .as_u64()
                    .map(|i| i as usize)
            }
        }
    }

    /// Every filled texture slot, in [`TextureSlot::ALL`] order.
    pub fn texture_slots(&self) -> Vec<(TextureSlot, usize)> {
        TextureSlot::ALL
            .iter()
            .filter_map(|&slot| self.texture_index(slot).map(|index| (slot, index)))
            .collect()
    }
}

/// The semantic slot a texture is bound to inside a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    BaseColor,
    MetallicRoughness,
    Normal,
    Occlusion,
    Emissive,
    Clearcoat,
    ClearcoatRoughness,
    ClearcoatNormal,
    SheenColor,
    SheenRoughness,
    Transmission,
    Thickness,
    Specular,
    SpecularColor,
    Iridescence,
    IridescenceThickness,
    Anisotropy,
    Diffuse,
    SpecularGlossiness,
    DiffuseTransmission,
    DiffuseTransmissionColor,
}

impl TextureSlot {
    /// All slots known to the material visitor.
    pub const ALL: [TextureSlot; 21] = [
        TextureSlot::BaseColor,
        TextureSlot::MetallicRoughness,
        TextureSlot::Normal,
        TextureSlot::Occlusion,
        TextureSlot::Emissive,
        TextureSlot::Clearcoat,
        TextureSlot::ClearcoatRoughness,
        TextureSlot::ClearcoatNormal,
        TextureSlot::SheenColor,
        TextureSlot::SheenRoughness,
        TextureSlot::Transmission,
        TextureSlot::Thickness,
        TextureSlot::Specular,
        TextureSlot::SpecularColor,
        TextureSlot::Iridescence,
        TextureSlot::IridescenceThickness,
        TextureSlot::Anisotropy,
        TextureSlot::Diffuse,
        TextureSlot::SpecularGlossiness,
        TextureSlot::DiffuseTransmission,
        TextureSlot::DiffuseTransmissionColor,
    ];

    /// Property name of the slot in the glTF JSON.
    pub fn key(&self) -> &'static str {
        match self {
            TextureSlot::BaseColor => "baseColorTexture",
            TextureSlot::MetallicRoughness => "metallicRoughnessTexture",
            TextureSlot::Normal => "normalTexture",
            TextureSlot::Occlusion => "occlusionTexture",
            TextureSlot::Emissive => "emissiveTexture",
            TextureSlot::Clearcoat => "clearcoatTexture",
            TextureSlot::ClearcoatRoughness => "clearcoatRoughnessTexture",
            TextureSlot::ClearcoatNormal => "clearcoatNormalTexture",
            TextureSlot::SheenColor => "sheenColorTexture",
            TextureSlot::SheenRoughness => "sheenRoughnessTexture",
            TextureSlot::Transmission => "transmissionTexture",
            TextureSlot::Thickness => "thicknessTexture",
            TextureSlot::Specular => "specularTexture",
            TextureSlot::SpecularColor => "specularColorTexture",
            TextureSlot::Iridescence => "iridescenceTexture",
            TextureSlot::IridescenceThickness => "iridescenceThicknessTexture",
            TextureSlot::Anisotropy => "anisotropyTexture",
            TextureSlot::Diffuse => "diffuseTexture",
            TextureSlot::SpecularGlossiness => "specularGlossinessTexture",
            TextureSlot::DiffuseTransmission => "diffuseTransmissionTexture",
            TextureSlot::DiffuseTransmissionColor => "diffuseTransmissionColorTexture",
        }
    }

    /// Extension object holding the slot, `None` for core slots.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            TextureSlot::BaseColor
            | TextureSlot::MetallicRoughness
            | TextureSlot::Normal
            | TextureSlot::Occlusion
            | TextureSlot::Emissive => None,
            TextureSlot::Clearcoat
            | TextureSlot::ClearcoatRoughness
            | TextureSlot::ClearcoatNormal => Some("KHR_materials_clearcoat"),
            TextureSlot::SheenColor | TextureSlot::SheenRoughness => Some("KHR_materials_sheen"),
            TextureSlot::Transmission => Some("KHR_materials_transmission"),
            TextureSlot::Thickness => Some("KHR_materials_volume"),
            TextureSlot::Specular | TextureSlot::SpecularColor => Some("KHR_materials_specular"),
            TextureSlot::Iridescence | TextureSlot::IridescenceThickness => {
                Some("KHR_materials_iridescence")
            }
            TextureSlot::Anisotropy => Some("KHR_materials_anisotropy"),
            TextureSlot::Diffuse | TextureSlot::SpecularGlossiness => {
                Some("KHR_materials_pbrSpecularGlossiness")
            }
            TextureSlot::DiffuseTransmission | TextureSlot::DiffuseTransmissionColor => {
                Some("KHR_materials_diffuse_transmission")
            }
        }
    }
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for TextureSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Name of the texture at `index`, synthesized as `"Texture" + index` when unnamed.
pub fn texture_name(index: usize, texture: &Texture) -> String {
    texture
        .name
        .clone()
        .unwrap_or_else(|| format!("Texture{}", index))
}

/// Name of the material at `index`, synthesized as `"_Mat" + index` when unnamed.
pub fn material_name(index: usize, material: &Material) -> String {
    material
        .name
        .clone()
        .unwrap_or_else(|| format!("_Mat{}", index))
}
