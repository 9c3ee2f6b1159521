//! Atlas mapping records.
//!
//! Turns pixel placements into normalized offset/repeat pairs and, when a
//! scene document is present, keys them by the textures that sample each
//! image.

use crate::atlas::{AtlasLayout, Placement};
use crate::input::base_stem;
use crate::scene::{CrossReference, MaterialTexture};
use glam::{DVec2, UVec2};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Where one source image lives inside the atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    /// Source file name of the image.
    pub name: String,
    /// Top-left corner in UV space (0-1).
    pub offset: [f64; 2],
    /// Size in UV space (0-1].
    pub repeat: [f64; 2],
    /// Top-left corner in pixels.
    pub position: [u32; 2],
    /// Size in pixels.
    pub scale: [u32; 2],
    /// Materials sampling this image (scene mode only).
    pub linked_materials: Vec<String>,
}

impl MapEntry {
    /// Map a placement into the UV space of an atlas of `atlas_size` pixels.
    pub fn from_placement(placement: &Placement, atlas_size: UVec2) -> Self {
        let size = atlas_size.as_dvec2();
        let position = UVec2::new(placement.x, placement.y);
        let scale = UVec2::new(placement.width, placement.height);

        Self {
            name: placement.name.clone(),
            offset: (position.as_dvec2() / size).to_array(),
            repeat: (scale.as_dvec2() / size).to_array(),
            position: position.to_array(),
            scale: scale.to_array(),
            linked_materials: Vec::new(),
        }
    }

    /// Transform a local UV coordinate (0-1) to atlas coordinate.
    pub fn transform_uv(&self, u: f64, v: f64) -> [f64; 2] {
        let local = DVec2::new(u, v);
        (DVec2::from(self.offset) + local * DVec2::from(self.repeat)).to_array()
    }
}

/// Pixel size of the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasSize {
    pub width: u32,
    pub height: u32,
}

/// Mapping keyed by the scene document's textures and materials.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMap {
    pub atlas: AtlasSize,
    /// Entries in texture order, then images the scene never references.
    pub textures: Vec<(String, MapEntry)>,
    /// Textures used by each material, in material order.
    pub materials: Vec<(String, Vec<MaterialTexture>)>,
}

impl SceneMap {
    /// Get the entry for a texture name.
    pub fn texture(&self, name: &str) -> Option<&MapEntry> {
        self.textures
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    /// Get the textures used by a material.
    pub fn material(&self, name: &str) -> Option<&[MaterialTexture]> {
        self.materials
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, used)| used.as_slice())
    }
}

/// The two shapes of the mapping file.
#[derive(Debug, Clone, PartialEq)]
pub enum AtlasMap {
    /// Plain list in input order, written when there is no scene document.
    Sequence(Vec<MapEntry>),
    /// Texture/material keyed object, written alongside a rewritten scene.
    Scene(SceneMap),
}

impl AtlasMap {
    /// Every entry, in output order.
    pub fn entries(&self) -> Vec<&MapEntry> {
        match self {
            AtlasMap::Sequence(entries) => entries.iter().collect(),
            AtlasMap::Scene(map) => map.textures.iter().map(|(_, e)| e).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the mapping records for a packed layout.
///
/// Without a usable cross reference the records follow input order. With one,
/// they are keyed by texture name in the document's texture order, tagged with
/// the materials that sample their image; rectangles no texture refers to are
/// appended afterwards under their file name.
pub fn build_map(layout: &AtlasLayout, cross_ref: Option<&CrossReference>) -> AtlasMap {
    let atlas_size = UVec2::new(layout.width, layout.height);
    let entries: Vec<MapEntry> = layout
        .placements
        .iter()
        .map(|p| MapEntry::from_placement(p, atlas_size))
        .collect();

    let Some(xref) = cross_ref.filter(|x| x.is_usable()) else {
        for entry in &entries {
            log::debug!("Map data added: {}", entry.name);
        }
        return AtlasMap::Sequence(entries);
    };

    let mut textures: Vec<(String, MapEntry)> = Vec::new();
    let mut used = vec![false; entries.len()];

    for (texture, image) in xref.texture_names.iter().zip(&xref.texture_images) {
        let Some(image) = image else { continue };
        let Some(i) = entries.iter().position(|e| base_stem(&e.name) == image.as_str()) else {
            log::warn!("Texture {} samples image '{}' which is not in the atlas", texture, image);
            continue;
        };
        if textures.iter().any(|(key, _)| key == texture) {
            log::warn!("Duplicate texture name {}, keeping the first", texture);
            continue;
        }

        let mut entry = entries[i].clone();
        entry.linked_materials = xref.materials_for_image(image);
        log::debug!("Map data added: {} -> {}", texture, entry.name);
        textures.push((texture.clone(), entry));
        used[i] = true;
    }

    for (entry, _) in entries.into_iter().zip(used).filter(|(_, used)| !*used) {
        log::debug!("Map data added: {} (not referenced by the scene)", entry.name);
        textures.push((entry.name.clone(), entry));
    }

    let mut materials: Vec<(String, Vec<MaterialTexture>)> = Vec::new();
    for name in &xref.material_names {
        if materials.iter().any(|(key, _)| key == name) {
            continue;
        }
        materials.push((name.clone(), xref.material_to_textures.get(name).to_vec()));
    }

    AtlasMap::Scene(SceneMap {
        atlas: AtlasSize {
            width: layout.width,
            height: layout.height,
        },
        textures,
        materials,
    })
}

/// `{ name, offset, repeat, pos, scale }`
struct SequenceEntry<'a>(&'a MapEntry);

impl Serialize for SequenceEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MapEntry", 5)?;
        s.serialize_field("name", &self.0.name)?;
        s.serialize_field("offset", &self.0.offset)?;
        s.serialize_field("repeat", &self.0.repeat)?;
        s.serialize_field("pos", &self.0.position)?;
        s.serialize_field("scale", &self.0.scale)?;
        s.end()
    }
}

/// `{ oldImageUsed, linkedMaterials, offset, repeat, position, scale }`
struct TextureEntry<'a>(&'a MapEntry);

impl Serialize for TextureEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TextureEntry", 6)?;
        s.serialize_field("oldImageUsed", &self.0.name)?;
        s.serialize_field("linkedMaterials", &self.0.linked_materials)?;
        s.serialize_field("offset", &self.0.offset)?;
        s.serialize_field("repeat", &self.0.repeat)?;
        s.serialize_field("position", &self.0.position)?;
        s.serialize_field("scale", &self.0.scale)?;
        s.end()
    }
}

#[derive(Serialize)]
struct MaterialEntry<'a> {
    #[serde(rename = "texturesUsed")]
    textures_used: &'a [MaterialTexture],
}

/// Texture entries as a JSON object, keeping their order.
struct TextureTable<'a>(&'a [(String, MapEntry)]);

impl Serialize for TextureTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, entry) in self.0 {
            map.serialize_entry(key, &TextureEntry(entry))?;
        }
        map.end()
    }
}

/// Material entries as a JSON object, keeping their order.
struct MaterialTable<'a>(&'a [(String, Vec<MaterialTexture>)]);

impl Serialize for MaterialTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, used) in self.0 {
            map.serialize_entry(key, &MaterialEntry { textures_used: used })?;
        }
        map.end()
    }
}

impl Serialize for SceneMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SceneMap", 3)?;
        s.serialize_field("atlas", &self.atlas)?;
        s.serialize_field("textures", &TextureTable(&self.textures))?;
        s.serialize_field("materials", &MaterialTable(&self.materials))?;
        s.end()
    }
}

impl Serialize for AtlasMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AtlasMap::Sequence(entries) => serializer.collect_seq(entries.iter().map(SequenceEntry)),
            AtlasMap::Scene(map) => map.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{pack, pack_sizes};
    use crate::input::Rectangle;
    use crate::scene::{cross_reference, SceneDoc, TextureSlot};
    use serde_json::json;

    const EPSILON: f64 = 1e-9;

    fn layout(named: &[(&str, u32, u32)]) -> AtlasLayout {
        let rects: Vec<Rectangle> = named
            .iter()
            .map(|&(name, w, h)| Rectangle::solid(name, w, h, [0, 0, 0, 255]))
            .collect();
        pack(&rects).unwrap()
    }

    #[test]
    fn test_sequence_in_input_order() {
        let layout = layout(&[("small.png", 32, 32), ("big.png", 64, 64)]);
        let AtlasMap::Sequence(entries) = build_map(&layout, None) else {
            panic!("expected a sequence map");
        };
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["small.png", "big.png"]);
        assert_eq!(entries[1].offset, [0.0, 0.0]);
        assert_eq!(entries[0].position, [64, 0]);
        assert_eq!(entries[0].scale, [32, 32]);
        assert!((entries[0].offset[0] - 64.0 / 96.0).abs() < EPSILON);
        assert!((entries[0].repeat[1] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_uv_round_trip() {
        let sizes = [(30, 20), (20, 30), (10, 10), (25, 25), (5, 40), (7, 3)];
        let layout = pack_sizes(&sizes).unwrap();
        let map = build_map(&layout, None);
        let atlas = [layout.width as f64, layout.height as f64];

        for entry in map.entries() {
            for axis in 0..2 {
                assert!((entry.offset[axis] * atlas[axis] - entry.position[axis] as f64).abs() < EPSILON);
                assert!((entry.repeat[axis] * atlas[axis] - entry.scale[axis] as f64).abs() < EPSILON);
                assert!(entry.offset[axis] >= 0.0 && entry.offset[axis] <= 1.0);
                assert!(entry.repeat[axis] > 0.0 && entry.repeat[axis] <= 1.0);
            }
        }
    }

    #[test]
    fn test_transform_uv() {
        let entry = MapEntry {
            name: "a.png".to_string(),
            offset: [0.25, 0.5],
            repeat: [0.25, 0.25],
            position: [0, 0],
            scale: [0, 0],
            linked_materials: Vec::new(),
        };

        let [u, v] = entry.transform_uv(0.0, 0.0);
        assert!((u - 0.25).abs() < EPSILON);
        assert!((v - 0.5).abs() < EPSILON);

        let [u, v] = entry.transform_uv(1.0, 1.0);
        assert!((u - 0.5).abs() < EPSILON);
        assert!((v - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_sequence_json_shape() {
        let layout = layout(&[("a.png", 64, 64), ("b.png", 32, 32)]);
        let json = serde_json::to_value(build_map(&layout, None)).unwrap();
        assert_eq!(
            json,
            json!([
                { "name": "a.png", "offset": [0.0, 0.0], "repeat": [64.0 / 96.0, 1.0], "pos": [0, 0], "scale": [64, 64] },
                { "name": "b.png", "offset": [64.0 / 96.0, 0.0], "repeat": [32.0 / 96.0, 0.5], "pos": [64, 0], "scale": [32, 32] }
            ])
        );
    }

    #[test]
    fn test_scene_map_links_materials() {
        let layout = layout(&[("a.png", 10, 10)]);
        let doc: SceneDoc = r#"{
            "images": [{ "uri": "a.png" }],
            "textures": [{ "source": 0 }],
            "materials": [{
                "name": "Mat",
                "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } }
            }]
        }"#
        .parse()
        .unwrap();
        let xref = cross_reference(&doc).unwrap();

        let AtlasMap::Scene(map) = build_map(&layout, Some(&xref)) else {
            panic!("expected a scene map");
        };
        assert_eq!(map.atlas, AtlasSize { width: 10, height: 10 });
        let entry = map.texture("Texture0").unwrap();
        assert_eq!(entry.linked_materials, ["Mat"]);
        assert_eq!(entry.name, "a.png");
        assert_eq!(entry.repeat, [1.0, 1.0]);

        let used = map.material("Mat").unwrap();
        assert_eq!(used[0].name, "Texture0");
        assert_eq!(used[0].slot, TextureSlot::BaseColor);
    }

    #[test]
    fn test_scene_map_order_and_unreferenced_images() {
        let layout = layout(&[("extra.png", 8, 8), ("b.png", 16, 16), ("a.png", 16, 16)]);
        let doc: SceneDoc = r#"{
            "images": [{ "uri": "img/a.png" }, { "uri": "img/b.jpg" }, { "uri": "img/missing.png" }],
            "textures": [{ "source": 1 }, { "source": 0, "name": "Albedo" }, { "source": 2 }],
            "materials": [
                { "normalTexture": { "index": 0 } },
                { "name": "Top", "pbrMetallicRoughness": { "baseColorTexture": { "index": 1 } } }
            ]
        }"#
        .parse()
        .unwrap();
        let xref = cross_reference(&doc).unwrap();

        let AtlasMap::Scene(map) = build_map(&layout, Some(&xref)) else {
            panic!("expected a scene map");
        };
        let keys: Vec<_> = map.textures.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["Texture0", "Albedo", "extra.png"]);
        assert_eq!(map.texture("Texture0").unwrap().name, "b.png");
        assert_eq!(map.texture("Texture0").unwrap().linked_materials, ["_Mat0"]);
        assert!(map.texture("extra.png").unwrap().linked_materials.is_empty());

        let materials: Vec<_> = map.materials.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(materials, ["_Mat0", "Top"]);
    }

    #[test]
    fn test_scene_json_shape() {
        let layout = layout(&[("a.png", 10, 10)]);
        let doc: SceneDoc = r#"{
            "images": [{ "uri": "a.png" }],
            "textures": [{ "source": 0 }],
            "materials": [{ "occlusionTexture": { "index": 0 } }]
        }"#
        .parse()
        .unwrap();
        let xref = cross_reference(&doc).unwrap();
        let json = serde_json::to_value(build_map(&layout, Some(&xref))).unwrap();

        assert_eq!(
            json,
            json!({
                "atlas": { "width": 10, "height": 10 },
                "textures": {
                    "Texture0": {
                        "oldImageUsed": "a.png",
                        "linkedMaterials": ["_Mat0"],
                        "offset": [0.0, 0.0],
                        "repeat": [1.0, 1.0],
                        "position": [0, 0],
                        "scale": [10, 10]
                    }
                },
                "materials": {
                    "_Mat0": { "texturesUsed": [{ "name": "Texture0", "type": "occlusionTexture", "index": 0 }] }
                }
            })
        );
    }

    #[test]
    fn test_unusable_cross_reference_falls_back() {
        let layout = layout(&[("a.png", 4, 4)]);
        let doc: SceneDoc = r#"{ "images": [], "textures": [], "materials": [] }"#.parse().unwrap();
        let xref = cross_reference(&doc).unwrap();
        assert!(matches!(build_map(&layout, Some(&xref)), AtlasMap::Sequence(_)));
    }
}
