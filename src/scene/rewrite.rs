//! Retarget a scene document at the atlas image.

use super::{texture_name, Image, SceneDoc};

/// Produce a copy of `doc` whose only image is the atlas.
///
/// Every texture samples image `0` afterwards, and unnamed textures get the
/// same synthetic names the cross reference uses, so the mapping file and the
/// rewritten document agree on texture identity.
pub fn rewrite(doc: &SceneDoc, atlas_uri: &str) -> SceneDoc {
    let mut out = doc.clone();
    out.images = Some(vec![Image::from_uri(atlas_uri)]);

    if let Some(textures) = out.textures.as_mut() {
        for (i, texture) in textures.iter_mut().enumerate() {
            texture.source = Some(0);
            if texture.name.is_none() {
                texture.name = Some(texture_name(i, texture));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "images": [{ "uri": "a.png" }, { "uri": "b.png", "mimeType": "image/png" }],
        "textures": [{ "source": 0 }, { "source": 1, "name": "Bark" }, { "source": 1 }],
        "materials": [{
            "name": "Tree",
            "pbrMetallicRoughness": { "baseColorTexture": { "index": 1 } }
        }],
        "nodes": [{ "mesh": 0 }]
    }"#;

    #[test]
    fn test_single_image_and_zero_sources() {
        let doc: SceneDoc = SCENE.parse().unwrap();
        let out = rewrite(&doc, "out/atlas.png");

        let images = out.images.as_ref().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].uri.as_deref(), Some("out/atlas.png"));
        assert!(out
            .textures
            .as_ref()
            .unwrap()
            .iter()
            .all(|t| t.source == Some(0)));
    }

    #[test]
    fn test_synthetic_texture_names() {
        let doc: SceneDoc = SCENE.parse().unwrap();
        let out = rewrite(&doc, "atlas.png");
        let names: Vec<_> = out
            .textures
            .unwrap()
            .into_iter()
            .map(|t| t.name.unwrap())
            .collect();
        assert_eq!(names, ["Texture0", "Bark", "Texture2"]);
    }

    #[test]
    fn test_original_untouched_and_rest_preserved() {
        let doc: SceneDoc = SCENE.parse().unwrap();
        let before = doc.clone();
        let out = rewrite(&doc, "atlas.png");

        assert_eq!(doc, before);
        assert_eq!(out.materials, doc.materials);
        assert_eq!(out.extra["nodes"], doc.extra["nodes"]);
    }

    #[test]
    fn test_rewritten_json_shape() {
        let doc: SceneDoc = SCENE.parse().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&rewrite(&doc, "out/atlas.png").to_json(true).unwrap()).unwrap();
        assert_eq!(json["images"], serde_json::json!([{ "uri": "out/atlas.png" }]));
        assert_eq!(json["textures"][2]["source"], 0);
    }
}
