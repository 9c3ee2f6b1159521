//! Output writers for the atlas image, the mapping file and the rewritten scene.

use crate::atlas::TextureAtlas;
use crate::error::{AtlasError, Result};
use crate::input::base_stem;
use crate::map::AtlasMap;
use crate::scene::SceneDoc;
use std::fs;
use std::path::{Path, PathBuf};

/// Create `dir` (and its parents) if it does not exist yet.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| AtlasError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Encode the atlas; the format follows the file extension.
pub fn write_atlas(atlas: &TextureAtlas, path: &Path) -> Result<()> {
    atlas.save(path)?;
    log::debug!("Atlas written to {}", path.display());
    Ok(())
}

/// Write the mapping file as pretty-printed JSON.
pub fn write_map(map: &AtlasMap, path: &Path) -> Result<()> {
    fs::write(path, map.to_json()?)?;
    log::debug!("Map written to {}", path.display());
    Ok(())
}

/// Write a scene document as pretty-printed JSON.
pub fn write_scene(doc: &SceneDoc, path: &Path) -> Result<()> {
    fs::write(path, doc.to_json(true)?)?;
    log::debug!("Scene written to {}", path.display());
    Ok(())
}

/// `scene.gltf` -> `newscene.gltf`, next to the source document.
pub fn rewritten_scene_path(scene_path: &Path) -> PathBuf {
    let file_name = scene_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "scene.gltf".to_string());
    scene_path.with_file_name(format!("new{}", file_name))
}

/// `newscene.gltf` -> `newscene.json`.
pub fn plain_json_path(rewritten: &Path) -> PathBuf {
    let file_name = rewritten
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    rewritten.with_file_name(format!("{}.json", base_stem(&file_name)))
}

/// URI of the atlas as seen from the scene document's directory.
///
/// A relative path, climbing out with `..` when the output directory is not
/// below the scene; the absolute atlas path when no relative one exists.
/// Always uses `/` separators.
pub fn atlas_uri(scene_dir: &Path, output_dir: &Path, atlas_file: &str) -> String {
    let atlas_path = output_dir.join(atlas_file);
    let relative = pathdiff::diff_paths(&atlas_path, scene_dir).unwrap_or(atlas_path);

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
