//! End-to-end atlas generation.
//!
//! Loads textures, packs and composes the atlas, builds the mapping and, when
//! a scene document is configured, cross-references and rewrites it. Every
//! stage runs in memory first; files are only written once all of them
//! succeeded, so a failed run leaves nothing behind.

use crate::atlas::{AtlasBuilder, AtlasLayout, TextureAtlas};
use crate::error::{AtlasError, Result};
use crate::export;
use crate::input::{load_from_directory, Rectangle, ResizeSpec};
use crate::map::{build_map, AtlasMap};
use crate::scene::{cross_reference, rewrite, SceneDoc};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Configuration for an atlas run.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Texture directory; the working directory when unset.
    pub input: Option<PathBuf>,
    /// Output directory; the input directory (or working directory) when unset.
    pub output: Option<PathBuf>,
    /// Atlas file name; its extension selects the image format.
    pub atlas_file: String,
    /// Mapping file name.
    pub map_file: String,
    /// Resize applied to every texture before packing.
    pub resize: ResizeSpec,
    /// glTF document to retarget at the atlas.
    pub scene: Option<PathBuf>,
    /// Also write the rewritten scene with a `.json` extension.
    pub scene_json: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            atlas_file: "atlas.png".to_string(),
            map_file: "map.json".to_string(),
            resize: ResizeSpec::default(),
            scene: None,
            scene_json: false,
        }
    }
}

impl AtlasConfig {
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_atlas_file(mut self, name: impl Into<String>) -> Self {
        self.atlas_file = name.into();
        self
    }

    pub fn with_map_file(mut self, name: impl Into<String>) -> Self {
        self.map_file = name.into();
        self
    }

    pub fn with_resize(mut self, resize: ResizeSpec) -> Self {
        self.resize = resize;
        self
    }

    /// Retarget a scene document; `json` also writes a plain `.json` copy.
    pub fn with_scene(mut self, scene: impl Into<PathBuf>, json: bool) -> Self {
        self.scene = Some(scene.into());
        self.scene_json = json;
        self
    }
}

/// Absolute locations used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scene_path: Option<PathBuf>,
}

/// Resolve the configured paths against `cwd`.
///
/// The input directory and the scene document must exist and the atlas
/// extension must be writable. The output directory is only resolved here,
/// it is created when writing.
pub fn resolve_paths(config: &AtlasConfig, cwd: &Path) -> Result<ResolvedPaths> {
    let writable = ImageFormat::from_path(&config.atlas_file)
        .map(|format| format.writing_enabled())
        .unwrap_or(false);
    if !writable {
        return Err(AtlasError::UnsupportedAtlasFormat(config.atlas_file.clone()));
    }

    let input_dir = match &config.input {
        Some(input) => {
            let dir = cwd.join(input);
            if !dir.is_dir() {
                return Err(AtlasError::DirectoryNotFound(input.clone()));
            }
            dir
        }
        None => cwd.to_path_buf(),
    };

    let output_dir = match &config.output {
        Some(output) => cwd.join(output),
        None => input_dir.clone(),
    };

    let scene_path = match &config.scene {
        Some(scene) => {
            let path = cwd.join(scene);
            if !path.is_file() {
                return Err(AtlasError::SceneNotFound(scene.clone()));
            }
            Some(path)
        }
        None => None,
    };

    log::debug!("Texture folder: {}", input_dir.display());
    log::debug!("Output folder: {}", output_dir.display());
    if let Some(scene) = &scene_path {
        log::debug!("Scene file: {}", scene.display());
    }

    Ok(ResolvedPaths {
        input_dir,
        output_dir,
        scene_path,
    })
}

/// Everything a run produces, before it is written.
#[derive(Debug)]
pub struct AtlasOutput {
    pub rectangles: Vec<Rectangle>,
    pub layout: AtlasLayout,
    pub atlas: TextureAtlas,
    pub map: AtlasMap,
    /// Rewritten scene document, when a usable one was supplied.
    pub scene: Option<SceneDoc>,
    /// Input files skipped for having an unsupported format.
    pub skipped: Vec<String>,
}

/// Run the core stages on already-loaded rectangles.
///
/// `scene` is the source document and the URI the rewritten document should
/// use for the atlas.
pub fn process(
    rectangles: Vec<Rectangle>,
    scene: Option<(&SceneDoc, &str)>,
) -> Result<AtlasOutput> {
    let (layout, atlas, rectangles) = rectangles.into_iter().collect::<AtlasBuilder>().build()?;
    log::info!("Atlas size: {}x{} pixels", layout.width, layout.height);

    let (map, scene) = match scene {
        Some((doc, atlas_uri)) => {
            let xref = cross_reference(doc)?;
            if xref.is_usable() {
                (build_map(&layout, Some(&xref)), Some(rewrite(doc, atlas_uri)))
            } else {
                log::warn!("Scene document has no images, textures or materials; writing a plain map");
                (build_map(&layout, None), None)
            }
        }
        None => (build_map(&layout, None), None),
    };

    Ok(AtlasOutput {
        rectangles,
        layout,
        atlas,
        map,
        scene,
        skipped: Vec::new(),
    })
}

/// Files written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub atlas_path: PathBuf,
    pub map_path: PathBuf,
    pub scene_paths: Vec<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub textures: usize,
    pub skipped: usize,
}

/// Generate everything in memory for resolved paths.
pub fn generate(config: &AtlasConfig, paths: &ResolvedPaths) -> Result<AtlasOutput> {
    let loaded = load_from_directory(&paths.input_dir, config.resize)?;
    log::info!("Read {} texture(s)", loaded.rectangles.len());

    let scene = match &paths.scene_path {
        Some(path) => {
            let doc = SceneDoc::from_path(path)?;
            let scene_dir = path.parent().unwrap_or(Path::new(""));
            let uri = export::atlas_uri(scene_dir, &paths.output_dir, &config.atlas_file);
            Some((doc, uri))
        }
        None => None,
    };

    let mut output = process(
        loaded.rectangles,
        scene.as_ref().map(|(doc, uri)| (doc, uri.as_str())),
    )?;
    output.skipped = loaded.skipped;
    Ok(output)
}

/// Write a generated output to disk.
pub fn write(output: &AtlasOutput, config: &AtlasConfig, paths: &ResolvedPaths) -> Result<RunSummary> {
    export::ensure_output_dir(&paths.output_dir)?;

    let atlas_path = paths.output_dir.join(&config.atlas_file);
    let map_path = paths.output_dir.join(&config.map_file);
    export::write_atlas(&output.atlas, &atlas_path)?;
    export::write_map(&output.map, &map_path)?;

    let mut scene_paths = Vec::new();
    if let (Some(doc), Some(source)) = (&output.scene, &paths.scene_path) {
        let rewritten = export::rewritten_scene_path(source);
        export::write_scene(doc, &rewritten)?;
        log::info!("Scene file created: {}", rewritten.display());
        scene_paths.push(rewritten.clone());

        if config.scene_json {
            let json_path = export::plain_json_path(&rewritten);
            export::write_scene(doc, &json_path)?;
            log::info!("Scene JSON file created: {}", json_path.display());
            scene_paths.push(json_path);
        }
    }

    log::info!("Texture atlas and map created successfully");

    Ok(RunSummary {
        atlas_path,
        map_path,
        scene_paths,
        width: output.layout.width,
        height: output.layout.height,
        textures: output.rectangles.len(),
        skipped: output.skipped.len(),
    })
}

/// Run the whole pipeline relative to the process working directory.
pub fn run(config: &AtlasConfig) -> Result<RunSummary> {
    let cwd = std::env::current_dir()?;
    run_in(config, &cwd)
}

/// Run the whole pipeline relative to `cwd`.
pub fn run_in(config: &AtlasConfig, cwd: &Path) -> Result<RunSummary> {
    let paths = resolve_paths(config, cwd)?;
    let output = generate(config, &paths)?;
    write(&output, config, &paths)
}
