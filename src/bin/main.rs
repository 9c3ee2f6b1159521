//! glTF Atlas CLI
//!
//! Pack a folder of textures into one atlas and retarget a glTF scene at it.

use clap::Parser;
use gltf_atlas::{AtlasConfig, ResizeSpec};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gltf-atlas")]
#[command(author, version, about = "Create a texture atlas with a UV map, and retarget glTF materials at it", long_about = None)]
struct Cli {
    /// Input directory containing the textures to process
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for the atlas and map files (created when missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Atlas file name; the extension [bmp, gif, jpeg, png, tiff] selects the format
    #[arg(short, long, default_value = "atlas.png")]
    atlas: String,

    /// Map file name
    #[arg(short, long, default_value = "map.json")]
    map: String,

    /// Resize applied to every texture: "<percentage>%" or "<pixels>px"
    #[arg(short, long, default_value = "100%", value_parser = parse_resize)]
    resize: ResizeSpec,

    /// glTF file whose materials should use the atlas
    #[arg(short, long)]
    gltf: Option<PathBuf>,

    /// Also write the rewritten glTF as a .json file
    #[arg(short, long)]
    json: bool,

    /// Extra log filter directives (e.g. "gltf_atlas::scene=trace")
    #[arg(short, long)]
    debug: Option<String>,
}

fn parse_resize(s: &str) -> Result<ResizeSpec, String> {
    s.parse().map_err(|e: gltf_atlas::AtlasError| e.to_string())
}

fn init_logging(debug: Option<&str>) {
    let mut filters = String::from("gltf_atlas=info");
    if let Some(extra) = debug {
        filters.push(',');
        filters.push_str(extra);
    }
    env_logger::Builder::new()
        .parse_filters(&filters)
        .format_timestamp(None)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug.as_deref());

    let mut config = AtlasConfig::default()
        .with_atlas_file(cli.atlas)
        .with_map_file(cli.map)
        .with_resize(cli.resize);
    if let Some(input) = cli.input {
        config = config.with_input(input);
    }
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }
    if let Some(gltf) = cli.gltf {
        config = config.with_scene(gltf, cli.json);
    }

    let summary = match gltf_atlas::run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Atlas could not be created.");
            return Err(e.into());
        }
    };

    println!(
        "Atlas: {}x{} with {} textures -> {:?}",
        summary.width, summary.height, summary.textures, summary.atlas_path
    );
    println!("  Map: {:?}", summary.map_path);
    for path in &summary.scene_paths {
        println!("  Scene: {:?}", path);
    }
    if summary.skipped > 0 {
        println!("  Skipped {} unsupported file(s)", summary.skipped);
    }

    Ok(())
}
