//! Scene Exporter CLI
//!
//! Export scene snapshots to Java/OpenGL source or DirectX `.x` files.

use clap::{Parser, Subcommand, ValueEnum};
use scene_exporter::registry::LabelStyle;
use scene_exporter::{
    load_scene, DirectXConfig, DirectXVariant, ExportOutcome, Exporter, FsTextureWriter,
    JavaConfig, MaterialKeying, MaterialRegistry, Scene,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scene-exporter")]
#[command(author, version, about = "Export 3D scene snapshots to Java/OpenGL or DirectX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the selection (or whole model) as a Java/OpenGL class
    Java {
        /// Scene snapshot JSON file
        #[arg(short, long)]
        scene: PathBuf,

        /// Output file path (defaults to <model>.java next to the scene)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Position scale factor (default 0.0254, inches to meters)
        #[arg(long)]
        unit_scale: Option<f64>,

        /// Deduplicate materials by identity instead of sanitized name
        #[arg(long)]
        identity_keys: bool,
    },

    /// Export visible top-level entities as a DirectX .x file
    Directx {
        /// Scene snapshot JSON file
        #[arg(short, long)]
        scene: PathBuf,

        /// Output file path (defaults to <model>[-T].x next to the scene)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export variant
        #[arg(short, long, value_enum)]
        variant: Option<Variant>,

        /// Position scale factor (default 1.0)
        #[arg(long)]
        unit_scale: Option<f64>,

        /// Deduplicate materials by identity instead of sanitized name
        #[arg(long)]
        identity_keys: bool,

        /// Directory to look up texture images by file name
        #[arg(long)]
        texture_dir: Option<PathBuf>,
    },

    /// Show information about a scene snapshot
    Info {
        /// Scene snapshot JSON file
        #[arg(short, long)]
        scene: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Every face, both sides
    All,
    /// Only face sides that carry a material
    Textured,
    /// Axes untouched, wrapped in a rotation frame
    Blender,
}

impl From<Variant> for DirectXVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::All => DirectXVariant::All,
            Variant::Textured => DirectXVariant::TexturedOnly,
            Variant::Blender => DirectXVariant::Blender,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Java {
            scene,
            output,
            config,
            unit_scale,
            identity_keys,
        } => {
            let mut java: JavaConfig = read_config(config.as_deref())?;
            if let Some(scale) = unit_scale {
                java = java.with_unit_scale(scale);
            }
            if identity_keys {
                java = java.with_material_keying(MaterialKeying::Identity);
            }
            export_java(&scene, output, &java)?;
        }
        Commands::Directx {
            scene,
            output,
            config,
            variant,
            unit_scale,
            identity_keys,
            texture_dir,
        } => {
            let mut directx: DirectXConfig = read_config(config.as_deref())?;
            if let Some(variant) = variant {
                directx = directx.with_variant(variant.into());
            }
            if let Some(scale) = unit_scale {
                directx = directx.with_unit_scale(scale);
            }
            if identity_keys {
                directx = directx.with_material_keying(MaterialKeying::Identity);
            }
            if let Some(dir) = texture_dir {
                directx = directx.with_texture_dir(dir);
            }
            export_directx(&scene, output, &directx)?;
        }
        Commands::Info { scene } => {
            show_scene_info(&scene)?;
        }
    }

    Ok(())
}

fn read_config<C>(path: Option<&Path>) -> Result<C, Box<dyn std::error::Error>>
where
    C: Default + serde::de::DeserializeOwned,
{
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(C::default()),
    }
}

/// Destination chooser standing in for the save dialog.
fn destination(
    scene_path: &Path,
    output: Option<PathBuf>,
) -> impl FnMut(&str, &str) -> Option<PathBuf> {
    let dir = scene_path.parent().map(Path::to_path_buf).unwrap_or_default();
    move |_title: &str, suggested: &str| Some(output.clone().unwrap_or_else(|| dir.join(suggested)))
}

fn export_java(
    scene_path: &Path,
    output: Option<PathBuf>,
    config: &JavaConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", scene_path);
    let scene = load_scene(scene_path)?;
    let exporter = Exporter::new(&scene);

    let outcome = exporter.export_java(config, &mut destination(scene_path, output))?;
    print_outcome(&outcome);
    Ok(())
}

fn export_directx(
    scene_path: &Path,
    output: Option<PathBuf>,
    config: &DirectXConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", scene_path);
    let scene = load_scene(scene_path)?;
    let exporter = Exporter::new(&scene);

    let writer = match &config.texture_dir {
        Some(_) => exporter.fs_texture_writer(config),
        None => FsTextureWriter::new(
            scene_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        ),
    };
    let outcome = exporter.export_directx(config, &mut destination(scene_path, output), writer)?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &ExportOutcome) {
    match outcome {
        ExportOutcome::Written(report) => {
            println!("Exported to {:?}", report.path);
            println!(
                "  {} mesh(es), {} face(s), {} group(s), {} component(s)",
                report.meshes, report.faces, report.groups, report.components
            );
            for texture in &report.textures {
                println!("  Texture: {:?}", texture);
            }
            for alias in &report.aliases {
                println!(
                    "  Warning: {} shares the entry of {} (key {:?})",
                    alias.aliased, alias.kept, alias.key
                );
            }
        }
        ExportOutcome::Cancelled => println!("Export cancelled"),
        ExportOutcome::NothingToExport => println!("Nothing to export"),
    }
}

fn show_scene_info(scene_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", scene_path);
    let scene: Scene = load_scene(scene_path)?;

    println!("\nScene Info:");
    println!("  Model: {:?}", scene.base_name());
    println!("  Nodes: {}", scene.node_count());
    println!("  Faces: {}", scene.face_count());
    println!("  Materials: {}", scene.materials.len());
    println!("  Top-level entities: {}", scene.roots.len());
    println!("  Selected: {}", scene.selection.len());

    let mut registry = MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::DirectX);
    for id in scene.material_ids() {
        registry.resolve(id, scene.material(id)?)?;
    }
    for alias in registry.aliases() {
        println!(
            "  Aliased materials: {:?} and {:?} (key {:?})",
            scene.material(alias.kept)?.name,
            scene.material(alias.aliased)?.name,
            alias.key
        );
    }

    Ok(())
}
