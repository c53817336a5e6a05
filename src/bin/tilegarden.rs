use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tilegarden", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a diorama scene as a PNG.
    Frame(FrameArgs),
    /// Print a preset's labelled ffmpeg filter-graph fragment.
    Graph(GraphArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GraphArgs {
    /// Preset name (unknown names resolve to `none`).
    #[arg(long)]
    preset: String,

    /// Input stream label.
    #[arg(long, default_value = "0:v")]
    input: String,

    /// Output stream label.
    #[arg(long, default_value = "graded")]
    output: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Graph(args) => cmd_graph(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<tilegarden::Diorama> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: tilegarden::Diorama =
        serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    scene.validate()?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let raster = tilegarden::render_diorama(&scene, assets_root)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        raster.data(),
        raster.width(),
        raster.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_graph(args: GraphArgs) -> anyhow::Result<()> {
    let graph = tilegarden::graph_for(&args.preset, &args.input, &args.output);
    if graph.is_empty() {
        eprintln!("preset '{}' is a no-op; omit the filter stage", args.preset);
    } else {
        println!("{graph}");
    }
    Ok(())
}
