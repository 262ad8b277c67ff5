use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::ImageFormat;
use tracing_subscriber::EnvFilter;

use meshmorph::{
    CANONICAL_HEIGHT, CANONICAL_WIDTH, DEFAULT_FPS, DEFAULT_GRID_SIZE, DEFAULT_SECONDS,
    FrameIndex, GridSnapshot, ImageSequenceSink, MorphParams, MorphPixel, MorphSession,
    MorphThreading, Raster, SampleFilter,
};

#[derive(Parser, Debug)]
#[command(name = "meshmorph", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an evenly spaced control grid as JSON.
    Grid(GridArgs),
    /// Render the whole morph as a numbered image sequence.
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct GridArgs {
    /// Movable points per row.
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE, value_parser = clap::value_parser!(u32).range(5..=20))]
    grid_size: u32,

    /// Canonical width the grid is authored at.
    #[arg(long, default_value_t = CANONICAL_WIDTH)]
    width: u32,

    /// Canonical height the grid is authored at.
    #[arg(long, default_value_t = CANONICAL_HEIGHT)]
    height: u32,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct MorphInputs {
    /// First (start) image.
    #[arg(long)]
    a: PathBuf,

    /// Second (end) image.
    #[arg(long)]
    b: PathBuf,

    /// Control grid JSON for the first image (even grid when omitted).
    #[arg(long)]
    grid_a: Option<PathBuf>,

    /// Control grid JSON for the second image (even grid when omitted).
    #[arg(long)]
    grid_b: Option<PathBuf>,

    /// Movable points per row; taken from the grid files when omitted.
    #[arg(long, value_parser = clap::value_parser!(u32).range(5..=20))]
    grid_size: Option<u32>,

    /// Morph duration in seconds.
    #[arg(long, default_value_t = DEFAULT_SECONDS, value_parser = clap::value_parser!(u32).range(1..=20))]
    seconds: u32,

    /// Frames per second.
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(2..=30))]
    fps: u32,

    /// Source sampling filter.
    #[arg(long, value_enum, default_value_t = FilterChoice::Bilinear)]
    filter: FilterChoice,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    inputs: MorphInputs,

    /// Output directory; frames are written as `<index>.<ext>`.
    #[arg(long, default_value = "renders")]
    out: PathBuf,

    /// Still image format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpg)]
    format: FormatChoice,

    /// Compute frames concurrently.
    #[arg(long)]
    parallel: bool,

    /// Worker threads (implies `--parallel`).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames computed per parallel chunk.
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Fail instead of replacing existing frame files.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    inputs: MorphInputs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Bilinear,
}

impl From<FilterChoice> for SampleFilter {
    fn from(choice: FilterChoice) -> Self {
        match choice {
            FilterChoice::Nearest => SampleFilter::Nearest,
            FilterChoice::Bilinear => SampleFilter::Bilinear,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpg,
    Png,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Grid(args) => cmd_grid(args),
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_grid(args: GridArgs) -> anyhow::Result<()> {
    let grid = GridSnapshot::even(args.width, args.height, args.grid_size)?;
    ensure_parent(&args.out)?;
    let f = File::create(&args.out)
        .with_context(|| format!("create grid file '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), &grid).with_context(|| "write grid JSON")?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (params, grid_a, grid_b) = resolve_inputs(&args.inputs)?;
    let threading = MorphThreading {
        parallel: args.parallel || args.threads.is_some(),
        chunk_size: args.chunk_size,
        threads: args.threads,
    };
    let mut sink = match args.format {
        FormatChoice::Jpg => ImageSequenceSink::new(&args.out, ImageFormat::Jpeg),
        FormatChoice::Png => ImageSequenceSink::new(&args.out, ImageFormat::Png),
    };
    if args.no_overwrite {
        sink = sink.no_overwrite();
    }

    // JPEG has no alpha channel.
    let stats = match args.format {
        FormatChoice::Jpg => {
            let (a, b) = load_pair(&args.inputs, |img| img.to_rgb8())?;
            render_all(&a, &grid_a, &b, &grid_b, &params, threading, &mut sink)?
        }
        FormatChoice::Png => {
            let (a, b) = load_pair(&args.inputs, |img| img.to_rgba8())?;
            render_all(&a, &grid_a, &b, &grid_b, &params, threading, &mut sink)?
        }
    };

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_emitted,
        args.out.display()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (params, grid_a, grid_b) = resolve_inputs(&args.inputs)?;
    let (a, b) = load_pair(&args.inputs, |img| img.to_rgba8())?;
    let session = MorphSession::new(&a, &grid_a, &b, &grid_b, &params)?;
    let frame = session.render_frame(FrameIndex(args.frame))?;

    ensure_parent(&args.out)?;
    frame
        .image
        .save_with_format(&args.out, ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn render_all<P>(
    a: &Raster<P>,
    grid_a: &GridSnapshot,
    b: &Raster<P>,
    grid_b: &GridSnapshot,
    params: &MorphParams,
    threading: MorphThreading,
    sink: &mut ImageSequenceSink,
) -> anyhow::Result<meshmorph::MorphStats>
where
    P: MorphPixel + image::PixelWithColorType,
{
    let session = MorphSession::new(a, grid_a, b, grid_b, params)?.with_threading(threading);
    Ok(session.run(sink)?)
}

fn resolve_inputs(inputs: &MorphInputs) -> anyhow::Result<(MorphParams, GridSnapshot, GridSnapshot)> {
    let loaded_a = inputs.grid_a.as_deref().map(read_grid_json).transpose()?;
    let loaded_b = inputs.grid_b.as_deref().map(read_grid_json).transpose()?;

    let grid_size = inputs
        .grid_size
        .or_else(|| loaded_a.as_ref().map(GridSnapshot::grid_size))
        .or_else(|| loaded_b.as_ref().map(GridSnapshot::grid_size))
        .unwrap_or(DEFAULT_GRID_SIZE);

    let even = || GridSnapshot::even(CANONICAL_WIDTH, CANONICAL_HEIGHT, grid_size);
    let grid_a = match loaded_a {
        Some(g) => g,
        None => even()?,
    };
    let grid_b = match loaded_b {
        Some(g) => g,
        None => even()?,
    };

    let params = MorphParams {
        grid_size,
        seconds: inputs.seconds,
        fps: inputs.fps,
        filter: inputs.filter.into(),
    };
    params.validate()?;
    Ok((params, grid_a, grid_b))
}

fn read_grid_json(path: &Path) -> anyhow::Result<GridSnapshot> {
    let f = File::open(path).with_context(|| format!("open grid '{}'", path.display()))?;
    let grid: GridSnapshot = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse grid JSON '{}'", path.display()))?;
    grid.validate()?;
    Ok(grid)
}

fn load_pair<P, F>(inputs: &MorphInputs, convert: F) -> anyhow::Result<(Raster<P>, Raster<P>)>
where
    P: MorphPixel,
    F: Fn(image::DynamicImage) -> Raster<P>,
{
    let a = image::open(&inputs.a).with_context(|| format!("decode '{}'", inputs.a.display()))?;
    let b = image::open(&inputs.b).with_context(|| format!("decode '{}'", inputs.b.display()))?;
    Ok((convert(a), convert(b)))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
