use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;

use backdrop::effects::composite::unpremultiply;
use backdrop::{
    BackdropConfig, BackgroundView, CpuCanvas, CpuCanvasOpts, RedrawFlag, ThumbnailCompositor,
};

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the blurred, letterboxed thumbnail of one image as PNG.
    Thumbnail(ThumbnailArgs),
    /// Render a tiled, cross-fading background sequence as numbered PNG frames.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ThumbnailArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source images, shown in order.
    #[arg(long = "in", required = true, num_args = 1..)]
    in_paths: Vec<PathBuf>,

    /// Directory receiving `frame_NNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 64)]
    height: u32,

    /// Scroll offset of the first frame.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    scroll: i32,

    /// Scroll change per frame.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    scroll_step: i32,

    #[arg(long, default_value_t = 30)]
    frames: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Frames between two consecutive images.
    #[arg(long, default_value_t = 15)]
    every: u32,

    /// Optional JSON config.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Thumbnail(args) => cmd_thumbnail(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BackdropConfig> {
    Ok(match path {
        Some(path) => BackdropConfig::from_json_path(path)?,
        None => BackdropConfig::default(),
    })
}

fn load_image(path: &Path) -> anyhow::Result<image::RgbaImage> {
    Ok(image::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .to_rgba8())
}

fn write_png(path: &Path, width: u32, height: u32, premul: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let straight: Vec<u8> = premul
        .chunks_exact(4)
        .flat_map(|px| unpremultiply([px[0], px[1], px[2], px[3]]))
        .collect();
    image::save_buffer_with_format(
        path,
        &straight,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_thumbnail(args: ThumbnailArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = load_image(&args.in_path)?;
    let thumb = ThumbnailCompositor::new(config.thumbnail).build(&source)?;
    write_png(&args.out, thumb.width(), thumb.height(), thumb.as_raw())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.fps > 0, "--fps must be > 0");
    anyhow::ensure!(args.every > 0, "--every must be > 0");

    let config = load_config(args.config.as_deref())?;
    let images = args
        .in_paths
        .iter()
        .map(|p| load_image(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut canvas = CpuCanvas::new(CpuCanvasOpts {
        width: args.width,
        height: args.height,
        clear_rgba: [0, 0, 0, 255],
    })?;
    let mut view = BackgroundView::new(config, RedrawFlag::new())?;
    view.set_viewport(args.width, args.height);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut next_image = images.iter();
    let mut redraws = 0u32;
    for frame in 0..args.frames {
        if frame % args.every == 0
            && let Some(img) = next_image.next()
        {
            view.set_image(img)?;
        }
        let scroll = i64::from(args.scroll) + i64::from(frame) * i64::from(args.scroll_step);
        view.set_scroll_position(scroll.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);

        canvas.set_time_ms(u64::from(frame) * 1000 / u64::from(args.fps));
        canvas.clear();
        let tiles = view.render(&mut canvas)?;
        if view.scheduler_mut().take() {
            redraws += 1;
        }

        let out = args.out_dir.join(format!("frame_{frame:04}.png"));
        let f = canvas.frame();
        write_png(&out, f.width, f.height, &f.data)?;
        info!(frame, tiles, state = ?view.state(), "rendered frame");
    }

    view.release(&mut canvas).map_err(|(_, err)| err)?;
    eprintln!(
        "wrote {} frames to {} ({redraws} requested redraws)",
        args.frames,
        args.out_dir.display()
    );
    Ok(())
}
