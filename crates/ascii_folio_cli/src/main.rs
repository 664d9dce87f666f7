use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ascii_folio::ascii::planet::RING_COLOR;
use ascii_folio::ascii::series::SeriesFrame;
use ascii_folio::render::{drive_for, REPAINT_INTERVAL};
use ascii_folio::{
    overlay, AppConfig, AsciiRenderer, DisplayTarget, FrameSeries, GridSource, Orientation,
    PlanetSource, PlanetStyle, RampPreset, RasterFrame, RenderLoop, RendererConfig, RepaintClock,
    Rgb, SceneKind,
};
use clap::{Parser, Subcommand, ValueEnum};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frame};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use walkdir::WalkDir;

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

#[derive(Parser, Debug)]
#[command(author, version, about = "Render images, scenes and animations as ASCII glyph grids")]
struct Cli {
    /// Renderer profile file; a missing file means built-in defaults
    #[arg(long, global = true, default_value = "ascii-folio.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render an image to stdout for a quick preview
    Preview(PreviewArgs),
    /// Render an image and write the result to disk
    Convert(ConvertArgs),
    /// Convert an animation (GIF or directory of frames) to ASCII frame files
    Animate(AnimateArgs),
    /// Play a live scene in the terminal
    Play(PlayArgs),
    /// Record a scene to ASCII frame files
    Record(RecordArgs),
    /// Print one frame of the text planet
    Planet(PlanetArgs),
    /// Apply the glyph overlay to an image and save it as a new image
    Overlay(OverlayArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path
    input: PathBuf,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input animation path (GIF file or directory of images)
    input: PathBuf,
    /// Output directory for frame files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Frames per second when the input lacks timing information
    #[arg(long, default_value_t = 12.0)]
    fps: f32,
    /// Play the converted frames once in the terminal afterwards
    #[arg(long, default_value_t = false)]
    play: bool,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[arg(value_enum)]
    scene: SceneChoice,
    /// Nominal canvas size in pixels
    #[arg(long)]
    size: Option<u32>,
    /// How long to play, in seconds
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    /// Seed for scenes with random layout
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Renderer profile supplying pacing and placeholders
    #[arg(long, default_value = "animation")]
    profile: String,
    /// Fixed tick interval, overriding the profile's pacing
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Plain text without colour escapes
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[arg(value_enum)]
    scene: SceneChoice,
    /// Output directory for frame files
    #[arg(short, long)]
    out_dir: PathBuf,
    #[arg(long, default_value_t = 60)]
    frames: usize,
    #[arg(long)]
    size: Option<u32>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Renderer profile whose pacing sets each frame's duration
    #[arg(long, default_value = "animation")]
    profile: String,
    /// Fixed frame duration, overriding the profile's pacing
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlanetArgs {
    /// Draw the ring around the planet
    #[arg(long, default_value_t = false)]
    ringed: bool,
    #[arg(long, default_value_t = 0)]
    rotation: u64,
    /// Emit 24-bit colour escapes
    #[arg(long, default_value_t = false)]
    ansi: bool,
}

#[derive(Parser, Debug)]
struct OverlayArgs {
    /// Input image path
    input: PathBuf,
    /// Output image path
    #[arg(short, long)]
    output: PathBuf,
    /// Glyph block size in pixels
    #[arg(long)]
    pixel_size: Option<u32>,
    /// Weight of the glyph shading (0.0 - 1.0)
    #[arg(long)]
    mix: Option<f32>,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    /// Renderer profile (built-in: avatar, icon, animation)
    #[arg(long, default_value = "animation")]
    profile: String,
    /// Pixel width the image is stretched to before sampling
    #[arg(long)]
    width: Option<u32>,
    /// Pixel height the image is stretched to before sampling
    #[arg(long)]
    height: Option<u32>,
    /// Pixels per glyph
    #[arg(long)]
    cell_size: Option<u32>,
    /// Pre-sampling shrink factor in (0, 1]
    #[arg(long)]
    downsample: Option<f32>,
    #[arg(long, value_enum)]
    ramp: Option<RampChoice>,
    #[arg(long, value_enum)]
    orientation: Option<OrientationChoice>,
    /// Colour for monochrome output (#RRGGBB)
    #[arg(long)]
    tint: Option<String>,
    /// Emit 24-bit colour escapes
    #[arg(long, default_value_t = false)]
    ansi: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RampChoice {
    Standard,
    Overlay,
    Blocks,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OrientationChoice {
    Normal,
    Inverted,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SceneChoice {
    Square,
    Waves,
    Tree,
    Planet,
    /// Text planet without canvas sampling
    Jupiter,
    /// Text planet with its ring
    Ringed,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let app = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {:?}", cli.config))?;

    match cli.command {
        Commands::Preview(args) => preview(&app, args),
        Commands::Convert(args) => convert(&app, args),
        Commands::Animate(args) => animate(&app, args),
        Commands::Play(args) => play(&app, args),
        Commands::Record(args) => record(&app, args),
        Commands::Planet(args) => planet(args),
        Commands::Overlay(args) => apply_overlay(&app, args),
    }
}

fn preview(app: &AppConfig, args: PreviewArgs) -> Result<()> {
    let config = args.settings.resolve(app)?;
    let output = AsciiRenderer
        .render_or_placeholder(&args.input, &config)
        .with_context(|| format!("failed to render {:?}", args.input))?;

    let body = if args.settings.ansi { output.to_ansi() } else { output.to_text() };
    println!("{body}");
    Ok(())
}

fn convert(app: &AppConfig, args: ConvertArgs) -> Result<()> {
    let config = args.settings.resolve(app)?;
    let output = AsciiRenderer
        .render_path(&args.input, &config)
        .with_context(|| format!("failed to render {:?}", args.input))?;

    let body = if args.settings.ansi { output.to_ansi() } else { output.to_text() };
    write_text(&args.output, &body)?;
    info!("wrote {}x{} grid to {:?}", output.grid.width, output.grid.height, args.output);
    Ok(())
}

fn animate(app: &AppConfig, args: AnimateArgs) -> Result<()> {
    let config = args.settings.resolve(app)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let fallback_delay = Duration::from_secs_f32(1.0 / args.fps.max(0.1));
    let frames = load_frames(&args.input)?;
    let progress = frame_progress(frames.len())?;
    let mut series = FrameSeries::new();

    for (index, frame) in frames.into_iter().enumerate() {
        let delay = Duration::from(frame.delay());
        let duration = if delay.is_zero() { fallback_delay } else { delay };

        let dynamic = DynamicImage::ImageRgba8(frame.into_buffer());
        let output = AsciiRenderer
            .render_image(&dynamic, &config)
            .with_context(|| format!("failed to render frame {}", index))?;

        let frame_path = args.out_dir.join(format!("frame_{:04}.txt", index));
        write_text(&frame_path, &output.to_text())?;
        if !series.push_frame(SeriesFrame { grid: output.grid, duration }) {
            warn!("frame {index} left out of playback");
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "Frames written to {:?} ({:.2}s total)",
        args.out_dir,
        series.total_duration().as_secs_f32()
    ));

    if args.play {
        play_series(&series, config.tint_rgb()?)?;
    }
    Ok(())
}

fn play(app: &AppConfig, args: PlayArgs) -> Result<()> {
    let config = profile(app, &args.profile)?;
    let (source, tint) = scene_source(args.scene, args.size, args.seed)?;
    let pacing = config.pacing_or(args.interval_ms);
    let duration = play_duration(args.seconds)?;

    let clock = RepaintClock::new();
    let target = DisplayTarget::new();
    let color = !args.no_color;
    target.on_publish(move |grid| {
        let body = if color { grid.to_ansi(Some(tint)) } else { grid.to_text() };
        let mut stdout = io::stdout().lock();
        // A closed stdout ends the show; the loop itself keeps running.
        let _ = writeln!(stdout, "{CLEAR_SCREEN}{body}");
        let _ = stdout.flush();
    });

    let handle = RenderLoop::start(&clock, &target, config.loop_settings(), source);
    // The terminal is always in view.
    handle.set_visible(true);
    let ticks = drive_for(&clock, pacing, duration);
    handle.stop();

    info!("played {ticks} ticks, final state {:?}", handle.state());
    Ok(())
}

/// Negative and NaN durations play nothing.
fn play_duration(seconds: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(seconds.max(0.0))
        .with_context(|| format!("invalid play duration {seconds} seconds"))
}

fn record(app: &AppConfig, args: RecordArgs) -> Result<()> {
    let interval = profile(app, &args.profile)?.pacing_or(args.interval_ms).interval();
    let (mut source, _) = scene_source(args.scene, args.size, args.seed)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let series = FrameSeries::record(&mut *source, args.frames, interval)
        .context("failed to record scene")?;

    let progress = frame_progress(series.len())?;
    for (index, frame) in series.frames().enumerate() {
        let frame_path = args.out_dir.join(format!("frame_{:04}.txt", index));
        write_text(&frame_path, &frame.grid.to_text())?;
        progress.inc(1);
    }
    progress.finish_with_message(format!("Frames written to {:?}", args.out_dir));
    Ok(())
}

fn planet(args: PlanetArgs) -> Result<()> {
    let style = if args.ringed { PlanetStyle::Ringed } else { PlanetStyle::Plain };
    let grid = PlanetSource::new(style).frame(args.rotation);
    let body = if args.ansi { grid.to_ansi(None) } else { grid.to_text() };
    println!("{body}");
    Ok(())
}

fn apply_overlay(app: &AppConfig, args: OverlayArgs) -> Result<()> {
    let mut config = app.overlay;
    config.enabled = true;
    if let Some(pixel_size) = args.pixel_size {
        config.pixel_size = pixel_size;
    }
    if let Some(mix) = args.mix {
        config.mix = mix;
    }

    let image =
        image::open(&args.input).with_context(|| format!("failed to open image {:?}", args.input))?;
    let composited = overlay::composite(&RasterFrame::from(image), &config);
    composited
        .into_image()
        .save(&args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    Ok(())
}

fn profile(app: &AppConfig, name: &str) -> Result<RendererConfig> {
    app.renderer(name).with_context(|| {
        format!("unknown renderer profile {name:?}, known: {}", app.profile_names().join(", "))
    })
}

fn scene_source(
    choice: SceneChoice,
    size: Option<u32>,
    seed: u64,
) -> Result<(Box<dyn GridSource>, Rgb)> {
    let kind = match choice {
        SceneChoice::Square => SceneKind::Square,
        SceneChoice::Waves => SceneKind::Waves,
        SceneChoice::Tree => SceneKind::Tree,
        SceneChoice::Planet => SceneKind::Planet,
        SceneChoice::Jupiter => return Ok((planet_source(PlanetStyle::Plain), RING_COLOR)),
        SceneChoice::Ringed => return Ok((planet_source(PlanetStyle::Ringed), RING_COLOR)),
    };

    let spec = kind.spec(size);
    let source = kind
        .source(&spec, seed)
        .with_context(|| format!("failed to set up the {} scene", kind.name()))?;
    Ok((source, spec.tint))
}

fn planet_source(style: PlanetStyle) -> Box<dyn GridSource> {
    Box::new(PlanetSource::new(style))
}

fn play_series(series: &FrameSeries, tint: Option<Rgb>) -> Result<()> {
    let total = series.total_duration();
    let start = Instant::now();
    let mut shown = None;
    let mut stdout = io::stdout().lock();

    while start.elapsed() < total {
        let index = series.frame_index_at(start.elapsed());
        if index != shown {
            if let Some(grid) = index.and_then(|index| series.frame(index)) {
                writeln!(stdout, "{CLEAR_SCREEN}{}", grid.to_ansi(tint))?;
                stdout.flush()?;
            }
            shown = index;
        }
        thread::sleep(REPAINT_INTERVAL);
    }
    Ok(())
}

fn frame_progress(len: usize) -> Result<ProgressBar> {
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );
    Ok(progress)
}

fn write_text(path: &Path, body: &str) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    writeln!(file, "{}", body).with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

fn load_frames(path: &Path) -> Result<Vec<Frame>> {
    if path.is_dir() {
        load_frames_from_directory(path)
    } else {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "gif" {
            load_frames_from_gif(path)
        } else {
            let image =
                image::open(path).with_context(|| format!("failed to open image {:?}", path))?;
            Ok(vec![Frame::new(image.into_rgba8())])
        }
    }
}

fn load_frames_from_gif(path: &Path) -> Result<Vec<Frame>> {
    let file = File::open(path).with_context(|| format!("failed to open GIF {:?}", path))?;
    let decoder =
        GifDecoder::new(file).with_context(|| format!("failed to decode GIF {:?}", path))?;
    decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("failed to collect frames from {:?}", path))
}

fn load_frames_from_directory(path: &Path) -> Result<Vec<Frame>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    entries.sort();
    if entries.is_empty() {
        anyhow::bail!("no image files found in {:?}", path);
    }

    entries
        .iter()
        .map(|entry| {
            let image =
                image::open(entry).with_context(|| format!("failed to open image {:?}", entry))?;
            Ok(Frame::new(image.into_rgba8()))
        })
        .collect()
}

impl RenderSettings {
    fn resolve(&self, app: &AppConfig) -> Result<RendererConfig> {
        let mut config = profile(app, &self.profile)?;

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }
        if let Some(downsample) = self.downsample {
            config.downsample = downsample;
        }
        if let Some(ramp) = self.ramp {
            config.ramp = ramp.into();
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation.into();
        }
        if let Some(tint) = &self.tint {
            config.tint = Some(tint.clone());
        }
        Ok(config)
    }
}

impl From<RampChoice> for RampPreset {
    fn from(choice: RampChoice) -> Self {
        match choice {
            RampChoice::Standard => RampPreset::Standard,
            RampChoice::Overlay => RampPreset::Overlay,
            RampChoice::Blocks => RampPreset::Blocks,
        }
    }
}

impl From<OrientationChoice> for Orientation {
    fn from(choice: OrientationChoice) -> Self {
        match choice {
            OrientationChoice::Normal => Orientation::Normal,
            OrientationChoice::Inverted => Orientation::Inverted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_duration_rejects_unbounded_values() {
        assert_eq!(play_duration(1.5).unwrap(), Duration::from_millis(1500));
        assert_eq!(play_duration(-3.0).unwrap(), Duration::ZERO);
        assert_eq!(play_duration(f32::NAN).unwrap(), Duration::ZERO);
        assert!(play_duration(f32::INFINITY).is_err());
    }

    #[test]
    fn unknown_profile_lists_known_names() {
        let err = profile(&AppConfig::default(), "banner").unwrap_err();
        assert!(err.to_string().contains("avatar, icon, animation"));
    }
}
