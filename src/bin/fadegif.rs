use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fadegif", version, about = "Cross-fade still images into an animated GIF")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an animated GIF from images, in the order given.
    Generate(GenerateArgs),
    /// Print frame count, durations and loop count of a GIF.
    Info(InfoArgs),
    /// Print the default job configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Job configuration JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transition frames between consecutive images.
    #[arg(long)]
    fade_steps: Option<u32>,

    /// Display time of each source image, in milliseconds.
    #[arg(long)]
    hold_ms: Option<u32>,

    /// Display time of each transition frame, in milliseconds.
    #[arg(long)]
    fade_ms: Option<u32>,

    /// Number of loops; 0 loops forever.
    #[arg(long)]
    loop_count: Option<u16>,

    /// Fixed output size, as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size, conflicts_with = "fit_to_largest")]
    size: Option<(u32, u32)>,

    /// Size the output to the largest input.
    #[arg(long)]
    fit_to_largest: bool,

    /// Keep the largest input size and build a palette per frame.
    #[arg(long)]
    preserve_quality: bool,

    /// Output quality, 0-100; below 90 the file is optimized for size.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: Option<u8>,

    /// Resampling filter.
    #[arg(long, value_enum)]
    resample: Option<ResampleChoice>,

    /// Crop every input to LEFT,TOP,RIGHT,BOTTOM.
    #[arg(long, value_parser = parse_crop)]
    crop: Option<fadegif::CropRect>,

    /// Unsharp-mask strength; 0 disables.
    #[arg(long)]
    sharpen: Option<f32>,

    /// Dithering for per-frame palettes.
    #[arg(long, value_enum)]
    dither: Option<DitherChoice>,

    /// Palette algorithm for per-frame palettes.
    #[arg(long, value_enum)]
    quantize: Option<QuantizeChoice>,

    /// Drop unreadable inputs instead of failing.
    #[arg(long)]
    skip_missing: bool,

    /// Worker threads for parallel stages.
    #[arg(long)]
    threads: Option<usize>,

    /// Input images.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// GIF file to inspect.
    path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResampleChoice {
    Lanczos,
    Bicubic,
    Bilinear,
    Nearest,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DitherChoice {
    FloydSteinberg,
    Ordered,
    None,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuantizeChoice {
    MedianCut,
    MaxCoverage,
    FastOctree,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Info(args) => cmd_info(args),
        Command::Config => cmd_config(),
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    Ok((w, h))
}

fn parse_crop(s: &str) -> Result<fadegif::CropRect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let [left, top, right, bottom] = parts.as_slice() else {
        return Err(format!("expected LEFT,TOP,RIGHT,BOTTOM, got '{s}'"));
    };
    Ok(fadegif::CropRect::from_edges(*left, *top, *right, *bottom))
}

fn build_config(args: &GenerateArgs) -> anyhow::Result<fadegif::PipelineConfig> {
    let mut cfg = match &args.config {
        Some(path) => fadegif::PipelineConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => fadegif::PipelineConfig::default(),
    };

    if let Some(v) = args.fade_steps {
        cfg.fade_steps = v;
    }
    if let Some(v) = args.hold_ms {
        cfg.hold_duration_ms = v;
    }
    if let Some(v) = args.fade_ms {
        cfg.fade_duration_ms = v;
    }
    if let Some(v) = args.loop_count {
        cfg.loop_count = v;
    }
    if let Some((width, height)) = args.size {
        cfg.target_canvas = fadegif::TargetCanvas::Fixed { width, height };
    }
    if args.fit_to_largest {
        cfg.target_canvas = fadegif::TargetCanvas::FitToLargest;
    }
    if args.preserve_quality {
        cfg.preserve_quality = true;
    }
    if let Some(v) = args.quality {
        cfg.quality = v;
    }
    if let Some(v) = args.resample {
        cfg.resample_filter = match v {
            ResampleChoice::Lanczos => fadegif::ResampleFilter::Lanczos,
            ResampleChoice::Bicubic => fadegif::ResampleFilter::Bicubic,
            ResampleChoice::Bilinear => fadegif::ResampleFilter::Bilinear,
            ResampleChoice::Nearest => fadegif::ResampleFilter::Nearest,
        };
    }
    if let Some(v) = args.crop {
        cfg.crop = Some(v);
    }
    if let Some(v) = args.sharpen {
        cfg.sharpen_strength = v;
    }
    if let Some(v) = args.dither {
        cfg.dither = match v {
            DitherChoice::FloydSteinberg => fadegif::DitherMethod::FloydSteinberg,
            DitherChoice::Ordered => fadegif::DitherMethod::Ordered,
            DitherChoice::None => fadegif::DitherMethod::None,
        };
    }
    if let Some(v) = args.quantize {
        cfg.quantize = match v {
            QuantizeChoice::MedianCut => fadegif::QuantizeMethod::MedianCut,
            QuantizeChoice::MaxCoverage => fadegif::QuantizeMethod::MaxCoverage,
            QuantizeChoice::FastOctree => fadegif::QuantizeMethod::FastOctree,
        };
    }
    if args.skip_missing {
        cfg.missing_input = fadegif::MissingInputPolicy::Skip;
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let worker = fadegif::JobWorker::new();
    let mut handle = worker.start(fadegif::JobRequest {
        inputs: args.images,
        output: args.out,
        config,
    })?;

    let result = handle.wait_with(|p| {
        eprint!("\rprogress {p:>3}%");
        let _ = std::io::stderr().flush();
    });
    eprintln!();

    match result {
        fadegif::JobResult::Success(path) => {
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        fadegif::JobResult::Failure { kind, message } => {
            anyhow::bail!("generation failed ({kind:?}): {message}")
        }
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let info = fadegif::inspect_gif(&args.path)
        .with_context(|| format!("inspect '{}'", args.path.display()))?;
    println!("size: {}x{}", info.width, info.height);
    println!("frames: {}", info.frame_count);
    let durations: Vec<String> = info.durations_ms.iter().map(u32::to_string).collect();
    println!("durations_ms: {}", durations.join(","));
    println!("total_ms: {}", info.total_duration_ms());
    match info.loop_count {
        Some(0) => println!("loop: forever"),
        Some(n) => println!("loop: {n}"),
        None => println!("loop: none"),
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&fadegif::PipelineConfig::default())
        .context("serialize default config")?;
    println!("{json}");
    Ok(())
}
