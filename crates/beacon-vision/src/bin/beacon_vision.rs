//! beacon-vision CLI: detect two-color beacons in an image and write a JSON report.

use std::path::PathBuf;
use std::process::ExitCode;

use beacon_vision::detect::{detect_file, DetectConfig};
use beacon_vision::ButtonStrategy;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "beacon-vision")]
#[command(about = "Detect red/blue beacons and their buttons in a camera frame")]
#[command(version)]
struct Cli {
    /// Path to the input image (overrides `image_path` of --config).
    image: Option<PathBuf>,

    /// JSON detection config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Button detection strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Frames are shrunk so their larger side is at most this many pixels.
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Minimum score a candidate needs to be reported.
    #[arg(long)]
    min_score: Option<u32>,

    /// Path to write the JSON report.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log verbosity.
    #[arg(long, value_enum, default_value_t = LogLevelArg::Warn)]
    log_level: LogLevelArg,

    /// Emit `tracing` spans as JSON instead of text.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_trace: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Ellipse,
    Hough,
}

impl From<StrategyArg> for ButtonStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Ellipse => ButtonStrategy::Ellipse,
            StrategyArg::Hough => ButtonStrategy::Hough,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Off => LevelFilter::Off,
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        beacon_vision::core::init_tracing(cli.log_level.into(), cli.json_trace);
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        beacon_vision::core::init_with_level(cli.log_level.into())?;
        Ok(())
    }
}

fn build_config(cli: &Cli) -> CliResult<DetectConfig> {
    let mut cfg = match &cli.config {
        Some(path) => DetectConfig::load_json(path)?,
        None => DetectConfig::default(),
    };
    if let Some(image) = &cli.image {
        cfg.image_path = image.to_string_lossy().into_owned();
    }
    if cfg.image_path.is_empty() {
        return Err("no input image: pass a path or set image_path in --config".into());
    }
    if let Some(strategy) = cli.strategy {
        cfg.strategy = Some(strategy.into());
    }
    if let Some(max_dimension) = cli.max_dimension {
        cfg.analyzer.max_dimension = max_dimension;
    }
    if let Some(min_score) = cli.min_score {
        cfg.analyzer.min_score = min_score;
    }
    if let Some(output) = &cli.output {
        cfg.output_path = Some(output.to_string_lossy().into_owned());
    }
    Ok(cfg)
}

fn run(cli: Cli) -> CliResult<()> {
    init_logging(&cli)?;
    let cfg = build_config(&cli)?;
    let report = detect_file(&cfg)?;

    for (i, b) in report.beacons.iter().enumerate() {
        println!(
            "#{i} {} score={} code={} center=({:.1}, {:.1}) size={:.1}x{:.1} angle={:.1}",
            b.colors, b.points, b.code, b.center[0], b.center[1], b.size[0], b.size[1], b.angle
        );
    }
    if report.beacons.is_empty() {
        println!("no beacons");
    }

    let out = cfg.output_path();
    report.write_json(&out)?;
    log::info!("wrote {}", out.display());
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
