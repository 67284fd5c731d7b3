use std::path::PathBuf;
use std::process;

use clap::Parser;

use framegrab_core::pipeline::extract_frames_use_case::{ExtractFramesUseCase, ProgressFn};
use framegrab_core::sampling::domain::sampling_request::SamplingRequest;
use framegrab_core::shared::constants::{DEFAULT_JPEG_QUALITY, DEFAULT_TARGET_FPS};
use framegrab_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use framegrab_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Save every Nth frame of a video as numbered JPEGs.
#[derive(Parser)]
#[command(name = "framegrab", version)]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Directory to write frame_NNNN.jpg files into (created if missing).
    output_dir: PathBuf,

    /// Frames to keep per second of source video.
    #[arg(long, default_value_t = DEFAULT_TARGET_FPS)]
    fps: f64,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let request = SamplingRequest::new(&cli.input, &cli.output_dir, cli.fps)?;

    let progress: ProgressFn = Box::new(|decoded, saved| {
        eprint!("\rDecoded {decoded} frames, saved {saved}");
    });
    let mut use_case = ExtractFramesUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(ImageFileWriter::new().with_jpeg_quality(cli.quality)),
        Some(progress),
    );

    let result = use_case.execute(&request);
    eprintln!();
    let result = result?;

    log::info!(
        "Saved {} frames to {}",
        result.frame_count,
        result.output_dir.display()
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !(1..=100).contains(&cli.quality) {
        return Err("--quality must be between 1 and 100".into());
    }
    Ok(())
}
