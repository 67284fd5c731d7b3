use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use framegrab_core::sampling::infrastructure::ffmpeg_frame_sampler::FfmpegFrameSampler;
use framegrab_server::config::{
    DEFAULT_FRAMES_DIR, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT, DEFAULT_UPLOAD_DIR,
};
use framegrab_server::{build_router, AppState, ServerConfig};

#[derive(Parser)]
#[command(
    name = "framegrab-server",
    about = "Serve frame extraction over HTTP",
    version
)]
struct Cli {
    /// Directory uploads are staged in
    #[arg(long, env = "UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    upload_dir: PathBuf,

    /// Directory sampled frames are written to
    #[arg(long, env = "FRAMES_DIR", default_value = DEFAULT_FRAMES_DIR)]
    frames_dir: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Largest accepted request body, in megabytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_mb: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[tokio::main]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::new(cli.upload_dir, cli.frames_dir)
        .with_max_upload_mb(cli.max_upload_mb);
    let addr = SocketAddr::new(cli.host, cli.port);

    log::info!(
        "Uploads in {}, frames in {}",
        config.upload_dir.display(),
        config.frames_dir.display()
    );

    let state = AppState::new(config, Arc::new(FfmpegFrameSampler::new()));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
