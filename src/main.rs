use anyhow::Result;
use bbb_downloader::{
    cli::{handle_download_command, until_interrupted, Cli},
    config::Config,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::load()?;

    info!("BBB downloader {}", env!("CARGO_PKG_VERSION"));

    match until_interrupted(
        handle_download_command(&cli, &config),
        tokio::signal::ctrl_c(),
    )
    .await
    {
        Some(report) => {
            let report = report?;
            println!();
            println!("Video path: {}", report.video_path.display());
            println!("Slides folder path: {}", report.slides_dir.display());
        }
        None => info!("Interrupted"),
    }

    Ok(())
}
