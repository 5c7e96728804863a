use crate::config::Config;
use crate::pipeline::{ConversionReport, Pipeline, PipelineOptions};
use crate::source::HttpSource;
use crate::transcode::Ffmpeg;
use anyhow::{Context, Result};
use std::future::Future;
use tracing::info;

pub mod args;

pub use args::Cli;

/// Run a full conversion for the URL given on the command line.
pub async fn handle_download_command(cli: &Cli, config: &Config) -> Result<ConversionReport> {
    let output_dir = match &cli.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let source =
        HttpSource::new(&config.network).context("Failed to create HTTP client")?;
    let transcoder = Ffmpeg::from_config(&config.transcoder);
    let pipeline = Pipeline::new(
        source,
        transcoder,
        PipelineOptions::from_config(config, output_dir),
    );

    let report = pipeline
        .run(&cli.url)
        .await
        .with_context(|| format!("Failed to convert {}", cli.url))?;

    info!(
        "Converted {} slides into {}s of video",
        report.slide_count, report.video_secs
    );
    Ok(report)
}

/// Run `work` until it completes or `interrupt` fires, whichever is first.
///
/// Returns `None` on interrupt. The interrupt is polled first, so when both
/// are ready at once (ffmpeg dying from the same Ctrl-C) the run counts as
/// interrupted. Dropping `work` kills any running ffmpeg and removes the
/// unfinished working directory.
pub async fn until_interrupted<W, I>(work: W, interrupt: I) -> Option<W::Output>
where
    W: Future,
    I: Future,
{
    tokio::select! {
        biased;
        _ = interrupt => None,
        output = work => Some(output),
    }
}
