//! End-to-end conversion of a recording into `{name}.mp4` plus a slides folder.
//!
//! Strictly sequential: every step is awaited before the next one starts and
//! every transcoder call is checked before its output is used.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{parse_manifest, Locator, SessionMetadata};
use crate::source::PresentationSource;
use crate::timing::{self, SlideSegment};
use crate::transcode::{write_concat_list, Transcoder};

pub mod workspace;

pub use workspace::Workspace;

const METADATA_DOCUMENT: &str = "metadata.xml";
const MANIFEST_DOCUMENT: &str = "shapes.svg";

/// Knobs for a run, usually taken from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Where the final video and slides folder are placed.
    pub output_dir: PathBuf,
    /// Recording files to try, relative to the presentation root.
    pub recording_assets: Vec<String>,
    pub keep_failed_workdir: bool,
    pub show_progress: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &Config, output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            recording_assets: config.network.recording_assets.clone(),
            keep_failed_workdir: config.behavior.keep_failed_workdir,
            show_progress: config.behavior.show_progress,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub display_name: String,
    pub video_path: PathBuf,
    pub slides_dir: PathBuf,
    pub slide_count: usize,
    /// Length of the slide video in seconds.
    pub video_secs: u64,
}

pub struct Pipeline<S, T> {
    source: S,
    transcoder: T,
    options: PipelineOptions,
}

impl<S: PresentationSource, T: Transcoder> Pipeline<S, T> {
    pub fn new(source: S, transcoder: T, options: PipelineOptions) -> Self {
        Self {
            source,
            transcoder,
            options,
        }
    }

    /// Convert the recording behind a playback URL.
    ///
    /// The URL is validated before anything is fetched. On failure the
    /// working directory is removed (see [`Workspace`]).
    pub async fn run(&self, playback_url: &str) -> Result<ConversionReport> {
        let locator = Locator::parse(playback_url)?;
        info!("Meeting ID: {}", locator.meeting_id());

        if self.options.recording_assets.is_empty() {
            return Err(Error::InvalidConfig(
                "no recording assets configured".to_string(),
            ));
        }

        self.transcoder.check_available()?;

        let metadata = self.fetch_metadata(&locator).await?;
        let segments = self.fetch_segments(&locator, &metadata).await?;

        let output_dir = absolute(&self.options.output_dir)?;
        let video_dest = output_dir.join(format!("{}.mp4", metadata.display_name));
        let slides_dest = output_dir.join(format!("{}_slides", metadata.display_name));
        // A finished run leaves its working directory behind as the slides folder.
        if slides_dest.exists() {
            return Err(Error::DirectoryExists { path: slides_dest });
        }
        if video_dest.exists() {
            return Err(Error::DestinationExists { path: video_dest });
        }

        let mut workspace = Workspace::create(
            &output_dir,
            locator.meeting_id(),
            self.options.keep_failed_workdir,
        )
        .await?;

        self.download_slides(&locator, &workspace, &segments).await?;
        let clips = self.render_clips(&workspace, &segments).await?;

        info!("Writing concat list for {} clips", clips.len());
        let list_file = workspace.list_file();
        write_concat_list(&list_file, &clips).await?;

        let recording = self.download_recording(&locator, &workspace).await?;

        info!("Merging clips");
        let merged = workspace.merged_file();
        self.transcoder.concat(&list_file, &merged).await?;

        info!("Adding audio to merged video");
        let output = workspace.output_file(&metadata.display_name);
        self.transcoder.mux(&merged, &recording, &output).await?;
        workspace.hold_output(&output);

        info!("Removing intermediate files");
        workspace
            .remove_intermediates(clips.len(), &recording)
            .await?;
        workspace.finalize(&output, &video_dest, &slides_dest).await?;

        Ok(ConversionReport {
            display_name: metadata.display_name,
            video_path: video_dest,
            slides_dir: slides_dest,
            slide_count: segments.len(),
            video_secs: timing::total_duration_secs(&segments),
        })
    }

    async fn fetch_metadata(&self, locator: &Locator) -> Result<SessionMetadata> {
        info!("Downloading metadata");
        let xml = self
            .source
            .fetch_document(locator, METADATA_DOCUMENT)
            .await?;
        let metadata = SessionMetadata::parse(&xml, locator.meeting_id())?;
        info!(
            "Meeting: {}, duration: {:.2} min",
            metadata.display_name,
            metadata.duration_minutes()
        );
        Ok(metadata)
    }

    async fn fetch_segments(
        &self,
        locator: &Locator,
        metadata: &SessionMetadata,
    ) -> Result<Vec<SlideSegment>> {
        info!("Downloading slides info");
        let xml = self
            .source
            .fetch_document(locator, MANIFEST_DOCUMENT)
            .await?;
        let entries = parse_manifest(&xml)?;
        let segments = timing::build_segments(&entries)?;
        debug!("Setting the last slide's end to the recording duration");
        timing::correct_segments(segments, metadata.duration_ms)
    }

    async fn download_slides(
        &self,
        locator: &Locator,
        workspace: &Workspace,
        segments: &[SlideSegment],
    ) -> Result<()> {
        info!("Downloading {} slide images", segments.len());
        let pb = self.progress_bar(segments.len() as u64, "Downloading slides");
        for (index, segment) in segments.iter().enumerate() {
            self.source
                .download(locator, segment.source(), &workspace.slide_image(index))
                .await?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(())
    }

    async fn render_clips(
        &self,
        workspace: &Workspace,
        segments: &[SlideSegment],
    ) -> Result<Vec<PathBuf>> {
        info!("Creating video clips from slides");
        let pb = self.progress_bar(segments.len() as u64, "Encoding clips");
        let mut clips = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let clip = workspace.clip(index);
            debug!(
                "Slide {} shown {}s..{}s",
                index,
                segment.time_in(),
                segment.time_out()
            );
            self.transcoder
                .still_to_clip(&workspace.slide_image(index), segment.duration_secs(), &clip)
                .await?;
            clips.push(clip);
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(clips)
    }

    /// Try each configured recording path in turn; only a 404 moves on.
    async fn download_recording(&self, locator: &Locator, workspace: &Workspace) -> Result<PathBuf> {
        let mut last_error = None;
        for asset in &self.options.recording_assets {
            info!("Downloading recording {}", asset);
            let destination = workspace.recording_file(asset);
            match self.source.download(locator, asset, &destination).await {
                Ok(bytes) => {
                    debug!("Recording is {} bytes", bytes);
                    return Ok(destination);
                }
                Err(err) if err.is_not_found() => {
                    warn!("Recording {} not found on server", asset);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            Error::InvalidConfig("no recording assets configured".to_string())
        }))
    }

    fn progress_bar(&self, len: u64, message: &'static str) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("━╸━"));
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
