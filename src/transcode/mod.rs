//! Video assembly through an external transcoder.
//!
//! The pipeline only needs three operations: render a still image into a
//! fixed-length clip, join clips without re-encoding, and lay an audio track
//! over a video. [`Ffmpeg`] provides them by shelling out to `ffmpeg`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::TranscoderConfig;
use crate::error::{Error, Result};

pub mod command;

pub use command::{ToolCommand, ToolOutput};

const FFMPEG: &str = "ffmpeg";

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Fail early when the transcoder cannot be run at all.
    fn check_available(&self) -> Result<()>;

    /// Render `image` as a clip of exactly `seconds` seconds.
    async fn still_to_clip(&self, image: &Path, seconds: u64, output: &Path) -> Result<()>;

    /// Join the clips referenced by a concat list file without re-encoding.
    async fn concat(&self, list_file: &Path, output: &Path) -> Result<()>;

    /// Take the video stream of `video` and the audio stream of `audio`.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// [`Transcoder`] backed by the `ffmpeg` command line tool.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    configured_path: Option<PathBuf>,
    frame_rate: u32,
    video_codec: String,
    pixel_format: String,
    audio_codec: String,
    timeout: Duration,
}

impl Ffmpeg {
    pub fn from_config(config: &TranscoderConfig) -> Self {
        Self {
            configured_path: config.ffmpeg_path.as_ref().map(PathBuf::from),
            frame_rate: config.frame_rate,
            video_codec: config.video_codec.clone(),
            pixel_format: config.pixel_format.clone(),
            audio_codec: config.audio_codec.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Path to the binary, preferring a configured path over PATH lookup.
    pub fn program(&self) -> Result<PathBuf> {
        if let Some(path) = &self.configured_path {
            if path.exists() {
                return Ok(path.clone());
            }
            debug!(
                "Configured ffmpeg path {} does not exist, searching PATH",
                path.display()
            );
        }
        which::which(FFMPEG).map_err(|_| Error::tool_not_found(FFMPEG))
    }

    fn command(&self) -> Result<ToolCommand> {
        let mut cmd = ToolCommand::new(self.program()?);
        cmd.timeout(self.timeout)
            .args(["-nostdin", "-hide_banner", "-loglevel", "error", "-y"]);
        Ok(cmd)
    }

    /// Arguments after the common prefix for a still-image clip.
    fn still_args(&self, image: &Path, seconds: u64, output: &Path) -> Vec<String> {
        vec![
            "-loop".into(),
            "1".into(),
            "-f".into(),
            "image2".into(),
            "-r".into(),
            "1".into(),
            "-i".into(),
            image.to_string_lossy().into_owned(),
            "-c:v".into(),
            self.video_codec.clone(),
            "-vf".into(),
            format!("fps={}", self.frame_rate),
            "-t".into(),
            seconds.to_string(),
            "-pix_fmt".into(),
            self.pixel_format.clone(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn mux_args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".into(),
            video.to_string_lossy().into_owned(),
            "-i".into(),
            audio.to_string_lossy().into_owned(),
            "-c:v".into(),
            "copy".into(),
            "-c:a".into(),
            self.audio_codec.clone(),
            "-map".into(),
            "0:v:0".into(),
            "-map".into(),
            "1:a:0".into(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    fn check_available(&self) -> Result<()> {
        self.program().map(|_| ())
    }

    async fn still_to_clip(&self, image: &Path, seconds: u64, output: &Path) -> Result<()> {
        self.command()?
            .args(self.still_args(image, seconds, output))
            .execute()
            .await?;
        ensure_output(output)
    }

    async fn concat(&self, list_file: &Path, output: &Path) -> Result<()> {
        self.command()?
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(list_file)
            .args(["-c", "copy"])
            .arg(output)
            .execute()
            .await?;
        ensure_output(output)
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        self.command()?
            .args(self.mux_args(video, audio, output))
            .execute()
            .await?;
        ensure_output(output)
    }
}

/// A zero exit status is not enough; the file has to be there too.
fn ensure_output(output: &Path) -> Result<()> {
    if output.is_file() {
        Ok(())
    } else {
        Err(Error::tool_failed(
            FFMPEG,
            format!("did not produce {}", output.display()),
        ))
    }
}

/// Contents of an ffmpeg concat demuxer list for `clips`, in order.
pub fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            // Single quotes close, escape, and reopen the quoted string.
            let quoted = clip.to_string_lossy().replace('\'', r"'\''");
            format!("file '{quoted}'\n")
        })
        .collect()
}

/// Write the concat list for `clips` to `path`.
pub async fn write_concat_list(path: &Path, clips: &[PathBuf]) -> Result<()> {
    tokio::fs::write(path, concat_list(clips)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffmpeg() -> Ffmpeg {
        Ffmpeg::from_config(&TranscoderConfig::default())
    }

    #[test]
    fn test_still_args() {
        let args = ffmpeg().still_args(Path::new("/w/0.png"), 6, Path::new("/w/0.mp4"));
        assert_eq!(
            args.join(" "),
            "-loop 1 -f image2 -r 1 -i /w/0.png -c:v libx264 -vf fps=24 -t 6 -pix_fmt yuv420p /w/0.mp4"
        );
    }

    #[test]
    fn test_mux_args() {
        let args = ffmpeg().mux_args(
            Path::new("/w/merged.mp4"),
            Path::new("/w/webcams.webm"),
            Path::new("/w/out.mp4"),
        );
        assert_eq!(
            args.join(" "),
            "-i /w/merged.mp4 -i /w/webcams.webm -c:v copy -c:a aac -map 0:v:0 -map 1:a:0 /w/out.mp4"
        );
    }

    #[test]
    fn test_concat_list_keeps_order_and_quotes() {
        let clips = vec![
            PathBuf::from("/w/0.mp4"),
            PathBuf::from("/w/1.mp4"),
            PathBuf::from("/it's here/2.mp4"),
        ];
        assert_eq!(
            concat_list(&clips),
            "file '/w/0.mp4'\nfile '/w/1.mp4'\nfile '/it'\\''s here/2.mp4'\n"
        );
    }

    #[test]
    fn test_missing_configured_path_falls_back_to_path_lookup() {
        let config = TranscoderConfig {
            ffmpeg_path: Some("/nonexistent/ffmpeg-xyz".to_string()),
            ..TranscoderConfig::default()
        };
        let program = Ffmpeg::from_config(&config).program();
        match program {
            Ok(path) => assert_ne!(path, PathBuf::from("/nonexistent/ffmpeg-xyz")),
            Err(err) => assert!(matches!(err, Error::ToolNotFound { .. })),
        }
    }

    #[test]
    fn test_ensure_output_requires_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(matches!(
            ensure_output(&missing),
            Err(Error::ExternalToolFailure { .. })
        ));
        std::fs::write(&missing, b"x").unwrap();
        assert!(ensure_output(&missing).is_ok());
    }
}
