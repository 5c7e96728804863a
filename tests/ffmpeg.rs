//! Runs the real ffmpeg transcoder end to end on generated inputs.
//!
//! ## Prerequisites
//! - FFmpeg with the `libx264` encoder must be on PATH; otherwise the test is skipped.

use bbb_downloader::config::TranscoderConfig;
use bbb_downloader::transcode::{write_concat_list, Ffmpeg, Transcoder};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-encoders")
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).contains("libx264"))
        .unwrap_or(false)
}

fn lavfi(source: &str, extra: &[&str], output: &Path) {
    let status = Command::new("ffmpeg")
        .args(["-nostdin", "-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i", source])
        .args(extra)
        .arg(output)
        .status()
        .unwrap();
    assert!(status.success(), "failed to generate {}", output.display());
}

#[tokio::test]
async fn test_slides_become_a_video_with_audio() {
    if !ffmpeg_available() {
        eprintln!("Skipping: FFmpeg with libx264 not installed");
        return;
    }

    let root = TempDir::new().unwrap();
    // Quotes and spaces exercise the concat list escaping.
    let dir = root.path().join("it's a meeting");
    std::fs::create_dir(&dir).unwrap();

    let red = dir.join("0.png");
    let blue = dir.join("1.png");
    let audio = dir.join("webcams.wav");
    lavfi("color=c=red:s=320x240", &["-frames:v", "1"], &red);
    lavfi("color=c=blue:s=320x240", &["-frames:v", "1"], &blue);
    lavfi("sine=frequency=440:duration=3", &[], &audio);

    let ffmpeg = Ffmpeg::from_config(&TranscoderConfig {
        timeout_seconds: 120,
        ..TranscoderConfig::default()
    });
    ffmpeg.check_available().unwrap();

    let clips = vec![dir.join("0.mp4"), dir.join("1.mp4")];
    ffmpeg.still_to_clip(&red, 1, &clips[0]).await.unwrap();
    ffmpeg.still_to_clip(&blue, 2, &clips[1]).await.unwrap();

    let list = dir.join("videos.txt");
    write_concat_list(&list, &clips).await.unwrap();
    let merged = dir.join("merged.mp4");
    ffmpeg.concat(&list, &merged).await.unwrap();

    let output = dir.join("Weekly_Sync.mp4");
    ffmpeg.mux(&merged, &audio, &output).await.unwrap();

    for path in clips.iter().chain([&merged, &output]) {
        let size = std::fs::metadata(path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
}

#[tokio::test]
async fn test_missing_image_is_a_tool_failure() {
    if !ffmpeg_available() {
        eprintln!("Skipping: FFmpeg with libx264 not installed");
        return;
    }

    let root = TempDir::new().unwrap();
    let ffmpeg = Ffmpeg::from_config(&TranscoderConfig::default());

    let err = ffmpeg
        .still_to_clip(&root.path().join("absent.png"), 1, &root.path().join("0.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        bbb_downloader::Error::ExternalToolFailure { .. }
    ));
}
