use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bbb-downloader")]
#[command(
    about = "Rebuild a BigBlueButton recording as a single video file",
    long_about = None,
    version
)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for the finished video and slides folder (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Playback link, e.g. https://HOST/playback/presentation/2.0/playback.html?meetingId=ID
    #[arg(value_name = "URL")]
    pub url: String,
}
