//! Working directory for a single conversion run.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

const LIST_FILE: &str = "videos.txt";
const MERGED_FILE: &str = "merged.mp4";
const RECORDING_STEM: &str = "webcams";

/// Directory named after the meeting that holds every file of a run.
///
/// The directory must not exist beforehand. Until [`Workspace::finalize`]
/// succeeds, dropping the workspace removes the directory and everything in
/// it, so a failed or interrupted run leaves nothing behind unless
/// `keep_on_failure` is set. Once [`Workspace::hold_output`] has recorded the
/// finished video, the directory is always kept.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    keep_on_failure: bool,
    finished: bool,
    held_output: Option<PathBuf>,
}

impl Workspace {
    /// Create `{parent}/{name}` as a fresh, empty directory.
    pub async fn create(parent: &Path, name: &str, keep_on_failure: bool) -> Result<Self> {
        let dir = parent.join(name);
        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::DirectoryExists { path: dir });
            }
            Err(e) => return Err(e.into()),
        }
        info!("Created working directory {}", dir.display());
        Ok(Self {
            dir,
            keep_on_failure,
            finished: false,
            held_output: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slide_image(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.png"))
    }

    pub fn clip(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.mp4"))
    }

    pub fn list_file(&self) -> PathBuf {
        self.dir.join(LIST_FILE)
    }

    pub fn merged_file(&self) -> PathBuf {
        self.dir.join(MERGED_FILE)
    }

    /// Local name for the downloaded recording, keeping the remote extension.
    pub fn recording_file(&self, remote_path: &str) -> PathBuf {
        match Path::new(remote_path).extension() {
            Some(ext) => self
                .dir
                .join(format!("{RECORDING_STEM}.{}", ext.to_string_lossy())),
            None => self.dir.join(RECORDING_STEM),
        }
    }

    pub fn output_file(&self, display_name: &str) -> PathBuf {
        self.dir.join(format!("{display_name}.mp4"))
    }

    /// Record the finished video. From here on an unfinished run keeps the
    /// directory instead of deleting the encoded output.
    pub fn hold_output(&mut self, output: &Path) {
        self.held_output = Some(output.to_path_buf());
    }

    /// Delete the clips, list file, recording and merged video.
    pub async fn remove_intermediates(&self, clip_count: usize, recording: &Path) -> Result<()> {
        let mut paths: Vec<PathBuf> = (0..clip_count).map(|i| self.clip(i)).collect();
        paths.push(self.list_file());
        paths.push(recording.to_path_buf());
        paths.push(self.merged_file());

        for path in paths {
            debug!("Removing {}", path.display());
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    /// Move the finished video and the directory (now only slide images) to
    /// their final names. The workspace is no longer removed on drop.
    pub async fn finalize(
        mut self,
        output: &Path,
        video_dest: &Path,
        slides_dest: &Path,
    ) -> Result<()> {
        tokio::fs::rename(output, video_dest).await?;
        tokio::fs::rename(&self.dir, slides_dest).await?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Some(output) = self.held_output.as_ref().filter(|p| p.exists()) {
            warn!(
                "Run did not finish, finished video kept at {}",
                output.display()
            );
            return;
        }
        if self.keep_on_failure {
            warn!(
                "Run did not finish, leaving working directory {} for inspection",
                self.dir.display()
            );
            return;
        }
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!("Removed unfinished working directory {}", self.dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove working directory {}: {}",
                self.dir.display(),
                e
            ),
        }
    }
}
