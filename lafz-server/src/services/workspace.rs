//! Per-request scratch directory
//!
//! Holds the upload, the transcoded audio, the transcript and the aligner
//! output for one request. The directory is removed when the workspace is
//! dropped, so every exit path of a request (success, error, client
//! disconnect) releases it.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

const UPLOAD_FILE: &str = "uploaded";
const AUDIO_FILE: &str = "audio.wav";
const TRANSCRIPT_FILE: &str = "words.txt";

#[derive(Debug)]
pub struct RequestWorkspace {
    request_id: Uuid,
    dir: PathBuf,
}

impl RequestWorkspace {
    /// Create `<base>/<request_id>/`
    pub async fn create(base: &Path, request_id: Uuid) -> std::io::Result<Self> {
        let dir = base.join(request_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Created request workspace");
        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Uploaded audio, as received
    pub fn upload_path(&self) -> PathBuf {
        self.dir.join(UPLOAD_FILE)
    }

    /// Transcoded mono audio handed to the aligner
    pub fn audio_path(&self) -> PathBuf {
        self.dir.join(AUDIO_FILE)
    }

    /// One word per line
    pub fn transcript_path(&self) -> PathBuf {
        self.dir.join(TRANSCRIPT_FILE)
    }
}

impl Drop for RequestWorkspace {
    // Blocking removal on the current worker: the directory holds four files,
    // and the one large entry (the upload) is a single unlink.
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = %self.dir.display(), "Removed request workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "Failed to remove request workspace"),
        }
    }
}
