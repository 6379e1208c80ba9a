//! Per-run scratch directory
//!
//! Every render owns one uniquely-named directory holding its frames,
//! manifest and encoder output. It is removed on every exit path: explicitly
//! with [`ScopedWorkDir::close`], or on drop when an error unwinds the run.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FluencyError, Result, VideoStage};

/// Scratch directory removed when the run ends
#[derive(Debug)]
pub struct ScopedWorkDir {
    path: PathBuf,
    closed: bool,
}

impl ScopedWorkDir {
    /// Create a fresh directory under `base`
    ///
    /// The name combines the invocation time with a random token, and
    /// creation fails rather than reusing an existing directory. The path
    /// is absolute even when `base` is relative, since concat manifests
    /// resolve relative entries against their own directory.
    pub fn create(base: &Path) -> Result<Self> {
        std::fs::create_dir_all(base).map_err(|e| {
            FluencyError::storage(
                VideoStage::Prepare,
                format!("cannot create {}: {e}", base.display()),
            )
        })?;
        let base = base.canonicalize().map_err(|e| {
            FluencyError::storage(
                VideoStage::Prepare,
                format!("cannot resolve {}: {e}", base.display()),
            )
        })?;

        let token = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "fluency_render_{}_{}",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%3f"),
            &token[..8]
        );
        let path = base.join(name);

        std::fs::create_dir(&path).map_err(|e| {
            FluencyError::storage(
                VideoStage::Prepare,
                format!("cannot create work dir {}: {e}", path.display()),
            )
        })?;

        debug!("Created work dir {}", path.display());
        Ok(Self {
            path,
            closed: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory and everything in it
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                debug!("Removed work dir {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FluencyError::storage(
                VideoStage::Cleanup,
                format!("cannot remove {}: {e}", self.path.display()),
            )),
        }
    }
}

impl Drop for ScopedWorkDir {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove work dir {}: {}", self.path.display(), e);
            }
        }
    }
}
