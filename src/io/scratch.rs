//! Scratch workspace for extracted archive entries.

use std::io;
use std::path::Path;

use tempfile::TempDir;

use crate::error::{Error, Result};

const SCRATCH_PREFIX: &str = "cbz_images";

/// A uniquely named, process-private working directory.
///
/// The directory and everything inside it is removed when the workspace is
/// dropped, so cleanup runs on success, on an early `?` return, and during
/// unwinding alike.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(|e| Error::filesystem(std::env::temp_dir(), e))?;
        tracing::debug!(path = %dir.path().display(), "created scratch workspace");
        Ok(Self { dir })
    }

    /// Create a workspace inside `parent` instead of the system temp directory.
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| Error::filesystem(parent, e))?;
        tracing::debug!(path = %dir.path().display(), "created scratch workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace now, reporting any failure.
    ///
    /// Dropping the workspace does the same but can only log errors.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e: io::Error| Error::filesystem(path, e))
    }
}

/// Run `body` with a fresh workspace, removing it afterwards on every path.
pub fn with_scratch_workspace<R>(body: impl FnOnce(&Path) -> Result<R>) -> Result<R> {
    let workspace = ScratchWorkspace::new()?;
    let result = body(workspace.path());
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove scratch workspace");
    }
    result
}
