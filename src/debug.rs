//! Optional side channel for intermediate canvases

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::canvas::BinaryCanvas;
use crate::grading::SheetRole;

/// Destination for normalized canvases, written while grading
///
/// Persisting is best effort: implementations log failures and never affect
/// the grading result.
pub trait DebugSink: Send + Sync {
    /// Returns the sink identifier (e.g., "directory")
    fn name(&self) -> &'static str;

    /// Store the binary canvas produced for a sheet
    fn persist(&self, role: SheetRole, canvas: &BinaryCanvas);
}

/// Writes `<role>_warped_bin.png` files into a directory
///
/// Every request writes the same two file names, so writes are serialized and
/// the most recent request wins.
pub struct DirectorySink {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, role: SheetRole) -> PathBuf {
        self.dir.join(format!("{}_warped_bin.png", role))
    }

    fn write(&self, role: SheetRole, canvas: &BinaryCanvas) -> anyhow::Result<PathBuf> {
        // A poisoned lock only means another write panicked; the directory is still usable
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(role);
        canvas.as_image().save(&path)?;
        Ok(path)
    }
}

impl DebugSink for DirectorySink {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn persist(&self, role: SheetRole, canvas: &BinaryCanvas) {
        match self.write(role, canvas) {
            Ok(path) => tracing::debug!(%role, path = %path.display(), "Saved debug canvas"),
            Err(e) => tracing::warn!(%role, error = %e, "Failed to save debug canvas"),
        }
    }
}
