//! Atomic artifact writing.
//!
//! Artifacts are encoded into a hidden temporary file next to the
//! destination and renamed into place only once every stage succeeded.
//! Dropping an [`AtomicFile`] without committing removes the temporary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fabkit_core::{CancelTokens, ExportError, ExportResult, GeometryError};
use parking_lot::Mutex;
use tempfile::NamedTempFile;

/// Prefix of in-progress temporary files
pub const TEMP_PREFIX: &str = ".fabkit-";

/// Suffix of in-progress temporary files
pub const TEMP_SUFFIX: &str = ".part";

/// A destination being written through a temporary file
#[derive(Debug)]
pub struct AtomicFile {
    temp: NamedTempFile,
    destination: PathBuf,
}

impl AtomicFile {
    /// Create the temporary in the destination's directory
    pub fn create(destination: &Path) -> ExportResult<Self> {
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| ExportError::io(destination, e))?;
        tracing::trace!(temp = %temp.path().display(), "temporary artifact created");
        Ok(Self {
            temp,
            destination: destination.to_path_buf(),
        })
    }

    /// Path of the temporary file
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Run an encoder against a buffered writer and flush it
    ///
    /// Stream failures reported by a geometry encoder become
    /// [`ExportError::Io`] on the destination.
    pub fn encode<F>(&mut self, encoder: F) -> ExportResult<()>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> ExportResult<()>,
    {
        let mut writer = BufWriter::new(self.temp.as_file_mut());
        encoder(&mut writer).map_err(|e| match e {
            ExportError::Geometry(err @ GeometryError::Stream { .. }) => {
                ExportError::from(err.at_path(&self.destination))
            }
            other => other,
        })?;
        writer
            .flush()
            .map_err(|e| ExportError::io(&self.destination, e))
    }

    fn persist(self) -> ExportResult<()> {
        self.temp
            .as_file()
            .sync_all()
            .map_err(|e| ExportError::io(&self.destination, e))?;
        self.temp
            .persist(&self.destination)
            .map_err(|e| ExportError::io(&self.destination, e.error))?;
        Ok(())
    }
}

/// Serializes the final rename against cancellation
///
/// Once an artifact is committed, `cancel` no longer sets the tokens, so
/// a completed job never carries a set token.
#[derive(Debug, Default)]
pub struct CommitGate {
    committed: Mutex<bool>,
}

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename `file` into place unless a token is already set
    pub fn commit(&self, tokens: &CancelTokens, file: AtomicFile) -> ExportResult<()> {
        let mut committed = self.committed.lock();
        if tokens.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        file.persist()?;
        *committed = true;
        Ok(())
    }

    /// Set both tokens unless the artifact is already committed
    ///
    /// Returns whether the tokens are set after the call.
    pub fn cancel(&self, tokens: &CancelTokens) -> bool {
        let committed = self.committed.lock();
        if *committed {
            return false;
        }
        tokens.cancel();
        true
    }

    pub fn is_committed(&self) -> bool {
        *self.committed.lock()
    }
}
