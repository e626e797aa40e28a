//! Snapshot store: durable persistence of client state
//!
//! The store owns one file under its root directory: the gzip-compressed
//! JSON serialization of [`Settings`]. Writes go through a temp file and
//! rename so a crash mid-write cannot leave a torn snapshot. A snapshot
//! that cannot be decompressed or parsed is discarded and reported as
//! absent rather than as an error, so a corrupted file never wedges the
//! client at startup.

use super::error::{ConfigError, ConfigResult};
use super::schema::Settings;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the snapshot inside the store directory
pub const SNAPSHOT_FILE: &str = "rivulet.snapshot.gz";

/// File-backed store for the settings snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize, compress, and atomically write the snapshot
    pub fn save(&self, settings: &Settings) -> ConfigResult<()> {
        let json = serde_json::to_vec(settings).map_err(|err| ConfigError::Invalid {
            message: format!("failed to serialize snapshot: {err}"),
        })?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json).map_err(|err| self.io_error(err))?;
        let compressed = encoder.finish().map_err(|err| self.io_error(err))?;

        let tmp = self.path.with_extension("gz.tmp");
        fs::write(&tmp, &compressed).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;

        debug!(
            "saved snapshot ({} bytes compressed) to {}",
            compressed.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the snapshot back, migrating old versions
    ///
    /// Returns `Ok(None)` when no snapshot exists or the existing one is
    /// corrupt; corrupt files are removed.
    pub fn load(&self) -> ConfigResult<Option<Settings>> {
        let compressed = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        let mut json = Vec::new();
        if GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .is_err()
        {
            warn!("discarding undecodable snapshot at {}", self.path.display());
            self.discard();
            return Ok(None);
        }

        match serde_json::from_slice::<Settings>(&json) {
            Ok(settings) => Ok(Some(settings.migrate())),
            Err(err) => {
                warn!(
                    "discarding unparseable snapshot at {}: {}",
                    self.path.display(),
                    err
                );
                self.discard();
                Ok(None)
            }
        }
    }

    /// Remove the snapshot
    pub fn clear(&self) -> ConfigResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn discard(&self) {
        let _ = fs::remove_file(&self.path);
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::IoError {
            path: self.path.to_string_lossy().to_string(),
            source,
        }
    }
}
