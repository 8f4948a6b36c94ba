//! Score record storage
//!
//! Features:
//! - Plain text payload (the high score table formats and parses itself)
//! - Atomic rewrite (write tmp → rename over the record)
//! - Missing record reported as `None`, not an error

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Small text record store
pub trait ScoreStore {
    /// Current contents, `None` if nothing has been stored yet
    fn read(&mut self) -> Result<Option<String>, StoreError>;
    /// Replace the contents
    fn write(&mut self, contents: &str) -> Result<(), StoreError>;
}

/// Record kept in a file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ScoreStore for FileStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        let tmp = self.tmp_path();
        // Rename replaces the old record in one step; a crash leaves either version intact
        let written = write_synced(&tmp, contents).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::debug!("Could not remove {}: {}", tmp.display(), cleanup);
            }
            return Err(e.into());
        }
        log::debug!("Score record written to {}", self.path.display());
        Ok(())
    }
}

fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

/// In-memory store for tests and boards without a filesystem
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    /// Number of successful writes
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Some(contents.to_string()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ScoreStore for MemoryStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}
