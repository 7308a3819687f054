//! The text store boundary: where document text comes from and goes to.
//!
//! The engine has no opinion on storage. A run loads its full input once and
//! writes its full output once; everything in between is pure in-memory text
//! manipulation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("source text unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to persist {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load/save capability supplied by the caller.
pub trait TextStore {
    fn load_text(&self, identity: &Path) -> Result<String, StoreError>;
    fn save_text(&self, identity: &Path, text: &str) -> Result<(), StoreError>;
}

/// Filesystem-backed store: full read, atomic full write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTextStore;

impl TextStore for FsTextStore {
    fn load_text(&self, identity: &Path) -> Result<String, StoreError> {
        fs::read_to_string(identity).map_err(|source| StoreError::Unavailable {
            path: identity.to_path_buf(),
            source,
        })
    }

    fn save_text(&self, identity: &Path, text: &str) -> Result<(), StoreError> {
        atomic_write(identity, text.as_bytes()).map_err(|source| StoreError::Persistence {
            path: identity.to_path_buf(),
            source,
        })?;

        // Bump mtime so dev-server file watchers pick up the rewrite even
        // when the rename preserves an older timestamp.
        let now = filetime::FileTime::now();
        filetime::set_file_mtime(identity, now).map_err(|source| StoreError::Persistence {
            path: identity.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    // Tempfile in the same directory so the rename stays on one filesystem.
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
