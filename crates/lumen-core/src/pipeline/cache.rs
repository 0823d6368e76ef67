//! Content-addressed thumbnail cache on disk.
//!
//! Layout: `<root>/<h0>/<h1>/<h2>/<hash>_<size>.jpg`, where `h0..h2` are the
//! first three characters of the content hash. The path is a pure function of
//! `(hash, size)`, so file existence is the whole index.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ThumbError, ThumbResult};

use super::generate::THUMB_EXTENSION;

/// Minimum content hash length accepted as a cache key.
const MIN_HASH_LEN: usize = 4;

/// Derivative cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct ThumbCache {
    root: PathBuf,
}

impl ThumbCache {
    /// Create a cache rooted at `root`. Directories are created lazily on write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache path of `size` for the original with `hash`. Performs no I/O.
    pub fn path(&self, hash: &str, size: &str) -> ThumbResult<PathBuf> {
        if hash.len() < MIN_HASH_LEN || !hash.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ThumbError::InvalidHash(hash.to_string()));
        }

        Ok(self
            .root
            .join(&hash[0..1])
            .join(&hash[1..2])
            .join(&hash[2..3])
            .join(format!("{}_{}.{}", hash, size, THUMB_EXTENSION)))
    }

    pub fn exists(&self, hash: &str, size: &str) -> bool {
        self.path(hash, size).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write `bytes` unless the entry already exists.
    ///
    /// Returns `true` if this call created the file. An entry that appears
    /// concurrently counts as success with `false`; readers never observe a
    /// partially written file.
    pub fn write_if_absent(&self, hash: &str, size: &str, bytes: &[u8]) -> ThumbResult<bool> {
        let path = self.path(hash, size)?;
        if path.is_file() {
            return Ok(false);
        }

        let tmp = Self::stage(&path, size, bytes)?;
        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                tracing::trace!("Cached {:?}", path);
                Ok(true)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("Lost write race for {:?}", path);
                Ok(false)
            }
            Err(e) => Err(ThumbError::CacheWrite {
                path,
                source: e.error,
            }),
        }
    }

    /// Atomically write `bytes`, replacing an existing entry.
    pub fn write(&self, hash: &str, size: &str, bytes: &[u8]) -> ThumbResult<()> {
        let path = self.path(hash, size)?;
        let tmp = Self::stage(&path, size, bytes)?;
        tmp.persist(&path).map_err(|e| ThumbError::CacheWrite {
            path: path.clone(),
            source: e.error,
        })?;
        tracing::trace!("Replaced {:?}", path);
        Ok(())
    }

    /// Remove the entry if present. Returns whether a file was deleted.
    pub fn remove(&self, hash: &str, size: &str) -> ThumbResult<bool> {
        let path = self.path(hash, size)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ThumbError::CacheWrite { path, source: e }),
        }
    }

    /// Write `bytes` to a synced temp file next to `path`.
    ///
    /// The temp file is deleted on drop unless persisted.
    fn stage(path: &Path, size: &str, bytes: &[u8]) -> ThumbResult<NamedTempFile> {
        if bytes.is_empty() {
            return Err(ThumbError::Encode {
                size: size.to_string(),
                message: "refusing to cache an empty file".to_string(),
            });
        }

        let dir = path.parent().unwrap_or(Path::new("."));
        let write_err = |e: std::io::Error| ThumbError::CacheWrite {
            path: path.to_path_buf(),
            source: e,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".lumen-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        Ok(tmp)
    }
}
