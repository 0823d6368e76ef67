//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{ThumbError, ThumbResult};

/// Container kinds recognized from the first bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
    /// ISO-BMFF `ftyp` box (HEIC, HEIF, AVIF)
    Heif,
    Unknown,
}

impl HeaderKind {
    /// Whether this engine can decode the format.
    pub fn is_decodable(self) -> bool {
        !matches!(self, HeaderKind::Heif | HeaderKind::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderKind::Jpeg => "jpeg",
            HeaderKind::Png => "png",
            HeaderKind::Gif => "gif",
            HeaderKind::WebP => "webp",
            HeaderKind::Bmp => "bmp",
            HeaderKind::Tiff => "tiff",
            HeaderKind::Heif => "heif",
            HeaderKind::Unknown => "unknown",
        }
    }
}

/// Validates originals before they are decoded.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation of a file on disk.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File starts with the signature of a format this engine decodes
    pub fn validate(&self, path: &Path) -> ThumbResult<HeaderKind> {
        if !path.exists() {
            return Err(ThumbError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| ThumbError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.check_size(path, metadata.len())?;

        let mut file = std::fs::File::open(path).map_err(|e| ThumbError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).map_err(|e| ThumbError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::check_header(path, &header[..bytes_read])
    }

    /// Validate an original that has already been read into memory.
    pub fn validate_bytes(&self, path: &Path, bytes: &[u8]) -> ThumbResult<HeaderKind> {
        self.check_size(path, bytes.len() as u64)?;
        Self::check_header(path, &bytes[..bytes.len().min(12)])
    }

    fn check_size(&self, path: &Path, len: u64) -> ThumbResult<()> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if len > max_bytes {
            return Err(ThumbError::Decode {
                path: path.to_path_buf(),
                message: format!(
                    "File too large ({}MB > {}MB)",
                    len / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            });
        }
        Ok(())
    }

    fn check_header(path: &Path, header: &[u8]) -> ThumbResult<HeaderKind> {
        if header.len() < 4 {
            return Err(ThumbError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        match Self::sniff(header) {
            HeaderKind::Unknown => Err(ThumbError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            }),
            kind if !kind.is_decodable() => Err(ThumbError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: kind.as_str().to_string(),
            }),
            kind => Ok(kind),
        }
    }

    /// Identify the container from its leading bytes.
    pub fn sniff(header: &[u8]) -> HeaderKind {
        if header.len() < 4 {
            return HeaderKind::Unknown;
        }

        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return HeaderKind::Jpeg;
        }
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return HeaderKind::Png;
        }
        if header.starts_with(b"GIF8") {
            return HeaderKind::Gif;
        }
        // RIFF....WEBP; a short read is given the benefit of the doubt
        if header.starts_with(b"RIFF") && (header.len() < 12 || &header[8..12] == b"WEBP") {
            return HeaderKind::WebP;
        }
        if header.starts_with(b"BM") {
            return HeaderKind::Bmp;
        }
        if header.starts_with(&[b'I', b'I', 0x2A, 0x00])
            || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        {
            return HeaderKind::Tiff;
        }
        if header.len() >= 8 && &header[4..8] == b"ftyp" {
            return HeaderKind::Heif;
        }

        HeaderKind::Unknown
    }
}
