//! Finding originals in directory trees.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::ProcessingConfig;

/// Discovers original media files to thumbnail.
pub struct FileDiscovery {
    config: ProcessingConfig,
    exclude: Vec<PathBuf>,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            exclude: Vec::new(),
        }
    }

    /// Never descend into `dir`.
    ///
    /// Used for the cache root, so a library that contains its own cache does
    /// not thumbnail its thumbnails.
    pub fn exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.exclude.push(std::fs::canonicalize(&dir).unwrap_or(dir));
        self
    }

    /// Discover all supported originals at a path.
    ///
    /// A file path yields itself if supported. A directory is walked
    /// recursively, skipping hidden entries and excluded directories.
    /// Results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .filter_map(|entry| {
                let size = entry.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: entry.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!("Discovered {} originals under {:?}", files.len(), path);
        files
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        let hidden = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false);
        if hidden {
            return true;
        }

        entry.file_type().is_dir()
            && !self.exclude.is_empty()
            && std::fs::canonicalize(entry.path())
                .map(|p| self.exclude.contains(&p))
                .unwrap_or(false)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.heic")));
        assert!(discovery.is_supported(Path::new("test.tiff")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("jpg")));
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.jpg"));
        touch(&dir.path().join("a/c.png"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join(".hidden/d.jpg"));

        let files = FileDiscovery::new(ProcessingConfig::default()).discover(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("a/c.png"), PathBuf::from("b.jpg")]);
    }

    #[test]
    fn test_discover_skips_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("photo.jpg"));
        touch(&dir.path().join("cache/a/b/c/abcd_tile_50.jpg"));

        let files = FileDiscovery::new(ProcessingConfig::default())
            .exclude(dir.path().join("cache"))
            .discover(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("photo.jpg"));
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.webp");
        touch(&path);

        let discovery = FileDiscovery::new(ProcessingConfig::default());
        assert_eq!(discovery.discover(&path).len(), 1);
        assert!(discovery.discover(&dir.path().join("missing.jpg")).is_empty());
    }

    #[test]
    fn test_total_size() {
        let files = vec![
            DiscoveredFile {
                path: PathBuf::from("a.jpg"),
                size: 100,
            },
            DiscoveredFile {
                path: PathBuf::from("b.jpg"),
                size: 200,
            },
        ];

        assert_eq!(FileDiscovery::total_size(&files), 300);
    }
}
