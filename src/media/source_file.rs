//! The user-selected video file

use log::debug;
use std::path::{Path, PathBuf};

use super::MediaError;

/// Extensions offered by the file dialog and accepted on drop
pub const VIDEO_EXTS: &[&str] = &[
    "mp4", "m4v", "mov", "webm", "mkv", "avi", "mpg", "mpeg", "ts", "mts", "m2ts", "wmv", "flv",
    "ogv", "3gp",
];

/// MIME type for a video file extension (case-insensitive)
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mpg" | "mpeg" => "video/mpeg",
        "ts" | "mts" | "m2ts" => "video/mp2t",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "ogv" => "video/ogg",
        "3gp" => "video/3gpp",
        _ => return None,
    };
    Some(mime)
}

/// Immutable description of the chosen file: path, size and MIME hint
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    path: PathBuf,
    name: String,
    size: u64,
    mime: Option<&'static str>,
}

impl SourceFile {
    /// Stat a file on disk. Directories and missing files are rejected.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let path = path.into();
        let meta = std::fs::metadata(&path)?;
        if !meta.is_file() {
            return Err(MediaError::Io(format!("{} is not a file", path.display())));
        }
        let file = Self::new(path, meta.len());
        debug!(
            "Selected {} ({} bytes, {})",
            file.path.display(),
            file.size,
            file.mime.unwrap_or("unknown type")
        );
        Ok(file)
    }

    /// Describe a file without touching the disk
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension);
        Self { path, name, size, mime }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Size in MiB, as shown next to the file name
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }

    /// MIME type derived from the extension, if known
    pub fn mime(&self) -> Option<&'static str> {
        self.mime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_lookup() {
        assert_eq!(mime_for_extension("MP4"), Some("video/mp4"));
        assert_eq!(mime_for_extension("mov"), Some("video/quicktime"));
        assert_eq!(mime_for_extension("txt"), None);
    }

    #[test]
    fn test_every_offered_extension_has_mime() {
        for ext in VIDEO_EXTS {
            assert!(mime_for_extension(ext).is_some(), "{} lacks a MIME type", ext);
        }
    }

    #[test]
    fn test_new_derives_name_and_mime() {
        let file = SourceFile::new("/videos/r1.mp4", 3 * 1024 * 1024);
        assert_eq!(file.name(), "r1.mp4");
        assert_eq!(file.mime(), Some("video/mp4"));
        assert_eq!(file.size_mb(), 3.0);

        let unknown = SourceFile::new("/videos/clip.bin", 10);
        assert_eq!(unknown.mime(), None);
    }

    #[test]
    fn test_open_missing_file() {
        let missing = std::env::temp_dir().join("framestep_test_missing_file.mp4");
        let _ = std::fs::remove_file(&missing);
        assert!(matches!(SourceFile::open(&missing), Err(MediaError::Io(_))));
    }

    #[test]
    fn test_open_reads_size() {
        let dir = std::env::temp_dir().join("framestep_test_source_file");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.webm");
        std::fs::write(&path, [0u8; 2048]).unwrap();

        let file = SourceFile::open(&path).unwrap();
        assert_eq!(file.size(), 2048);
        assert_eq!(file.mime(), Some("video/webm"));

        assert!(SourceFile::open(&dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
