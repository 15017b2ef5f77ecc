//! Media errors shared by probing, decoding and the media element.

use std::path::PathBuf;

/// Errors raised while opening, probing or decoding a video file
#[derive(Debug, Clone, PartialEq)]
pub enum MediaError {
    /// File could not be read from disk
    Io(String),
    /// Container or stream could not be opened
    Open(String),
    /// File opened but carries no video stream
    NoVideoStream(PathBuf),
    /// Decoder failed on a packet or frame
    Decode(String),
    /// Pixel conversion failed
    Scale(String),
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::Io(e) => write!(f, "IO error: {}", e),
            MediaError::Open(e) => write!(f, "Failed to open video: {}", e),
            MediaError::NoVideoStream(p) => write!(f, "No video stream found in {}", p.display()),
            MediaError::Decode(e) => write!(f, "Decode error: {}", e),
            MediaError::Scale(e) => write!(f, "Scale error: {}", e),
        }
    }
}

impl std::error::Error for MediaError {}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        MediaError::Io(e.to_string())
    }
}
