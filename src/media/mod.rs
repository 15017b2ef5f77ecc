//! Media layer: files, decoding, frame sources and the threaded media element
//!
//! Two decode strategies share one FFmpeg [`StreamDecoder`]:
//! - [`SeekSource`] trusts container timestamps and seeks by keyframe
//! - [`ExtractSource`] counts frames from the start and caches them
//!
//! [`MediaElement`] drives either one from a worker thread and exposes the
//! engine contract the player talks to.

pub mod clock;
pub mod decoder;
pub mod element;
pub mod error;
pub mod extract_source;
pub mod frame;
pub mod probe;
pub mod seek_source;
pub mod source_file;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::MediaClock;
pub use decoder::{DecodeStream, StreamDecoder, StreamInfo};
pub use element::MediaElement;
pub use error::MediaError;
pub use extract_source::ExtractSource;
pub use frame::VideoFrame;
pub use probe::{ProbeJob, ProbeResult, VideoMetadata};
pub use seek_source::SeekSource;
pub use source_file::{SourceFile, VIDEO_EXTS, mime_for_extension};

use std::path::Path;

/// A decode strategy that can produce the frame shown at a given time.
///
/// Sources are opened and used on the media element's worker thread only.
pub trait FrameSource: Sized {
    /// Short name used for worker threads and log lines
    const NAME: &'static str;

    fn open(path: &Path) -> Result<Self, MediaError>;

    fn info(&self) -> StreamInfo;

    /// Frame on screen at `secs`. `Ok(None)` if the stream has no frame there.
    fn frame_at(&mut self, secs: f64) -> Result<Option<VideoFrame>, MediaError>;
}
