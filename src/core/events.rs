//! Event types
//!
//! [`MediaEvent`]s come out of a media engine and are consumed by its
//! player. The `*Event` structs travel on the [`EventBus`](super::EventBus)
//! from the file picker to the app, which forwards them to both panes.

use super::frame_rate::FrameRate;
use crate::media::SourceFile;

/// Notifications from a media engine
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Stream opened, duration and dimensions known
    MetadataLoaded,
    Play,
    Pause,
    /// Position reached the duration while playing
    Ended,
    /// A seek finished and its frame is available
    Seeked,
    /// Periodic position notification while playing
    TimeUpdate,
    /// A presented frame finished decoding
    FrameReady,
    Error(String),
}

// === Picker -> App ===

/// User chose a file (dialog, drop or command line)
#[derive(Clone, Debug)]
pub struct FileSelectedEvent(pub SourceFile);

/// User cleared the selection
#[derive(Clone, Debug)]
pub struct SelectionClearedEvent;

/// Metadata probe settled on a frame rate for the current file
#[derive(Clone, Copy, Debug)]
pub struct FrameRateDetectedEvent(pub FrameRate);
