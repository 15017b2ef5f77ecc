//! Coarse metadata for the selected file
//!
//! [`ProbeJob`] reads stream properties on a short-lived thread while the
//! picker holds a temporary playable handle. The handle is released as soon
//! as the result is taken, or when the job is dropped because a newer file
//! replaced it.

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use log::{debug, warn};
use std::path::Path;
use std::thread;
use uuid::Uuid;

use super::{MediaError, SourceFile, StreamInfo};
use crate::core::frame_rate::{FrameRate, detect_frame_rate, to_fixed};
use crate::core::resource::ResourceHandle;

/// Codec label used when the file type is unknown
const DEFAULT_CODEC: &str = "video/mp4";

/// Approximate bitrate in kbps: `round(bytes * 8 / duration / 1000)`.
/// Zero when the duration is unknown.
pub fn bitrate_kbps(size: u64, duration: f64) -> u64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (size as f64 * 8.0 / duration / 1000.0).round() as u64
}

/// Read-only snapshot of the selected file's properties
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub frame_rate: FrameRate,
    pub bitrate_kbps: u64,
    /// MIME type of the file, `video/mp4` when unknown
    pub codec: String,
    /// Decoder FFmpeg picked for the stream
    pub decoder: String,
}

impl VideoMetadata {
    pub fn from_stream(info: &StreamInfo, file: &SourceFile) -> Self {
        Self {
            width: info.width,
            height: info.height,
            duration: info.duration,
            frame_rate: detect_frame_rate(info.duration),
            bitrate_kbps: bitrate_kbps(file.size(), info.duration),
            codec: file.mime().unwrap_or(DEFAULT_CODEC).to_string(),
            decoder: info.codec_name.clone(),
        }
    }

    /// `floor(duration * frame_rate)`
    pub fn total_frames(&self) -> u64 {
        self.frame_rate.frame_count(self.duration)
    }

    /// Label/value rows shown in the info card and printed by `--info`
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Resolution", format!("{}x{}", self.width, self.height)),
            ("Frame rate", format!("{} fps", self.frame_rate)),
            ("Bitrate", format!("{} kbps", self.bitrate_kbps)),
            ("Codec", self.codec.clone()),
            ("Decoder", self.decoder.clone()),
            ("Duration", format!("{} s", to_fixed(self.duration, 2))),
            ("Total frames", self.total_frames().to_string()),
        ]
    }
}

/// Probe outcome tagged with the handle it was requested for
#[derive(Debug)]
pub struct ProbeResult {
    pub handle_id: Uuid,
    pub result: Result<VideoMetadata, MediaError>,
}

/// Metadata read in flight for one file
pub struct ProbeJob {
    handle: Option<ResourceHandle>,
    rx: Receiver<ProbeResult>,
}

impl ProbeJob {
    /// Probe `file` through `handle` with `read` (normally [`StreamInfo::read`])
    pub fn spawn<F>(file: SourceFile, handle: ResourceHandle, read: F) -> Self
    where
        F: FnOnce(&Path) -> Result<StreamInfo, MediaError> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let handle_id = handle.id();
        let path = handle.path().to_path_buf();
        let fallback_tx = tx.clone();

        let spawned = thread::Builder::new()
            .name("framestep-probe".to_string())
            .spawn(move || {
                let result = read(path.as_path())
                    .map(|info| VideoMetadata::from_stream(&info, &file));
                let _ = tx.send(ProbeResult { handle_id, result });
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn probe thread: {}", e);
            let _ = fallback_tx.send(ProbeResult {
                handle_id,
                result: Err(MediaError::Io(format!("Failed to spawn probe thread: {}", e))),
            });
        }

        Self {
            handle: Some(handle),
            rx,
        }
    }

    /// Take the result if ready. Releases the handle when it returns `Some`.
    pub fn try_finish(&mut self) -> Option<Result<VideoMetadata, MediaError>> {
        let expected = self.handle.as_ref()?.id();
        let outcome = match self.rx.try_recv() {
            Ok(ProbeResult { handle_id, result }) if handle_id == expected => result,
            Ok(stale) => {
                debug!("Discarding probe result for blob:{}", stale.handle_id);
                return None;
            }
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(MediaError::Io("Probe thread exited without a result".to_string()))
            }
        };
        self.handle = None;
        Some(outcome)
    }
}
