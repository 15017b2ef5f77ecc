//! Frame-counting source (variant B)
//!
//! Identifies frames purely by their position in decode order: the frame
//! for time `t` is ordinal `floor(t * fps)` counted from the first decoded
//! frame, whatever its timestamp says. Decoded frames go into an LRU cache
//! so stepping backwards over recent frames is free; a miss behind the
//! decode position rewinds the stream and counts again from the start.

use log::{debug, trace};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::Path;

use super::decoder::{DecodeStream, StreamDecoder, StreamInfo};
use super::{FrameSource, MediaError, VideoFrame};

/// Memory budget for extracted frames
const CACHE_BUDGET_BYTES: usize = 512 * 1024 * 1024;
const MIN_CACHED_FRAMES: usize = 16;
const MAX_CACHED_FRAMES: usize = 600;

/// Used when the stream declares no frame rate
const FALLBACK_FPS: f64 = 30.0;

/// Cache slots for frames of the given size
pub fn cache_capacity(width: u32, height: u32) -> NonZeroUsize {
    let frame_bytes = (width as usize * height as usize * 4).max(1);
    let frames = (CACHE_BUDGET_BYTES / frame_bytes).clamp(MIN_CACHED_FRAMES, MAX_CACHED_FRAMES);
    NonZeroUsize::new(frames).unwrap_or(NonZeroUsize::MIN)
}

pub struct ExtractSource<D = StreamDecoder> {
    stream: D,
    fps: f64,
    cache: LruCache<u64, VideoFrame>,
    /// Ordinal the next decoded frame will get
    next_ordinal: u64,
    /// Frame count, known once the stream has been read to the end
    total: Option<u64>,
}

impl<D: DecodeStream> ExtractSource<D> {
    pub fn with_stream(stream: D) -> Self {
        let info = stream.info();
        let fps = if info.nominal_fps > 0.0 {
            info.nominal_fps
        } else {
            FALLBACK_FPS
        };
        let capacity = cache_capacity(info.width, info.height);
        debug!(
            "Extract source: {:.3} fps, caching up to {} frames",
            fps, capacity
        );
        Self {
            stream,
            fps,
            cache: LruCache::new(capacity),
            next_ordinal: 0,
            total: None,
        }
    }

    pub fn stream(&self) -> &D {
        &self.stream
    }

    pub fn cached_frames(&self) -> usize {
        self.cache.len()
    }

    pub fn total_frames(&self) -> Option<u64> {
        self.total
    }

    /// Ordinal shown at `secs`
    pub fn ordinal_at(&self, secs: f64) -> u64 {
        (secs.max(0.0) * self.fps + 1e-6).floor() as u64
    }

    pub fn frame_at(&mut self, secs: f64) -> Result<Option<VideoFrame>, MediaError> {
        let mut target = self.ordinal_at(secs);
        if let Some(total) = self.total {
            if total == 0 {
                return Ok(None);
            }
            target = target.min(total - 1);
        }

        if let Some(frame) = self.cache.get(&target) {
            return Ok(Some(frame.clone()));
        }

        if target < self.next_ordinal {
            trace!(
                "Extract source: frame {} not cached, counting again from the start",
                target
            );
            self.stream.rewind()?;
            self.next_ordinal = 0;
        }

        while self.next_ordinal <= target {
            match self.stream.next_frame()? {
                Some(frame) => {
                    let ordinal = self.next_ordinal;
                    self.cache.put(ordinal, frame.with_ordinal(ordinal));
                    self.next_ordinal += 1;
                }
                None => {
                    debug!("Extract source: stream ends after {} frames", self.next_ordinal);
                    self.total = Some(self.next_ordinal);
                    if self.next_ordinal == 0 {
                        return Ok(None);
                    }
                    target = self.next_ordinal - 1;
                    break;
                }
            }
        }

        Ok(self.cache.get(&target).cloned())
    }
}

impl FrameSource for ExtractSource<StreamDecoder> {
    const NAME: &'static str = "extract";

    fn open(path: &Path) -> Result<Self, MediaError> {
        Ok(Self::with_stream(StreamDecoder::open(path)?))
    }

    fn info(&self) -> StreamInfo {
        self.stream.info().clone()
    }

    fn frame_at(&mut self, secs: f64) -> Result<Option<VideoFrame>, MediaError> {
        ExtractSource::frame_at(self, secs)
    }
}
