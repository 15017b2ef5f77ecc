//! Timestamp-trusting frame source (variant A)
//!
//! Behaves like a platform media element: a request for time `t` shows the
//! last frame whose presentation timestamp is at or before `t`. Requests
//! slightly ahead of what is already decoded are served by decoding
//! forward; anything behind the shown frame, or further ahead than
//! [`FORWARD_DECODE_WINDOW`], seeks to the preceding keyframe first.

use log::trace;
use std::path::Path;

use super::decoder::{DecodeStream, StreamDecoder, StreamInfo};
use super::{FrameSource, MediaError, VideoFrame};

/// Seconds ahead of the decode position still reached by decoding forward
pub const FORWARD_DECODE_WINDOW: f64 = 2.0;

/// Timestamps within this distance count as equal
const PTS_EPSILON: f64 = 1e-4;

pub struct SeekSource<D = StreamDecoder> {
    stream: D,
    /// Frame currently on screen
    shown: Option<VideoFrame>,
    /// First decoded frame past the last request, kept for the next one
    ahead: Option<VideoFrame>,
    /// Stream hit its end since the last seek
    exhausted: bool,
}

impl<D: DecodeStream> SeekSource<D> {
    pub fn with_stream(stream: D) -> Self {
        Self {
            stream,
            shown: None,
            ahead: None,
            exhausted: false,
        }
    }

    pub fn stream(&self) -> &D {
        &self.stream
    }

    /// Timestamp of the furthest frame pulled from the stream
    fn decode_position(&self) -> f64 {
        self.ahead
            .as_ref()
            .or(self.shown.as_ref())
            .map_or(0.0, |f| f.pts_secs())
    }

    fn needs_seek(&self, secs: f64) -> bool {
        if let Some(shown) = &self.shown
            && secs + PTS_EPSILON < shown.pts_secs()
        {
            return true;
        }
        !self.exhausted && secs > self.decode_position() + FORWARD_DECODE_WINDOW
    }

    pub fn frame_at(&mut self, secs: f64) -> Result<Option<VideoFrame>, MediaError> {
        let secs = secs.max(0.0);

        if let (Some(shown), Some(ahead)) = (&self.shown, &self.ahead)
            && shown.pts_secs() <= secs + PTS_EPSILON
            && secs + PTS_EPSILON < ahead.pts_secs()
        {
            return Ok(Some(shown.clone()));
        }

        if self.needs_seek(secs) {
            trace!("Seek source: seeking to {:.4}s", secs);
            self.stream.seek(secs)?;
            self.shown = None;
            self.ahead = None;
            self.exhausted = false;
        }

        loop {
            let next = match self.ahead.take() {
                Some(frame) => Some(frame),
                None => self.stream.next_frame()?,
            };
            match next {
                Some(frame) if frame.pts_secs() <= secs + PTS_EPSILON => {
                    self.shown = Some(frame);
                }
                Some(frame) => {
                    self.ahead = Some(frame);
                    break;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        // Before the first frame: show the first frame
        if self.shown.is_none() {
            self.shown = self.ahead.take();
        }
        Ok(self.shown.clone())
    }
}

impl FrameSource for SeekSource<StreamDecoder> {
    const NAME: &'static str = "seek";

    fn open(path: &Path) -> Result<Self, MediaError> {
        Ok(Self::with_stream(StreamDecoder::open(path)?))
    }

    fn info(&self) -> StreamInfo {
        self.stream.info().clone()
    }

    fn frame_at(&mut self, secs: f64) -> Result<Option<VideoFrame>, MediaError> {
        SeekSource::frame_at(self, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::SyntheticStream;

    fn index_of(frame: &VideoFrame) -> u64 {
        (frame.pts_secs() * 30.0).round() as u64
    }

    fn source() -> SeekSource<SyntheticStream> {
        // 10 s at 30 fps, keyframe every 30 frames
        SeekSource::with_stream(SyntheticStream::new(300, 30.0, 30))
    }

    #[test]
    fn test_first_frame_at_zero() {
        let mut src = source();
        let frame = src.frame_at(0.0).unwrap().unwrap();
        assert_eq!(index_of(&frame), 0);
        assert_eq!(src.stream().seeks, 0);
    }

    #[test]
    fn test_shows_last_frame_not_after_time() {
        let mut src = source();
        let frame = src.frame_at(1.0 / 30.0 * 4.5).unwrap().unwrap();
        assert_eq!(index_of(&frame), 4);
        let frame = src.frame_at(5.0 / 30.0).unwrap().unwrap();
        assert_eq!(index_of(&frame), 5);
    }

    #[test]
    fn test_sequential_requests_decode_forward() {
        let mut src = source();
        for i in 0..60u64 {
            let frame = src.frame_at(i as f64 / 30.0).unwrap().unwrap();
            assert_eq!(index_of(&frame), i);
        }
        assert_eq!(src.stream().seeks, 0);
        assert_eq!(src.stream().decoded, 61);
    }

    #[test]
    fn test_repeated_request_reuses_frame() {
        let mut src = source();
        src.frame_at(1.0).unwrap();
        let decoded = src.stream().decoded;
        src.frame_at(1.0).unwrap();
        src.frame_at(1.01).unwrap();
        assert_eq!(src.stream().decoded, decoded);
    }

    #[test]
    fn test_backward_request_seeks_to_keyframe() {
        let mut src = source();
        src.frame_at(2.0).unwrap();
        let frame = src.frame_at(1.5).unwrap().unwrap();
        assert_eq!(index_of(&frame), 45);
        assert_eq!(src.stream().seeks, 1);
    }

    #[test]
    fn test_far_request_seeks() {
        let mut src = source();
        let frame = src.frame_at(8.0).unwrap().unwrap();
        assert_eq!(index_of(&frame), 240);
        assert_eq!(src.stream().seeks, 1);
        // Keyframe at 240, so only the target frame plus the lookahead were decoded
        assert_eq!(src.stream().decoded, 2);
    }

    #[test]
    fn test_past_end_holds_last_frame() {
        let mut src = source();
        let frame = src.frame_at(20.0).unwrap().unwrap();
        assert_eq!(index_of(&frame), 299);
        let seeks = src.stream().seeks;
        let frame = src.frame_at(25.0).unwrap().unwrap();
        assert_eq!(index_of(&frame), 299);
        assert_eq!(src.stream().seeks, seeks);
    }

    #[test]
    fn test_negative_time_clamps_to_start() {
        let mut src = source();
        let frame = src.frame_at(-3.0).unwrap().unwrap();
        assert_eq!(index_of(&frame), 0);
    }
}
