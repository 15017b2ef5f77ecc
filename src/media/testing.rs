//! Synthetic streams and engines for unit tests

use std::path::Path;

use super::decoder::{DecodeStream, StreamInfo};
use super::{FrameSource, MediaError, VideoFrame};
use crate::core::events::MediaEvent;
use crate::core::player::MediaEngine;
use crate::core::resource::ResourceHandle;

/// Constant-rate 2x2 stream. Every pixel of frame `i` holds `i as u8`.
pub struct SyntheticStream {
    info: StreamInfo,
    frames: u64,
    gop: u64,
    pos: u64,
    pub seeks: usize,
    pub decoded: usize,
}

impl SyntheticStream {
    pub fn new(frames: u64, fps: f64, gop: u64) -> Self {
        Self {
            info: StreamInfo {
                width: 2,
                height: 2,
                duration: frames as f64 / fps,
                nominal_fps: fps,
                codec_name: "synthetic".to_string(),
            },
            frames,
            gop: gop.max(1),
            pos: 0,
            seeks: 0,
            decoded: 0,
        }
    }

    pub fn frame(index: u64, fps: f64) -> VideoFrame {
        VideoFrame::from_rgba(2, 2, vec![index as u8; 16], index as f64 / fps)
            .expect("2x2 frame")
    }
}

impl DecodeStream for SyntheticStream {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, MediaError> {
        if self.pos >= self.frames {
            return Ok(None);
        }
        let frame = Self::frame(self.pos, self.info.nominal_fps);
        self.pos += 1;
        self.decoded += 1;
        Ok(Some(frame))
    }

    fn seek(&mut self, secs: f64) -> Result<(), MediaError> {
        let index = ((secs.max(0.0) * self.info.nominal_fps + 1e-9).floor() as u64)
            .min(self.frames.saturating_sub(1));
        self.pos = index / self.gop * self.gop;
        self.seeks += 1;
        Ok(())
    }
}

/// Frame source for media element tests, 10 fps. Paths containing "broken"
/// fail to open; "short" gives 0.3 s, anything else 10 s. With "crash" the
/// worker panics on any frame after the first.
pub struct FakeSource {
    info: StreamInfo,
    frames: u64,
    crash: bool,
}

impl FrameSource for FakeSource {
    const NAME: &'static str = "fake";

    fn open(path: &Path) -> Result<Self, MediaError> {
        if path.to_string_lossy().contains("broken") {
            return Err(MediaError::Open("unsupported container".to_string()));
        }
        let frames = if path.to_string_lossy().contains("short") { 3 } else { 100 };
        Ok(Self {
            info: SyntheticStream::new(frames, 10.0, 10).info,
            frames,
            crash: path.to_string_lossy().contains("crash"),
        })
    }

    fn info(&self) -> StreamInfo {
        self.info.clone()
    }

    fn frame_at(&mut self, secs: f64) -> Result<Option<VideoFrame>, MediaError> {
        if self.crash && secs > 0.0 {
            panic!("decoder crashed at {}s", secs);
        }
        let index = ((secs.max(0.0) * 10.0 + 1e-9).floor() as u64).min(self.frames - 1);
        Ok(Some(SyntheticStream::frame(index, 10.0)))
    }
}

/// Engine that reports everything synchronously; tests move `time` by hand.
/// Loads give a 10 s clip, or an `Error` when `fail_load` is set.
#[derive(Default)]
pub struct FakeEngine {
    pub loaded: bool,
    pub playing: bool,
    pub time: f64,
    pub duration: f64,
    pub rate: f64,
    pub fail_load: Option<String>,
    pub play_calls: usize,
    pub events: Vec<MediaEvent>,
    pub presented: Vec<f64>,
    pub seeks: Vec<f64>,
}

impl MediaEngine for FakeEngine {
    fn load(&mut self, _handle: &ResourceHandle) {
        if let Some(msg) = &self.fail_load {
            self.events.push(MediaEvent::Error(msg.clone()));
            return;
        }
        self.loaded = true;
        self.duration = 10.0;
        self.time = 0.0;
        self.events.push(MediaEvent::MetadataLoaded);
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.playing = false;
        self.duration = 0.0;
        self.time = 0.0;
        self.events.clear();
    }

    fn play(&mut self) {
        self.play_calls += 1;
        if self.loaded && !self.playing {
            self.playing = true;
            self.events.push(MediaEvent::Play);
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.events.push(MediaEvent::Pause);
        }
    }

    fn set_current_time(&mut self, secs: f64) {
        self.time = secs.clamp(0.0, self.duration);
        self.seeks.push(self.time);
        self.events.push(MediaEvent::Seeked);
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn frame(&self) -> Option<VideoFrame> {
        VideoFrame::from_rgba(1, 1, vec![0; 4], self.time)
    }

    fn present(&mut self, secs: f64) {
        self.presented.push(secs);
        self.events.push(MediaEvent::FrameReady);
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.events)
    }
}
