//! Frame-stepping player, generic over its media engine
//!
//! **Architecture**: one `Player` per pane. It owns the engine, the pane's
//! playable handle and the redraw ticker, and keeps the observable playback
//! state (time, duration, state, rate, last frame index). The engine does
//! the actual decoding and reports back through [`MediaEvent`]s.
//!
//! **Used by**: `ui::pane` (controls and readouts), `ui::app` (frame loop)
//!
//! # Stepping
//!
//! Every programmatic seek pauses first, then moves by whole frames of the
//! shared [`FrameRate`] and clamps to `[0, duration]` (see [`seek_target`]).
//!
//! # Playback Loop
//!
//! `update()` runs once per UI frame: drain engine events, then sample the
//! position if the ticker is due. A redraw is requested only when
//! `floor(t * fps)` changed since the previous sample.
//!
//! # Autoplay
//!
//! [`Player::set_autoplay`] arms a one-shot play for the load in flight. It
//! fires on `MetadataLoaded` and is disarmed by an error or an unload.
//!
//! # Absent resources
//!
//! No surface attached or no file loaded: controls are silent no-ops.

use log::{debug, trace, warn};
use std::time::{Duration, Instant};

use super::events::MediaEvent;
use super::frame_rate::FrameRate;
use super::playback::{PlaybackInput, PlaybackState};
use super::rate::PlaybackRate;
use super::resource::{ResourceBinder, ResourceHandle};
use super::ticker::{TickScheduler, TickTask};
use crate::media::{SourceFile, VideoFrame};

/// Decode element driven by a [`Player`]. Mirrors a platform video element.
pub trait MediaEngine {
    /// Start opening the media behind `handle`; `MetadataLoaded` or `Error` follows
    fn load(&mut self, handle: &ResourceHandle);
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek; completion is reported with `Seeked`
    fn set_current_time(&mut self, secs: f64);
    fn set_playback_rate(&mut self, rate: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    /// Most recently decoded frame
    fn frame(&self) -> Option<VideoFrame>;
    /// Decode the frame shown at `secs` without seeking; `FrameReady` follows
    fn present(&mut self, secs: f64);
    fn poll_events(&mut self) -> Vec<MediaEvent>;

    /// Work outstanding that will produce events later
    fn is_busy(&self) -> bool {
        false
    }
}

/// Where decoded frames are drawn. Written, never read back.
pub trait DrawSurface {
    fn draw(&mut self, frame: &VideoFrame);
}

/// Target time of a relative frame step, clamped to `[0, duration]`
pub fn seek_target(current: f64, frames: i64, rate: FrameRate, duration: f64) -> f64 {
    (current + frames as f64 * rate.frame_duration()).clamp(0.0, duration.max(0.0))
}

pub struct Player<E: MediaEngine> {
    engine: E,
    surface: Option<Box<dyn DrawSurface>>,
    handle: Option<ResourceHandle>,
    scheduler: TickScheduler,
    ticker: Option<TickTask>,
    state: PlaybackState,
    frame_rate: FrameRate,
    current_time: f64,
    duration: f64,
    playback_rate: PlaybackRate,
    last_frame_index: Option<i64>,
    last_error: Option<String>,
    autoplay: bool,
}

impl<E: MediaEngine> Player<E> {
    pub fn new(engine: E, scheduler: TickScheduler) -> Self {
        Self {
            engine,
            surface: None,
            handle: None,
            scheduler,
            ticker: None,
            state: PlaybackState::Idle,
            frame_rate: FrameRate::default(),
            current_time: 0.0,
            duration: 0.0,
            playback_rate: PlaybackRate::default(),
            last_frame_index: None,
            last_error: None,
            autoplay: false,
        }
    }

    pub fn attach_surface(&mut self, surface: Box<dyn DrawSurface>) {
        self.surface = Some(surface);
    }

    // === Accessors ===

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.playback_rate
    }

    /// `floor(current_time * fps)`
    pub fn frame_index(&self) -> i64 {
        self.frame_rate.frame_index(self.current_time)
    }

    /// `floor(duration * fps)`
    pub fn total_frames(&self) -> u64 {
        self.frame_rate.frame_count(self.duration)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        self.handle.as_ref()
    }

    /// When the UI should run `update()` again: at the next tick while
    /// playing, one tick interval while the engine owes events, else never.
    pub fn repaint_after(&self, now: Instant) -> Option<Duration> {
        match &self.ticker {
            Some(ticker) => Some(ticker.until_due(now)),
            None if self.engine.is_busy() => Some(TickScheduler::interval()),
            None => None,
        }
    }

    // === Source ===

    /// Replace the current file. The previous handle is released first.
    pub fn load(&mut self, file: &SourceFile, binder: &ResourceBinder) {
        self.unload();
        let handle = binder.bind(file);
        debug!("Loading {} as {}", file.name(), handle.url());
        self.engine.load(&handle);
        self.handle = Some(handle);
    }

    pub fn unload(&mut self) {
        self.ticker = None;
        self.engine.unload();
        self.handle = None;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.last_frame_index = None;
        self.last_error = None;
        self.autoplay = false;
        self.apply(PlaybackInput::Unload);
    }

    /// Play once the media in flight reaches `Ready`
    pub fn set_autoplay(&mut self, on: bool) {
        self.autoplay = on;
    }

    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        if rate != self.frame_rate {
            debug!("Frame rate {} -> {}", self.frame_rate, rate);
        }
        self.frame_rate = rate;
        self.last_frame_index = None;
    }

    // === Transport ===

    pub fn play_pause(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if !self.state.is_loaded() {
            trace!("play: nothing loaded");
            return;
        }
        self.engine.play();
    }

    pub fn pause(&mut self) {
        if !self.state.is_loaded() {
            trace!("pause: nothing loaded");
            return;
        }
        self.engine.pause();
    }

    /// Pause and return to the start. Repeating it changes nothing.
    pub fn stop(&mut self) {
        if !self.state.is_loaded() {
            trace!("stop: nothing loaded");
            return;
        }
        self.engine.pause();
        self.engine.set_current_time(0.0);
        self.current_time = 0.0;
        self.apply(PlaybackInput::Stop);
    }

    /// Pause and move `frames` frames from the current position
    pub fn seek_by_frames(&mut self, frames: i64) {
        if !self.state.is_loaded() {
            trace!("seek_by_frames: nothing loaded");
            return;
        }
        self.engine.pause();
        let current = self.engine.current_time();
        let target = seek_target(current, frames, self.frame_rate, self.duration);
        trace!("Step {:+} frames: {:.4}s -> {:.4}s", frames, current, target);
        self.seek_to_time(target);
    }

    /// Pause and jump to the start of frame `index` (scrub)
    pub fn seek_to_frame(&mut self, index: i64) {
        if !self.state.is_loaded() {
            trace!("seek_to_frame: nothing loaded");
            return;
        }
        self.engine.pause();
        let target = self.frame_rate.frame_time(index).clamp(0.0, self.duration);
        self.seek_to_time(target);
    }

    fn seek_to_time(&mut self, target: f64) {
        self.engine.set_current_time(target);
        self.current_time = target;
        self.apply(PlaybackInput::Seek);
    }

    /// Change speed. Position and pause state are untouched.
    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.playback_rate = rate;
        if self.state.is_loaded() {
            self.engine.set_playback_rate(rate.as_f64());
        }
    }

    // === Loop ===

    /// Drain engine events, then sample the position if due.
    /// Returns true when the shown frame index changed.
    pub fn update(&mut self, now: Instant) -> bool {
        self.pump_events();
        self.tick(now)
    }

    pub fn pump_events(&mut self) {
        for event in self.engine.poll_events() {
            self.handle_event(event);
        }
    }

    /// One ticker sample. Requests a redraw only for a new frame index.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(ticker) = self.ticker.as_mut() else {
            return false;
        };
        if !ticker.due(now) {
            return false;
        }

        self.current_time = self.engine.current_time();
        let index = self.frame_rate.frame_index(self.current_time);
        if self.last_frame_index == Some(index) {
            return false;
        }
        self.last_frame_index = Some(index);
        self.engine.present(self.current_time);
        true
    }

    fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded => {
                self.duration = self.engine.duration();
                self.current_time = 0.0;
                self.last_frame_index = None;
                self.last_error = None;
                self.engine.set_playback_rate(self.playback_rate.as_f64());
                self.apply(PlaybackInput::MetadataLoaded);
                if std::mem::take(&mut self.autoplay) {
                    debug!("Autoplay");
                    self.play();
                }
            }
            MediaEvent::Play => self.apply(PlaybackInput::Play),
            MediaEvent::Pause => {
                self.current_time = self.engine.current_time();
                self.apply(PlaybackInput::Pause);
            }
            MediaEvent::Ended => {
                self.current_time = self.engine.current_time();
                self.apply(PlaybackInput::Ended);
                self.engine.present(self.current_time);
            }
            MediaEvent::Seeked => {
                self.current_time = self.engine.current_time();
                self.last_frame_index = Some(self.frame_rate.frame_index(self.current_time));
                self.capture();
            }
            MediaEvent::TimeUpdate => {
                self.current_time = self.engine.current_time();
            }
            MediaEvent::FrameReady => self.capture(),
            MediaEvent::Error(msg) => {
                warn!("Media error: {}", msg);
                self.autoplay = false;
                self.last_error = Some(msg);
            }
        }
    }

    /// Draw the engine's current frame onto the surface
    fn capture(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            trace!("capture: no surface");
            return;
        };
        if let Some(frame) = self.engine.frame() {
            surface.draw(&frame);
        }
    }

    fn apply(&mut self, input: PlaybackInput) {
        let next = self.state.next(input);
        if next != self.state {
            debug!("{} --{:?}--> {}", self.state, input, next);
        }
        self.state = next;

        if self.state.is_playing() {
            if self.ticker.is_none() {
                self.ticker = Some(self.scheduler.start(Instant::now()));
                self.last_frame_index = None;
            }
        } else {
            self.ticker = None;
        }
    }
}
