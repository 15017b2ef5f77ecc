//! Threaded media element
//!
//! Native counterpart of a platform video element. Owns a decode worker
//! thread running one [`FrameSource`], a wall clock for the play position and
//! the most recently decoded frame. Everything observable is reported as
//! [`MediaEvent`]s drained with `poll_events()` on the UI thread.
//!
//! Worker protocol (crossbeam channels):
//! - the worker opens the source and answers `Opened` once
//! - each `Decode` request is answered with a `Frame` reply carrying its id
//! - queued requests are coalesced to the newest, so scrubbing never backs up
//!
//! A seek is complete when a reply with an id at or after the seek's request
//! arrives; that reply is reported as `Seeked` instead of `FrameReady`.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use log::{debug, trace, warn};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{FrameSource, MediaClock, MediaError, StreamInfo, VideoFrame};
use crate::core::events::MediaEvent;
use crate::core::player::MediaEngine;
use crate::core::resource::ResourceHandle;

/// Interval of `TimeUpdate` events while playing
const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// How long dropping a worker waits for it to finish its current frame
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);

enum DecodeCmd {
    Decode { request: u64, secs: f64 },
}

enum DecodeReply {
    Opened(Result<StreamInfo, MediaError>),
    Frame {
        request: u64,
        result: Result<Option<VideoFrame>, MediaError>,
    },
}

struct DecodeWorker {
    cmd_tx: Option<Sender<DecodeCmd>>,
    reply_rx: Receiver<DecodeReply>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    fn spawn<S: FrameSource + 'static>(path: PathBuf) -> Result<Self, MediaError> {
        let (cmd_tx, cmd_rx) = unbounded();
        let (reply_tx, reply_rx) = unbounded();

        let handle = thread::Builder::new()
            .name(format!("framestep-{}", S::NAME))
            .spawn(move || decode_loop::<S>(path, cmd_rx, reply_tx))
            .map_err(|e| MediaError::Io(format!("Failed to spawn decode worker: {}", e)))?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            reply_rx,
            handle: Some(handle),
        })
    }

    fn send(&self, cmd: DecodeCmd) -> bool {
        self.cmd_tx.as_ref().is_some_and(|tx| tx.send(cmd).is_ok())
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        // Closing the command channel ends the worker loop
        self.cmd_tx.take();

        let Some(handle) = self.handle.take() else {
            return;
        };
        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                trace!("Decode worker still busy, detaching");
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        if handle.join().is_err() {
            warn!("Decode worker panicked");
        }
    }
}

fn decode_loop<S: FrameSource>(
    path: PathBuf,
    cmd_rx: Receiver<DecodeCmd>,
    reply_tx: Sender<DecodeReply>,
) {
    trace!("{} worker started for {}", S::NAME, path.display());

    let mut source = match S::open(&path) {
        Ok(source) => {
            let _ = reply_tx.send(DecodeReply::Opened(Ok(source.info())));
            source
        }
        Err(e) => {
            let _ = reply_tx.send(DecodeReply::Opened(Err(e)));
            return;
        }
    };

    while let Ok(mut cmd) = cmd_rx.recv() {
        // Only the newest request matters
        while let Ok(newer) = cmd_rx.try_recv() {
            cmd = newer;
        }
        let DecodeCmd::Decode { request, secs } = cmd;
        let result = source.frame_at(secs);
        if reply_tx.send(DecodeReply::Frame { request, result }).is_err() {
            break;
        }
    }

    trace!("{} worker stopped", S::NAME);
}

/// Media element over frame source `S`
pub struct MediaElement<S> {
    worker: Option<DecodeWorker>,
    info: Option<StreamInfo>,
    clock: MediaClock,
    frame: Option<VideoFrame>,
    events: Vec<MediaEvent>,
    playing: bool,
    /// Id of the newest decode request sent
    latest_request: u64,
    /// Id of the newest reply received
    latest_reply: u64,
    /// Request that completes the pending seek
    pending_seek: Option<u64>,
    last_time_update: Option<Instant>,
    _source: PhantomData<fn() -> S>,
}

impl<S: FrameSource + 'static> Default for MediaElement<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FrameSource + 'static> MediaElement<S> {
    pub fn new() -> Self {
        Self {
            worker: None,
            info: None,
            clock: MediaClock::default(),
            frame: None,
            events: Vec::new(),
            playing: false,
            latest_request: 0,
            latest_reply: 0,
            pending_seek: None,
            last_time_update: None,
            _source: PhantomData,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.info.is_some() && self.worker.is_some()
    }

    fn request_decode(&mut self, secs: f64) -> Option<u64> {
        let worker = self.worker.as_ref()?;
        self.latest_request += 1;
        let request = self.latest_request;
        if worker.send(DecodeCmd::Decode { request, secs }) {
            Some(request)
        } else {
            warn!("{} worker is gone, dropping decode request", S::NAME);
            None
        }
    }

    fn handle_reply(&mut self, reply: DecodeReply) {
        match reply {
            DecodeReply::Opened(Ok(info)) => {
                debug!(
                    "{}: metadata loaded ({}x{}, {:.3}s, {})",
                    S::NAME,
                    info.width,
                    info.height,
                    info.duration,
                    info.codec_name
                );
                let now = Instant::now();
                let rate = self.clock.rate();
                self.clock = MediaClock::new(info.duration);
                self.clock.set_rate(rate, now);
                self.info = Some(info);
                self.events.push(MediaEvent::MetadataLoaded);
                self.present(0.0);
            }
            DecodeReply::Opened(Err(e)) => {
                warn!("{}: failed to open media: {}", S::NAME, e);
                self.worker = None;
                self.events.push(MediaEvent::Error(e.to_string()));
            }
            DecodeReply::Frame { request, result } => {
                self.latest_reply = self.latest_reply.max(request);
                match result {
                    Ok(Some(frame)) => self.frame = Some(frame),
                    Ok(None) => trace!("{}: no frame for request {}", S::NAME, request),
                    Err(e) => {
                        warn!("{}: decode failed: {}", S::NAME, e);
                        self.events.push(MediaEvent::Error(e.to_string()));
                    }
                }
                match self.pending_seek {
                    Some(seek) if request >= seek => {
                        self.pending_seek = None;
                        self.events.push(MediaEvent::Seeked);
                    }
                    _ => self.events.push(MediaEvent::FrameReady),
                }
            }
        }
    }

    fn drain_worker(&mut self) {
        loop {
            let Some(worker) = &self.worker else {
                return;
            };
            match worker.reply_rx.try_recv() {
                Ok(reply) => self.handle_reply(reply),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    warn!("{} worker exited unexpectedly", S::NAME);
                    self.worker = None;
                    self.events
                        .push(MediaEvent::Error("decode worker stopped".to_string()));
                    return;
                }
            }
        }
    }

    fn advance_clock(&mut self, now: Instant) {
        if !self.playing {
            return;
        }
        if self.clock.reached_end(now) {
            self.clock.stop(now);
            self.playing = false;
            self.last_time_update = None;
            self.events.push(MediaEvent::Ended);
            return;
        }
        let due = self
            .last_time_update
            .is_none_or(|last| now.saturating_duration_since(last) >= TIME_UPDATE_INTERVAL);
        if due {
            self.last_time_update = Some(now);
            self.events.push(MediaEvent::TimeUpdate);
        }
    }
}

impl<S: FrameSource + 'static> MediaEngine for MediaElement<S> {
    fn load(&mut self, handle: &ResourceHandle) {
        self.unload();
        debug!("{}: loading {}", S::NAME, handle.url());
        match DecodeWorker::spawn::<S>(handle.path().to_path_buf()) {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => self.events.push(MediaEvent::Error(e.to_string())),
        }
    }

    fn unload(&mut self) {
        let rate = self.clock.rate();
        self.worker = None;
        self.info = None;
        self.frame = None;
        self.events.clear();
        self.playing = false;
        self.pending_seek = None;
        self.last_time_update = None;
        self.latest_reply = self.latest_request;
        self.clock = MediaClock::default();
        self.clock.set_rate(rate, Instant::now());
    }

    fn play(&mut self) {
        if !self.is_ready() || self.playing {
            return;
        }
        let now = Instant::now();
        if self.clock.reached_end(now) {
            self.clock.seek(0.0, now);
        }
        self.clock.start(now);
        self.playing = true;
        self.events.push(MediaEvent::Play);
    }

    fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.clock.stop(Instant::now());
        self.playing = false;
        self.last_time_update = None;
        self.events.push(MediaEvent::Pause);
    }

    fn set_current_time(&mut self, secs: f64) {
        if !self.is_ready() {
            return;
        }
        self.clock.seek(secs, Instant::now());
        let target = self.clock.position(Instant::now());
        if let Some(request) = self.request_decode(target) {
            self.pending_seek = Some(request);
        }
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.clock.set_rate(rate, Instant::now());
    }

    fn current_time(&self) -> f64 {
        self.clock.position(Instant::now())
    }

    fn duration(&self) -> f64 {
        self.clock.duration()
    }

    fn frame(&self) -> Option<VideoFrame> {
        self.frame.clone()
    }

    fn present(&mut self, secs: f64) {
        if self.info.is_none() {
            return;
        }
        self.request_decode(secs.clamp(0.0, self.clock.duration()));
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        self.drain_worker();
        self.advance_clock(Instant::now());
        std::mem::take(&mut self.events)
    }

    fn is_busy(&self) -> bool {
        match &self.worker {
            Some(_) => self.info.is_none() || self.latest_reply < self.latest_request,
            None => false,
        }
    }
}
