//! FFmpeg stream decoding shared by both frame sources
//!
//! [`StreamDecoder`] wraps one opened input, the best video stream's decoder
//! and an RGBA scaler. It decodes strictly in stream order
//! ([`StreamDecoder::next_frame`]) and can reposition to the keyframe at or
//! before a time ([`StreamDecoder::seek`]). The frame sources decide how to
//! use that: trust timestamps and seek, or count frames from the start.

use log::{trace, warn};
use playa_ffmpeg as ffmpeg;
use std::path::Path;
use std::sync::Once;

use super::{MediaError, VideoFrame};

static FFMPEG_LOG_INIT: Once = Once::new();

/// AV_TIME_BASE: container durations are in microseconds
const CONTAINER_TIME_BASE: f64 = 1_000_000.0;

fn init_ffmpeg_logging() {
    FFMPEG_LOG_INIT.call_once(|| {
        unsafe {
            // Silence FFmpeg's own stderr output; errors surface through MediaError
            ffmpeg::ffi::av_log_set_level(ffmpeg::ffi::AV_LOG_QUIET);
        }
    });
}

fn open_err(e: ffmpeg::Error) -> MediaError {
    MediaError::Open(e.to_string())
}

/// Stream properties read at open time
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Seconds; container duration, stream duration as fallback, 0 if unknown
    pub duration: f64,
    /// Average frame rate declared by the stream, 0 if unknown
    pub nominal_fps: f64,
    /// FFmpeg codec name, e.g. "h264"
    pub codec_name: String,
}

impl StreamInfo {
    /// Read stream properties without decoding any frames
    pub fn read(path: &Path) -> Result<Self, MediaError> {
        init_ffmpeg_logging();

        let ictx = ffmpeg::format::input(path).map_err(open_err)?;
        let stream = ictx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

        let decoder_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(open_err)?;
        let decoder = decoder_ctx.decoder().video().map_err(open_err)?;

        Ok(Self::from_parts(&ictx, &stream, &decoder))
    }

    fn from_parts(
        ictx: &ffmpeg::format::context::Input,
        stream: &ffmpeg::format::stream::Stream,
        decoder: &ffmpeg::decoder::Video,
    ) -> Self {
        let time_base = rational_to_f64(stream.time_base());
        let container = ictx.duration();
        let duration = if container > 0 {
            container as f64 / CONTAINER_TIME_BASE
        } else if stream.duration() > 0 {
            stream.duration() as f64 * time_base
        } else {
            0.0
        };

        Self {
            width: decoder.width(),
            height: decoder.height(),
            duration,
            nominal_fps: rational_to_f64(stream.avg_frame_rate()),
            codec_name: stream.parameters().id().name().to_string(),
        }
    }
}

fn rational_to_f64(r: ffmpeg::Rational) -> f64 {
    if r.denominator() == 0 {
        return 0.0;
    }
    r.numerator() as f64 / r.denominator() as f64
}

/// Ordered frame stream with keyframe seeking.
///
/// [`StreamDecoder`] is the real implementation; the frame sources are
/// generic over it so their bookkeeping can be exercised with synthetic
/// streams.
pub trait DecodeStream {
    fn info(&self) -> &StreamInfo;

    /// Next frame in decode order, `Ok(None)` at end of stream
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, MediaError>;

    /// Reposition to the keyframe at or before `secs`
    fn seek(&mut self, secs: f64) -> Result<(), MediaError>;

    /// Back to the first frame of the stream
    fn rewind(&mut self) -> Result<(), MediaError> {
        self.seek(0.0)
    }
}

/// Sequential RGBA decoder over the best video stream of a file
pub struct StreamDecoder {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
    /// Seconds per stream tick
    time_base: f64,
    /// Stream start timestamp, subtracted so the first frame sits at 0
    start_ts: i64,
    info: StreamInfo,
    last_pts: Option<f64>,
    eof: bool,
}

impl StreamDecoder {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        init_ffmpeg_logging();

        let input = ffmpeg::format::input(path).map_err(open_err)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;
        let stream_index = stream.index();
        let time_base = rational_to_f64(stream.time_base());
        let start = stream.start_time();
        let start_ts = if start == ffmpeg::ffi::AV_NOPTS_VALUE { 0 } else { start };

        let mut decoder_ctx =
            ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .map_err(open_err)?;

        // Multi-threaded frame decoding
        unsafe {
            (*decoder_ctx.as_mut_ptr()).thread_type = ffmpeg::ffi::FF_THREAD_FRAME;
            (*decoder_ctx.as_mut_ptr()).thread_count = 0; // Auto-detect CPU cores
        }

        let decoder = decoder_ctx.decoder().video().map_err(open_err)?;
        let info = StreamInfo::from_parts(&input, &stream, &decoder);

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| MediaError::Scale(format!("Failed to create scaler: {}", e)))?;

        trace!(
            "Opened {} ({}x{}, {:.3}s, {})",
            path.display(),
            info.width,
            info.height,
            info.duration,
            info.codec_name
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            start_ts,
            info,
            last_pts: None,
            eof: false,
        })
    }

    fn convert(
        &mut self,
        decoded: &ffmpeg::util::frame::video::Video,
    ) -> Result<VideoFrame, MediaError> {
        let mut rgba = ffmpeg::util::frame::video::Video::empty();
        self.scaler
            .run(decoded, &mut rgba)
            .map_err(|e| MediaError::Scale(format!("Failed to scale frame: {}", e)))?;

        // Frames without a timestamp are placed one nominal frame after the previous one
        let pts = match decoded.timestamp().or(decoded.pts()) {
            Some(ts) => (ts - self.start_ts) as f64 * self.time_base,
            None => {
                let fps = self.info.nominal_fps;
                let step = if fps > 0.0 { 1.0 / fps } else { 0.0 };
                self.last_pts.map_or(0.0, |p| p + step)
            }
        };
        self.last_pts = Some(pts);

        let width = self.info.width as usize;
        let height = self.info.height as usize;
        VideoFrame::from_strided(width, height, rgba.stride(0), rgba.data(0), pts)
            .ok_or_else(|| MediaError::Scale("Scaled plane shorter than frame".to_string()))
    }
}

impl DecodeStream for StreamDecoder {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Decode the next frame in stream order. `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, MediaError> {
        loop {
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.convert(&decoded).map(Some);
            }
            if self.eof {
                return Ok(None);
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        warn!("Skipping undecodable packet: {}", e);
                    }
                }
                None => {
                    self.decoder.send_eof().map_err(|e| {
                        MediaError::Decode(format!("Failed to flush decoder: {}", e))
                    })?;
                    self.eof = true;
                }
            }
        }
    }

    /// Reposition to the keyframe at or before `secs` and drop buffered frames.
    fn seek(&mut self, secs: f64) -> Result<(), MediaError> {
        let target_ts = self.start_ts + (secs.max(0.0) / self.time_base) as i64;
        let seek_ret = unsafe {
            ffmpeg::ffi::av_seek_frame(
                self.input.as_mut_ptr(),
                self.stream_index as i32,
                target_ts,
                ffmpeg::ffi::AVSEEK_FLAG_BACKWARD,
            )
        };
        if seek_ret < 0 {
            return Err(MediaError::Decode(format!(
                "Seek to {:.3}s failed (ret={})",
                secs, seek_ret
            )));
        }
        self.decoder.flush();
        self.last_pts = None;
        self.eof = false;
        trace!("Seeked to {:.3}s (ts {})", secs, target_ts);
        Ok(())
    }
}
