//! Decoded video frames as tightly packed RGBA8 buffers
//!
//! **Used by**: Frame sources (decode output), media element (current frame),
//! drawing surfaces (texture upload).

use std::sync::Arc;

/// Single decoded frame, RGBA8, rows packed without padding.
///
/// Pixel data sits behind an `Arc` so the media element, the decode worker
/// and the drawing surface can hold the same frame without copying.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pixels: Arc<Vec<u8>>,
    width: usize,
    height: usize,
    /// Presentation time relative to the first frame of the stream
    pts_secs: f64,
    /// Position in decode order, counted from the start of the stream.
    /// Only sources that count frames fill this in.
    ordinal: Option<u64>,
}

impl VideoFrame {
    /// Wrap an already packed RGBA buffer.
    ///
    /// Returns `None` if the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>, pts_secs: f64) -> Option<Self> {
        if pixels.len() != width * height * 4 {
            return None;
        }
        Some(Self {
            pixels: Arc::new(pixels),
            width,
            height,
            pts_secs,
            ordinal: None,
        })
    }

    /// Copy a strided plane (as produced by the scaler) into a packed frame.
    ///
    /// Returns `None` when the plane is too short for the given geometry.
    pub fn from_strided(
        width: usize,
        height: usize,
        stride: usize,
        plane: &[u8],
        pts_secs: f64,
    ) -> Option<Self> {
        let row_bytes = width * 4;
        if stride < row_bytes || height == 0 || plane.len() < stride * (height - 1) + row_bytes {
            return None;
        }
        let mut output = vec![0u8; row_bytes * height];
        for y in 0..height {
            let src = y * stride;
            let dst = y * row_bytes;
            output[dst..dst + row_bytes].copy_from_slice(&plane[src..src + row_bytes]);
        }
        Self::from_rgba(width, height, output, pts_secs)
    }

    /// Tag the frame with its decode-order position.
    pub fn with_ordinal(mut self, ordinal: u64) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pts_secs(&self) -> f64 {
        self.pts_secs
    }

    pub fn ordinal(&self) -> Option<u64> {
        self.ordinal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_rejects_wrong_length() {
        assert!(VideoFrame::from_rgba(2, 2, vec![0; 15], 0.0).is_none());
        assert!(VideoFrame::from_rgba(2, 2, vec![0; 16], 0.0).is_some());
    }

    #[test]
    fn test_from_strided_drops_row_padding() {
        // 1x2 image, stride 8 (4 bytes padding per row)
        let plane = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8];
        let frame = VideoFrame::from_strided(1, 2, 8, &plane, 0.5).unwrap();
        assert_eq!(frame.pixels(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(frame.pts_secs(), 0.5);
        assert_eq!(frame.ordinal(), None);
    }

    #[test]
    fn test_from_strided_rejects_short_plane() {
        let plane = [0u8; 10];
        assert!(VideoFrame::from_strided(1, 2, 8, &plane, 0.0).is_none());
    }

    #[test]
    fn test_with_ordinal() {
        let frame = VideoFrame::from_rgba(1, 1, vec![0; 4], 0.0).unwrap().with_ordinal(7);
        assert_eq!(frame.ordinal(), Some(7));
    }
}
