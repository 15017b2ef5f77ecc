//! Frame rate model and NTSC duration heuristic
//!
//! Both panes quantize time with one shared [`FrameRate`]. The rate is stored
//! as an exact ratio so 29.97 material (30000/1001) yields whole frame counts:
//! a 60.06 s clip is exactly 1800 frames.
//!
//! # Detection
//!
//! [`detect_frame_rate`] guesses 29.97 vs 30 fps from the container duration
//! alone. The duration is rendered with two fractional digits and matched
//! against a fixed set of endings (.03/.06/.09, .33/.36/.39, .63/.66/.69,
//! .93/.96/.99). Durations that happen to match are classified as NTSC even
//! when they are not; that surface is kept as-is so both panes agree.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Slack added before flooring so `k / fps` maps back to frame `k`
/// despite float rounding in the multiply.
const FRAME_EPSILON: f64 = 1e-6;

/// Fractional digits needed to print any finite f64 exactly.
const EXACT_DIGITS: usize = 1074;

static NTSC_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(0[369]|3[369]|6[369]|9[369])$").expect("NTSC duration pattern is valid")
});

/// Frames per second as an exact ratio `num / den`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    num: u32,
    den: u32,
}

impl FrameRate {
    /// 30 fps, used whenever the heuristic does not fire
    pub const STANDARD: FrameRate = FrameRate { num: 30, den: 1 };
    /// 29.97 fps (30000/1001)
    pub const NTSC: FrameRate = FrameRate { num: 30_000, den: 1001 };

    /// Build a rate from a ratio. Zero numerator or denominator is rejected.
    pub fn from_ratio(num: u32, den: u32) -> Option<Self> {
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Duration of one frame in seconds
    pub fn frame_duration(&self) -> f64 {
        self.den as f64 / self.num as f64
    }

    /// Logical frame index shown at `secs`: `floor(secs * fps + 1e-6)`.
    ///
    /// The epsilon keeps exact frame boundaries from falling one frame short
    /// after float rounding (60.06 s at 29.97 fps is frame 1800, not 1799).
    /// A time less than a millionth of a frame before a boundary therefore
    /// reports the next frame.
    pub fn frame_index(&self, secs: f64) -> i64 {
        ((secs * self.num as f64) / self.den as f64 + FRAME_EPSILON).floor() as i64
    }

    /// Start time of frame `index`
    pub fn frame_time(&self, index: i64) -> f64 {
        (index as f64 * self.den as f64) / self.num as f64
    }

    /// Total whole frames in `duration` seconds
    pub fn frame_count(&self, duration: f64) -> u64 {
        if !duration.is_finite() || duration <= 0.0 {
            return 0;
        }
        self.frame_index(duration).max(0) as u64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.num % self.den == 0 {
            write!(f, "{}", self.num / self.den)
        } else {
            write!(f, "{:.2}", self.as_f64())
        }
    }
}

/// Guess the frame rate from a media duration in seconds.
///
/// Never fails: NaN and infinite durations fall back to [`FrameRate::STANDARD`].
pub fn detect_frame_rate(duration_secs: f64) -> FrameRate {
    let rendered = to_fixed(duration_secs, 2);
    let rate = if NTSC_DURATION.is_match(&rendered) {
        FrameRate::NTSC
    } else {
        FrameRate::STANDARD
    };
    debug!("Frame rate for duration {} ({}): {} fps", duration_secs, rendered, rate);
    rate
}

/// Render `value` with `digits` fractional digits the way ECMAScript's
/// `Number.prototype.toFixed` does.
///
/// Rounds on the exact binary value and resolves exact ties toward the larger
/// magnitude (0.625 -> "0.63"), unlike `format!` which rounds ties to even.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.abs() >= 1e21 {
        return format!("{}", value);
    }

    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut kept: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    kept.extend((0..digits).map(|i| frac.get(i).map_or(0, |b| b - b'0')));

    if frac.get(digits).is_some_and(|&b| b >= b'5') {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, 1);
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|d| (b'0' + d) as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|d| (b'0' + d) as char));
    }
    out
}
