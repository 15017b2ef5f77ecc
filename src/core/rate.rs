//! Playback speed presets

use std::str::FromStr;

/// Playback speed multiplier, one of a fixed set of presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackRate {
    Quarter,
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    /// All presets, slowest first (order of the rate selector)
    pub const ALL: [PlaybackRate; 7] = [
        PlaybackRate::Quarter,
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn as_f64(&self) -> f64 {
        match self {
            PlaybackRate::Quarter => 0.25,
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Selector label, e.g. "0.25x"
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackRate::Quarter => "0.25x",
            PlaybackRate::Half => "0.5x",
            PlaybackRate::ThreeQuarters => "0.75x",
            PlaybackRate::Normal => "1x",
            PlaybackRate::OneAndQuarter => "1.25x",
            PlaybackRate::OneAndHalf => "1.5x",
            PlaybackRate::Double => "2x",
        }
    }
}

impl std::fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlaybackRate {
    type Err = String;

    /// Accepts "1.25", "1.25x" or "1.25X"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix(['x', 'X']).unwrap_or(trimmed);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid playback rate '{}'", s))?;
        PlaybackRate::ALL
            .iter()
            .copied()
            .find(|r| (r.as_f64() - value).abs() < 1e-9)
            .ok_or_else(|| {
                format!(
                    "unsupported playback rate '{}' (expected 0.25, 0.5, 0.75, 1, 1.25, 1.5 or 2)",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_ascending() {
        let values: Vec<f64> = PlaybackRate::ALL.iter().map(|r| r.as_f64()).collect();
        assert_eq!(values, vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0]);
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(PlaybackRate::default(), PlaybackRate::Normal);
        assert_eq!(PlaybackRate::default().as_f64(), 1.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("0.25".parse::<PlaybackRate>(), Ok(PlaybackRate::Quarter));
        assert_eq!("1.5x".parse::<PlaybackRate>(), Ok(PlaybackRate::OneAndHalf));
        assert_eq!(" 2X ".parse::<PlaybackRate>(), Ok(PlaybackRate::Double));
        assert_eq!("1".parse::<PlaybackRate>(), Ok(PlaybackRate::Normal));
    }

    #[test]
    fn test_parse_rejects_other_values() {
        assert!("3".parse::<PlaybackRate>().is_err());
        assert!("fast".parse::<PlaybackRate>().is_err());
        assert!("0".parse::<PlaybackRate>().is_err());
    }

    #[test]
    fn test_labels_round_trip() {
        for rate in PlaybackRate::ALL {
            assert_eq!(rate.label().parse::<PlaybackRate>(), Ok(rate));
        }
    }
}
