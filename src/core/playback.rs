//! Playback state machine
//!
//! Pure transition table, no I/O. The player feeds it media element events
//! (metadata loaded, play, pause, ended) and its own commands (seek, stop,
//! unload); everything that touches the engine or the screen lives in
//! [`crate::core::player`].
//!
//! ```text
//!   Idle --MetadataLoaded--> Ready --Play--> Playing --Ended--> Ended
//!                              |               |  ^                |
//!                              |        Pause/Seek/Stop           Play
//!                              |               v  |                |
//!                              +--Seek/Stop--> Paused <------------+
//! ```
//!
//! `Unload` returns every state to `Idle`. `Stop` and `Seek` always land in
//! `Paused`, so a seek never leaves playback running.

/// Lifecycle of one playback pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    /// No file loaded
    #[default]
    Idle,
    /// Metadata loaded, paused at the first frame
    Ready,
    /// Position advancing
    Playing,
    /// Paused by the user or by a seek
    Paused,
    /// Position reached the end of the media
    Ended,
}

/// Inputs driving [`PlaybackState::next`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackInput {
    /// Media element finished loading metadata
    MetadataLoaded,
    /// Media element started playing
    Play,
    /// Media element paused
    Pause,
    /// Programmatic seek (frame step or scrub)
    Seek,
    /// Media element reached the end
    Ended,
    /// Stop control: position reset to zero and paused
    Stop,
    /// File released
    Unload,
}

impl PlaybackState {
    /// Next state for `input`. Inputs that make no sense in a state leave it unchanged.
    pub fn next(self, input: PlaybackInput) -> PlaybackState {
        use PlaybackInput as I;
        use PlaybackState as S;

        match (self, input) {
            (_, I::Unload) => S::Idle,
            (_, I::MetadataLoaded) => S::Ready,
            (S::Idle, _) => S::Idle,

            (_, I::Play) => S::Playing,
            (S::Playing, I::Pause) => S::Paused,
            (state, I::Pause) => state,
            (_, I::Seek) | (_, I::Stop) => S::Paused,
            (_, I::Ended) => S::Ended,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// A file is loaded and the engine can take commands
    pub fn is_loaded(&self) -> bool {
        !matches!(self, PlaybackState::Idle)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Ready => "Ready",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Ended => "Ended",
        };
        f.write_str(name)
    }
}
