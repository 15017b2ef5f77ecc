//! Core playback model - frame rate, state machine, ticking, player
//!
//! Independent of egui. The media layer plugs in through
//! [`player::MediaEngine`], the UI through [`player::DrawSurface`].

pub mod event_bus;
pub mod events;
pub mod frame_rate;
pub mod playback;
pub mod player;
pub mod rate;
pub mod resource;
pub mod ticker;

pub use event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use frame_rate::{FrameRate, detect_frame_rate};
pub use playback::{PlaybackInput, PlaybackState};
pub use player::{DrawSurface, MediaEngine, Player, seek_target};
pub use rate::PlaybackRate;
pub use resource::{ResourceBinder, ResourceHandle};
pub use ticker::{TickScheduler, TickTask};
