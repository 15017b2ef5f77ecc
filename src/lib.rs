//! framestep - side-by-side frame stepping over two video decode paths
//!
//! Re-exports all modules for use by the binary target.

// Core playback model (frame rate, state machine, player)
pub mod core;

// Decoding (FFmpeg stream, frame sources, media element)
pub mod media;

// App modules
pub mod cli;
pub mod config;
pub mod ui;

pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use core::player::{MediaEngine, Player};
pub use media::{MediaError, SourceFile, VideoMetadata};
