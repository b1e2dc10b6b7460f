//! Kino YouTube - YouTube iframe playback for Kino
//!
//! This crate lets a Kino player drive a hosted YouTube embed through the
//! same lifecycle and events it uses for native video:
//! - Source matching (`can_play`, video id and quality extraction)
//! - Shared iframe API loading
//! - Embed construction and control forwarding
//! - Progress and time-update polling
//! - Embed state changes mapped to playback events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Kino YouTube                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │    Script    │  │   Mediator   │  │   Surface    │          │
//! │  │    Loader    │  │   (resize)   │  │  (markup)    │          │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘          │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   YouTube   │──── polling timers           │
//! │                    │  Playback   │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐                              │
//! │  │  Embed API   │◄─┤    Event    │                              │
//! │  │  (YT.Player) │  │    Sink     │                              │
//! │  └──────────────┘  └─────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod source;
pub mod embed;
pub mod events;
pub mod loader;
pub mod mediator;
pub mod surface;
pub mod playback;

pub use error::{Error, Result};
pub use types::*;
pub use config::{Dimension, EmbedConfig};
pub use source::{can_play, find_video_id, find_video_quality, is_high_definition};
pub use embed::{
    EmbedApi, EmbedNotification, EmbedNotifier, EmbedOptions, EmbedPlayer, EmbedState, PlayerVars,
};
pub use events::{EventBus, EventSink, PlaybackEvent, PlaybackEventRecord};
pub use loader::{ScriptInjector, ScriptLoader, ScriptTag};
pub use mediator::{HostNotification, Mediator};
pub use surface::{PlaybackStyle, RenderedFragment, Surface};
pub use playback::{PlaybackContext, TimerStatus, YoutubePlayback, PLAYBACK_NAME};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "Kino YouTube initialized");
}
