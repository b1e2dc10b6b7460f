//! Playback event emission
//!
//! The adapter reports everything it observes as a [`PlaybackEvent`] pushed
//! into an [`EventSink`]. [`EventBus`] is the stock sink: it stamps each
//! event with a sequence number and time and fans it out to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Events emitted by a playback, named after the host's event vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Ready sequence completed
    Ready,
    Buffering,
    BufferFull,
    Play,
    Pause,
    Ended,
    /// Buffered span
    Progress {
        start: f64,
        current: f64,
        total: f64,
    },
    /// Playback position
    TimeUpdate {
        current: f64,
        total: f64,
    },
    /// Playback type changed; the host should re-read the settings
    SettingsUpdate,
    HighDefinitionUpdate {
        in_use: bool,
    },
    MediaControlEnable,
    MediaControlDisable,
}

impl PlaybackEvent {
    /// Host event name
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::Ready => "playback:ready",
            PlaybackEvent::Buffering => "playback:buffering",
            PlaybackEvent::BufferFull => "playback:bufferfull",
            PlaybackEvent::Play => "playback:play",
            PlaybackEvent::Pause => "playback:pause",
            PlaybackEvent::Ended => "playback:ended",
            PlaybackEvent::Progress { .. } => "playback:progress",
            PlaybackEvent::TimeUpdate { .. } => "playback:timeupdate",
            PlaybackEvent::SettingsUpdate => "playback:settingsupdate",
            PlaybackEvent::HighDefinitionUpdate { .. } => "playback:highdefinitionupdate",
            PlaybackEvent::MediaControlEnable => "playback:mediacontrol:enable",
            PlaybackEvent::MediaControlDisable => "playback:mediacontrol:disable",
        }
    }

    /// Periodic events raised by the polling timers
    pub fn is_periodic(&self) -> bool {
        matches!(
            self,
            PlaybackEvent::Progress { .. } | PlaybackEvent::TimeUpdate { .. }
        )
    }
}

/// Observer the adapter reports to.
///
/// `emit` is called synchronously with no adapter lock held; implementations
/// may query the playback that emitted the event.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PlaybackEvent);
}

/// Event with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackEventRecord {
    /// Sequence number, starting at 1
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

/// Broadcast event bus.
///
/// Events published with no subscribers are dropped. Slow subscribers get
/// `RecvError::Lagged` instead of blocking the playback.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<PlaybackEventRecord>,
    sequence: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEventRecord> {
        self.tx.subscribe()
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: PlaybackEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.tx.send(PlaybackEventRecord {
            sequence,
            timestamp: Utc::now(),
            event,
        });
    }
}
