//! Boundary with the YouTube iframe API
//!
//! The host implements [`EmbedApi`] on top of the global `YT.Player`
//! constructor. A created [`EmbedPlayer`] is a complete control surface: once
//! the adapter holds one, every method is callable.

use crate::config::Dimension;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Player states reported by the embed (`YT.PlayerState`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl EmbedState {
    /// Map a raw `YT.PlayerState` code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(EmbedState::Unstarted),
            0 => Some(EmbedState::Ended),
            1 => Some(EmbedState::Playing),
            2 => Some(EmbedState::Paused),
            3 => Some(EmbedState::Buffering),
            5 => Some(EmbedState::Cued),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            EmbedState::Unstarted => -1,
            EmbedState::Ended => 0,
            EmbedState::Playing => 1,
            EmbedState::Paused => 2,
            EmbedState::Buffering => 3,
            EmbedState::Cued => 5,
        }
    }
}

/// Handle to one constructed embed
pub trait EmbedPlayer: Send + Sync {
    fn play_video(&self);

    fn pause_video(&self);

    /// Seek to an absolute position in seconds
    fn seek_to(&self, seconds: f64);

    /// Total duration in seconds (0 until metadata loads)
    fn duration(&self) -> f64;

    fn current_time(&self) -> f64;

    /// Fraction of the video buffered, 0.0..=1.0
    fn loaded_fraction(&self) -> f64;

    fn player_state(&self) -> EmbedState;

    /// Current quality label, e.g. `hd720` or `medium`
    fn playback_quality(&self) -> String;

    /// Volume, 0..=100
    fn set_volume(&self, volume: f64);

    fn set_size(&self, width: f64, height: f64);
}

/// Factory for embeds, backed by the loaded iframe API
pub trait EmbedApi: Send + Sync {
    /// True once the global player constructor exists
    fn is_available(&self) -> bool;

    /// Construct a player bound to the element with `container_id`.
    ///
    /// The embed reports its callbacks through `notifier`.
    fn create_player(
        &self,
        container_id: &str,
        options: EmbedOptions,
        notifier: EmbedNotifier,
    ) -> Box<dyn EmbedPlayer>;
}

/// Callbacks raised by an embed
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedNotification {
    /// `onReady`
    Ready,
    /// `onStateChange` with the raw state code
    StateChange(i32),
    /// `onPlaybackQualityChange` with the new quality label
    QualityChange(String),
}

/// Sender half handed to [`EmbedApi::create_player`]
#[derive(Debug, Clone)]
pub struct EmbedNotifier {
    tx: mpsc::UnboundedSender<EmbedNotification>,
}

impl EmbedNotifier {
    /// Create a notifier and the receiver the adapter drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EmbedNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn ready(&self) {
        self.send(EmbedNotification::Ready);
    }

    pub fn state_change(&self, code: i32) {
        self.send(EmbedNotification::StateChange(code));
    }

    pub fn quality_change(&self, quality: impl Into<String>) {
        self.send(EmbedNotification::QualityChange(quality.into()));
    }

    fn send(&self, notification: EmbedNotification) {
        if self.tx.send(notification).is_err() {
            debug!("Embed notification dropped, playback is gone");
        }
    }
}

/// Query parameters passed to the embed (`playerVars`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlayerVars {
    pub controls: u8,
    pub autoplay: u8,
    pub disablekb: u8,
    pub enablejsapi: u8,
    pub iv_load_policy: u8,
    pub modestbranding: u8,
    pub showinfo: u8,
    pub html5: u8,
    pub playsinline: u8,
    /// Requested quality
    pub vq: String,
    /// Related videos at the end
    pub rel: u8,
    #[serde(rename = "loop")]
    pub loop_playback: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(rename = "listType", skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
}

impl PlayerVars {
    /// Forced parameters: autoplay and inline playback on; native controls,
    /// keyboard, annotations, related content and branding off.
    pub fn new(vq: impl Into<String>) -> Self {
        Self {
            controls: 0,
            autoplay: 1,
            disablekb: 1,
            enablejsapi: 1,
            iv_load_policy: 3,
            modestbranding: 1,
            showinfo: 0,
            html5: 1,
            playsinline: 1,
            vq: vq.into(),
            rel: 0,
            loop_playback: 0,
            origin: None,
            list_type: None,
            list: None,
        }
    }

    pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.list_type = Some("playlist".to_string());
        self.list = Some(playlist.into());
        self
    }

    /// Serialize as the JSON object the iframe API expects
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Everything needed to construct an embed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    pub width: Dimension,
    pub height: Dimension,
    pub video_id: String,
    pub player_vars: PlayerVars,
}

/// Origin parameter for a page location, omitted for local protocols
pub fn page_origin(page: &url::Url) -> Option<String> {
    match page.scheme() {
        "file" | "app" => None,
        _ => Some(page.origin().ascii_serialization()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_state_codes() {
        for state in [
            EmbedState::Unstarted,
            EmbedState::Ended,
            EmbedState::Playing,
            EmbedState::Paused,
            EmbedState::Buffering,
            EmbedState::Cued,
        ] {
            assert_eq!(EmbedState::from_code(state.code()), Some(state));
        }
        assert_eq!(EmbedState::from_code(4), None);
        assert_eq!(EmbedState::from_code(42), None);
    }

    #[test]
    fn test_player_vars_defaults() {
        let json = PlayerVars::new("auto").to_json().unwrap();
        assert_eq!(json["controls"], 0);
        assert_eq!(json["autoplay"], 1);
        assert_eq!(json["playsinline"], 1);
        assert_eq!(json["modestbranding"], 1);
        assert_eq!(json["iv_load_policy"], 3);
        assert_eq!(json["vq"], "auto");
        assert_eq!(json["loop"], 0);
        assert!(json.get("origin").is_none());
        assert!(json.get("listType").is_none());
        assert!(json.get("list").is_none());
    }

    #[test]
    fn test_player_vars_playlist() {
        let json = PlayerVars::new("hd720").with_playlist("PL123").to_json().unwrap();
        assert_eq!(json["listType"], "playlist");
        assert_eq!(json["list"], "PL123");
    }

    #[test]
    fn test_page_origin() {
        let page = Url::parse("https://example.com:8443/videos/1?x=y").unwrap();
        assert_eq!(page_origin(&page).as_deref(), Some("https://example.com:8443"));

        let page = Url::parse("http://localhost/index.html").unwrap();
        assert_eq!(page_origin(&page).as_deref(), Some("http://localhost"));

        let page = Url::parse("file:///home/user/player.html").unwrap();
        assert_eq!(page_origin(&page), None);

        let page = Url::parse("app://kino/index.html").unwrap();
        assert_eq!(page_origin(&page), None);
    }

    #[tokio::test]
    async fn test_notifier_delivers_in_order() {
        let (notifier, mut rx) = EmbedNotifier::channel();
        notifier.ready();
        notifier.state_change(1);
        notifier.quality_change("hd720");

        assert_eq!(rx.recv().await, Some(EmbedNotification::Ready));
        assert_eq!(rx.recv().await, Some(EmbedNotification::StateChange(1)));
        assert_eq!(
            rx.recv().await,
            Some(EmbedNotification::QualityChange("hd720".into()))
        );
    }

    #[test]
    fn test_notifier_after_receiver_dropped() {
        let (notifier, rx) = EmbedNotifier::channel();
        drop(rx);
        notifier.state_change(2);
    }
}
