//! Adapter configuration
//!
//! Mirrors the option names the host player passes to playbacks
//! (`videoQuality`, `youtubeShowRelated`, `autoPlay`, ...), so a host can
//! forward its JSON options untouched.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Embed width or height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    /// Absolute size in pixels
    Pixels(u32),
    /// Any CSS length, e.g. `100%`
    Css(String),
}

impl Dimension {
    /// Fill the container
    pub fn fill() -> Self {
        Dimension::Css("100%".to_string())
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{}", px),
            Dimension::Css(value) => write!(f, "{}", value),
        }
    }
}

/// Configuration for a YouTube playback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedConfig {
    /// Source URL or bare video id
    pub src: String,
    /// Embed width (defaults to filling the container)
    #[serde(default)]
    pub width: Option<Dimension>,
    /// Embed height (defaults to filling the container)
    #[serde(default)]
    pub height: Option<Dimension>,
    /// Explicit quality, overrides any `vq` parameter in `src`
    #[serde(default)]
    pub video_quality: Option<String>,
    /// Show related videos when playback ends
    #[serde(default)]
    pub youtube_show_related: bool,
    /// Playlist id to attach to the embed
    #[serde(default)]
    pub youtube_playlist: Option<String>,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
    /// Mute as soon as the playback becomes ready
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub auto_play: bool,
    /// Base URL substituted into the adapter stylesheet
    #[serde(default)]
    pub base_url: Option<String>,
    /// Location of the hosting page; drives the embed `origin` parameter
    #[serde(default)]
    pub page_url: Option<Url>,
    /// Progress/time-update polling period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: None,
            height: None,
            video_quality: None,
            youtube_show_related: false,
            youtube_playlist: None,
            loop_playback: false,
            mute: false,
            auto_play: false,
            base_url: None,
            page_url: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl EmbedConfig {
    /// Create config for a source with default options
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Default::default()
        }
    }

    /// Config for a muted, auto-playing background video
    pub fn background(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mute: true,
            auto_play: true,
            loop_playback: true,
            ..Default::default()
        }
    }

    /// Parse and validate options forwarded by the host as JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.src.trim().is_empty() {
            return Err(Error::config("src must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::config("pollIntervalMs must be greater than zero"));
        }
        Ok(())
    }

    /// Polling period for the progress and time-update timers
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_from_json_host_options() {
        let json = r#"{
            "src": "https://youtu.be/dQw4w9WgXcQ",
            "width": 640,
            "height": "360px",
            "videoQuality": "hd1080",
            "youtubeShowRelated": true,
            "youtubePlaylist": "PL123",
            "loop": true,
            "mute": true,
            "autoPlay": true,
            "baseUrl": "https://cdn.example.com/assets",
            "pageUrl": "https://example.com/watch"
        }"#;

        let config = assert_ok!(EmbedConfig::from_json(json));
        assert_eq!(config.width, Some(Dimension::Pixels(640)));
        assert_eq!(config.height, Some(Dimension::Css("360px".into())));
        assert_eq!(config.video_quality.as_deref(), Some("hd1080"));
        assert!(config.youtube_show_related);
        assert_eq!(config.youtube_playlist.as_deref(), Some("PL123"));
        assert!(config.loop_playback);
        assert!(config.mute);
        assert!(config.auto_play);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.page_url.unwrap().host_str(), Some("example.com"));
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = assert_ok!(EmbedConfig::from_json(r#"{"src": "dQw4w9WgXcQ"}"#));
        assert!(config.width.is_none());
        assert!(!config.youtube_show_related);
        assert!(!config.auto_play);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_validation() {
        assert_err!(EmbedConfig::from_json(r#"{"src": "  "}"#));
        assert_err!(EmbedConfig::from_json(r#"{"width": 100}"#));
        assert_err!(EmbedConfig::from_json(r#"{"src": "x", "pollIntervalMs": 0}"#));
        assert_ok!(EmbedConfig::new("dQw4w9WgXcQ").validate());
    }

    #[test]
    fn test_background_preset() {
        let config = EmbedConfig::background("dQw4w9WgXcQ");
        assert!(config.mute);
        assert!(config.auto_play);
        assert!(config.loop_playback);
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::fill().to_string(), "100%");
        assert_eq!(Dimension::Pixels(480).to_string(), "480");
    }
}
