//! Core types for Kino YouTube

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an adapter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackId(pub Uuid);

impl PlaybackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlaybackId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Adapter lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Constructed, nothing requested yet
    Uninitialized,
    /// Waiting for the iframe API script
    ApiLoading,
    /// Embed constructed, waiting for its ready callback
    PlayerEmbedding,
    /// Ready sequence completed
    Ready,
    Playing,
    Paused,
    Buffering,
    Ended,
}

impl LifecycleState {
    /// Playback states are only reachable after the ready sequence
    pub fn is_playback(&self) -> bool {
        matches!(
            self,
            LifecycleState::Playing
                | LifecycleState::Paused
                | LifecycleState::Buffering
                | LifecycleState::Ended
        )
    }

    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        use LifecycleState::*;
        if target.is_playback() {
            return *self == Ready || self.is_playback();
        }
        matches!(
            (self, target),
            (Uninitialized, ApiLoading) |
            (ApiLoading, Ready) |
            (Ready, Ready) |
            (Ready, PlayerEmbedding) |
            (PlayerEmbedding, Ready)
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::ApiLoading => write!(f, "api_loading"),
            LifecycleState::PlayerEmbedding => write!(f, "player_embedding"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Playing => write!(f, "playing"),
            LifecycleState::Paused => write!(f, "paused"),
            LifecycleState::Buffering => write!(f, "buffering"),
            LifecycleState::Ended => write!(f, "ended"),
        }
    }
}

/// Media stream classification used by the host to adjust its controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackType {
    Vod,
    Live,
}

impl std::fmt::Display for PlaybackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackType::Vod => write!(f, "vod"),
            PlaybackType::Live => write!(f, "live"),
        }
    }
}

/// Control layout advertised to the host's media control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSettings {
    /// Bumped every time the detected playback type changes
    pub change_count: u32,
    pub seek_enabled: bool,
    pub left: Vec<String>,
    pub default: Vec<String>,
    pub right: Vec<String>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        let names = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            change_count: 0,
            seek_enabled: true,
            left: names(&["playpause", "position", "duration"]),
            default: names(&["seekbar"]),
            right: names(&["fullscreen", "volume", "hd-indicator"]),
        }
    }
}

/// Pointer-event mode applied to the adapter's container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvents {
    /// Container receives pointer input (media control disabled)
    Auto,
    /// Input passes through to the host's media control
    None,
}

impl PointerEvents {
    pub fn as_css(&self) -> &'static str {
        match self {
            PointerEvents::Auto => "auto",
            PointerEvents::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_startup_path() {
        use LifecycleState::*;
        assert!(Uninitialized.can_transition_to(ApiLoading));
        assert!(ApiLoading.can_transition_to(Ready));
        assert!(Ready.can_transition_to(PlayerEmbedding));
        assert!(PlayerEmbedding.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Playing));
    }

    #[test]
    fn test_lifecycle_playback_requires_ready() {
        use LifecycleState::*;
        for target in [Playing, Paused, Buffering, Ended] {
            assert!(!Uninitialized.can_transition_to(target));
            assert!(!ApiLoading.can_transition_to(target));
            assert!(!PlayerEmbedding.can_transition_to(target));
        }
    }

    #[test]
    fn test_lifecycle_playback_states_interchange() {
        use LifecycleState::*;
        assert!(Playing.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Buffering));
        assert!(Buffering.can_transition_to(Ended));
        assert!(Ended.can_transition_to(Playing));
        assert!(!Playing.can_transition_to(ApiLoading));
        assert!(!Paused.can_transition_to(Uninitialized));
    }

    #[test]
    fn test_default_settings() {
        let settings = PlaybackSettings::default();
        assert_eq!(settings.change_count, 0);
        assert!(settings.seek_enabled);
        assert_eq!(settings.right, vec!["fullscreen", "volume", "hd-indicator"]);

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"changeCount\":0"));
        assert!(json.contains("\"seekEnabled\":true"));
    }

    #[test]
    fn test_playback_id_display_is_compact() {
        let id = PlaybackId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert!(!text.contains('-'));
    }
}
