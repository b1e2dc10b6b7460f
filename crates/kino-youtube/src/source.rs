//! Source matching for YouTube URLs
//!
//! Stateless helpers used by the host to pick this adapter for a source and
//! by the adapter to derive embed parameters from it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches every supported YouTube URL shape. The final `id` group holds the
/// candidate video id. Host dots are literal and `\w` is ASCII-only.
static YT_URL_PARSER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^.*((youtu\.be/)|(youtube\.com/v/)|(youtube\.com/u/(?-u:\w)/)|(youtube\.com/embed/)|(youtube\.com/watch\?)|(feature=player_embedded&))\??v?=?(?P<id>[^#&?]*).*",
    )
    .expect("static regex")
});

static VIDEO_QUALITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]vq=([^#&?]+)").expect("static regex"));

static HD_QUALITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^hd\d+").expect("static regex"));

/// Length of a YouTube video id
pub const VIDEO_ID_LEN: usize = 11;

/// Quality requested when neither the config nor the URL names one
pub const DEFAULT_QUALITY: &str = "auto";

/// Returns true if `source` is a YouTube URL this adapter can play.
///
/// Accepted shapes:
/// - `https://youtu.be/ID`
/// - `https://www.youtube.com/watch?v=ID`
/// - `https://www.youtube.com/embed/ID`
/// - `https://www.youtube.com/v/ID`
/// - `https://www.youtube.com/u/x/ID`
/// - `...?feature=player_embedded&v=ID`
pub fn can_play(source: &str) -> bool {
    YT_URL_PARSER.is_match(source)
}

/// Extract the video id from a source.
///
/// Returns the captured id when it is exactly [`VIDEO_ID_LEN`] characters
/// long; otherwise the source is assumed to already be an id and is returned
/// unchanged (the provider rejects it if it is not).
pub fn find_video_id(source: &str) -> &str {
    YT_URL_PARSER
        .captures(source)
        .and_then(|caps| caps.name("id"))
        .map(|id| id.as_str())
        .filter(|id| id.chars().count() == VIDEO_ID_LEN)
        .unwrap_or(source)
}

/// Extract the `vq` quality parameter from a source URL, defaulting to `auto`
pub fn find_video_quality(source: &str) -> &str {
    VIDEO_QUALITY
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_QUALITY)
}

/// True if a playback quality label denotes HD (`hd720`, `hd1080`, ...)
pub fn is_high_definition(quality: &str) -> bool {
    HD_QUALITY.is_match(quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_can_play_supported_shapes() {
        let sources = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/u/1/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=player_embedded&v=dQw4w9WgXcQ",
        ];

        for source in sources {
            assert!(can_play(source), "expected playable: {}", source);
            assert_eq!(find_video_id(source), ID, "id from {}", source);
        }
    }

    #[test]
    fn test_can_play_rejects_unrelated() {
        assert!(!can_play("not-a-url"));
        assert!(!can_play("https://vimeo.com/123456"));
        assert!(!can_play("https://example.com/master.m3u8"));
        assert!(!can_play(""));
    }

    #[test]
    fn test_can_play_is_strict_about_host_and_user_segment() {
        assert!(can_play("https://www.youtube.com/u/7/dQw4w9WgXcQ"));
        assert!(!can_play("https://www.youtube.com/u/é/dQw4w9WgXcQ"));
        assert!(!can_play("https://youtuxbe/dQw4w9WgXcQ"));
    }

    #[test]
    fn test_video_id_ignores_trailing_params() {
        assert_eq!(
            find_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s#comments"),
            ID
        );
        assert_eq!(find_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"), ID);
    }

    #[test]
    fn test_video_id_falls_back_to_input() {
        assert_eq!(find_video_id("not-a-url"), "not-a-url");
        assert_eq!(find_video_id(ID), ID);
        // Wrong-length capture
        assert_eq!(
            find_video_id("https://youtu.be/short"),
            "https://youtu.be/short"
        );
        // Playlist-only watch URL has no 11-character id
        let list = "https://www.youtube.com/watch?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG";
        assert_eq!(find_video_id(list), list);
    }

    #[test]
    fn test_video_quality() {
        assert_eq!(find_video_quality("https://www.youtube.com/watch?v=dQw4w9WgXcQ&vq=hd720"), "hd720");
        assert_eq!(find_video_quality("https://youtu.be/dQw4w9WgXcQ?vq=small#t"), "small");
        assert_eq!(find_video_quality("https://youtu.be/dQw4w9WgXcQ"), "auto");
        // Parameter name must be exactly vq
        assert_eq!(find_video_quality("https://youtu.be/dQw4w9WgXcQ?xvq=hd720"), "auto");
    }

    #[test]
    fn test_high_definition_labels() {
        assert!(is_high_definition("hd720"));
        assert!(is_high_definition("hd1080"));
        assert!(!is_high_definition("hd"));
        assert!(!is_high_definition("large"));
        assert!(!is_high_definition("highres"));
        assert!(!is_high_definition(""));
    }
}
