//! Container element, markup and styling for the playback
//!
//! # Usage
//!
//! ```rust
//! use kino_youtube::surface::{PlaybackStyle, RenderedFragment};
//!
//! let fragment = RenderedFragment::new("abc123", Some("https://cdn.example.com"));
//! assert!(fragment.html.contains(r#"id="ytabc123""#));
//! assert!(PlaybackStyle::generate(None).contains(".clappr-youtube-playback"));
//! ```

use crate::types::PointerEvents;
use serde::{Deserialize, Serialize};

/// Class applied to the playback container
pub const PLAYBACK_CLASS: &str = "clappr-youtube-playback";

/// Marker attribute on the playback container
pub const PLAYBACK_ATTRIBUTE: &str = "data-youtube-playback";

/// The host element the playback lives in
pub trait Surface: Send + Sync {
    /// Current container size in CSS pixels
    fn size(&self) -> (f64, f64);

    fn set_pointer_events(&self, mode: PointerEvents);

    /// Replace the container content with the fragment
    fn render(&self, fragment: &RenderedFragment);
}

/// Adapter-scoped stylesheet
pub struct PlaybackStyle;

impl PlaybackStyle {
    /// Token replaced with the configured base URL
    pub const BASE_URL_TOKEN: &'static str = "<%=baseUrl%>";

    const TEMPLATE: &'static str = r#"[data-youtube-playback].clappr-youtube-playback {
  --kino-youtube-assets: url("<%=baseUrl%>");
  position: absolute;
  top: 0;
  left: 0;
  height: 100%;
  width: 100%;
  display: block;
  pointer-events: none;
  background: #000;
}

[data-youtube-playback].clappr-youtube-playback iframe {
  height: 100%;
  width: 100%;
  border: 0;
}
"#;

    /// Generate the stylesheet for a base URL
    pub fn generate(base_url: Option<&str>) -> String {
        Self::TEMPLATE.replace(Self::BASE_URL_TOKEN, base_url.unwrap_or(""))
    }
}

/// Markup and styles produced by a render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFragment {
    /// Container id (the playback cid)
    pub id: String,
    pub html: String,
    pub css: String,
}

impl RenderedFragment {
    pub fn new(cid: &str, base_url: Option<&str>) -> Self {
        let html = format!(
            r#"<div {attr}="" class="{class}" id="{cid}"><div id="{embed}"></div></div>"#,
            attr = PLAYBACK_ATTRIBUTE,
            class = PLAYBACK_CLASS,
            cid = cid,
            embed = embed_container_id(cid),
        );
        Self {
            id: cid.to_string(),
            html,
            css: PlaybackStyle::generate(base_url),
        }
    }
}

/// Id of the element the embed replaces
pub fn embed_container_id(cid: &str) -> String {
    format!("yt{}", cid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_markup() {
        let fragment = RenderedFragment::new("c42", None);
        assert_eq!(fragment.id, "c42");
        assert!(fragment.html.contains(r#"data-youtube-playback="""#));
        assert!(fragment.html.contains(r#"class="clappr-youtube-playback""#));
        assert!(fragment.html.contains(r#"id="c42""#));
        assert!(fragment.html.contains(r#"<div id="ytc42"></div>"#));
    }

    #[test]
    fn test_style_base_url() {
        let css = PlaybackStyle::generate(Some("https://cdn.example.com/kino"));
        assert!(css.contains(r#"url("https://cdn.example.com/kino")"#));
        assert!(!css.contains(PlaybackStyle::BASE_URL_TOKEN));

        let css = PlaybackStyle::generate(None);
        assert!(css.contains(r#"url("")"#));
    }

    #[test]
    fn test_embed_container_id() {
        assert_eq!(embed_container_id("abc"), "ytabc");
    }
}
