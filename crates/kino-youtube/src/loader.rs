//! Iframe API script loading
//!
//! One [`ScriptLoader`] is shared by every playback on a page. It injects the
//! API script the first time any playback asks for it and holds the single
//! readiness signal all playbacks wait on.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Location of the YouTube iframe API
pub const IFRAME_API_URL: &str = "https://www.youtube.com/iframe_api";

/// Script element to append to the document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub script_type: String,
    pub is_async: bool,
}

impl ScriptTag {
    /// Tag for the iframe API
    pub fn iframe_api() -> Self {
        Self {
            src: IFRAME_API_URL.to_string(),
            script_type: "text/javascript".to_string(),
            is_async: true,
        }
    }

    /// Render as HTML
    pub fn to_html(&self) -> String {
        format!(
            r#"<script type="{}"{} src="{}"></script>"#,
            self.script_type,
            if self.is_async { r#" async="async""# } else { "" },
            self.src
        )
    }
}

/// Document access used to inject the script
pub trait ScriptInjector: Send + Sync {
    fn inject(&self, tag: &ScriptTag);
}

struct LoaderInner {
    injector: Arc<dyn ScriptInjector>,
    injected: Mutex<bool>,
    ready_tx: watch::Sender<bool>,
}

/// Shared loader for the iframe API
#[derive(Clone)]
pub struct ScriptLoader {
    inner: Arc<LoaderInner>,
}

impl ScriptLoader {
    pub fn new(injector: Arc<dyn ScriptInjector>) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoaderInner {
                injector,
                injected: Mutex::new(false),
                ready_tx,
            }),
        }
    }

    /// Inject the API script unless a previous call already did.
    ///
    /// Returns true if this call injected it.
    pub fn ensure_injected(&self) -> bool {
        let mut injected = self.inner.injected.lock();
        if *injected {
            debug!("Iframe API script already injected");
            return false;
        }
        let tag = ScriptTag::iframe_api();
        info!(src = %tag.src, "Injecting iframe API script");
        self.inner.injector.inject(&tag);
        *injected = true;
        true
    }

    pub fn is_injected(&self) -> bool {
        *self.inner.injected.lock()
    }

    /// Signal that the API finished loading (`onYouTubeIframeAPIReady`).
    ///
    /// Only the first call has an effect.
    pub fn mark_ready(&self) {
        let changed = self.inner.ready_tx.send_if_modified(|ready| {
            let was_ready = *ready;
            *ready = true;
            !was_ready
        });
        if changed {
            info!("Iframe API ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready_tx.borrow()
    }

    /// Wait until the API is ready; returns immediately if it already is
    pub async fn ready(&self) {
        let mut rx = self.inner.ready_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl std::fmt::Debug for ScriptLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptLoader")
            .field("injected", &self.is_injected())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingInjector {
        tags: Mutex<Vec<ScriptTag>>,
    }

    impl ScriptInjector for CountingInjector {
        fn inject(&self, tag: &ScriptTag) {
            self.tags.lock().push(tag.clone());
        }
    }

    #[test]
    fn test_injects_once() {
        let injector = Arc::new(CountingInjector::default());
        let loader = ScriptLoader::new(injector.clone());
        let other = loader.clone();

        assert!(loader.ensure_injected());
        assert!(!loader.ensure_injected());
        assert!(!other.ensure_injected());

        let tags = injector.tags.lock();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0], ScriptTag::iframe_api());
    }

    #[test]
    fn test_script_tag_html() {
        let html = ScriptTag::iframe_api().to_html();
        assert_eq!(
            html,
            r#"<script type="text/javascript" async="async" src="https://www.youtube.com/iframe_api"></script>"#
        );
    }

    #[tokio::test]
    async fn test_ready_wakes_waiters() {
        let loader = ScriptLoader::new(Arc::new(CountingInjector::default()));
        assert!(!loader.is_ready());

        let waiter = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.ready().await })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        loader.mark_ready();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert!(loader.is_ready());
    }

    #[tokio::test]
    async fn test_ready_when_already_loaded() {
        let loader = ScriptLoader::new(Arc::new(CountingInjector::default()));
        loader.mark_ready();
        loader.mark_ready();
        tokio::time::timeout(Duration::from_millis(10), loader.ready())
            .await
            .expect("already ready");
    }
}
