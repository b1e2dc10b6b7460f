//! Page-wide notifications shared by all playbacks

use tokio::sync::broadcast;

/// Notifications raised by the host player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostNotification {
    /// The player viewport changed size
    Resize,
}

/// Global notification bus. Clones share one channel.
#[derive(Debug, Clone)]
pub struct Mediator {
    tx: broadcast::Sender<HostNotification>,
}

impl Mediator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Tell every playback the viewport was resized
    pub fn resize(&self) {
        let _ = self.tx.send(HostNotification::Resize);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostNotification> {
        self.tx.subscribe()
    }
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resize_reaches_all_subscribers() {
        let mediator = Mediator::new();
        let mut a = mediator.subscribe();
        let mut b = mediator.clone().subscribe();

        mediator.resize();

        assert_eq!(a.recv().await.unwrap(), HostNotification::Resize);
        assert_eq!(b.recv().await.unwrap(), HostNotification::Resize);
    }

    #[test]
    fn test_resize_without_playbacks() {
        Mediator::default().resize();
    }
}
