//! Process-wide log fan-out.
//!
//! The [`LogBroadcaster`] decouples scan progress from presentation: the
//! orchestrator publishes human-readable lines and any number of live
//! subscribers (SSE connections, tests) receive them. Publishing never
//! blocks on slow or absent subscribers.

use tokio::sync::broadcast;

/// Buffered messages per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 256;

/// A fan-out channel for scan progress messages.
///
/// Cloning is cheap and every clone publishes into the same channel, so one
/// broadcaster can be shared between concurrent runs. Subscribers register
/// with [`subscribe`](Self::subscribe) and unregister by dropping the
/// receiver; a subscriber that falls behind loses its oldest entries rather
/// than delaying the publisher.
#[derive(Debug, Clone)]
pub struct LogBroadcaster {
    sender: broadcast::Sender<String>,
}

impl LogBroadcaster {
    /// Creates a broadcaster with the default per-subscriber buffer.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Delivers `message` to every currently registered subscriber.
    ///
    /// Best-effort: with zero subscribers the message is simply dropped.
    /// The line is also mirrored to the process log.
    pub fn publish(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        let _ = self.sender.send(message);
    }

    /// Registers a new subscriber.
    ///
    /// The receiver only observes messages published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_does_not_fail() {
        let log = LogBroadcaster::new();
        log.publish("nobody is listening");
        assert_eq!(log.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn all_subscribers_receive_each_message() {
        let log = LogBroadcaster::new();
        let mut first = log.subscribe();
        let mut second = log.subscribe();

        log.publish("hello");

        assert_eq!(first.recv().await.unwrap(), "hello");
        assert_eq!(second.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn dropped_subscriber_does_not_affect_others() {
        let log = LogBroadcaster::new();
        let first = log.subscribe();
        let mut second = log.subscribe();

        drop(first);
        log.publish("still here");

        assert_eq!(second.recv().await.unwrap(), "still here");
        assert_eq!(log.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn subscriber_only_sees_messages_after_registration() {
        let log = LogBroadcaster::new();
        log.publish("before");

        let mut late = log.subscribe();
        log.publish("after");

        assert_eq!(late.recv().await.unwrap(), "after");
    }

    #[tokio::test]
    async fn clones_publish_into_the_same_channel() {
        let log = LogBroadcaster::new();
        let clone = log.clone();
        let mut rx = log.subscribe();

        clone.publish("from clone");
        assert_eq!(rx.recv().await.unwrap(), "from clone");
    }
}
