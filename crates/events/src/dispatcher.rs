//! Event-to-topic routing.
//!
//! [`NotificationDispatcher`] subscribes to the event bus and, for every
//! event, publishes one [`DeliveryMessage`] to each recipient's direct topic
//! and one to the shared [`UPDATES_TOPIC`]. Delivery is best-effort: a
//! failed publish is logged and the remaining topics are still attempted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scn_core::event::{NoticeEvent, NoticeEventKind, UPDATES_TOPIC};
use scn_core::notice::Notice;
use scn_core::types::{DbId, Timestamp};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

/// Buffer size of each topic channel in [`TopicHub`].
const TOPIC_CAPACITY: usize = 256;

/// What subscribers of a topic receive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryMessage {
    /// Dot-separated event name, e.g. `"notice.plan_submitted"`.
    pub event_type: String,
    pub kind: NoticeEventKind,
    pub actor_id: DbId,
    pub notices: Vec<Notice>,
    pub timestamp: Timestamp,
}

impl From<&NoticeEvent> for DeliveryMessage {
    fn from(event: &NoticeEvent) -> Self {
        Self {
            event_type: event.event_type(),
            kind: event.kind,
            actor_id: event.actor_id,
            notices: event.notices.clone(),
            timestamp: event.timestamp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Topic '{0}' is unavailable")]
    Unavailable(String),

    #[error("Publish failed: {0}")]
    Transport(String),
}

/// A pub/sub transport the dispatcher hands messages to.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, message: &DeliveryMessage) -> Result<(), PublishError>;
}

/// In-process publisher: one broadcast channel per topic, created lazily
/// on first subscription.
#[derive(Default)]
pub struct TopicHub {
    topics: RwLock<HashMap<String, broadcast::Sender<DeliveryMessage>>>,
}

impl TopicHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<DeliveryMessage> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl Publisher for TopicHub {
    async fn publish(&self, topic: &str, message: &DeliveryMessage) -> Result<(), PublishError> {
        if let Some(sender) = self.topics.read().await.get(topic) {
            // No live receivers is not an error for a broadcast topic.
            let _ = sender.send(message.clone());
        }
        Ok(())
    }
}

/// Routes bus events to publisher topics.
pub struct NotificationDispatcher {
    publisher: Arc<dyn Publisher>,
}

impl NotificationDispatcher {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Run the routing loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<NoticeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event to every recipient topic and the updates topic.
    pub async fn dispatch(&self, event: &NoticeEvent) {
        let message = DeliveryMessage::from(event);
        let topics = event
            .recipients
            .iter()
            .map(|r| r.topic())
            .chain(std::iter::once(UPDATES_TOPIC.to_string()));

        for topic in topics {
            if let Err(e) = self.publisher.publish(&topic, &message).await {
                tracing::error!(
                    error = %e,
                    topic = %topic,
                    event_type = %message.event_type,
                    "Failed to deliver notice event"
                );
            }
        }
    }
}
