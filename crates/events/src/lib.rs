//! Notice event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, used by the service as its event sink.
//! - [`NotificationDispatcher`]: routes each event to per-recipient topics
//!   and the shared updates topic through a [`Publisher`].
//! - [`EventPersistence`]: background service that writes every event to
//!   the `notice_events` table.

pub mod bus;
pub mod dispatcher;
pub mod persistence;

pub use bus::EventBus;
pub use dispatcher::{DeliveryMessage, NotificationDispatcher, PublishError, Publisher, TopicHub};
pub use persistence::EventPersistence;
