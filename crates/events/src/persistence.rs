//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`NoticeEvent`] to the `notice_events` table.
//! It runs as a long-lived background task and exits when the bus is dropped.

use scn_core::event::NoticeEvent;
use scn_core::types::DbId;
use scn_db::models::event::CreateNoticeEvent;
use scn_db::repositories::NoticeEventRepo;
use scn_db::DbPool;
use tokio::sync::broadcast;

#[derive(Debug, thiserror::Error)]
enum PersistError {
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

/// Background service that persists notice events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<NoticeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type(),
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &NoticeEvent) -> Result<DbId, PersistError> {
        let row = CreateNoticeEvent::from_event(event)?;
        Ok(NoticeEventRepo::insert(pool, &row).await?)
    }
}
