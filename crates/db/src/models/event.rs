//! Rows of the `notice_events` log.

use scn_core::event::NoticeEvent;
use scn_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notice_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NoticeEventRow {
    pub id: DbId,
    pub event_type: String,
    pub actor_id: DbId,
    pub notice_ids: Vec<DbId>,
    pub recipients: serde_json::Value,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

/// Flattened form of a [`NoticeEvent`] ready for insertion.
#[derive(Debug, Clone)]
pub struct CreateNoticeEvent {
    pub event_type: String,
    pub actor_id: DbId,
    pub notice_ids: Vec<DbId>,
    pub recipients: serde_json::Value,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
}

impl CreateNoticeEvent {
    pub fn from_event(event: &NoticeEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: event.event_type(),
            actor_id: event.actor_id,
            notice_ids: event.notices.iter().map(|n| n.id).collect(),
            recipients: serde_json::to_value(&event.recipients)?,
            payload: serde_json::to_value(&event.notices)?,
            occurred_at: event.timestamp,
        })
    }
}
