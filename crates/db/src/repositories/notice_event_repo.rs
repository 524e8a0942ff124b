//! Repository for the `notice_events` table.

use scn_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateNoticeEvent, NoticeEventRow};

const COLUMNS: &str =
    "id, event_type, actor_id, notice_ids, recipients, payload, occurred_at, created_at";

/// Provides insert and query operations for persisted events.
pub struct NoticeEventRepo;

impl NoticeEventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn insert(pool: &PgPool, event: &CreateNoticeEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notice_events \
                (event_type, actor_id, notice_ids, recipients, payload, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&event.event_type)
        .bind(event.actor_id)
        .bind(&event.notice_ids)
        .bind(&event.recipients)
        .bind(&event.payload)
        .bind(event.occurred_at)
        .fetch_one(pool)
        .await
    }

    /// Events touching one notice, oldest first.
    pub async fn list_for_notice(
        pool: &PgPool,
        notice_id: DbId,
    ) -> Result<Vec<NoticeEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notice_events \
             WHERE $1 = ANY(notice_ids) \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, NoticeEventRow>(&query)
            .bind(notice_id)
            .fetch_all(pool)
            .await
    }
}
