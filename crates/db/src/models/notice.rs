//! Mapping between the `notices` table and the core [`Notice`] aggregate.

use std::collections::BTreeSet;

use scn_core::error::CoreError;
use scn_core::history::History;
use scn_core::notice::{Notice, SdNotice};
use scn_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `notices` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoticeRow {
    pub id: DbId,
    pub notice_code: String,
    pub category: String,
    pub title: String,
    pub assigned_supplier_id: DbId,
    pub assigned_supplier_name: String,
    pub status: String,
    pub is_reviewed: bool,
    pub sd_notice: Json<SdNotice>,
    pub history: Json<History>,
    pub likes: Vec<DbId>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<NoticeRow> for Notice {
    type Error = CoreError;

    fn try_from(row: NoticeRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            CoreError::Storage(format!(
                "Notice {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(Notice {
            id: row.id,
            notice_code: row.notice_code,
            category: row.category,
            title: row.title,
            assigned_supplier_id: row.assigned_supplier_id,
            assigned_supplier_name: row.assigned_supplier_name,
            status,
            is_reviewed: row.is_reviewed,
            sd_notice: row.sd_notice.0,
            history: row.history.0,
            likes: row.likes.into_iter().collect::<BTreeSet<_>>(),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
