//! Repository for the `notices` table.

use scn_core::notice::{NewNotice, Notice};
use scn_core::ports::NoticeFilter;
use scn_core::types::DbId;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::notice::NoticeRow;

/// Column list for `notices` SELECT / RETURNING clauses.
const COLUMNS: &str = "\
    id, notice_code, category, title, assigned_supplier_id, \
    assigned_supplier_name, status, is_reviewed, sd_notice, history, \
    likes, version, created_at, updated_at";

/// Provides CRUD operations for notices.
pub struct NoticeRepo;

impl NoticeRepo {
    /// Insert a new notice at version 1 with an empty history.
    pub async fn insert(pool: &PgPool, notice: &NewNotice) -> Result<NoticeRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notices \
                (notice_code, category, title, assigned_supplier_id, \
                 assigned_supplier_name, status, sd_notice, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoticeRow>(&query)
            .bind(&notice.notice_code)
            .bind(&notice.category)
            .bind(&notice.title)
            .bind(notice.assigned_supplier_id)
            .bind(&notice.assigned_supplier_name)
            .bind(notice.status.as_str())
            .bind(Json(&notice.sd_notice))
            .bind(notice.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a notice by its internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<NoticeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notices WHERE id = $1");
        sqlx::query_as::<_, NoticeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite every mutable column if the stored version still matches.
    ///
    /// Returns `None` when the row is missing or its version moved on; use
    /// [`NoticeRepo::exists`] to tell the two apart.
    pub async fn update_if_version(
        pool: &PgPool,
        notice: &Notice,
    ) -> Result<Option<NoticeRow>, sqlx::Error> {
        let likes: Vec<DbId> = notice.likes.iter().copied().collect();
        let query = format!(
            "UPDATE notices SET \
                category = $3, title = $4, assigned_supplier_id = $5, \
                assigned_supplier_name = $6, status = $7, is_reviewed = $8, \
                sd_notice = $9, history = $10, likes = $11, updated_at = $12, \
                version = version + 1 \
             WHERE id = $1 AND version = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoticeRow>(&query)
            .bind(notice.id)
            .bind(notice.version)
            .bind(&notice.category)
            .bind(&notice.title)
            .bind(notice.assigned_supplier_id)
            .bind(&notice.assigned_supplier_name)
            .bind(notice.status.as_str())
            .bind(notice.is_reviewed)
            .bind(Json(&notice.sd_notice))
            .bind(Json(&notice.history))
            .bind(likes)
            .bind(notice.updated_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM notices WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a notice, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<NoticeRow>, sqlx::Error> {
        let query = format!("DELETE FROM notices WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, NoticeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List notices matching the filter, newest first.
    pub async fn list(pool: &PgPool, filter: &NoticeFilter) -> Result<Vec<NoticeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notices \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR category = $2) \
               AND ($3::bigint IS NULL OR assigned_supplier_id = $3) \
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, NoticeRow>(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.category.as_deref())
            .bind(filter.supplier_id)
            .fetch_all(pool)
            .await
    }
}
