//! Postgres implementations of the `scn_core` ports.

use async_trait::async_trait;
use scn_core::error::CoreError;
use scn_core::notice::{NewNotice, Notice, Supplier};
use scn_core::ports::{NoticeFilter, NoticeStore, SupplierRegistry};
use scn_core::types::DbId;

use crate::repositories::{NoticeRepo, SupplierRepo};
use crate::DbPool;

fn storage_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |e| {
        tracing::error!(error = %e, operation, "Database error");
        CoreError::Storage(format!("{operation} failed"))
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Notice",
        id,
    }
}

/// [`NoticeStore`] over the `notices` table.
#[derive(Clone)]
pub struct PgNoticeStore {
    pool: DbPool,
}

impl PgNoticeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoticeStore for PgNoticeStore {
    async fn insert(&self, notice: NewNotice) -> Result<Notice, CoreError> {
        NoticeRepo::insert(&self.pool, &notice)
            .await
            .map_err(storage_error("insert notice"))?
            .try_into()
    }

    async fn load(&self, id: DbId) -> Result<Notice, CoreError> {
        NoticeRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error("load notice"))?
            .ok_or_else(|| not_found(id))?
            .try_into()
    }

    async fn save(&self, notice: &Notice) -> Result<Notice, CoreError> {
        let updated = NoticeRepo::update_if_version(&self.pool, notice)
            .await
            .map_err(storage_error("save notice"))?;
        match updated {
            Some(row) => row.try_into(),
            None => {
                let exists = NoticeRepo::exists(&self.pool, notice.id)
                    .await
                    .map_err(storage_error("check notice"))?;
                if exists {
                    tracing::warn!(
                        notice_id = notice.id,
                        version = notice.version,
                        "Rejected stale notice write"
                    );
                    Err(CoreError::StaleState { id: notice.id })
                } else {
                    Err(not_found(notice.id))
                }
            }
        }
    }

    async fn delete(&self, id: DbId) -> Result<Notice, CoreError> {
        NoticeRepo::delete(&self.pool, id)
            .await
            .map_err(storage_error("delete notice"))?
            .ok_or_else(|| not_found(id))?
            .try_into()
    }

    async fn list(&self, filter: &NoticeFilter) -> Result<Vec<Notice>, CoreError> {
        NoticeRepo::list(&self.pool, filter)
            .await
            .map_err(storage_error("list notices"))?
            .into_iter()
            .map(Notice::try_from)
            .collect()
    }
}

/// [`SupplierRegistry`] over the `suppliers` table.
#[derive(Clone)]
pub struct PgSupplierRegistry {
    pool: DbPool,
}

impl PgSupplierRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupplierRegistry for PgSupplierRegistry {
    async fn find_supplier(&self, id: DbId) -> Result<Option<Supplier>, CoreError> {
        Ok(SupplierRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error("find supplier"))?
            .map(Supplier::from))
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, CoreError> {
        Ok(SupplierRepo::list(&self.pool)
            .await
            .map_err(storage_error("list suppliers"))?
            .into_iter()
            .map(Supplier::from)
            .collect())
    }
}
