//! Repository for the `suppliers` table.

use scn_core::types::DbId;
use sqlx::PgPool;

use crate::models::supplier::{CreateSupplier, SupplierRow};

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for suppliers.
pub struct SupplierRepo;

impl SupplierRepo {
    pub async fn create(pool: &PgPool, input: &CreateSupplier) -> Result<SupplierRow, sqlx::Error> {
        let query = format!("INSERT INTO suppliers (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, SupplierRow>(&query)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SupplierRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, SupplierRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all suppliers ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<SupplierRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers ORDER BY name");
        sqlx::query_as::<_, SupplierRow>(&query).fetch_all(pool).await
    }
}
