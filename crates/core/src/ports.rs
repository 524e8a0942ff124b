//! Seams between the workflow and the outside world.
//!
//! The service depends only on these traits; `scn-db` provides Postgres
//! implementations and [`crate::memory`] provides in-process ones.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CoreError;
use crate::event::NoticeEvent;
use crate::notice::{NewNotice, Notice, Supplier};
use crate::status::NoticeStatus;
use crate::types::DbId;

/// Optional filters for listing notices. `None` means "any".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticeFilter {
    pub status: Option<NoticeStatus>,
    pub category: Option<String>,
    pub supplier_id: Option<DbId>,
}

impl NoticeFilter {
    pub fn matches(&self, notice: &Notice) -> bool {
        self.status.map_or(true, |s| notice.status == s)
            && self
                .category
                .as_deref()
                .map_or(true, |c| notice.category == c)
            && self
                .supplier_id
                .map_or(true, |id| notice.assigned_supplier_id == id)
    }
}

/// Durable storage of notices.
#[async_trait]
pub trait NoticeStore: Send + Sync {
    /// Persist a new notice and return it with its assigned id.
    async fn insert(&self, notice: NewNotice) -> Result<Notice, CoreError>;

    /// Load one notice. Fails with [`CoreError::NotFound`].
    async fn load(&self, id: DbId) -> Result<Notice, CoreError>;

    /// Replace a notice if its stored version still equals `notice.version`.
    ///
    /// Returns the saved notice with its version incremented. A mismatch
    /// fails with [`CoreError::StaleState`] and leaves the stored copy as is.
    async fn save(&self, notice: &Notice) -> Result<Notice, CoreError>;

    /// Remove a notice and return its last state.
    async fn delete(&self, id: DbId) -> Result<Notice, CoreError>;

    /// Notices matching `filter`, newest first.
    async fn list(&self, filter: &NoticeFilter) -> Result<Vec<Notice>, CoreError>;
}

/// Lookup of supplier companies.
#[async_trait]
pub trait SupplierRegistry: Send + Sync {
    async fn find_supplier(&self, id: DbId) -> Result<Option<Supplier>, CoreError>;

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, CoreError>;
}

/// Receiver of domain events. Emission is fire-and-forget: a sink that
/// cannot deliver logs the failure and drops the event.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: NoticeEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::test_support::sample_notice;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(NoticeFilter::default().matches(&sample_notice()));
    }

    #[test]
    fn filters_combine() {
        let notice = sample_notice();
        let filter = NoticeFilter {
            status: Some(NoticeStatus::PendingPlan),
            category: Some("incoming_inspection".into()),
            supplier_id: Some(100),
        };
        assert!(filter.matches(&notice));

        let other_supplier = NoticeFilter {
            supplier_id: Some(200),
            ..filter.clone()
        };
        assert!(!other_supplier.matches(&notice));

        let other_status = NoticeFilter {
            status: Some(NoticeStatus::Completed),
            ..filter
        };
        assert!(!other_status.matches(&notice));
    }
}
