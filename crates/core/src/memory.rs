//! In-process implementations of the ports.
//!
//! Used by the API when no `DATABASE_URL` is configured and by tests. State
//! lives behind `tokio::sync::RwLock`; nothing survives a restart.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::event::NoticeEvent;
use crate::notice::{NewNotice, Notice, Supplier};
use crate::ports::{EventSink, NoticeFilter, NoticeStore, SupplierRegistry};
use crate::types::DbId;

#[derive(Default)]
struct StoreState {
    next_id: DbId,
    notices: BTreeMap<DbId, Notice>,
}

/// Notice store backed by a map, with the same version check as Postgres.
#[derive(Default)]
pub struct MemoryNoticeStore {
    state: RwLock<StoreState>,
}

impl MemoryNoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notices.
    pub async fn len(&self) -> usize {
        self.state.read().await.notices.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NoticeStore for MemoryNoticeStore {
    async fn insert(&self, notice: NewNotice) -> Result<Notice, CoreError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let notice = notice.into_notice(state.next_id);
        state.notices.insert(notice.id, notice.clone());
        Ok(notice)
    }

    async fn load(&self, id: DbId) -> Result<Notice, CoreError> {
        self.state
            .read()
            .await
            .notices
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "Notice",
                id,
            })
    }

    async fn save(&self, notice: &Notice) -> Result<Notice, CoreError> {
        let mut state = self.state.write().await;
        let stored = state.notices.get_mut(&notice.id).ok_or(CoreError::NotFound {
            entity: "Notice",
            id: notice.id,
        })?;
        if stored.version != notice.version {
            return Err(CoreError::StaleState { id: notice.id });
        }
        let mut saved = notice.clone();
        saved.version += 1;
        *stored = saved.clone();
        Ok(saved)
    }

    async fn delete(&self, id: DbId) -> Result<Notice, CoreError> {
        self.state
            .write()
            .await
            .notices
            .remove(&id)
            .ok_or(CoreError::NotFound {
                entity: "Notice",
                id,
            })
    }

    async fn list(&self, filter: &NoticeFilter) -> Result<Vec<Notice>, CoreError> {
        let state = self.state.read().await;
        Ok(state
            .notices
            .values()
            .rev()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect())
    }
}

/// Fixed supplier directory.
#[derive(Default)]
pub struct MemorySupplierRegistry {
    suppliers: RwLock<BTreeMap<DbId, Supplier>>,
}

impl MemorySupplierRegistry {
    pub fn new(suppliers: impl IntoIterator<Item = Supplier>) -> Self {
        Self {
            suppliers: RwLock::new(suppliers.into_iter().map(|s| (s.id, s)).collect()),
        }
    }
}

#[async_trait]
impl SupplierRegistry for MemorySupplierRegistry {
    async fn find_supplier(&self, id: DbId) -> Result<Option<Supplier>, CoreError> {
        Ok(self.suppliers.read().await.get(&id).cloned())
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, CoreError> {
        Ok(self.suppliers.read().await.values().cloned().collect())
    }
}

/// Sink that keeps every emitted event, for assertions in tests.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<NoticeEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NoticeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: NoticeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::notice::test_support::sample_notice;

    fn draft() -> NewNotice {
        let n = sample_notice();
        NewNotice {
            notice_code: n.notice_code,
            category: n.category,
            title: n.title,
            assigned_supplier_id: n.assigned_supplier_id,
            assigned_supplier_name: n.assigned_supplier_name,
            status: n.status,
            sd_notice: n.sd_notice,
            created_at: n.created_at,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryNoticeStore::new();
        let a = store.insert(draft()).await.unwrap();
        let b = store.insert(draft()).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn save_bumps_version_and_detects_stale_writes() {
        let store = MemoryNoticeStore::new();
        let original = store.insert(draft()).await.unwrap();

        let mut first = original.clone();
        first.is_reviewed = true;
        let saved = store.save(&first).await.unwrap();
        assert_eq!(saved.version, 2);

        // A second writer still holding version 1 loses.
        let mut second = original;
        second.title = "other".into();
        assert_matches!(store.save(&second).await, Err(CoreError::StaleState { .. }));
        assert!(store.load(saved.id).await.unwrap().is_reviewed);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let store = MemoryNoticeStore::new();
        store.insert(draft()).await.unwrap();
        store.insert(draft()).await.unwrap();
        let all = store.list(&NoticeFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 1]);

        let none = store
            .list(&NoticeFilter {
                supplier_id: Some(999),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = MemoryNoticeStore::new();
        assert_matches!(store.delete(3).await, Err(CoreError::NotFound { id: 3, .. }));
    }
}
