//! The workflow entry point used by the API.
//!
//! Every mutating call follows the same path: load the notice, check the
//! actor's capability, run the pure transition, save conditionally on the
//! loaded version, then emit the event. An event is only emitted after the
//! save succeeded.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::capability::{authorize, Actor, Operation};
use crate::error::CoreError;
use crate::event::{NoticeEvent, NoticeEventKind, Recipient};
use crate::notice::{CreateNoticeInput, NewNotice, Notice, NoticeEdit, Supplier};
use crate::plan::{ActionPlanInput, EvidenceInput};
use crate::ports::{EventSink, NoticeFilter, NoticeStore, SupplierRegistry};
use crate::roles::Role;
use crate::types::{DbId, Timestamp};
use crate::workflow::{self, Transition};

/// Maximum number of notices in one batch create or bulk close.
pub const MAX_BATCH_SIZE: usize = 100;

/// Per-notice result of a bulk closure.
#[derive(Debug, Clone, Serialize)]
pub struct BulkCloseOutcome {
    pub notice_id: DbId,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

#[derive(Clone)]
pub struct NoticeService {
    store: Arc<dyn NoticeStore>,
    suppliers: Arc<dyn SupplierRegistry>,
    events: Arc<dyn EventSink>,
}

impl NoticeService {
    pub fn new(
        store: Arc<dyn NoticeStore>,
        suppliers: Arc<dyn SupplierRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            suppliers,
            events,
        }
    }

    // -- reads -------------------------------------------------------------

    pub async fn get(&self, actor: &Actor, id: DbId) -> Result<Notice, CoreError> {
        let notice = self.store.load(id).await?;
        authorize(actor, Operation::ViewNotice, Some(&notice))?;
        Ok(notice)
    }

    /// List notices visible to `actor`. Suppliers only ever see their own.
    pub async fn list(
        &self,
        actor: &Actor,
        mut filter: NoticeFilter,
    ) -> Result<Vec<Notice>, CoreError> {
        if actor.role == Role::Supplier {
            let own = actor.supplier_id.ok_or_else(|| {
                CoreError::Forbidden("Supplier user is not linked to a supplier".into())
            })?;
            filter.supplier_id = Some(own);
        }
        self.store.list(&filter).await
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, CoreError> {
        self.suppliers.list_suppliers().await
    }

    // -- creation ----------------------------------------------------------

    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateNoticeInput,
    ) -> Result<Notice, CoreError> {
        let mut created = self.create_batch(actor, vec![input]).await?;
        created
            .pop()
            .ok_or_else(|| CoreError::Internal("Notice insert returned nothing".into()))
    }

    /// Create several notices. Every input is validated before any is stored.
    pub async fn create_batch(
        &self,
        actor: &Actor,
        inputs: Vec<CreateNoticeInput>,
    ) -> Result<Vec<Notice>, CoreError> {
        authorize(actor, Operation::CreateNotice, None)?;
        if inputs.is_empty() {
            return Err(CoreError::Validation("No notices to create".into()));
        }
        if inputs.len() > MAX_BATCH_SIZE {
            return Err(CoreError::Validation(format!(
                "At most {MAX_BATCH_SIZE} notices can be created at once"
            )));
        }

        let now = Utc::now();
        let mut drafts: Vec<NewNotice> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let supplier = self.require_supplier(input.supplier_id).await?;
            drafts.push(workflow::create(actor, input, &supplier, now)?);
        }

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let notice = self.store.insert(draft).await?;
            tracing::info!(
                notice_id = notice.id,
                notice_code = %notice.notice_code,
                supplier_id = notice.assigned_supplier_id,
                actor_id = actor.id,
                "Notice created"
            );
            created.push(notice);
        }

        let mut event =
            NoticeEvent::batch(NoticeEventKind::Created, actor, created.clone(), now);
        for notice in &created {
            event = event.notify(Recipient::Supplier(notice.assigned_supplier_id));
        }
        self.events.emit(event);

        Ok(created)
    }

    // -- lifecycle ---------------------------------------------------------

    pub async fn edit(
        &self,
        actor: &Actor,
        id: DbId,
        edit: NoticeEdit,
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::EditNotice, |n, now| {
            workflow::edit(n, actor, edit, now)
        })
        .await
    }

    pub async fn submit_plan(
        &self,
        actor: &Actor,
        id: DbId,
        items: &[ActionPlanInput],
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::SubmitPlan, |n, now| {
            workflow::submit_plan(n, actor, items, now)
        })
        .await
    }

    pub async fn approve_plan(&self, actor: &Actor, id: DbId) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::ReviewPlan, |n, now| {
            workflow::approve_plan(n, actor, now)
        })
        .await
    }

    pub async fn reject_plan(
        &self,
        actor: &Actor,
        id: DbId,
        reason: &str,
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::ReviewPlan, |n, now| {
            workflow::reject_plan(n, actor, reason, now)
        })
        .await
    }

    pub async fn submit_evidence(
        &self,
        actor: &Actor,
        id: DbId,
        evidence: &[EvidenceInput],
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::SubmitEvidence, |n, now| {
            workflow::submit_evidence(n, actor, evidence, now)
        })
        .await
    }

    pub async fn approve_evidence(&self, actor: &Actor, id: DbId) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::ReviewEvidence, |n, now| {
            workflow::approve_evidence(n, actor, now)
        })
        .await
    }

    pub async fn reject_evidence(
        &self,
        actor: &Actor,
        id: DbId,
        reason: &str,
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::ReviewEvidence, |n, now| {
            workflow::reject_evidence(n, actor, reason, now)
        })
        .await
    }

    pub async fn approve_evidence_item(
        &self,
        actor: &Actor,
        id: DbId,
        index: usize,
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::ReviewEvidence, |n, now| {
            workflow::approve_evidence_item(n, actor, index, now)
        })
        .await
    }

    pub async fn reject_evidence_item(
        &self,
        actor: &Actor,
        id: DbId,
        index: usize,
        reason: &str,
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::ReviewEvidence, |n, now| {
            workflow::reject_evidence_item(n, actor, index, reason, now)
        })
        .await
    }

    pub async fn reassign(
        &self,
        actor: &Actor,
        id: DbId,
        supplier_id: DbId,
        reason: &str,
    ) -> Result<Notice, CoreError> {
        let notice = self.load_authorized(actor, id, Operation::Reassign).await?;
        let target = self.require_supplier(supplier_id).await?;
        let transition = workflow::reassign(notice, actor, &target, reason, Utc::now())?;
        self.commit(actor, transition).await
    }

    pub async fn void(&self, actor: &Actor, id: DbId, reason: &str) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::Void, |n, now| {
            workflow::void(n, actor, reason, now)
        })
        .await
    }

    pub async fn mark_reviewed(
        &self,
        actor: &Actor,
        id: DbId,
        reviewed: bool,
    ) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::MarkReviewed, |n, now| {
            workflow::mark_reviewed(n, actor, reviewed, now)
        })
        .await
    }

    pub async fn toggle_like(&self, actor: &Actor, id: DbId) -> Result<Notice, CoreError> {
        self.apply(actor, id, Operation::Like, |n, now| {
            workflow::toggle_like(n, actor, now)
        })
        .await
    }

    /// Approve the evidence of several notices. Each notice succeeds or
    /// fails on its own; one failure does not stop the rest.
    pub async fn bulk_close(
        &self,
        actor: &Actor,
        ids: &[DbId],
    ) -> Result<Vec<BulkCloseOutcome>, CoreError> {
        authorize(actor, Operation::ReviewEvidence, None)?;
        if ids.is_empty() {
            return Err(CoreError::Validation("No notices to close".into()));
        }
        if ids.len() > MAX_BATCH_SIZE {
            return Err(CoreError::Validation(format!(
                "At most {MAX_BATCH_SIZE} notices can be closed at once"
            )));
        }

        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            let outcome = match self.approve_evidence(actor, id).await {
                Ok(_) => BulkCloseOutcome {
                    notice_id: id,
                    closed: true,
                    error: None,
                    code: None,
                },
                Err(e) => BulkCloseOutcome {
                    notice_id: id,
                    closed: false,
                    code: Some(e.code()),
                    error: Some(e.to_string()),
                },
            };
            outcomes.push(outcome);
        }

        let closed = outcomes.iter().filter(|o| o.closed).count();
        tracing::info!(
            actor_id = actor.id,
            requested = ids.len(),
            closed,
            "Bulk closure finished"
        );
        Ok(outcomes)
    }

    /// Permanently remove a notice.
    pub async fn delete(&self, actor: &Actor, id: DbId) -> Result<Notice, CoreError> {
        let notice = self.store.load(id).await?;
        authorize(actor, Operation::Delete, Some(&notice))?;
        let deleted = self.store.delete(id).await?;

        tracing::info!(notice_id = id, actor_id = actor.id, "Notice deleted");
        let supplier = deleted.assigned_supplier_id;
        self.events.emit(
            NoticeEvent::new(NoticeEventKind::Deleted, actor, deleted.clone(), Utc::now())
                .notify(Recipient::Supplier(supplier)),
        );
        Ok(deleted)
    }

    // -- internals ---------------------------------------------------------

    async fn require_supplier(&self, id: DbId) -> Result<Supplier, CoreError> {
        self.suppliers
            .find_supplier(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Supplier",
                id,
            })
    }

    async fn load_authorized(
        &self,
        actor: &Actor,
        id: DbId,
        operation: Operation,
    ) -> Result<Notice, CoreError> {
        let notice = self.store.load(id).await?;
        authorize(actor, operation, Some(&notice))?;
        Ok(notice)
    }

    async fn apply<F>(
        &self,
        actor: &Actor,
        id: DbId,
        operation: Operation,
        transition: F,
    ) -> Result<Notice, CoreError>
    where
        F: FnOnce(Notice, Timestamp) -> Result<Transition, CoreError>,
    {
        let notice = self.load_authorized(actor, id, operation).await?;
        let transition = transition(notice, Utc::now())?;
        self.commit(actor, transition).await
    }

    /// Save conditionally on the loaded version, then emit. Nothing is
    /// emitted when the save fails.
    async fn commit(&self, actor: &Actor, transition: Transition) -> Result<Notice, CoreError> {
        let Transition { notice, mut event } = transition;
        let saved = self.store.save(&notice).await?;

        tracing::info!(
            notice_id = saved.id,
            actor_id = actor.id,
            event = %event.event_type(),
            status = %saved.status,
            version = saved.version,
            "Notice updated"
        );
        event.notices = vec![saved.clone()];
        self.events.emit(event);
        Ok(saved)
    }
}
