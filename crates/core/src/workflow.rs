//! Pure transition functions for the notice lifecycle.
//!
//! Every function takes the current notice by value plus the acting user and
//! returns a [`Transition`]: the next notice state and the event describing
//! it. Nothing here performs I/O; validation failures leave the caller's
//! stored copy untouched because nothing is written until the service saves
//! the returned notice.
//!
//! ```text
//! PendingPlan ──submit_plan──▶ PendingSDPlanReview ──approve_plan──▶ PendingSupplierEvidence
//!      ▲                              │                                   │        ▲
//!      └──────────reject_plan─────────┘                      submit_evidence   reject_evidence(_item)
//!                                                                         ▼        │
//!                      Completed ◀──approve_evidence / last item── PendingSDEvidenceReview
//!
//! any non-terminal ──void──▶ Void            any non-terminal ──reassign──▶ (unchanged)
//! ```

use crate::capability::Actor;
use crate::error::CoreError;
use crate::event::{NoticeEvent, NoticeEventKind, Recipient};
use crate::history::{with_reason, HistoryEntry, HistoryKind};
use crate::notice::{
    derive_title, generate_notice_code, validate_category, CreateNoticeInput, NewNotice, Notice,
    NoticeEdit, SdNotice, Supplier, MAX_DESCRIPTION_LENGTH,
};
use crate::plan::{
    merge_evidence, normalize_plan, ActionPlanInput, EvidenceInput, PlanItemStatus,
    MAX_TEXT_LENGTH,
};
use crate::status::NoticeStatus;
use crate::types::Timestamp;

/// The outcome of a successful operation: the notice to persist and the
/// event to emit once it is persisted.
#[derive(Debug, Clone)]
pub struct Transition {
    pub notice: Notice,
    pub event: NoticeEvent,
}

impl Transition {
    fn new(notice: Notice, actor: &Actor, kind: NoticeEventKind) -> Self {
        let event = NoticeEvent::new(kind, actor, notice.clone(), notice.updated_at);
        Self { notice, event }
    }

    fn notify(mut self, recipient: Recipient) -> Self {
        self.event = self.event.notify(recipient);
        self
    }

    fn notify_supplier(self) -> Self {
        let supplier = self.notice.assigned_supplier_id;
        self.notify(Recipient::Supplier(supplier))
    }

    fn notify_creator(self) -> Self {
        let creator = self.notice.sd_notice.creator_id;
        self.notify(Recipient::User(creator))
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn expect_status(
    notice: &Notice,
    expected: NoticeStatus,
    operation: &'static str,
) -> Result<(), CoreError> {
    if notice.status == expected {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            operation,
            status: notice.status,
        })
    }
}

fn expect_open(notice: &Notice, operation: &'static str) -> Result<(), CoreError> {
    if notice.status.is_terminal() {
        Err(CoreError::InvalidTransition {
            operation,
            status: notice.status,
        })
    } else {
        Ok(())
    }
}

fn required_reason(reason: &str) -> Result<String, CoreError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("A reason is required".into()));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Reason exceeds {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Creation and editing
// ---------------------------------------------------------------------------

/// Build a new notice in `PendingPlan` assigned to `supplier`.
pub fn create(
    actor: &Actor,
    input: CreateNoticeInput,
    supplier: &Supplier,
    now: Timestamp,
) -> Result<NewNotice, CoreError> {
    validate_category(&input.category)?;
    let description = optional_text(input.description);
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
    {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    if description.is_none() && input.details.is_empty() {
        return Err(CoreError::Validation(
            "A notice needs a description or category details".into(),
        ));
    }

    let category = input.category.trim().to_string();
    let title = derive_title(&category, description.as_deref(), &input.details);

    Ok(NewNotice {
        notice_code: generate_notice_code(now),
        category,
        title,
        assigned_supplier_id: supplier.id,
        assigned_supplier_name: supplier.name.clone(),
        status: NoticeStatus::PendingPlan,
        sd_notice: SdNotice {
            creator_id: actor.id,
            creator_name: actor.display_name.clone(),
            description,
            details: input.details,
            images: input.images,
            attachments: input.attachments,
            created_at: now,
            problem_source: optional_text(input.problem_source),
            cause: optional_text(input.cause),
            supplement: None,
            extra_images: Vec::new(),
            extra_attachments: Vec::new(),
        },
        created_at: now,
    })
}

/// Edit the supplementary fields of an open notice.
pub fn edit(
    mut notice: Notice,
    actor: &Actor,
    edit: NoticeEdit,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_open(&notice, "edit")?;

    let mut changed: Vec<&str> = Vec::new();

    if let Some(category) = edit.category {
        validate_category(&category)?;
        let category = category.trim().to_string();
        if category != notice.category {
            notice.category = category;
            changed.push("category");
        }
    }

    let sd = &mut notice.sd_notice;
    for (field, value, slot) in [
        ("supplement", edit.supplement, &mut sd.supplement),
        ("problem_source", edit.problem_source, &mut sd.problem_source),
        ("cause", edit.cause, &mut sd.cause),
    ] {
        if let Some(value) = value {
            if value.chars().count() > MAX_TEXT_LENGTH {
                return Err(CoreError::Validation(format!(
                    "'{field}' exceeds {MAX_TEXT_LENGTH} characters"
                )));
            }
            let value = optional_text(Some(value));
            if *slot != value {
                *slot = value;
                changed.push(field);
            }
        }
    }
    if !edit.add_images.is_empty() {
        sd.extra_images.extend(edit.add_images);
        changed.push("images");
    }
    if !edit.add_attachments.is_empty() {
        sd.extra_attachments.extend(edit.add_attachments);
        changed.push("attachments");
    }

    if changed.is_empty() {
        return Err(CoreError::Validation("The edit changes nothing".into()));
    }

    notice.title = derive_title(
        &notice.category,
        notice.sd_notice.description.as_deref(),
        &notice.sd_notice.details,
    );
    notice.history.push(HistoryEntry::new(
        HistoryKind::SdNoticeEdit,
        actor,
        now,
        format!("Edited notice: {}", changed.join(", ")),
    ));
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::Edited).notify_supplier())
}

// ---------------------------------------------------------------------------
// Action plan
// ---------------------------------------------------------------------------

/// Supplier submits an action plan: `PendingPlan` → `PendingSDPlanReview`.
pub fn submit_plan(
    mut notice: Notice,
    actor: &Actor,
    items: &[ActionPlanInput],
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(&notice, NoticeStatus::PendingPlan, "submit a plan for")?;
    let plans = normalize_plan(items)?;

    notice.history.push(
        HistoryEntry::new(
            HistoryKind::SupplierPlanSubmission,
            actor,
            now,
            format!("Submitted an action plan with {} item(s)", plans.len()),
        )
        .with_action_plans(plans),
    );
    notice.status = NoticeStatus::PendingSDPlanReview;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::PlanSubmitted).notify_creator())
}

/// SD approves the latest plan: `PendingSDPlanReview` → `PendingSupplierEvidence`.
///
/// The approved copy, with every item stamped `pending_evidence`, becomes
/// the baseline evidence is matched against.
pub fn approve_plan(
    mut notice: Notice,
    actor: &Actor,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(&notice, NoticeStatus::PendingSDPlanReview, "approve the plan of")?;

    let mut baseline = notice
        .history
        .latest(HistoryKind::SupplierPlanSubmission)
        .and_then(|(_, entry)| entry.action_plans.clone())
        .ok_or_else(|| {
            CoreError::MissingPriorState(format!(
                "Notice {} has no submitted action plan to approve",
                notice.id
            ))
        })?;
    for item in &mut baseline {
        item.status = Some(PlanItemStatus::PendingEvidence);
    }

    notice.history.push(
        HistoryEntry::new(
            HistoryKind::SdPlanApproval,
            actor,
            now,
            "Approved the action plan",
        )
        .with_action_plans(baseline),
    );
    notice.status = NoticeStatus::PendingSupplierEvidence;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::PlanApproved).notify_supplier())
}

/// SD rejects the plan: `PendingSDPlanReview` → `PendingPlan`.
pub fn reject_plan(
    mut notice: Notice,
    actor: &Actor,
    reason: &str,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(&notice, NoticeStatus::PendingSDPlanReview, "reject the plan of")?;
    let reason = required_reason(reason)?;

    notice.history.push(HistoryEntry::new(
        HistoryKind::SdPlanRejection,
        actor,
        now,
        with_reason("Rejected the action plan.", &reason),
    ));
    notice.status = NoticeStatus::PendingPlan;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::PlanRejected).notify_supplier())
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Supplier submits evidence: `PendingSupplierEvidence` → `PendingSDEvidenceReview`.
pub fn submit_evidence(
    mut notice: Notice,
    actor: &Actor,
    evidence: &[EvidenceInput],
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(
        &notice,
        NoticeStatus::PendingSupplierEvidence,
        "submit evidence for",
    )?;

    let baseline = notice
        .history
        .latest_of(&[
            HistoryKind::SdPlanApproval,
            HistoryKind::SupplierPlanSubmission,
        ])
        .and_then(|(_, entry)| entry.action_plans.as_deref())
        .ok_or_else(|| {
            CoreError::MissingPriorState(format!(
                "Notice {} has no approved action plan to attach evidence to",
                notice.id
            ))
        })?;
    let merged = merge_evidence(baseline, evidence)?;
    let provided = evidence.len();

    notice.history.push(
        HistoryEntry::new(
            HistoryKind::SupplierEvidenceSubmission,
            actor,
            now,
            format!(
                "Submitted evidence for {provided} of {} action item(s)",
                merged.len()
            ),
        )
        .with_action_plans(merged),
    );
    notice.status = NoticeStatus::PendingSDEvidenceReview;
    notice.is_reviewed = false;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::EvidenceSubmitted).notify_creator())
}

/// SD accepts all evidence at once: `PendingSDEvidenceReview` → `Completed`.
pub fn approve_evidence(
    mut notice: Notice,
    actor: &Actor,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(
        &notice,
        NoticeStatus::PendingSDEvidenceReview,
        "approve the evidence of",
    )?;

    notice.history.push(HistoryEntry::new(
        HistoryKind::SdClosureApprove,
        actor,
        now,
        "Approved the evidence and closed the notice",
    ));
    notice.status = NoticeStatus::Completed;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::EvidenceApproved).notify_supplier())
}

/// SD rejects the evidence as a whole: back to `PendingSupplierEvidence`.
pub fn reject_evidence(
    mut notice: Notice,
    actor: &Actor,
    reason: &str,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(
        &notice,
        NoticeStatus::PendingSDEvidenceReview,
        "reject the evidence of",
    )?;
    let reason = required_reason(reason)?;

    notice.history.push(HistoryEntry::new(
        HistoryKind::SdEvidenceRejection,
        actor,
        now,
        with_reason("Rejected the evidence.", &reason),
    ));
    notice.status = NoticeStatus::PendingSupplierEvidence;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::EvidenceRejected).notify_supplier())
}

/// SD approves one evidence item.
///
/// Approvals are counted from the latest evidence submission onward. When
/// this approval completes the set, the closing entry is appended in the
/// same transition and the notice becomes `Completed`.
pub fn approve_evidence_item(
    mut notice: Notice,
    actor: &Actor,
    index: usize,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(
        &notice,
        NoticeStatus::PendingSDEvidenceReview,
        "approve an evidence item of",
    )?;

    let (position, total) = latest_evidence(&notice, index)?;
    let mut approved = notice.history.approved_indices_since(position);
    if approved.contains(&index) {
        return Err(CoreError::Validation(format!(
            "Evidence item {index} is already approved"
        )));
    }

    notice
        .history
        .annotate_plan_item(position, index, PlanItemStatus::Approved)?;
    notice.history.push(
        HistoryEntry::new(
            HistoryKind::SdEvidenceItemApproval,
            actor,
            now,
            format!("Approved evidence for action item {}", index + 1),
        )
        .with_evidence_index(index),
    );
    approved.insert(index);
    notice.updated_at = now;

    if approved.len() == total {
        notice.history.push(HistoryEntry::new(
            HistoryKind::SdClosureApprove,
            actor,
            now,
            "All evidence items approved; closed the notice",
        ));
        notice.status = NoticeStatus::Completed;
        return Ok(
            Transition::new(notice, actor, NoticeEventKind::EvidenceApproved).notify_supplier(),
        );
    }

    Ok(Transition::new(notice, actor, NoticeEventKind::EvidenceItemApproved).notify_supplier())
}

/// SD rejects one evidence item; the whole notice returns to
/// `PendingSupplierEvidence` and the supplier resubmits.
pub fn reject_evidence_item(
    mut notice: Notice,
    actor: &Actor,
    index: usize,
    reason: &str,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(
        &notice,
        NoticeStatus::PendingSDEvidenceReview,
        "reject an evidence item of",
    )?;
    let reason = required_reason(reason)?;
    let (position, _) = latest_evidence(&notice, index)?;

    notice
        .history
        .annotate_plan_item(position, index, PlanItemStatus::Rejected)?;
    notice.history.push(
        HistoryEntry::new(
            HistoryKind::SdEvidenceRejection,
            actor,
            now,
            with_reason(
                &format!("Rejected evidence for action item {}.", index + 1),
                &reason,
            ),
        )
        .with_evidence_index(index),
    );
    notice.status = NoticeStatus::PendingSupplierEvidence;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::EvidenceRejected).notify_supplier())
}

/// Locate the latest evidence submission and bounds-check `index` against it.
fn latest_evidence(notice: &Notice, index: usize) -> Result<(usize, usize), CoreError> {
    let (position, entry) = notice
        .history
        .latest(HistoryKind::SupplierEvidenceSubmission)
        .ok_or_else(|| {
            CoreError::MissingPriorState(format!(
                "Notice {} has no evidence submission to review",
                notice.id
            ))
        })?;
    let total = entry.action_plans.as_ref().map_or(0, Vec::len);
    if total == 0 {
        return Err(CoreError::MissingPriorState(format!(
            "Evidence submission on notice {} has no action items",
            notice.id
        )));
    }
    if index >= total {
        return Err(CoreError::Validation(format!(
            "Evidence index {index} is out of range; the submission has {total} items"
        )));
    }
    Ok((position, total))
}

// ---------------------------------------------------------------------------
// Corrections
// ---------------------------------------------------------------------------

/// Manager moves an open notice to another supplier. Status is unchanged.
pub fn reassign(
    mut notice: Notice,
    actor: &Actor,
    target: &Supplier,
    reason: &str,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_open(&notice, "reassign")?;
    if target.id == notice.assigned_supplier_id {
        return Err(CoreError::Validation(format!(
            "Notice is already assigned to supplier {}",
            target.id
        )));
    }
    let reason = required_reason(reason)?;

    let previous = notice.assigned_supplier_id;
    let description = with_reason(
        &format!(
            "Reassigned from {} to {}.",
            notice.assigned_supplier_name, target.name
        ),
        &reason,
    );
    notice.assigned_supplier_id = target.id;
    notice.assigned_supplier_name = target.name.clone();
    notice.history.push(HistoryEntry::new(
        HistoryKind::ManagerReassignment,
        actor,
        now,
        description,
    ));
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::Reassigned)
        .notify(Recipient::Supplier(previous))
        .notify_supplier())
}

/// Manager cancels an open notice. `Void` is absorbing.
pub fn void(
    mut notice: Notice,
    actor: &Actor,
    reason: &str,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_open(&notice, "void")?;
    let reason = required_reason(reason)?;

    notice.history.push(HistoryEntry::new(
        HistoryKind::ManagerVoid,
        actor,
        now,
        with_reason("Voided the notice.", &reason),
    ));
    notice.status = NoticeStatus::Void;
    notice.updated_at = now;

    Ok(Transition::new(notice, actor, NoticeEventKind::Voided)
        .notify_supplier()
        .notify_creator())
}

// ---------------------------------------------------------------------------
// Flags outside the state machine
// ---------------------------------------------------------------------------

/// Set the secondary-triage flag while evidence awaits review.
pub fn mark_reviewed(
    mut notice: Notice,
    actor: &Actor,
    reviewed: bool,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(
        &notice,
        NoticeStatus::PendingSDEvidenceReview,
        "mark as reviewed",
    )?;
    notice.is_reviewed = reviewed;
    notice.updated_at = now;
    Ok(Transition::new(notice, actor, NoticeEventKind::Reviewed))
}

/// Toggle the actor's endorsement of a completed notice.
pub fn toggle_like(
    mut notice: Notice,
    actor: &Actor,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    expect_status(&notice, NoticeStatus::Completed, "like")?;
    if !notice.likes.remove(&actor.id) {
        notice.likes.insert(actor.id);
    }
    notice.updated_at = now;
    Ok(Transition::new(notice, actor, NoticeEventKind::Liked))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
