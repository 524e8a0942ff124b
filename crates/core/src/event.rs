//! Domain events emitted after a successful operation.
//!
//! Transition functions return a [`NoticeEvent`] next to the updated notice;
//! the service hands it to an [`EventSink`](crate::ports::EventSink) and a
//! dispatcher turns it into topic deliveries. Nothing in this module knows
//! about the transport.

use serde::{Deserialize, Serialize};

use crate::capability::Actor;
use crate::notice::Notice;
use crate::types::{DbId, Timestamp};

/// Shared broadcast topic for every notice change.
pub const UPDATES_TOPIC: &str = "updates";

/// What happened to the notice(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeEventKind {
    Created,
    Edited,
    PlanSubmitted,
    PlanApproved,
    PlanRejected,
    EvidenceSubmitted,
    EvidenceItemApproved,
    EvidenceApproved,
    EvidenceRejected,
    Reassigned,
    Voided,
    Reviewed,
    Liked,
    Deleted,
}

impl NoticeEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeEventKind::Created => "created",
            NoticeEventKind::Edited => "edited",
            NoticeEventKind::PlanSubmitted => "plan_submitted",
            NoticeEventKind::PlanApproved => "plan_approved",
            NoticeEventKind::PlanRejected => "plan_rejected",
            NoticeEventKind::EvidenceSubmitted => "evidence_submitted",
            NoticeEventKind::EvidenceItemApproved => "evidence_item_approved",
            NoticeEventKind::EvidenceApproved => "evidence_approved",
            NoticeEventKind::EvidenceRejected => "evidence_rejected",
            NoticeEventKind::Reassigned => "reassigned",
            NoticeEventKind::Voided => "voided",
            NoticeEventKind::Reviewed => "reviewed",
            NoticeEventKind::Liked => "liked",
            NoticeEventKind::Deleted => "deleted",
        }
    }
}

/// Who should receive a direct alert for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    /// A single user (e.g. the SD who created the notice).
    User(DbId),
    /// Every user of a supplier company.
    Supplier(DbId),
}

impl Recipient {
    /// Per-recipient delivery topic.
    pub fn topic(self) -> String {
        match self {
            Recipient::User(id) => format!("user.{id}"),
            Recipient::Supplier(id) => format!("supplier.{id}"),
        }
    }
}

/// A change to one or more notices, carrying their full updated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeEvent {
    pub kind: NoticeEventKind,
    pub actor_id: DbId,
    pub notices: Vec<Notice>,
    pub recipients: Vec<Recipient>,
    pub timestamp: Timestamp,
}

impl NoticeEvent {
    pub fn new(kind: NoticeEventKind, actor: &Actor, notice: Notice, timestamp: Timestamp) -> Self {
        Self::batch(kind, actor, vec![notice], timestamp)
    }

    pub fn batch(
        kind: NoticeEventKind,
        actor: &Actor,
        notices: Vec<Notice>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            kind,
            actor_id: actor.id,
            notices,
            recipients: Vec::new(),
            timestamp,
        }
    }

    /// Add a direct-alert recipient, skipping duplicates.
    pub fn notify(mut self, recipient: Recipient) -> Self {
        if !self.recipients.contains(&recipient) {
            self.recipients.push(recipient);
        }
        self
    }

    /// Dot-separated event name, e.g. `"notice.plan_submitted"`.
    pub fn event_type(&self) -> String {
        format!("notice.{}", self.kind.as_str())
    }
}
