//! The append-only audit log of a notice.
//!
//! [`History`] wraps the ordered entries together with a side index of the
//! last position of each [`HistoryKind`], so "the most recent plan
//! submission" style lookups don't rescan the log. The index is rebuilt
//! whenever a history is deserialized and maintained on every append.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::capability::Actor;
use crate::error::CoreError;
use crate::plan::{ActionPlanItem, PlanItemStatus};
use crate::types::{DbId, Timestamp};

/// Marker placed before a rejection reason inside an entry description.
pub const REASON_MARKER: &str = "[Reason]";

/// Which operation produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    SupplierPlanSubmission,
    SdPlanApproval,
    SdPlanRejection,
    SupplierEvidenceSubmission,
    SdClosureApprove,
    SdEvidenceRejection,
    SdEvidenceItemApproval,
    ManagerReassignment,
    ManagerVoid,
    SdNoticeEdit,
}

impl HistoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryKind::SupplierPlanSubmission => "supplier_plan_submission",
            HistoryKind::SdPlanApproval => "sd_plan_approval",
            HistoryKind::SdPlanRejection => "sd_plan_rejection",
            HistoryKind::SupplierEvidenceSubmission => "supplier_evidence_submission",
            HistoryKind::SdClosureApprove => "sd_closure_approve",
            HistoryKind::SdEvidenceRejection => "sd_evidence_rejection",
            HistoryKind::SdEvidenceItemApproval => "sd_evidence_item_approval",
            HistoryKind::ManagerReassignment => "manager_reassignment",
            HistoryKind::ManagerVoid => "manager_void",
            HistoryKind::SdNoticeEdit => "sd_notice_edit",
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    /// Display name of the actor.
    pub submitter: String,
    pub submitter_id: DbId,
    pub time: Timestamp,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plans: Option<Vec<ActionPlanItem>>,
    /// Set on entries about one specific evidence item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_index: Option<usize>,
}

impl HistoryEntry {
    pub fn new(
        kind: HistoryKind,
        actor: &Actor,
        time: Timestamp,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            submitter: actor.display_name.clone(),
            submitter_id: actor.id,
            time,
            description: description.into(),
            action_plans: None,
            evidence_index: None,
        }
    }

    pub fn with_action_plans(mut self, plans: Vec<ActionPlanItem>) -> Self {
        self.action_plans = Some(plans);
        self
    }

    pub fn with_evidence_index(mut self, index: usize) -> Self {
        self.evidence_index = Some(index);
        self
    }
}

/// Build a description that embeds a rejection reason after [`REASON_MARKER`].
pub fn with_reason(summary: &str, reason: &str) -> String {
    format!("{summary} {REASON_MARKER} {reason}")
}

/// Ordered, append-only sequence of [`HistoryEntry`] with a per-kind index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct History {
    entries: Vec<HistoryEntry>,
    last_by_kind: HashMap<HistoryKind, usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&HistoryEntry> {
        self.entries.get(position)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Append an entry and return its position.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        let position = self.entries.len();
        self.last_by_kind.insert(entry.kind, position);
        self.entries.push(entry);
        position
    }

    /// Position and entry of the most recent entry of `kind`.
    pub fn latest(&self, kind: HistoryKind) -> Option<(usize, &HistoryEntry)> {
        let position = *self.last_by_kind.get(&kind)?;
        Some((position, &self.entries[position]))
    }

    /// The most recent entry whose kind is any of `kinds`.
    pub fn latest_of(&self, kinds: &[HistoryKind]) -> Option<(usize, &HistoryEntry)> {
        kinds
            .iter()
            .filter_map(|kind| self.last_by_kind.get(kind).copied())
            .max()
            .map(|position| (position, &self.entries[position]))
    }

    /// Indices approved by `sd_evidence_item_approval` entries after `position`.
    pub fn approved_indices_since(&self, position: usize) -> BTreeSet<usize> {
        self.entries
            .iter()
            .skip(position + 1)
            .filter(|e| e.kind == HistoryKind::SdEvidenceItemApproval)
            .filter_map(|e| e.evidence_index)
            .collect()
    }

    /// Annotate one plan item of an existing entry with a review status.
    ///
    /// This is the only in-place mutation the log allows: per-item evidence
    /// review marks the item on the evidence-submission entry it reviewed.
    pub fn annotate_plan_item(
        &mut self,
        position: usize,
        index: usize,
        status: PlanItemStatus,
    ) -> Result<(), CoreError> {
        let item = self
            .entries
            .get_mut(position)
            .and_then(|e| e.action_plans.as_mut())
            .and_then(|plans| plans.get_mut(index))
            .ok_or_else(|| {
                CoreError::MissingPriorState(format!(
                    "History entry {position} has no action item {index}"
                ))
            })?;
        item.status = Some(status);
        Ok(())
    }
}

impl From<Vec<HistoryEntry>> for History {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        let last_by_kind = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.kind, position))
            .collect();
        Self {
            entries,
            last_by_kind,
        }
    }
}

impl From<History> for Vec<HistoryEntry> {
    fn from(history: History) -> Self {
        history.entries
    }
}
