//! Action plan and evidence items, plus the input validation applied to
//! supplier submissions.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of action items in a single plan submission.
pub const MAX_PLAN_ITEMS: usize = 50;

/// Maximum length for free-text plan and evidence fields.
pub const MAX_TEXT_LENGTH: usize = 5_000;

/// Canonical deadline format stored on every plan item.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Review status of a single plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanItemStatus {
    PendingEvidence,
    Approved,
    Rejected,
}

/// An opaque reference to an uploaded file. Never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub url: String,
}

/// One line of a plan or evidence submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlanItem {
    pub plan: String,
    pub responsible: String,
    /// Canonical `YYYY-MM-DD`.
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence_images: Vec<FileRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence_attachments: Vec<FileRef>,
}

/// A plan line as submitted by the supplier, before normalization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionPlanInput {
    pub plan: String,
    pub responsible: String,
    pub deadline: String,
}

/// Evidence for one item of the approved plan baseline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvidenceInput {
    /// Position in the approved plan baseline.
    pub index: usize,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<FileRef>,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
}

impl EvidenceInput {
    fn has_content(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
            || !self.images.is_empty()
            || !self.attachments.is_empty()
    }
}

/// Normalize a supplier-entered deadline to `YYYY-MM-DD`.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD` (single-digit month and
/// day allowed) and RFC 3339 date-times, which keep only their date part.
pub fn normalize_deadline(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Deadline must not be empty".into()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive().format(DEADLINE_FORMAT).to_string());
    }

    let unified = trimmed.replace(['/', '.'], "-");
    NaiveDate::parse_from_str(&unified, "%Y-%m-%d")
        .map(|d| d.format(DEADLINE_FORMAT).to_string())
        .map_err(|_| {
            CoreError::Validation(format!(
                "Invalid deadline '{trimmed}'. Expected a date such as 2025-01-10"
            ))
        })
}

/// Validate a plan submission and turn it into stored plan items.
///
/// At least one item is required and every item needs a non-empty plan,
/// responsible party, and a parseable deadline.
pub fn normalize_plan(items: &[ActionPlanInput]) -> Result<Vec<ActionPlanItem>, CoreError> {
    if items.is_empty() {
        return Err(CoreError::Validation(
            "An action plan must contain at least one item".into(),
        ));
    }
    if items.len() > MAX_PLAN_ITEMS {
        return Err(CoreError::Validation(format!(
            "An action plan may contain at most {MAX_PLAN_ITEMS} items"
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let plan = required_text(&item.plan, "plan", i)?;
            let responsible = required_text(&item.responsible, "responsible", i)?;
            let deadline = normalize_deadline(&item.deadline).map_err(|e| match e {
                CoreError::Validation(msg) => CoreError::Validation(format!("Item {i}: {msg}")),
                other => other,
            })?;
            Ok(ActionPlanItem {
                plan,
                responsible,
                deadline,
                status: None,
                evidence_description: None,
                evidence_images: Vec::new(),
                evidence_attachments: Vec::new(),
            })
        })
        .collect()
}

/// Merge evidence onto a copy of the approved baseline.
///
/// Plan, responsible and deadline are preserved; each item's status is reset
/// to `pending_evidence` so the new submission starts a fresh review round.
pub fn merge_evidence(
    baseline: &[ActionPlanItem],
    evidence: &[EvidenceInput],
) -> Result<Vec<ActionPlanItem>, CoreError> {
    if !evidence.iter().any(EvidenceInput::has_content) {
        return Err(CoreError::Validation(
            "Evidence must be provided for at least one action item".into(),
        ));
    }

    let mut merged: Vec<ActionPlanItem> = baseline
        .iter()
        .cloned()
        .map(|mut item| {
            item.status = Some(PlanItemStatus::PendingEvidence);
            item.evidence_description = None;
            item.evidence_images.clear();
            item.evidence_attachments.clear();
            item
        })
        .collect();

    let mut seen = vec![false; merged.len()];
    for input in evidence {
        let Some(target) = merged.get_mut(input.index) else {
            return Err(CoreError::Validation(format!(
                "Evidence index {} is out of range; the approved plan has {} items",
                input.index,
                baseline.len()
            )));
        };
        if std::mem::replace(&mut seen[input.index], true) {
            return Err(CoreError::Validation(format!(
                "Evidence for item {} was provided more than once",
                input.index
            )));
        }
        if let Some(desc) = &input.description {
            if desc.chars().count() > MAX_TEXT_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Evidence description for item {} exceeds {MAX_TEXT_LENGTH} characters",
                    input.index
                )));
            }
        }
        target.evidence_description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        target.evidence_images = input.images.clone();
        target.evidence_attachments = input.attachments.clone();
    }

    Ok(merged)
}

fn required_text(value: &str, field: &str, index: usize) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!(
            "Item {index}: '{field}' must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Item {index}: '{field}' exceeds {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
