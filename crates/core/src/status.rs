//! Notice lifecycle statuses.
//!
//! The wire names (`as_str`) are what the database `status` column and the
//! JSON API carry. The labels are the display strings the SD and supplier
//! portals show.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Current lifecycle state of a notice. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStatus {
    /// Waiting for the supplier to submit an action plan.
    PendingPlan,
    /// Waiting for SD to approve or reject the submitted plan.
    #[serde(rename = "pending_sd_plan_review")]
    PendingSDPlanReview,
    /// Waiting for the supplier to submit evidence for the approved plan.
    PendingSupplierEvidence,
    /// Waiting for SD to review the submitted evidence.
    #[serde(rename = "pending_sd_evidence_review")]
    PendingSDEvidenceReview,
    /// Closed successfully.
    Completed,
    /// Cancelled by a manager.
    Void,
}

impl NoticeStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [NoticeStatus; 6] = [
        NoticeStatus::PendingPlan,
        NoticeStatus::PendingSDPlanReview,
        NoticeStatus::PendingSupplierEvidence,
        NoticeStatus::PendingSDEvidenceReview,
        NoticeStatus::Completed,
        NoticeStatus::Void,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoticeStatus::PendingPlan => "pending_plan",
            NoticeStatus::PendingSDPlanReview => "pending_sd_plan_review",
            NoticeStatus::PendingSupplierEvidence => "pending_supplier_evidence",
            NoticeStatus::PendingSDEvidenceReview => "pending_sd_evidence_review",
            NoticeStatus::Completed => "completed",
            NoticeStatus::Void => "void",
        }
    }

    /// Display label used by the portals.
    pub fn label(self) -> &'static str {
        match self {
            NoticeStatus::PendingPlan => "待提交Action Plan",
            NoticeStatus::PendingSDPlanReview => "待SD确认",
            NoticeStatus::PendingSupplierEvidence => "待供应商关闭",
            NoticeStatus::PendingSDEvidenceReview => "待SD关闭",
            NoticeStatus::Completed => "已完成",
            NoticeStatus::Void => "已作废",
        }
    }

    /// `Completed` and `Void` accept no further status transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, NoticeStatus::Completed | NoticeStatus::Void)
    }
}

impl fmt::Display for NoticeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoticeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid notice status '{s}'. Must be one of: {}",
                    NoticeStatus::ALL.map(NoticeStatus::as_str).join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for status in NoticeStatus::ALL {
            assert_eq!(status.as_str().parse::<NoticeStatus>().unwrap(), status);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        for status in NoticeStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }

    #[test]
    fn unknown_status_rejected() {
        let err = "closed".parse::<NoticeStatus>().unwrap_err();
        assert!(err.to_string().contains("Invalid notice status"));
    }

    #[test]
    fn only_completed_and_void_are_terminal() {
        let terminal: Vec<_> = NoticeStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![NoticeStatus::Completed, NoticeStatus::Void]);
    }
}
