//! Actors and the single capability check every operation goes through.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::notice::Notice;
use crate::roles::Role;
use crate::types::DbId;

/// The caller of an operation, as resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: DbId,
    pub display_name: String,
    pub role: Role,
    /// Set only for supplier users.
    pub supplier_id: Option<DbId>,
}

/// Everything an actor can ask the workflow to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateNotice,
    ViewNotice,
    EditNotice,
    SubmitPlan,
    ReviewPlan,
    SubmitEvidence,
    ReviewEvidence,
    MarkReviewed,
    Like,
    Reassign,
    Void,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateNotice => "create_notice",
            Operation::ViewNotice => "view_notice",
            Operation::EditNotice => "edit_notice",
            Operation::SubmitPlan => "submit_plan",
            Operation::ReviewPlan => "review_plan",
            Operation::SubmitEvidence => "submit_evidence",
            Operation::ReviewEvidence => "review_evidence",
            Operation::MarkReviewed => "mark_reviewed",
            Operation::Like => "like",
            Operation::Reassign => "reassign",
            Operation::Void => "void",
            Operation::Delete => "delete",
        }
    }
}

/// Decide whether `actor` may perform `operation` on `notice`.
///
/// `notice` is `None` only for operations that do not target an existing
/// notice (creation). Suppliers act only on notices assigned to their own
/// supplier id; managers hold every SD power plus the correction ones.
pub fn authorize(
    actor: &Actor,
    operation: Operation,
    notice: Option<&Notice>,
) -> Result<(), CoreError> {
    let allowed = match operation {
        Operation::CreateNotice
        | Operation::EditNotice
        | Operation::ReviewPlan
        | Operation::ReviewEvidence
        | Operation::MarkReviewed
        | Operation::Like => actor.role.is_reviewer(),
        Operation::Reassign | Operation::Void | Operation::Delete => actor.role == Role::Manager,
        Operation::SubmitPlan | Operation::SubmitEvidence => {
            actor.role == Role::Supplier && owns(actor, notice)
        }
        Operation::ViewNotice => actor.role.is_reviewer() || owns(actor, notice),
    };

    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            actor_id = actor.id,
            role = %actor.role,
            operation = operation.as_str(),
            notice_id = ?notice.map(|n| n.id),
            "Operation denied"
        );
        Err(CoreError::Forbidden(format!(
            "Role '{}' may not perform '{}' on this notice",
            actor.role,
            operation.as_str()
        )))
    }
}

fn owns(actor: &Actor, notice: Option<&Notice>) -> bool {
    match (actor.supplier_id, notice) {
        (Some(supplier_id), Some(notice)) => notice.assigned_supplier_id == supplier_id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::notice::test_support::sample_notice;

    fn actor(role: Role, supplier_id: Option<DbId>) -> Actor {
        Actor {
            id: 10,
            display_name: "Tester".into(),
            role,
            supplier_id,
        }
    }

    #[test]
    fn supplier_may_only_touch_own_notices() {
        let notice = sample_notice(); // assigned to supplier 100
        let own = actor(Role::Supplier, Some(100));
        let other = actor(Role::Supplier, Some(200));

        assert!(authorize(&own, Operation::SubmitPlan, Some(&notice)).is_ok());
        assert!(authorize(&own, Operation::ViewNotice, Some(&notice)).is_ok());
        assert_matches!(
            authorize(&other, Operation::SubmitPlan, Some(&notice)),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            authorize(&other, Operation::ViewNotice, Some(&notice)),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn supplier_without_company_is_denied() {
        let notice = sample_notice();
        assert!(authorize(&actor(Role::Supplier, None), Operation::SubmitEvidence, Some(&notice))
            .is_err());
    }

    #[test]
    fn reviewers_cannot_submit_on_behalf_of_supplier() {
        let notice = sample_notice();
        assert!(authorize(&actor(Role::SD, None), Operation::SubmitPlan, Some(&notice)).is_err());
        assert!(
            authorize(&actor(Role::Manager, Some(100)), Operation::SubmitPlan, Some(&notice))
                .is_err()
        );
    }

    #[test]
    fn corrections_are_manager_only() {
        let notice = sample_notice();
        for op in [Operation::Reassign, Operation::Void, Operation::Delete] {
            assert!(authorize(&actor(Role::Manager, None), op, Some(&notice)).is_ok());
            assert!(authorize(&actor(Role::SD, None), op, Some(&notice)).is_err());
            assert!(authorize(&actor(Role::Supplier, Some(100)), op, Some(&notice)).is_err());
        }
    }

    #[test]
    fn review_powers_shared_by_sd_and_manager() {
        let notice = sample_notice();
        for op in [
            Operation::ReviewPlan,
            Operation::ReviewEvidence,
            Operation::EditNotice,
            Operation::MarkReviewed,
            Operation::Like,
        ] {
            assert!(authorize(&actor(Role::SD, None), op, Some(&notice)).is_ok());
            assert!(authorize(&actor(Role::Manager, None), op, Some(&notice)).is_ok());
            assert!(authorize(&actor(Role::Supplier, Some(100)), op, Some(&notice)).is_err());
        }
        assert!(authorize(&actor(Role::SD, None), Operation::CreateNotice, None).is_ok());
        assert!(authorize(&actor(Role::Supplier, Some(100)), Operation::CreateNotice, None).is_err());
    }
}
