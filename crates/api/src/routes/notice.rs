//! Route definitions for the `/notices` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::notice;
use crate::state::AppState;

/// Routes mounted at `/notices`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notice::list_notices).post(notice::create_notice))
        .route("/batch", post(notice::create_notices_batch))
        .route("/bulk-close", post(notice::bulk_close))
        .route(
            "/{id}",
            get(notice::get_notice)
                .patch(notice::edit_notice)
                .delete(notice::delete_notice),
        )
        .route("/{id}/plan", post(notice::submit_plan))
        .route("/{id}/plan/approve", post(notice::approve_plan))
        .route("/{id}/plan/reject", post(notice::reject_plan))
        .route("/{id}/evidence", post(notice::submit_evidence))
        .route("/{id}/evidence/approve", post(notice::approve_evidence))
        .route("/{id}/evidence/reject", post(notice::reject_evidence))
        .route(
            "/{id}/evidence/{index}/approve",
            post(notice::approve_evidence_item),
        )
        .route(
            "/{id}/evidence/{index}/reject",
            post(notice::reject_evidence_item),
        )
        .route("/{id}/reassign", post(notice::reassign))
        .route("/{id}/void", post(notice::void))
        .route("/{id}/reviewed", put(notice::mark_reviewed))
        .route("/{id}/like", post(notice::toggle_like))
}
