//! Handlers for the `/suppliers` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /suppliers -- the companies a notice can be assigned to.
pub async fn list_suppliers(
    AuthUser(_actor): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let suppliers = state.service.list_suppliers().await?;
    Ok(Json(DataResponse { data: suppliers }))
}
