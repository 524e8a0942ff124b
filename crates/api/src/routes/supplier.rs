use axum::routing::get;
use axum::Router;

use crate::handlers::supplier;
use crate::state::AppState;

/// Routes mounted at `/suppliers`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(supplier::list_suppliers))
}
