pub mod health;
pub mod notice;
pub mod supplier;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /notices                                   list, create
/// /notices/batch                             create many (POST)
/// /notices/bulk-close                        close many (POST)
/// /notices/{id}                              get, edit, delete
/// /notices/{id}/plan                         submit plan (POST)
/// /notices/{id}/plan/approve                 approve plan (POST)
/// /notices/{id}/plan/reject                  reject plan (POST)
/// /notices/{id}/evidence                     submit evidence (POST)
/// /notices/{id}/evidence/approve             approve all evidence (POST)
/// /notices/{id}/evidence/reject              reject all evidence (POST)
/// /notices/{id}/evidence/{index}/approve     approve one item (POST)
/// /notices/{id}/evidence/{index}/reject      reject one item (POST)
/// /notices/{id}/reassign                     change supplier (POST)
/// /notices/{id}/void                         void (POST)
/// /notices/{id}/reviewed                     set reviewed flag (PUT)
/// /notices/{id}/like                         toggle like (POST)
///
/// /suppliers                                 list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/notices", notice::router())
        .nest("/suppliers", supplier::router())
}
