//! HTTP-level integration tests for the `/notices` and `/suppliers`
//! endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router,
//! backed by in-memory stores.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, build_test_app, create_notice, get, manager, post_json, sd, send, supplier_user,
    ACME, BETA,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn two_item_plan() -> serde_json::Value {
    json!({
        "action_plans": [
            { "plan": "Deburr tooling", "responsible": "Li", "deadline": "2025/01/10" },
            { "plan": "Add visual check", "responsible": "Wang", "deadline": "2025-02-01T08:00:00Z" }
        ]
    })
}

fn full_evidence() -> serde_json::Value {
    json!({
        "evidence": [
            { "index": 0, "description": "Tooling replaced" },
            { "index": 1, "description": "Checklist updated" }
        ]
    })
}

/// Drive a fresh notice for ACME up to evidence review.
async fn notice_in_evidence_review(app: &axum::Router) -> i64 {
    let id = create_notice(app, ACME).await;
    let acme = supplier_user(ACME);

    let response = post_json(app, &format!("/api/v1/notices/{id}/plan"), &acme, two_item_plan()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(app, Method::POST, &format!("/api/v1/notices/{id}/plan/approve"), Some(&sd()), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post_json(app, &format!("/api/v1/notices/{id}/evidence"), &acme, full_evidence()).await;
    assert_eq!(response.status(), StatusCode::OK);
    id
}

// ---------------------------------------------------------------------------
// Test: full lifecycle over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_lifecycle_through_item_approvals() {
    let app = build_test_app();
    let acme = supplier_user(ACME);

    let response = post_json(
        &app,
        "/api/v1/notices",
        &sd(),
        json!({
            "category": "incoming_inspection",
            "supplier_id": ACME,
            "description": "Burrs on housing",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["status"], "pending_plan");
    assert_eq!(created["data"]["assigned_supplier_name"], "Acme Castings");
    assert!(created["data"]["notice_code"].as_str().unwrap().starts_with("SCN-"));

    let response = post_json(&app, &format!("/api/v1/notices/{id}/plan"), &acme, two_item_plan()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_sd_plan_review");
    assert_eq!(
        json["data"]["history"][0]["action_plans"][0]["deadline"],
        "2025-01-10"
    );
    assert_eq!(
        json["data"]["history"][0]["action_plans"][1]["deadline"],
        "2025-02-01"
    );

    let response = send(&app, Method::POST, &format!("/api/v1/notices/{id}/plan/approve"), Some(&sd()), None).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_supplier_evidence");
    assert_eq!(json["data"]["history"][1]["type"], "sd_plan_approval");

    let response = post_json(&app, &format!("/api/v1/notices/{id}/evidence"), &acme, full_evidence()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_sd_evidence_review");
    assert_eq!(json["data"]["is_reviewed"], false);

    let response = send(&app, Method::POST, &format!("/api/v1/notices/{id}/evidence/0/approve"), Some(&sd()), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_sd_evidence_review");

    let response = send(&app, Method::POST, &format!("/api/v1/notices/{id}/evidence/1/approve"), Some(&sd()), None).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "completed");
    let history = json["data"]["history"].as_array().unwrap();
    assert_eq!(history.last().unwrap()["type"], "sd_closure_approve");

    let response = send(&app, Method::POST, &format!("/api/v1/notices/{id}/like"), Some(&sd()), None).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["likes"], json!([1]));
}

// ---------------------------------------------------------------------------
// Test: rejections send the notice back to the supplier
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejections_carry_the_reason() {
    let app = build_test_app();
    let acme = supplier_user(ACME);
    let id = create_notice(&app, ACME).await;

    post_json(&app, &format!("/api/v1/notices/{id}/plan"), &acme, two_item_plan()).await;
    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/plan/reject"),
        &sd(),
        json!({ "reason": "Deadlines too late" }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_plan");
    assert!(json["data"]["history"][1]["description"]
        .as_str()
        .unwrap()
        .contains("Deadlines too late"));

    let id = notice_in_evidence_review(&app).await;
    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/evidence/1/reject"),
        &sd(),
        json!({ "reason": "Photo is blurry" }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending_supplier_evidence");
    let last = json["data"]["history"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["type"], "sd_evidence_rejection");
    assert_eq!(last["evidence_index"], 1);
}

#[tokio::test]
async fn blank_reason_is_a_validation_error() {
    let app = build_test_app();
    let id = notice_in_evidence_review(&app).await;

    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/evidence/reject"),
        &sd(),
        json!({ "reason": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // Whitespace passes the length check but not the workflow's own guard.
    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/evidence/reject"),
        &sd(),
        json!({ "reason": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn long_cjk_reason_is_accepted() {
    let app = build_test_app();
    let id = notice_in_evidence_review(&app).await;

    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/evidence/reject"),
        &sd(),
        json!({ "reason": "照片模糊".repeat(500) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "pending_supplier_evidence");
}

// ---------------------------------------------------------------------------
// Test: error statuses and codes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = build_test_app();
    let response = send(&app, Method::GET, "/api/v1/notices", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_notice_is_not_found() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/notices/9999", &sd()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn wrong_state_is_a_conflict() {
    let app = build_test_app();
    let id = create_notice(&app, ACME).await;

    let response = send(&app, Method::POST, &format!("/api/v1/notices/{id}/evidence/approve"), Some(&sd()), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn suppliers_cannot_see_or_act_on_other_suppliers_notices() {
    let app = build_test_app();
    let acme_notice = create_notice(&app, ACME).await;
    create_notice(&app, BETA).await;
    let beta = supplier_user(BETA);

    let response = get(&app, &format!("/api/v1/notices/{acme_notice}"), &beta).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let response = post_json(&app, &format!("/api/v1/notices/{acme_notice}/plan"), &beta, two_item_plan()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Even an explicit filter for another supplier only returns their own.
    let response = get(&app, &format!("/api/v1/notices?supplier_id={ACME}"), &beta).await;
    let json = body_json(response).await;
    let notices = json["data"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["assigned_supplier_id"], BETA);
}

#[tokio::test]
async fn sd_cannot_reassign_void_or_delete() {
    let app = build_test_app();
    let id = create_notice(&app, ACME).await;

    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/reassign"),
        &sd(),
        json!({ "supplier_id": BETA, "reason": "Wrong plant" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(&app, &format!("/api/v1/notices/{id}/void"), &sd(), json!({ "reason": "Duplicate" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::DELETE, &format!("/api/v1/notices/{id}"), Some(&sd()), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_for_unknown_supplier_is_not_found() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/notices",
        &sd(),
        json!({ "category": "incoming_inspection", "supplier_id": 999, "description": "x" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn supplier_reassign_to_unknown_supplier_is_forbidden() {
    let app = build_test_app();
    let id = create_notice(&app, ACME).await;

    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/reassign"),
        &supplier_user(ACME),
        json!({ "supplier_id": 999, "reason": "Wrong plant" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/reassign"),
        &manager(),
        json!({ "supplier_id": 999, "reason": "Wrong plant" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: manager corrections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reassign_then_void_is_absorbing() {
    let app = build_test_app();
    let id = create_notice(&app, ACME).await;

    let response = post_json(
        &app,
        &format!("/api/v1/notices/{id}/reassign"),
        &manager(),
        json!({ "supplier_id": BETA, "reason": "Wrong plant" }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["assigned_supplier_id"], BETA);
    assert_eq!(json["data"]["assigned_supplier_name"], "Beta Plastics");

    let response = post_json(&app, &format!("/api/v1/notices/{id}/void"), &manager(), json!({ "reason": "Duplicate" })).await;
    assert_eq!(body_json(response).await["data"]["status"], "void");

    let response = post_json(&app, &format!("/api/v1/notices/{id}/plan"), &supplier_user(BETA), two_item_plan()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn manager_delete_removes_the_notice() {
    let app = build_test_app();
    let id = create_notice(&app, ACME).await;

    let response = send(&app, Method::DELETE, &format!("/api/v1/notices/{id}"), Some(&manager()), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &format!("/api/v1/notices/{id}"), &manager()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: batch operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_create_is_all_or_nothing() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/notices/batch",
        &sd(),
        json!({ "notices": [
            { "category": "incoming_inspection", "supplier_id": ACME, "description": "a" },
            { "category": "incoming_inspection", "supplier_id": 999, "description": "b" }
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/api/v1/notices", &sd()).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = post_json(
        &app,
        "/api/v1/notices/batch",
        &sd(),
        json!({ "notices": [
            { "category": "incoming_inspection", "supplier_id": ACME, "description": "a" },
            { "category": "line_audit", "supplier_id": BETA, "description": "b" }
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = get(&app, "/api/v1/notices?category=line_audit", &sd()).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bulk_close_reports_each_notice() {
    let app = build_test_app();
    let ready = notice_in_evidence_review(&app).await;
    let fresh = create_notice(&app, ACME).await;

    let response = post_json(
        &app,
        "/api/v1/notices/bulk-close",
        &sd(),
        json!({ "ids": [ready, fresh, 9999] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let outcomes = json["data"].as_array().unwrap();
    assert_eq!(outcomes[0]["closed"], true);
    assert_eq!(outcomes[1]["closed"], false);
    assert_eq!(outcomes[1]["code"], "INVALID_TRANSITION");
    assert_eq!(outcomes[2]["code"], "NOT_FOUND");

    let response = post_json(&app, "/api/v1/notices/bulk-close", &sd(), json!({ "ids": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/api/v1/notices/bulk-close",
        &supplier_user(ACME),
        json!({ "ids": [fresh] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Test: flags and edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reviewed_flag_only_in_evidence_review() {
    let app = build_test_app();
    let fresh = create_notice(&app, ACME).await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/notices/{fresh}/reviewed"),
        Some(&sd()),
        Some(json!({ "is_reviewed": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let id = notice_in_evidence_review(&app).await;
    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/notices/{id}/reviewed"),
        Some(&sd()),
        Some(json!({ "is_reviewed": true })),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["is_reviewed"], true);
}

#[tokio::test]
async fn edit_updates_title_and_records_history() {
    let app = build_test_app();
    let id = create_notice(&app, ACME).await;

    let response = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/notices/{id}"),
        Some(&sd()),
        Some(json!({ "category": "line_audit", "cause": "Worn die" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["category"], "line_audit");
    assert!(json["data"]["title"].as_str().unwrap().starts_with("[line_audit]"));
    assert_eq!(json["data"]["sd_notice"]["cause"], "Worn die");
    assert_eq!(json["data"]["history"][0]["type"], "sd_notice_edit");
}

#[tokio::test]
async fn suppliers_endpoint_lists_registry() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/suppliers", &supplier_user(ACME)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
