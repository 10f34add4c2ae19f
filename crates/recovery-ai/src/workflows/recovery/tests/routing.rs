use super::common::*;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::AllocationConfig;
use crate::workflows::recovery::domain::CaseStatus;
use crate::workflows::recovery::router::{allocate_handler, batch_handler, case_handler};
use crate::workflows::recovery::RecoveryService;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializes")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn ingest_route_creates_cases() {
    let (service, _) = build_service(Vec::new());
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/cases",
            json!({ "customer_name": "Globex", "amount": 12000, "days_overdue": 30 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("NEW"));
    assert_eq!(payload["currency"], json!("USD"));
    assert_eq!(payload["audit_log"][0]["action"], json!("CREATED"));
}

#[tokio::test]
async fn ingest_route_rejects_negative_amounts() {
    let (service, _) = build_service(Vec::new());
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/v1/cases", json!({ "amount": -1 })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("amount"));
}

#[tokio::test]
async fn score_route_returns_analysis() {
    let (service, _) = build_service(vec![case("score-me", 60_000.0, 40)]);
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("POST", "/api/v1/cases/score-me/score"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("AI_PROCESSED"));
    assert_eq!(payload["analysis"]["recovery_probability"], json!(90));
    assert_eq!(payload["analysis"]["priority_score"], json!(70));
    assert_eq!(payload["analysis"]["sla_breach_risk"], json!("LOW"));
}

#[tokio::test]
async fn case_handler_maps_missing_case_to_not_found() {
    let (service, _) = build_service(Vec::new());

    let response = case_handler(State(Arc::new(service)), Path("nope".to_string())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn allocate_handler_defaults_to_auto_allocation() {
    let (service, _) = build_service(vec![case("auto", 1_000.0, 3)]);

    let response = allocate_handler(
        State(Arc::new(service)),
        Path("auto".to_string()),
        Bytes::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["assigned_partner_id"], json!("dca-003"));
    assert_eq!(payload["audit_log"][1]["action"], json!("ALLOCATED_AUTO"));
}

#[tokio::test]
async fn allocate_handler_reports_unknown_partner() {
    let (service, _) = build_service(vec![case("manual", 1_000.0, 3)]);

    let response = allocate_handler(
        State(Arc::new(service)),
        Path("manual".to_string()),
        Bytes::from_static(br#"{ "partner_id": "dca-404" }"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn allocate_handler_rejects_malformed_body() {
    let (service, _) = build_service(vec![case("manual", 1_000.0, 3)]);

    let response = allocate_handler(
        State(Arc::new(service)),
        Path("manual".to_string()),
        Bytes::from_static(b"{ not json"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_handler_conflicts_without_partners() {
    let (service, _) = build_service_with(
        vec![case("pending", 1_000.0, 3)],
        Vec::new(),
        AllocationConfig::default(),
    );

    let response = batch_handler(State(Arc::new(service))).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn batch_handler_returns_internal_error_on_repository_failure() {
    let service = RecoveryService::new(
        Arc::new(UnavailableCases),
        Arc::new(MemoryPartners {
            partners: partners(),
        }),
        AllocationConfig::default(),
    );

    let response = batch_handler(State(Arc::new(service))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn batch_route_returns_assignment_mapping() {
    let (service, _) = build_service(vec![case("big", 80_000.0, 3), case("small", 80.0, 3)]);
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("POST", "/api/v1/allocations/batch"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["allocated"], json!(2));
    assert_eq!(payload["assignments"]["big"], json!("dca-003"));
    assert_eq!(payload["assignments"]["small"], json!("dca-004"));
}

#[tokio::test]
async fn status_and_interaction_routes_update_case() {
    let assigned = case_with_status("work", 4_000.0, CaseStatus::Assigned);
    let (service, _) = build_service(vec![assigned]);
    let service = Arc::new(service);
    let router = crate::workflows::recovery::recovery_router(service.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/cases/work/status",
            json!({ "status": "IN_PROGRESS", "note": "picked up" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/cases/work/interactions",
            json!({ "kind": "CALL", "notes": "spoke to AP team" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["interactions"][0]["kind"], json!("CALL"));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/cases/work/status",
            json!({ "status": "ASSIGNED" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn partner_route_scopes_cases_to_path_identity() {
    let assigned = case_with_status("scoped", 4_000.0, CaseStatus::Assigned);
    let (service, _) = build_service(vec![assigned, case("open", 1.0, 1)]);
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/partners/dca-002/cases"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["id"], json!("scoped"));

    let response = router
        .oneshot(empty_request("GET", "/api/v1/partners/dca-001/cases"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn insights_route_summarizes_portfolio() {
    let (service, _) = build_service(vec![case("one", 1_000.0, 3)]);
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/insights"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_cases"], json!(1));
    assert_eq!(payload["partners"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn malformed_bodies_answer_with_json_errors() {
    let (service, _) = build_service(vec![case("typed", 1_000.0, 3)]);
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cases")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ \"amount\": "))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/cases/typed/status",
            json!({ "status": "DONE" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cases/typed/interactions")
                .body(Body::from(r#"{ "kind": "CALL", "notes": "hi" }"#))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
}
