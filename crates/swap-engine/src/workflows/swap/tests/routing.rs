use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::swap::router::swap_router;
use crate::workflows::swap::scoring::ScoringAlgorithm;
use crate::workflows::swap::service::SwapProposalService;

fn router() -> Router {
    let (service, _, _) = build_service(ScoringAlgorithm::VarietyWeighted);
    swap_router(Arc::new(service))
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request(method, uri, body))
        .await
        .expect("router response");
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return (status, Value::Null);
    }
    (status, read_json_body(response).await)
}

async fn open(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/v1/swaps", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().expect("session id").to_string()
}

#[tokio::test]
async fn open_returns_an_empty_scored_session() {
    let app = router();
    let (status, body) = send(&app, Method::POST, "/api/v1/swaps", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["score"]["score"], 80);
    assert_eq!(body["gate"]["blocker"]["code"], "empty_zone");
}

#[tokio::test]
async fn zone_edits_rescore_the_session() {
    let app = router();
    let id = open(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/zones/offer"),
        Some(json!({ "item_id": "camera" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offer"][0]["id"], "camera");
    assert_eq!(body["score"]["score"], 55);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/swaps/{id}/zones/offer/camera"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offer_summary"]["item_count"], 0);
}

#[tokio::test]
async fn unknown_catalog_item_is_unprocessable() {
    let app = router();
    let id = open(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/zones/request"),
        Some(json!({ "item_id": "spaceship" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["item_id"], "spaceship");
}

#[tokio::test]
async fn blocked_submit_returns_warning_banner() {
    let app = router();
    let id = open(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/actions/submit"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["blocker"]["code"], "empty_zone");
    assert_eq!(body["banner"]["title"], "Attention Required");
    assert_eq!(body["banner"]["message"], "Add items to both sides of the swap");
}

#[tokio::test]
async fn submit_is_accepted_and_left_pending() {
    let app = router();
    let id = open(&app).await;
    for (zone, item) in [("offer", "camera"), ("request", "handbag")] {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/swaps/{id}/zones/{zone}"),
            Some(json!({ "item_id": item })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/actions/submit"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["banner"]["title"], "Proposal Pending");

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/swaps/{id}/draft"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offer"], json!(["camera"]));
    assert!(body["submission"]["proposal_id"]
        .as_str()
        .is_some_and(|proposal| proposal.starts_with("swap-")));

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/actions/submit"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn lifecycle_conflicts_and_resolve_are_refused() {
    let app = router();
    let id = open(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/actions/acknowledge"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/actions/resolve"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/swaps/{id}/actions/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "draft");
}

#[tokio::test]
async fn closed_and_unknown_sessions_are_not_found() {
    let app = router();
    let id = open(&app).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/swaps/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/swaps/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "swap session not found");
}

#[tokio::test]
async fn store_outage_is_an_internal_error() {
    let service = SwapProposalService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemoryCounterparty::default()),
        Arc::new(catalog()),
        config(ScoringAlgorithm::RatioWeighted),
    );
    let app = swap_router(Arc::new(service));

    let (status, body) = send(&app, Method::POST, "/api/v1/swaps", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("maintenance")));
}
