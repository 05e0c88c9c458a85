use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::applications::router::submit_handler;
use crate::permits::PermitNumber;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_returns_created_view() {
    let (portal, _) = build_portal();

    let response = portal
        .router()
        .oneshot(json_request(
            "POST",
            "/api/v1/applications",
            serde_json::to_value(new_submission()).expect("serializable"),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["processing"]["status"], "PENDING");
    assert_eq!(body["editable"], true);
    assert_eq!(
        body["outstanding_tasks"],
        json!([
            "APP_NUMBER_ASSIGNED",
            "APP_HOLE_PUNCHED",
            "WALLET_CARD_CREATED",
            "INVOICE_GENERATED"
        ])
    );
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let portal = portal_with_applications(Arc::new(UnavailableRepository));

    let response = submit_handler(State(portal.applications.clone()), axum::Json(new_submission()))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let (portal, _) = build_portal();

    let response = portal
        .router()
        .oneshot(
            Request::get("/api/v1/applications/77")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "APPLICATION_NOT_FOUND");
}

#[tokio::test]
async fn premature_completion_is_a_conflict() {
    let (portal, _) = build_portal();
    let id = approved_application(&portal);

    let response = portal
        .router()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/complete"),
            json!({}),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "INCOMPLETE_PROCESSING");
    assert!(body["error"]
        .as_str()
        .expect("message")
        .contains("APP number assigned"));
}

#[tokio::test]
async fn app_number_route_rejects_duplicates() {
    let (portal, _) = build_portal();
    let first = approved_application(&portal);
    let second = approved_application(&portal);
    portal
        .applications
        .assign_app_number(first, PermitNumber(30_001), now())
        .expect("assign");

    let response = portal
        .router()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/applications/{second}/processing/app-number"),
            json!({ "app_number": 30_001 }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "APP_NUMBER_ALREADY_EXISTS");
}

#[tokio::test]
async fn signed_invoice_link_downloads_and_tampering_is_forbidden() {
    let (portal, _) = build_portal();
    let id = approved_application(&portal);
    let invoice = portal
        .applications
        .generate_invoice(id, Utc::now())
        .expect("invoice");
    let path = invoice
        .document
        .url
        .strip_prefix(&document_config().public_base_url)
        .expect("link uses public base url")
        .to_string();

    let response = portal
        .router()
        .oneshot(Request::get(path.as_str()).body(Body::empty()).expect("request builds"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 invoice");
    assert!(text.contains(&invoice.display_number()));

    let tampered = format!("{}x", path);
    let response = portal
        .router()
        .oneshot(
            Request::get(tampered.as_str())
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "INVALID_SIGNATURE");
}
