//! End-to-end permit processing through the public HTTP router: intake, staff
//! processing, completion, and the reports built from the results.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use rcd_permits::config::DocumentConfig;
use rcd_permits::Portal;
use serde_json::{json, Value};
use tower::ServiceExt;

fn portal() -> Portal {
    Portal::in_memory(&DocumentConfig {
        public_base_url: "http://127.0.0.1:8080".to_string(),
        signing_secret: "integration-secret".to_string(),
    })
}

fn address() -> Value {
    json!({
        "address_line_1": "8671 No. 1 Rd",
        "city": "Richmond",
        "postal_code": "V7C 1V3"
    })
}

fn new_application() -> Value {
    json!({
        "contact": {
            "first_name": "Harold",
            "middle_name": "J",
            "last_name": "Singh",
            "phone": "604-555-0110",
            "address": address()
        },
        "permit_type": "PERMANENT",
        "payment": {
            "method": "MASTERCARD",
            "processing_fee_cents": 2600,
            "donation_cents": 2000
        },
        "details": {
            "type": "NEW",
            "date_of_birth": "1949-02-17",
            "gender": "MALE",
            "medical_information": {
                "disability": "Amputee",
                "affected_areas": ["Legs"],
                "patient_condition": "NON_AMBULATORY",
                "physician": {
                    "msp_number": 30912,
                    "first_name": "Grace",
                    "last_name": "Lam",
                    "phone": "604-555-0188",
                    "address": address()
                }
            }
        }
    })
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).expect("request builds"))
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn new_application_walks_through_to_an_issued_permit() {
    let router = portal().router();

    let (status, created) = send(&router, "POST", "/api/v1/applications", Some(new_application())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_u64().expect("application id");
    let base = format!("/api/v1/applications/{id}");

    let (status, view) = send(&router, "POST", &format!("{base}/review"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["processing"]["status"], "IN_PROGRESS");

    let (status, edited) = send(
        &router,
        "PATCH",
        &base,
        Some(json!({ "payment": { "method": "CASH", "processing_fee_cents": 2600 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["submission"]["payment"]["method"], "CASH");

    let (status, approved) = send(
        &router,
        "POST",
        &format!("{base}/approve"),
        Some(json!({ "reviewer": "staff@rcd" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["processing"]["status"], "APPROVED");
    assert_eq!(approved["editable"], false);

    let (status, _) = send(
        &router,
        "PUT",
        &format!("{base}/processing/app-number"),
        Some(json!({ "app_number": 41_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        "PUT",
        &format!("{base}/processing/hole-punched"),
        Some(json!({ "done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, card) = send(&router, "POST", &format!("{base}/processing/wallet-card"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(card["document"]["url"]
        .as_str()
        .expect("card url")
        .contains("/documents/wallet-cards/"));
    let (status, invoice) = send(&router, "POST", &format!("{base}/processing/invoice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["invoice_number"], 1);

    let (status, outcome) = send(&router, "POST", &format!("{base}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["application"]["processing"]["status"], "COMPLETED");
    assert_eq!(outcome["permit"]["rcd_permit_id"], 41_000);
    assert_eq!(outcome["permit"]["status"], "ACTIVE");
    let applicant_id = outcome["applicant"]["id"].as_u64().expect("applicant id");

    let (status, permits) = send(
        &router,
        "GET",
        &format!("/api/v1/applicants/{applicant_id}/permits"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(permits.as_array().expect("permit list").len(), 1);
    let (status, active) = send(
        &router,
        "GET",
        &format!("/api/v1/applicants/{applicant_id}/permits/active"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["rcd_permit_id"], 41_000);

    let (status, permit) = send(&router, "GET", "/api/v1/permits/41000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(permit["active"], true);

    let (status, err) = send(&router, "POST", &format!("{base}/undo-review"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn applications_report_link_serves_the_csv() {
    let router = portal().router();
    let (status, _) = send(&router, "POST", "/api/v1/applications", Some(new_application())).await;
    assert_eq!(status, StatusCode::CREATED);

    let today = chrono::Utc::now().date_naive();
    let (status, link) = send(
        &router,
        "POST",
        "/api/v1/reports/applications",
        Some(json!({
            "start_date": today.to_string(),
            "end_date": today.to_string(),
            "columns": ["APPLICANT_NAME", "APPLICATION_TYPE", "DONATION_AMOUNT"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["row_count"], 1);

    let url = link["url"].as_str().expect("report url");
    let path = url
        .strip_prefix("http://127.0.0.1:8080")
        .expect("public base url");
    let (status, csv) = send(&router, "GET", path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        csv,
        Value::String(
            "Applicant Name,Application Type,Donation Amount\nHarold J Singh,New,$20.00\n"
                .to_string()
        )
    );
}

#[tokio::test]
async fn report_with_unknown_column_is_rejected() {
    let router = portal().router();

    let (status, _) = send(
        &router,
        "POST",
        "/api/v1/reports/permit-holders",
        Some(json!({
            "start_date": "2026-01-01",
            "end_date": "2026-12-31",
            "columns": ["FAVOURITE_COLOUR"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn report_without_columns_reports_validation_error() {
    let router = portal().router();

    let (status, body) = send(
        &router,
        "POST",
        "/api/v1/reports/permit-holders",
        Some(json!({
            "start_date": "2026-01-01",
            "end_date": "2026-12-31",
            "columns": []
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
