use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationSubmission, SubmissionEdit};
use super::processing::ProcessingTask;
use super::service::{
    ApplicationFilter, ApplicationService, ApplicationServiceError, CompletionOutcome,
};
use crate::documents::{Invoice, WalletCard};
use crate::permits::PermitNumber;

/// Application record plus what is still left before it can be completed.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub record: ApplicationRecord,
    pub editable: bool,
    pub outstanding_tasks: Vec<ProcessingTask>,
}

impl From<ApplicationRecord> for ApplicationView {
    fn from(record: ApplicationRecord) -> Self {
        Self {
            editable: record.processing.status.accepts_edits(),
            outstanding_tasks: record.processing.outstanding_tasks(),
            record,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) reviewer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) reviewer: String,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppNumberRequest {
    pub(crate) app_number: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HolePunchedRequest {
    pub(crate) done: bool,
}

type ServiceState = State<Arc<ApplicationService>>;
type ViewResult = Result<Json<ApplicationView>, ApplicationServiceError>;

/// Router builder exposing intake and staff processing endpoints.
pub fn application_router(service: Arc<ApplicationService>) -> Router {
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler).get(list_handler),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler).patch(edit_handler),
        )
        .route(
            "/api/v1/applications/:application_id/review",
            post(begin_review_handler),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_handler),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler),
        )
        .route(
            "/api/v1/applications/:application_id/undo-review",
            post(undo_review_handler),
        )
        .route(
            "/api/v1/applications/:application_id/complete",
            post(complete_handler),
        )
        .route(
            "/api/v1/applications/:application_id/processing/app-number",
            put(app_number_handler),
        )
        .route(
            "/api/v1/applications/:application_id/processing/hole-punched",
            put(hole_punched_handler),
        )
        .route(
            "/api/v1/applications/:application_id/processing/wallet-card",
            post(generate_wallet_card_handler),
        )
        .route(
            "/api/v1/applications/:application_id/processing/invoice",
            post(generate_invoice_handler),
        )
        .route(
            "/api/v1/applications/:application_id/wallet-card",
            get(wallet_card_handler),
        )
        .route(
            "/api/v1/applications/:application_id/invoice",
            get(invoice_handler),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): ServiceState,
    Json(submission): Json<ApplicationSubmission>,
) -> Response {
    match service.submit(submission, Utc::now()) {
        Ok(record) => {
            (StatusCode::CREATED, Json(ApplicationView::from(record))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler(
    State(service): ServiceState,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationView>>, ApplicationServiceError> {
    let records = service.list(filter)?;
    Ok(Json(records.into_iter().map(ApplicationView::from).collect()))
}

pub(crate) async fn get_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> ViewResult {
    service
        .get(ApplicationId(application_id))
        .map(|record| Json(record.into()))
}

pub(crate) async fn edit_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
    Json(edit): Json<SubmissionEdit>,
) -> ViewResult {
    service
        .update_submission(ApplicationId(application_id), edit, Utc::now())
        .map(|record| Json(record.into()))
}

pub(crate) async fn begin_review_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> ViewResult {
    service
        .begin_review(ApplicationId(application_id), Utc::now())
        .map(|record| Json(record.into()))
}

pub(crate) async fn approve_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
    Json(request): Json<ReviewRequest>,
) -> ViewResult {
    service
        .approve(ApplicationId(application_id), &request.reviewer, Utc::now())
        .map(|record| Json(record.into()))
}

pub(crate) async fn reject_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
    Json(request): Json<RejectRequest>,
) -> ViewResult {
    service
        .reject(
            ApplicationId(application_id),
            &request.reviewer,
            request.reason,
            Utc::now(),
        )
        .map(|record| Json(record.into()))
}

pub(crate) async fn undo_review_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> ViewResult {
    service
        .undo_review(ApplicationId(application_id), Utc::now())
        .map(|record| Json(record.into()))
}

pub(crate) async fn complete_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> Result<Json<CompletionOutcome>, ApplicationServiceError> {
    service
        .complete(ApplicationId(application_id), Utc::now())
        .map(Json)
}

pub(crate) async fn app_number_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
    Json(request): Json<AppNumberRequest>,
) -> ViewResult {
    service
        .assign_app_number(
            ApplicationId(application_id),
            PermitNumber(request.app_number),
            Utc::now(),
        )
        .map(|record| Json(record.into()))
}

pub(crate) async fn hole_punched_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
    Json(request): Json<HolePunchedRequest>,
) -> ViewResult {
    service
        .set_hole_punched(ApplicationId(application_id), request.done, Utc::now())
        .map(|record| Json(record.into()))
}

pub(crate) async fn generate_wallet_card_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> Result<Json<WalletCard>, ApplicationServiceError> {
    service
        .generate_wallet_card(ApplicationId(application_id), Utc::now())
        .map(Json)
}

pub(crate) async fn generate_invoice_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> Result<Json<Invoice>, ApplicationServiceError> {
    service
        .generate_invoice(ApplicationId(application_id), Utc::now())
        .map(Json)
}

pub(crate) async fn wallet_card_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> Result<Json<WalletCard>, ApplicationServiceError> {
    service
        .wallet_card(ApplicationId(application_id), Utc::now())
        .map(Json)
}

pub(crate) async fn invoice_handler(
    State(service): ServiceState,
    Path(application_id): Path<u64>,
) -> Result<Json<Invoice>, ApplicationServiceError> {
    service
        .invoice(ApplicationId(application_id), Utc::now())
        .map(Json)
}
