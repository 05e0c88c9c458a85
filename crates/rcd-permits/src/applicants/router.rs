use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::domain::{Applicant, ApplicantEdit, ApplicantId, ApplicantStatus};
use super::service::{ApplicantService, ApplicantServiceError};
use crate::permits::PermitView;

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) status: ApplicantStatus,
}

pub fn applicant_router(service: Arc<ApplicantService>) -> Router {
    Router::new()
        .route(
            "/api/v1/applicants/:applicant_id",
            get(applicant_handler).patch(update_handler),
        )
        .route("/api/v1/applicants/:applicant_id/status", put(status_handler))
        .route(
            "/api/v1/applicants/:applicant_id/permits",
            get(permits_handler),
        )
        .route(
            "/api/v1/applicants/:applicant_id/permits/active",
            get(active_permit_handler),
        )
        .with_state(service)
}

pub(crate) async fn applicant_handler(
    State(service): State<Arc<ApplicantService>>,
    Path(applicant_id): Path<u64>,
) -> Result<Json<Applicant>, ApplicantServiceError> {
    service.get(ApplicantId(applicant_id)).map(Json)
}

pub(crate) async fn update_handler(
    State(service): State<Arc<ApplicantService>>,
    Path(applicant_id): Path<u64>,
    Json(edit): Json<ApplicantEdit>,
) -> Result<Json<Applicant>, ApplicantServiceError> {
    service
        .update_contact(ApplicantId(applicant_id), edit, Utc::now())
        .map(Json)
}

pub(crate) async fn status_handler(
    State(service): State<Arc<ApplicantService>>,
    Path(applicant_id): Path<u64>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Applicant>, ApplicantServiceError> {
    service
        .set_status(ApplicantId(applicant_id), request.status, Utc::now())
        .map(Json)
}

pub(crate) async fn permits_handler(
    State(service): State<Arc<ApplicantService>>,
    Path(applicant_id): Path<u64>,
) -> Result<Json<Vec<PermitView>>, ApplicantServiceError> {
    service
        .permits(ApplicantId(applicant_id), Utc::now())
        .map(Json)
}

/// `null` when the applicant holds no active permit.
pub(crate) async fn active_permit_handler(
    State(service): State<Arc<ApplicantService>>,
    Path(applicant_id): Path<u64>,
) -> Result<Json<Option<PermitView>>, ApplicantServiceError> {
    service
        .active_permit(ApplicantId(applicant_id), Utc::now())
        .map(Json)
}
