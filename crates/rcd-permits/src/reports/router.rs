use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;

use super::columns::{ApplicationsReportColumn, PermitHoldersReportColumn};
use super::error::ReportError;
use super::generator::{ReportGenerator, ReportLink, ReportRequest};

pub fn report_router(generator: Arc<ReportGenerator>) -> Router {
    Router::new()
        .route("/api/v1/reports/applications", post(applications_handler))
        .route(
            "/api/v1/reports/permit-holders",
            post(permit_holders_handler),
        )
        .with_state(generator)
}

pub(crate) async fn applications_handler(
    State(generator): State<Arc<ReportGenerator>>,
    Json(request): Json<ReportRequest<ApplicationsReportColumn>>,
) -> Result<Json<ReportLink>, ReportError> {
    generator.applications_report(&request, Utc::now()).map(Json)
}

pub(crate) async fn permit_holders_handler(
    State(generator): State<Arc<ReportGenerator>>,
    Json(request): Json<ReportRequest<PermitHoldersReportColumn>>,
) -> Result<Json<ReportLink>, ReportError> {
    generator
        .permit_holders_report(&request, Utc::now())
        .map(Json)
}
