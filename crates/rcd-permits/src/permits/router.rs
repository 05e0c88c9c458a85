use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use super::domain::{PermitNumber, PermitView};
use super::service::{PermitService, PermitServiceError};

pub fn permit_router(service: Arc<PermitService>) -> Router {
    Router::new()
        .route("/api/v1/permits/:rcd_permit_id", get(permit_handler))
        .with_state(service)
}

pub(crate) async fn permit_handler(
    State(service): State<Arc<PermitService>>,
    Path(rcd_permit_id): Path<u32>,
) -> Result<Json<PermitView>, PermitServiceError> {
    service
        .get(PermitNumber(rcd_permit_id), Utc::now())
        .map(Json)
}
