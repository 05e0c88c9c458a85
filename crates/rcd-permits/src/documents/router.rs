use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::service::{DocumentError, DocumentService};

#[derive(Debug, Deserialize)]
pub(crate) struct SignedQuery {
    pub(crate) expires: i64,
    pub(crate) signature: String,
}

pub fn document_router(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route("/documents/*key", get(download_handler))
        .with_state(service)
}

pub(crate) async fn download_handler(
    State(service): State<Arc<DocumentService>>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Response, DocumentError> {
    let object = service.open(&key, query.expires, &query.signature, Utc::now())?;
    Ok(([(header::CONTENT_TYPE, object.content_type)], object.bytes).into_response())
}
