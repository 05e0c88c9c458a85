use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{Permit, PermitNumber, PermitView};
use super::repository::PermitRepository;
use crate::applicants::ApplicantId;
use crate::error::{error_response, RepositoryError};

/// Issues permits and keeps at most one active permit per applicant.
pub struct PermitService {
    permits: Arc<dyn PermitRepository>,
}

impl PermitService {
    pub fn new(permits: Arc<dyn PermitRepository>) -> Self {
        Self { permits }
    }

    /// Store `permit` as the applicant's active permit, retiring any other active one.
    ///
    /// The new permit is stored before anything else is touched, so a refused
    /// insert leaves the applicant's current permit active.
    pub fn issue(&self, mut permit: Permit) -> Result<Permit, PermitServiceError> {
        let id = permit.rcd_permit_id;
        if self.permits.fetch(id)?.is_some() {
            return Err(PermitServiceError::AlreadyExists(id));
        }

        permit.active = true;
        let stored = self.permits.insert(permit).map_err(|err| match err {
            RepositoryError::Conflict => PermitServiceError::AlreadyExists(id),
            other => PermitServiceError::Repository(other),
        })?;

        for mut previous in self.permits.for_applicant(stored.applicant_id)? {
            if previous.active && previous.rcd_permit_id != id {
                previous.active = false;
                info!(
                    applicant_id = %stored.applicant_id,
                    rcd_permit_id = %previous.rcd_permit_id,
                    "deactivated superseded permit"
                );
                self.permits.update(previous)?;
            }
        }

        info!(
            applicant_id = %stored.applicant_id,
            rcd_permit_id = %stored.rcd_permit_id,
            expiry_date = %stored.expiry_date,
            "issued permit"
        );
        Ok(stored)
    }

    pub fn get(&self, id: PermitNumber, now: DateTime<Utc>) -> Result<PermitView, PermitServiceError> {
        let permit = self
            .permits
            .fetch(id)?
            .ok_or(PermitServiceError::NotFound(id))?;
        Ok(permit.view(now))
    }

    pub fn find(&self, id: PermitNumber) -> Result<Option<Permit>, PermitServiceError> {
        Ok(self.permits.fetch(id)?)
    }

    pub fn is_taken(&self, id: PermitNumber) -> Result<bool, PermitServiceError> {
        Ok(self.find(id)?.is_some())
    }

    pub fn for_applicant(
        &self,
        applicant_id: ApplicantId,
        now: DateTime<Utc>,
    ) -> Result<Vec<PermitView>, PermitServiceError> {
        Ok(self
            .permits
            .for_applicant(applicant_id)?
            .iter()
            .map(|permit| permit.view(now))
            .collect())
    }

    pub fn active_for(&self, applicant_id: ApplicantId) -> Result<Option<Permit>, PermitServiceError> {
        Ok(self
            .permits
            .for_applicant(applicant_id)?
            .into_iter()
            .find(|permit| permit.active))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PermitServiceError {
    #[error("permit {0} not found")]
    NotFound(PermitNumber),
    #[error("a permit numbered {0} already exists")]
    AlreadyExists(PermitNumber),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl PermitServiceError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PERMIT_NOT_FOUND",
            Self::AlreadyExists(_) => "PERMIT_ALREADY_EXISTS",
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PermitServiceError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.code(), self.to_string())
    }
}
