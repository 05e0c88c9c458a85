use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use super::domain::{
    Address, Applicant, ApplicantEdit, ApplicantId, ApplicantStatus, Gender, Guardian,
    MedicalInformation, Physician,
};
use super::repository::ApplicantRepository;
use crate::error::{error_response, RepositoryError};
use crate::permits::{PermitService, PermitServiceError, PermitView};

/// Everything needed to register a permit holder from a completed NEW application.
#[derive(Debug, Clone)]
pub struct NewApplicant {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: Option<String>,
    pub phone: String,
    pub address: Address,
    pub guardian: Option<Guardian>,
    pub medical_information: MedicalInformation,
}

pub struct ApplicantService {
    applicants: Arc<dyn ApplicantRepository>,
    permits: Arc<PermitService>,
}

impl ApplicantService {
    pub fn new(applicants: Arc<dyn ApplicantRepository>, permits: Arc<PermitService>) -> Self {
        Self {
            applicants,
            permits,
        }
    }

    pub fn get(&self, id: ApplicantId) -> Result<Applicant, ApplicantServiceError> {
        self.applicants
            .fetch(id)?
            .ok_or(ApplicantServiceError::NotFound(id))
    }

    pub fn exists(&self, id: ApplicantId) -> Result<bool, ApplicantServiceError> {
        Ok(self.applicants.fetch(id)?.is_some())
    }

    pub fn list(&self) -> Result<Vec<Applicant>, ApplicantServiceError> {
        Ok(self.applicants.list()?)
    }

    pub fn register(
        &self,
        new_applicant: NewApplicant,
        now: DateTime<Utc>,
    ) -> Result<Applicant, ApplicantServiceError> {
        let id = self.applicants.next_id()?;
        let applicant = Applicant {
            id,
            first_name: new_applicant.first_name,
            middle_name: new_applicant.middle_name,
            last_name: new_applicant.last_name,
            date_of_birth: new_applicant.date_of_birth,
            gender: new_applicant.gender,
            email: new_applicant.email,
            phone: new_applicant.phone,
            address: new_applicant.address,
            status: ApplicantStatus::Active,
            guardian: new_applicant.guardian,
            medical_information: new_applicant.medical_information,
            created_at: now,
            updated_at: now,
        };

        let stored = self.applicants.insert(applicant).map_err(|err| match err {
            RepositoryError::Conflict => ApplicantServiceError::AlreadyExists(id),
            other => ApplicantServiceError::Repository(other),
        })?;
        info!(applicant_id = %stored.id, "registered permit holder");
        Ok(stored)
    }

    pub fn update_contact(
        &self,
        id: ApplicantId,
        edit: ApplicantEdit,
        now: DateTime<Utc>,
    ) -> Result<Applicant, ApplicantServiceError> {
        let mut applicant = self.get(id)?;
        edit.apply(&mut applicant);
        validate_names(&applicant)?;
        applicant.updated_at = now;
        self.applicants.update(applicant.clone())?;
        Ok(applicant)
    }

    /// Replace the certifying physician, e.g. when a renewal names a new one.
    pub fn update_physician(
        &self,
        id: ApplicantId,
        physician: Physician,
        now: DateTime<Utc>,
    ) -> Result<Applicant, ApplicantServiceError> {
        let mut applicant = self.get(id)?;
        applicant.medical_information.physician = physician;
        applicant.updated_at = now;
        self.applicants.update(applicant.clone())?;
        Ok(applicant)
    }

    pub fn set_status(
        &self,
        id: ApplicantId,
        status: ApplicantStatus,
        now: DateTime<Utc>,
    ) -> Result<Applicant, ApplicantServiceError> {
        let mut applicant = self.get(id)?;
        if applicant.status != status {
            info!(
                applicant_id = %id,
                from = applicant.status.label(),
                to = status.label(),
                "applicant status changed"
            );
            applicant.status = status;
            applicant.updated_at = now;
            self.applicants.update(applicant.clone())?;
        }
        Ok(applicant)
    }

    pub fn permits(
        &self,
        id: ApplicantId,
        now: DateTime<Utc>,
    ) -> Result<Vec<PermitView>, ApplicantServiceError> {
        self.get(id)?;
        Ok(self.permits.for_applicant(id, now)?)
    }

    pub fn active_permit(
        &self,
        id: ApplicantId,
        now: DateTime<Utc>,
    ) -> Result<Option<PermitView>, ApplicantServiceError> {
        self.get(id)?;
        Ok(self.permits.active_for(id)?.map(|permit| permit.view(now)))
    }
}

fn validate_names(applicant: &Applicant) -> Result<(), ApplicantServiceError> {
    if applicant.first_name.trim().is_empty() || applicant.last_name.trim().is_empty() {
        return Err(ApplicantServiceError::Validation(
            "first and last name are required".to_string(),
        ));
    }
    if applicant.phone.trim().is_empty() {
        return Err(ApplicantServiceError::Validation(
            "phone number is required".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ApplicantServiceError {
    #[error("applicant {0} not found")]
    NotFound(ApplicantId),
    #[error("applicant {0} already exists")]
    AlreadyExists(ApplicantId),
    #[error("invalid applicant data: {0}")]
    Validation(String),
    #[error(transparent)]
    Permit(#[from] PermitServiceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicantServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "APPLICANT_NOT_FOUND",
            Self::AlreadyExists(_) => "APPLICANT_ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Permit(err) => err.code(),
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Permit(PermitServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Permit(PermitServiceError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::Permit(PermitServiceError::Repository(_)) | Self::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApplicantServiceError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.code(), self.to_string())
    }
}
