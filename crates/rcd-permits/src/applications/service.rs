use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::artifacts::{
    invoice_key, render_invoice, render_wallet_card, wallet_card_key,
    TEXT_DOCUMENT_CONTENT_TYPE,
};
use super::domain::{
    ApplicantContact, ApplicationDetails, ApplicationId, ApplicationRecord, ApplicationSubmission, ApplicationType,
    SubmissionEdit,
};
use super::processing::{ApplicationProcessing, ApplicationStatus, ProcessingError};
use super::repository::ApplicationRepository;
use crate::applicants::{
    Applicant, ApplicantEdit, ApplicantId, ApplicantService, ApplicantServiceError,
    ApplicantStatus, NewApplicant,
};
use crate::documents::{DocumentError, DocumentService, Invoice, WalletCard};
use crate::error::{error_response, RepositoryError};
use crate::permits::{
    expiry_for, Permit, PermitNumber, PermitService, PermitServiceError, PermitType, PermitView,
};

/// Optional filters for listing applications.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub application_type: Option<ApplicationType>,
}

impl ApplicationFilter {
    fn matches(&self, record: &ApplicationRecord) -> bool {
        self.status
            .map_or(true, |status| record.processing.status == status)
            && self
                .application_type
                .map_or(true, |kind| record.application_type() == kind)
    }
}

/// Everything produced by completing an application.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub application: ApplicationRecord,
    pub applicant: Applicant,
    pub permit: PermitView,
}

/// Service composing application storage with applicant, permit, and document services.
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    applicants: Arc<ApplicantService>,
    permits: Arc<PermitService>,
    documents: Arc<DocumentService>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        applicants: Arc<ApplicantService>,
        permits: Arc<PermitService>,
        documents: Arc<DocumentService>,
    ) -> Self {
        Self {
            applications,
            applicants,
            permits,
            documents,
        }
    }

    /// Record a new request in `Pending`.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        validate_submission(&submission)?;

        let applicant_id = submission.details.existing_applicant();
        if let Some(applicant_id) = applicant_id {
            if !self.applicants.exists(applicant_id)? {
                return Err(ApplicationServiceError::ApplicantNotFound(applicant_id));
            }
        }

        let record = ApplicationRecord {
            id: self.applications.next_id()?,
            submission,
            applicant_id,
            processing: ApplicationProcessing::new(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.applications.insert(record).map_err(|err| match err {
            RepositoryError::Conflict => ApplicationServiceError::Validation(
                "an application with this id already exists".to_string(),
            ),
            other => ApplicationServiceError::Repository(other),
        })?;
        info!(
            application_id = %stored.id,
            application_type = stored.application_type().label(),
            "application submitted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: ApplicationId) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.applications
            .fetch(id)?
            .ok_or(ApplicationServiceError::NotFound(id))
    }

    pub fn list(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        Ok(self
            .applications
            .list()?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    pub fn update_submission(
        &self,
        id: ApplicationId,
        edit: SubmissionEdit,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.modify(id, now, |record| {
            record.processing.ensure_accepts_edits()?;
            let mut submission = record.submission.clone();
            edit.apply(&mut submission);
            validate_submission(&submission)?;
            record.submission = submission;
            Ok(())
        })
    }

    pub fn begin_review(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.transition(id, now, |processing| processing.begin_review())
    }

    /// Approval makes the submitted data final.
    pub fn approve(
        &self,
        id: ApplicationId,
        reviewer: &str,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let reviewer = validate_reviewer(reviewer)?;
        self.transition(id, now, |processing| processing.approve(reviewer, now))
    }

    pub fn reject(
        &self,
        id: ApplicationId,
        reviewer: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let reviewer = validate_reviewer(reviewer)?;
        let reason = reason.filter(|reason| !reason.trim().is_empty());
        self.transition(id, now, |processing| {
            processing.reject(reviewer, reason, now)
        })
    }

    /// Reopen a reviewed application; every processing step has to be redone.
    pub fn undo_review(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.transition(id, now, |processing| processing.undo_review())
    }

    pub fn assign_app_number(
        &self,
        id: ApplicationId,
        app_number: PermitNumber,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let claimed_elsewhere = self
            .applications
            .find_by_app_number(app_number)?
            .is_some_and(|other| other.id != id);
        if claimed_elsewhere || self.permits.is_taken(app_number)? {
            return Err(ApplicationServiceError::AppNumberAlreadyExists(app_number));
        }

        self.modify(id, now, |record| {
            record.processing.ensure_tasks_open()?;
            if record.processing.app_number != Some(app_number) {
                // The wallet card prints the APP number, so it has to be regenerated.
                record.processing.wallet_card = None;
            }
            record.processing.app_number = Some(app_number);
            Ok(())
        })
    }

    pub fn set_hole_punched(
        &self,
        id: ApplicationId,
        done: bool,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.modify(id, now, |record| {
            record.processing.ensure_tasks_open()?;
            record.processing.app_hole_punched = done;
            Ok(())
        })
    }

    pub fn generate_wallet_card(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<WalletCard, ApplicationServiceError> {
        let record = self.modify(id, now, |record| {
            record.processing.ensure_tasks_open()?;
            let app_number = record
                .processing
                .app_number
                .ok_or(ProcessingError::AppNumberRequired)?;

            let permit_expiry_date = permit_expiry(&record.submission, now)?;
            let body = render_wallet_card(record, app_number, permit_expiry_date);
            let document = self.documents.save(
                &wallet_card_key(record, app_number),
                TEXT_DOCUMENT_CONTENT_TYPE,
                body.into_bytes(),
                now,
            )?;
            record.processing.wallet_card = Some(WalletCard {
                document,
                permit_expiry_date,
                created_at: now,
            });
            Ok(())
        })?;

        record
            .processing
            .wallet_card
            .ok_or(ApplicationServiceError::WalletCardNotFound(id))
    }

    /// Generate the receipt once; later calls return the existing invoice.
    pub fn generate_invoice(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<Invoice, ApplicationServiceError> {
        let current = self.get(id)?;
        current.processing.ensure_tasks_open()?;
        if current.processing.invoice.is_some() {
            return self.invoice(id, now);
        }

        let invoice_number = self.applications.next_invoice_number()?;
        let record = self.modify(id, now, |record| {
            record.processing.ensure_tasks_open()?;
            let body = render_invoice(record, invoice_number, now);
            let document = self.documents.save(
                &invoice_key(record, invoice_number),
                TEXT_DOCUMENT_CONTENT_TYPE,
                body.into_bytes(),
                now,
            )?;
            record.processing.invoice = Some(Invoice {
                invoice_number,
                document,
                created_at: now,
            });
            Ok(())
        })?;

        record
            .processing
            .invoice
            .ok_or(ApplicationServiceError::InvoiceNotFound(id))
    }

    /// Read the invoice, re-signing its link when stale.
    pub fn invoice(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<Invoice, ApplicationServiceError> {
        let mut record = self.get(id)?;
        let Some(invoice) = record.processing.invoice.as_mut() else {
            return Err(ApplicationServiceError::InvoiceNotFound(id));
        };

        if self.documents.refresh(&mut invoice.document, now)? {
            let refreshed = invoice.clone();
            self.applications.update(record)?;
            return Ok(refreshed);
        }
        Ok(invoice.clone())
    }

    /// Read the wallet card, re-signing its link when stale.
    pub fn wallet_card(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<WalletCard, ApplicationServiceError> {
        let mut record = self.get(id)?;
        let Some(card) = record.processing.wallet_card.as_mut() else {
            return Err(ApplicationServiceError::WalletCardNotFound(id));
        };

        if self.documents.refresh(&mut card.document, now)? {
            let refreshed = card.clone();
            self.applications.update(record)?;
            return Ok(refreshed);
        }
        Ok(card.clone())
    }

    /// Close out an approved application: register or update the permit holder and
    /// issue the permit numbered by the assigned APP number.
    ///
    /// The permit expires on the date printed on the wallet card. A call that failed
    /// after issuing the permit can be repeated; it picks up the permit and applicant
    /// already stored for this application.
    pub fn complete(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, ApplicationServiceError> {
        let mut record = self.get(id)?;
        if let Err(err) = record.processing.ensure_completable() {
            warn!(application_id = %id, error = %err, "completion refused");
            return Err(err.into());
        }

        let app_number = record
            .processing
            .app_number
            .ok_or(ProcessingError::AppNumberRequired)?;
        let expiry_date = record
            .processing
            .wallet_card
            .as_ref()
            .map(|card| card.permit_expiry_date)
            .ok_or(ApplicationServiceError::WalletCardNotFound(id))?;
        if record.submission.permit_type == PermitType::Temporary
            && expiry_date.date_naive() < now.date_naive()
        {
            return Err(ApplicationServiceError::Validation(
                "temporary_permit_expiry is in the past".to_string(),
            ));
        }

        let (applicant, permit) = match self.permits.find(app_number)? {
            Some(permit) if permit.application_id == record.id => {
                info!(
                    application_id = %id,
                    rcd_permit_id = %permit.rcd_permit_id,
                    "resuming completion with issued permit"
                );
                (self.applicants.get(permit.applicant_id)?, permit)
            }
            Some(_) => return Err(ApplicationServiceError::AppNumberAlreadyExists(app_number)),
            None => {
                let applicant = self.settle_applicant(&mut record, now)?;
                let permit = self.permits.issue(Permit {
                    rcd_permit_id: app_number,
                    applicant_id: applicant.id,
                    application_id: record.id,
                    permit_type: record.submission.permit_type,
                    expiry_date,
                    active: true,
                    issued_at: now,
                })?;
                (applicant, permit)
            }
        };

        record.processing.complete(now)?;
        record.applicant_id = Some(applicant.id);
        record.updated_at = now;
        self.applications.update(record.clone())?;

        info!(
            application_id = %id,
            applicant_id = %applicant.id,
            rcd_permit_id = %permit.rcd_permit_id,
            from = ApplicationStatus::Approved.label(),
            to = ApplicationStatus::Completed.label(),
            "application completed"
        );

        Ok(CompletionOutcome {
            application: record,
            applicant,
            permit: permit.view(now),
        })
    }

    /// Register a NEW applicant, or apply the submitted details to the existing one.
    ///
    /// A newly registered applicant is linked to the application straight away so a
    /// repeated completion does not register them twice.
    fn settle_applicant(
        &self,
        record: &mut ApplicationRecord,
        now: DateTime<Utc>,
    ) -> Result<Applicant, ApplicationServiceError> {
        if let (ApplicationDetails::New { .. }, Some(applicant_id)) =
            (&record.submission.details, record.applicant_id)
        {
            return Ok(self.applicants.get(applicant_id)?);
        }

        let contact = record.submission.contact.clone();
        match &record.submission.details {
            ApplicationDetails::New {
                date_of_birth,
                gender,
                medical_information,
                guardian,
            } => {
                let applicant = self.applicants.register(
                    NewApplicant {
                        first_name: contact.first_name,
                        middle_name: contact.middle_name,
                        last_name: contact.last_name,
                        date_of_birth: *date_of_birth,
                        gender: *gender,
                        email: contact.email,
                        phone: contact.phone,
                        address: contact.address,
                        guardian: guardian.clone(),
                        medical_information: medical_information.clone(),
                    },
                    now,
                )?;
                record.applicant_id = Some(applicant.id);
                record.updated_at = now;
                self.applications.update(record.clone())?;
                Ok(applicant)
            }
            ApplicationDetails::Renewal {
                applicant_id,
                physician,
            } => {
                let applicant = self.apply_contact(*applicant_id, contact, now)?;
                match physician {
                    Some(physician) => Ok(self.applicants.update_physician(
                        applicant.id,
                        physician.clone(),
                        now,
                    )?),
                    None => Ok(applicant),
                }
            }
            ApplicationDetails::Replacement { applicant_id, .. } => {
                self.apply_contact(*applicant_id, contact, now)
            }
        }
    }

    fn apply_contact(
        &self,
        applicant_id: ApplicantId,
        contact: ApplicantContact,
        now: DateTime<Utc>,
    ) -> Result<Applicant, ApplicationServiceError> {
        let edit = ApplicantEdit {
            first_name: Some(contact.first_name),
            middle_name: Some(contact.middle_name.unwrap_or_default()),
            last_name: Some(contact.last_name),
            email: contact.email,
            phone: Some(contact.phone),
            address: Some(contact.address),
            guardian: None,
        };
        let not_found = |err: ApplicantServiceError| match err {
            ApplicantServiceError::NotFound(id) => ApplicationServiceError::ApplicantNotFound(id),
            other => ApplicationServiceError::Applicant(other),
        };
        self.applicants
            .update_contact(applicant_id, edit, now)
            .map_err(not_found)?;
        // A renewed or replaced permit brings a lapsed holder back.
        self.applicants
            .set_status(applicant_id, ApplicantStatus::Active, now)
            .map_err(not_found)
    }

    /// Apply a status change and persist it; nothing is stored when the change is refused.
    fn transition<F>(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
        change: F,
    ) -> Result<ApplicationRecord, ApplicationServiceError>
    where
        F: FnOnce(&mut ApplicationProcessing) -> Result<(), ProcessingError>,
    {
        let mut record = self.get(id)?;
        let from = record.processing.status;

        if let Err(err) = change(&mut record.processing) {
            warn!(application_id = %id, from = from.label(), error = %err, "transition refused");
            return Err(err.into());
        }

        record.updated_at = now;
        self.applications.update(record.clone())?;
        info!(
            application_id = %id,
            from = from.label(),
            to = record.processing.status.label(),
            "application status changed"
        );
        Ok(record)
    }

    /// Load, change a copy, and persist only if the change succeeded.
    fn modify<F>(
        &self,
        id: ApplicationId,
        now: DateTime<Utc>,
        change: F,
    ) -> Result<ApplicationRecord, ApplicationServiceError>
    where
        F: FnOnce(&mut ApplicationRecord) -> Result<(), ApplicationServiceError>,
    {
        let mut record = self.get(id)?;
        change(&mut record)?;
        record.updated_at = now;
        self.applications.update(record.clone())?;
        Ok(record)
    }
}

fn permit_expiry(
    submission: &ApplicationSubmission,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ApplicationServiceError> {
    let expiry = expiry_for(
        submission.permit_type,
        submission.temporary_permit_expiry,
        now,
    )
    .ok_or_else(|| {
        ApplicationServiceError::Validation(
            "temporary permits require a temporary_permit_expiry date".to_string(),
        )
    })?;

    if submission.permit_type == PermitType::Temporary && expiry.date_naive() < now.date_naive() {
        return Err(ApplicationServiceError::Validation(
            "temporary_permit_expiry is in the past".to_string(),
        ));
    }
    Ok(expiry)
}

fn validate_submission(submission: &ApplicationSubmission) -> Result<(), ApplicationServiceError> {
    let contact = &submission.contact;
    if contact.first_name.trim().is_empty() || contact.last_name.trim().is_empty() {
        return Err(ApplicationServiceError::Validation(
            "first and last name are required".to_string(),
        ));
    }
    if contact.phone.trim().is_empty() {
        return Err(ApplicationServiceError::Validation(
            "phone number is required".to_string(),
        ));
    }
    if submission.permit_type == PermitType::Temporary
        && submission.temporary_permit_expiry.is_none()
    {
        return Err(ApplicationServiceError::Validation(
            "temporary permits require a temporary_permit_expiry date".to_string(),
        ));
    }
    Ok(())
}

fn validate_reviewer(reviewer: &str) -> Result<&str, ApplicationServiceError> {
    let reviewer = reviewer.trim();
    if reviewer.is_empty() {
        return Err(ApplicationServiceError::Validation(
            "reviewer is required".to_string(),
        ));
    }
    Ok(reviewer)
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("applicant {0} not found")]
    ApplicantNotFound(ApplicantId),
    #[error("APP number {0} is already in use")]
    AppNumberAlreadyExists(PermitNumber),
    #[error("application {0} has no invoice")]
    InvoiceNotFound(ApplicationId),
    #[error("application {0} has no wallet card")]
    WalletCardNotFound(ApplicationId),
    #[error("invalid application data: {0}")]
    Validation(String),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Applicant(#[from] ApplicantServiceError),
    #[error(transparent)]
    Permit(#[from] PermitServiceError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "APPLICATION_NOT_FOUND",
            Self::ApplicantNotFound(_) => "APPLICANT_NOT_FOUND",
            Self::AppNumberAlreadyExists(_) => "APP_NUMBER_ALREADY_EXISTS",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::WalletCardNotFound(_) => "WALLET_CARD_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Processing(err) => err.code(),
            Self::Applicant(err) => err.code(),
            Self::Permit(err) => err.code(),
            Self::Document(err) => err.code(),
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_)
            | Self::ApplicantNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::WalletCardNotFound(_) => StatusCode::NOT_FOUND,
            Self::AppNumberAlreadyExists(_) | Self::Processing(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Applicant(err) => err.status(),
            Self::Permit(PermitServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Permit(PermitServiceError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::Document(err) => err.status(),
            Self::Permit(PermitServiceError::Repository(_)) | Self::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApplicationServiceError {
    fn into_response(self) -> Response {
        if matches!(self.status(), StatusCode::INTERNAL_SERVER_ERROR) {
            warn!(error = %self, "application request failed");
        }
        error_response(self.status(), self.code(), self.to_string())
    }
}
