use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::applicants::{
    Address, ApplicantId, Gender, MedicalInformation, NewApplicant, PatientCondition, Physician,
};
use crate::applications::domain::{
    ApplicantContact, ApplicationDetails, ApplicationId, ApplicationRecord, ApplicationSubmission,
    PaymentDetails, PaymentMethod,
};
use crate::applications::processing::ApplicationStatus;
use crate::applications::repository::ApplicationRepository;
use crate::config::DocumentConfig;
use crate::error::RepositoryError;
use crate::memory::InMemoryApplicationRepository;
use crate::permits::{PermitNumber, PermitType};
use crate::portal::{Portal, PortalRepositories};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 15, 45, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn document_config() -> DocumentConfig {
    DocumentConfig {
        public_base_url: "https://permits.example.org".to_string(),
        signing_secret: "test-signing-secret".to_string(),
    }
}

pub(super) fn address() -> Address {
    Address {
        address_line_1: "1020 Mainland St".to_string(),
        address_line_2: Some("Suite 310".to_string()),
        city: "Vancouver".to_string(),
        province: "BC".to_string(),
        postal_code: "V6B 2T4".to_string(),
    }
}

pub(super) fn physician() -> Physician {
    Physician {
        msp_number: 10_457,
        first_name: "Priya".to_string(),
        last_name: "Sandhu".to_string(),
        phone: "604-555-0144".to_string(),
        address: address(),
    }
}

pub(super) fn medical_information() -> MedicalInformation {
    MedicalInformation {
        disability: "Multiple sclerosis".to_string(),
        affected_areas: vec!["Legs".to_string()],
        patient_condition: PatientCondition::NonAmbulatory,
        physician: physician(),
    }
}

pub(super) fn contact() -> ApplicantContact {
    ApplicantContact {
        first_name: "Maya".to_string(),
        middle_name: None,
        last_name: "Okafor".to_string(),
        email: Some("maya@example.org".to_string()),
        phone: "604-555-0199".to_string(),
        address: address(),
    }
}

pub(super) fn payment() -> PaymentDetails {
    PaymentDetails {
        method: PaymentMethod::Visa,
        processing_fee_cents: 2_600,
        donation_cents: 1_000,
        second_donation_cents: 0,
    }
}

pub(super) fn new_submission() -> ApplicationSubmission {
    ApplicationSubmission {
        contact: contact(),
        permit_type: PermitType::Permanent,
        temporary_permit_expiry: None,
        payment: payment(),
        details: ApplicationDetails::New {
            date_of_birth: NaiveDate::from_ymd_opt(1961, 7, 2).expect("valid date"),
            gender: Gender::Female,
            medical_information: medical_information(),
            guardian: None,
        },
    }
}

pub(super) fn renewal_submission(applicant_id: ApplicantId) -> ApplicationSubmission {
    ApplicationSubmission {
        details: ApplicationDetails::Renewal {
            applicant_id,
            physician: None,
        },
        ..new_submission()
    }
}

pub(super) fn new_applicant() -> NewApplicant {
    NewApplicant {
        first_name: "Maya".to_string(),
        middle_name: None,
        last_name: "Okafor".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1961, 7, 2).expect("valid date"),
        gender: Gender::Female,
        email: None,
        phone: "604-555-0100".to_string(),
        address: address(),
        guardian: None,
        medical_information: medical_information(),
    }
}

pub(super) fn build_portal() -> (Portal, PortalRepositories) {
    let repositories = PortalRepositories::in_memory();
    let portal = Portal::new(repositories.clone(), &document_config());
    (portal, repositories)
}

pub(super) fn portal_with_applications(applications: Arc<dyn ApplicationRepository>) -> Portal {
    let repositories = PortalRepositories {
        applications,
        ..PortalRepositories::in_memory()
    };
    Portal::new(repositories, &document_config())
}

/// Submit and approve, returning the id of an application ready for processing.
pub(super) fn approved_application(portal: &Portal) -> ApplicationId {
    let record = portal
        .applications
        .submit(new_submission(), now())
        .expect("submit");
    portal
        .applications
        .approve(record.id, "intake@rcd", now())
        .expect("approve");
    record.id
}

/// Run every processing step on an approved application.
pub(super) fn process_fully(portal: &Portal, id: ApplicationId, app_number: u32) {
    let service = &portal.applications;
    service
        .assign_app_number(id, PermitNumber(app_number), now())
        .expect("assign app number");
    service
        .set_hole_punched(id, true, now())
        .expect("hole punch");
    service
        .generate_wallet_card(id, now())
        .expect("wallet card");
    service.generate_invoice(id, now()).expect("invoice");
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn next_id(&self) -> Result<ApplicationId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn next_invoice_number(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn created_between(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_app_number(
        &self,
        _app_number: PermitNumber,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// In-memory storage that refuses the first write marking an application completed.
#[derive(Default)]
pub(super) struct CompletionWriteFailsOnce {
    inner: InMemoryApplicationRepository,
    failed: AtomicBool,
}

impl ApplicationRepository for CompletionWriteFailsOnce {
    fn next_id(&self) -> Result<ApplicationId, RepositoryError> {
        self.inner.next_id()
    }

    fn next_invoice_number(&self) -> Result<u64, RepositoryError> {
        self.inner.next_invoice_number()
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        if record.processing.status == ApplicationStatus::Completed
            && !self.failed.swap(true, Ordering::SeqCst)
        {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.update(record)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list()
    }

    fn created_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.created_between(start, end)
    }

    fn find_by_app_number(
        &self,
        app_number: PermitNumber,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.find_by_app_number(app_number)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
