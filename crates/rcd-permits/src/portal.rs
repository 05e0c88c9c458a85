//! Wiring of repositories into services and of services into one router.

use std::sync::Arc;

use axum::Router;

use crate::applicants::{applicant_router, ApplicantRepository, ApplicantService};
use crate::applications::{application_router, ApplicationRepository, ApplicationService};
use crate::config::DocumentConfig;
use crate::documents::{document_router, DocumentService, ObjectStore, UrlSigner};
use crate::memory::{
    InMemoryApplicantRepository, InMemoryApplicationRepository, InMemoryObjectStore,
    InMemoryPermitRepository,
};
use crate::permits::{permit_router, PermitRepository, PermitService};
use crate::reports::{report_router, ReportGenerator};

/// Storage backends the portal runs on.
#[derive(Clone)]
pub struct PortalRepositories {
    pub applicants: Arc<dyn ApplicantRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub permits: Arc<dyn PermitRepository>,
    pub objects: Arc<dyn ObjectStore>,
}

impl PortalRepositories {
    pub fn in_memory() -> Self {
        Self {
            applicants: Arc::new(InMemoryApplicantRepository::default()),
            applications: Arc::new(InMemoryApplicationRepository::default()),
            permits: Arc::new(InMemoryPermitRepository::default()),
            objects: Arc::new(InMemoryObjectStore::default()),
        }
    }
}

#[derive(Clone)]
pub struct Portal {
    pub applicants: Arc<ApplicantService>,
    pub applications: Arc<ApplicationService>,
    pub permits: Arc<PermitService>,
    pub documents: Arc<DocumentService>,
    pub reports: Arc<ReportGenerator>,
}

impl Portal {
    pub fn new(repositories: PortalRepositories, config: &DocumentConfig) -> Self {
        let signer = UrlSigner::new(&config.signing_secret, config.public_base_url.clone());
        let documents = Arc::new(DocumentService::new(repositories.objects, signer));
        let permits = Arc::new(PermitService::new(repositories.permits.clone()));
        let applicants = Arc::new(ApplicantService::new(
            repositories.applicants.clone(),
            permits.clone(),
        ));
        let applications = Arc::new(ApplicationService::new(
            repositories.applications.clone(),
            applicants.clone(),
            permits.clone(),
            documents.clone(),
        ));
        let reports = Arc::new(ReportGenerator::new(
            repositories.applicants,
            repositories.applications,
            repositories.permits,
            documents.clone(),
        ));

        Self {
            applicants,
            applications,
            permits,
            documents,
            reports,
        }
    }

    pub fn in_memory(config: &DocumentConfig) -> Self {
        Self::new(PortalRepositories::in_memory(), config)
    }

    pub fn router(&self) -> Router {
        application_router(self.applications.clone())
            .merge(applicant_router(self.applicants.clone()))
            .merge(permit_router(self.permits.clone()))
            .merge(report_router(self.reports.clone()))
            .merge(document_router(self.documents.clone()))
    }
}
