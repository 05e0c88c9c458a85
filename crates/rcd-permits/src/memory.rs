//! Process-local storage used by the demo, the default server wiring, and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::applicants::{Applicant, ApplicantId, ApplicantRepository};
use crate::applications::{ApplicationId, ApplicationRecord, ApplicationRepository};
use crate::documents::{DocumentError, ObjectStore, StoredObject};
use crate::error::RepositoryError;
use crate::permits::{Permit, PermitNumber, PermitRepository};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Debug, Default, Clone)]
struct Sequence(Arc<AtomicU64>);

impl Sequence {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Default, Clone)]
pub struct InMemoryApplicantRepository {
    records: Arc<Mutex<BTreeMap<ApplicantId, Applicant>>>,
    ids: Sequence,
}

impl ApplicantRepository for InMemoryApplicantRepository {
    fn next_id(&self) -> Result<ApplicantId, RepositoryError> {
        Ok(ApplicantId(self.ids.next()))
    }

    fn insert(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&applicant.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(applicant.id, applicant.clone());
        Ok(applicant)
    }

    fn update(&self, applicant: Applicant) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.get_mut(&applicant.id) {
            Some(existing) => {
                *existing = applicant;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Applicant>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<BTreeMap<ApplicationId, ApplicationRecord>>>,
    ids: Sequence,
    invoice_numbers: Sequence,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn next_id(&self) -> Result<ApplicationId, RepositoryError> {
        Ok(ApplicationId(self.ids.next()))
    }

    fn next_invoice_number(&self) -> Result<u64, RepositoryError> {
        Ok(self.invoice_numbers.next())
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }

    fn created_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .filter(|record| {
                let created = record.created_at.date_naive();
                start <= created && created <= end
            })
            .cloned()
            .collect())
    }

    fn find_by_app_number(
        &self,
        app_number: PermitNumber,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .find(|record| record.processing.app_number == Some(app_number))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPermitRepository {
    permits: Arc<Mutex<BTreeMap<PermitNumber, Permit>>>,
}

impl PermitRepository for InMemoryPermitRepository {
    fn insert(&self, permit: Permit) -> Result<Permit, RepositoryError> {
        let mut guard = lock(&self.permits)?;
        if guard.contains_key(&permit.rcd_permit_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(permit.rcd_permit_id, permit.clone());
        Ok(permit)
    }

    fn update(&self, permit: Permit) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.permits)?;
        match guard.get_mut(&permit.rcd_permit_id) {
            Some(existing) => {
                *existing = permit;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: PermitNumber) -> Result<Option<Permit>, RepositoryError> {
        Ok(lock(&self.permits)?.get(&id).cloned())
    }

    fn for_applicant(&self, applicant_id: ApplicantId) -> Result<Vec<Permit>, RepositoryError> {
        let mut permits: Vec<Permit> = lock(&self.permits)?
            .values()
            .filter(|permit| permit.applicant_id == applicant_id)
            .cloned()
            .collect();
        permits.sort_by(|a, b| {
            b.issued_at
                .cmp(&a.issued_at)
                .then(b.rcd_permit_id.cmp(&a.rcd_permit_id))
        });
        Ok(permits)
    }

    fn expiring_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Permit>, RepositoryError> {
        Ok(lock(&self.permits)?
            .values()
            .filter(|permit| {
                let expiry = permit.expiry_date.date_naive();
                start <= expiry && expiry <= end
            })
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, object: StoredObject) -> Result<(), DocumentError> {
        let mut guard = self
            .objects
            .lock()
            .map_err(|_| DocumentError::Storage("in-memory store poisoned".to_string()))?;
        guard.insert(object.key.clone(), object);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<StoredObject>, DocumentError> {
        let guard = self
            .objects
            .lock()
            .map_err(|_| DocumentError::Storage("in-memory store poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }
}
