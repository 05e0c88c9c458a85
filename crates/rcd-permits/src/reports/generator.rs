use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::columns::{ApplicationsReportColumn, PermitHoldersReportColumn, ReportColumn};
use super::error::ReportError;
use crate::applicants::{Applicant, ApplicantRepository};
use crate::applications::{dollars, ApplicationDetails, ApplicationRecord, ApplicationRepository};
use crate::documents::DocumentService;
use crate::permits::{Permit, PermitRepository};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range plus the ordered list of columns to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest<C> {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub columns: Vec<C>,
}

/// CSV bytes produced for a request, before storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

/// Where a stored report can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLink {
    pub key: String,
    pub url: String,
    pub row_count: usize,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

struct ApplicationRow {
    record: ApplicationRecord,
    applicant: Option<Applicant>,
}

struct PermitHolderRow {
    applicant: Applicant,
    permit: Permit,
    application: Option<ApplicationRecord>,
}

pub struct ReportGenerator {
    applicants: Arc<dyn ApplicantRepository>,
    applications: Arc<dyn ApplicationRepository>,
    permits: Arc<dyn PermitRepository>,
    documents: Arc<DocumentService>,
    sequence: AtomicU64,
}

impl ReportGenerator {
    pub fn new(
        applicants: Arc<dyn ApplicantRepository>,
        applications: Arc<dyn ApplicationRepository>,
        permits: Arc<dyn PermitRepository>,
        documents: Arc<DocumentService>,
    ) -> Self {
        Self {
            applicants,
            applications,
            permits,
            documents,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn applications_report(
        &self,
        request: &ReportRequest<ApplicationsReportColumn>,
        now: DateTime<Utc>,
    ) -> Result<ReportLink, ReportError> {
        let rendered = self.render_applications(request)?;
        self.store("applications", request.start_date, request.end_date, rendered, now)
    }

    pub fn permit_holders_report(
        &self,
        request: &ReportRequest<PermitHoldersReportColumn>,
        now: DateTime<Utc>,
    ) -> Result<ReportLink, ReportError> {
        let rendered = self.render_permit_holders(request, now)?;
        self.store("permit-holders", request.start_date, request.end_date, rendered, now)
    }

    /// Applications created within the range, oldest first.
    pub fn render_applications(
        &self,
        request: &ReportRequest<ApplicationsReportColumn>,
    ) -> Result<RenderedReport, ReportError> {
        ensure_columns(&request.columns)?;

        let mut rows = Vec::new();
        if request.start_date <= request.end_date {
            let mut records = self
                .applications
                .created_between(request.start_date, request.end_date)?;
            records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

            for record in records {
                let applicant = match record.applicant_id {
                    Some(id) => self.applicants.fetch(id)?,
                    None => None,
                };
                rows.push(ApplicationRow { record, applicant });
            }
        }

        write_csv(&request.columns, &rows, application_cell)
    }

    /// Permit holders whose most recent permit expires within the range.
    pub fn render_permit_holders(
        &self,
        request: &ReportRequest<PermitHoldersReportColumn>,
        now: DateTime<Utc>,
    ) -> Result<RenderedReport, ReportError> {
        ensure_columns(&request.columns)?;

        let mut rows = Vec::new();
        if request.start_date <= request.end_date {
            for permit in self
                .permits
                .expiring_between(request.start_date, request.end_date)?
            {
                let most_recent = self.permits.for_applicant(permit.applicant_id)?;
                let is_most_recent = most_recent
                    .first()
                    .is_some_and(|recent| recent.rcd_permit_id == permit.rcd_permit_id);
                if !is_most_recent {
                    continue;
                }

                let Some(applicant) = self.applicants.fetch(permit.applicant_id)? else {
                    continue;
                };
                let application = self.applications.fetch(permit.application_id)?;
                rows.push(PermitHolderRow {
                    applicant,
                    permit,
                    application,
                });
            }
            rows.sort_by(|a, b| {
                a.permit
                    .expiry_date
                    .cmp(&b.permit.expiry_date)
                    .then(a.applicant.id.cmp(&b.applicant.id))
            });
        }

        write_csv(&request.columns, &rows, |row, column| {
            permit_holder_cell(row, column, now)
        })
    }

    fn store(
        &self,
        kind: &str,
        start: NaiveDate,
        end: NaiveDate,
        rendered: RenderedReport,
        now: DateTime<Utc>,
    ) -> Result<ReportLink, ReportError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let key = format!(
            "reports/{kind}-{start}-to-{end}-{}-{sequence}.csv",
            now.format("%Y%m%d%H%M%S")
        );
        let row_count = rendered.row_count;
        let document = self
            .documents
            .save(&key, mime::TEXT_CSV.as_ref(), rendered.bytes, now)?;

        info!(%key, row_count, "report generated");
        Ok(ReportLink {
            key,
            url: document.url,
            row_count,
            generated_at: now,
            expires_at: document.url_expires_at,
        })
    }
}

fn ensure_columns<C>(columns: &[C]) -> Result<(), ReportError> {
    if columns.is_empty() {
        return Err(ReportError::NoColumns);
    }
    Ok(())
}

/// Header row of labels, then one record per row with exactly `columns` in order.
fn write_csv<C, R, F>(columns: &[C], rows: &[R], cell: F) -> Result<RenderedReport, ReportError>
where
    C: ReportColumn,
    F: Fn(&R, C) -> String,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|column| column.label()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|column| cell(row, *column)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ReportError::Write(err.to_string()))?;
    Ok(RenderedReport {
        bytes,
        row_count: rows.len(),
    })
}

fn application_cell(row: &ApplicationRow, column: ApplicationsReportColumn) -> String {
    let record = &row.record;
    let payment = &record.submission.payment;
    match column {
        ApplicationsReportColumn::UserId => record
            .applicant_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        ApplicationsReportColumn::ApplicantName => record.applicant_name(),
        ApplicationsReportColumn::ApplicantDateOfBirth => match &record.submission.details {
            ApplicationDetails::New { date_of_birth, .. } => {
                date_of_birth.format(DATE_FORMAT).to_string()
            }
            _ => row
                .applicant
                .as_ref()
                .map(|applicant| applicant.date_of_birth.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        },
        ApplicationsReportColumn::AppNumber => record
            .processing
            .app_number
            .map(|number| number.to_string())
            .unwrap_or_default(),
        ApplicationsReportColumn::ApplicationDate => {
            record.created_at.format(DATE_FORMAT).to_string()
        }
        ApplicationsReportColumn::ApplicationType => record.application_type().label().to_string(),
        ApplicationsReportColumn::ApplicationStatus => {
            record.processing.status.label().to_string()
        }
        ApplicationsReportColumn::PaymentMethod => payment.method.label().to_string(),
        ApplicationsReportColumn::FeeAmount => {
            format!("${}", dollars(u64::from(payment.processing_fee_cents)))
        }
        ApplicationsReportColumn::DonationAmount => {
            format!("${}", dollars(u64::from(payment.donation_cents)))
        }
        ApplicationsReportColumn::SecondDonationAmount => {
            format!("${}", dollars(u64::from(payment.second_donation_cents)))
        }
        ApplicationsReportColumn::TotalAmount => format!("${}", dollars(payment.total_cents())),
    }
}

fn permit_holder_cell(
    row: &PermitHolderRow,
    column: PermitHoldersReportColumn,
    now: DateTime<Utc>,
) -> String {
    let applicant = &row.applicant;
    match column {
        PermitHoldersReportColumn::UserId => applicant.id.to_string(),
        PermitHoldersReportColumn::ApplicantName => applicant.full_name(),
        PermitHoldersReportColumn::ApplicantDateOfBirth => {
            applicant.date_of_birth.format(DATE_FORMAT).to_string()
        }
        PermitHoldersReportColumn::Address => applicant.address.to_string(),
        PermitHoldersReportColumn::Email => applicant.email.clone().unwrap_or_default(),
        PermitHoldersReportColumn::Phone => applicant.phone.clone(),
        PermitHoldersReportColumn::GuardianPoaName => applicant
            .guardian
            .as_ref()
            .map(|guardian| guardian.full_name())
            .unwrap_or_default(),
        PermitHoldersReportColumn::GuardianPoaRelation => applicant
            .guardian
            .as_ref()
            .map(|guardian| guardian.relationship.clone())
            .unwrap_or_default(),
        PermitHoldersReportColumn::RecentAppNumber => row.permit.rcd_permit_id.to_string(),
        PermitHoldersReportColumn::RecentAppType => row
            .application
            .as_ref()
            .map(|application| application.application_type().label().to_string())
            .unwrap_or_default(),
        PermitHoldersReportColumn::PermitExpiryDate => {
            row.permit.expiry_date.format(DATE_FORMAT).to_string()
        }
        PermitHoldersReportColumn::PermitStatus => row.permit.status(now).label().to_string(),
        PermitHoldersReportColumn::UserStatus => applicant.status.label().to_string(),
    }
}
