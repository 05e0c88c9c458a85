use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::expiry::{classify, days_until_expiry, PermitStatus};
use crate::applicants::ApplicantId;
use crate::applications::ApplicationId;

/// Months a permanent permit stays valid after the application is completed.
pub const PERMANENT_PERMIT_VALIDITY_MONTHS: u32 = 36;

/// APP number printed on the physical permit; unique across all permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermitNumber(pub u32);

impl fmt::Display for PermitNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitType {
    Permanent,
    Temporary,
}

impl PermitType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Permanent => "Permanent",
            Self::Temporary => "Temporary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    pub rcd_permit_id: PermitNumber,
    pub applicant_id: ApplicantId,
    pub application_id: ApplicationId,
    pub permit_type: PermitType,
    pub expiry_date: DateTime<Utc>,
    pub active: bool,
    pub issued_at: DateTime<Utc>,
}

impl Permit {
    pub fn status(&self, now: DateTime<Utc>) -> PermitStatus {
        classify(self.expiry_date, now)
    }

    pub fn view(&self, now: DateTime<Utc>) -> PermitView {
        PermitView {
            rcd_permit_id: self.rcd_permit_id,
            applicant_id: self.applicant_id,
            application_id: self.application_id,
            permit_type: self.permit_type,
            expiry_date: self.expiry_date,
            active: self.active,
            status: self.status(now),
            days_until_expiry: days_until_expiry(self.expiry_date, now),
        }
    }
}

/// Permit as exposed to API callers, with its status resolved against "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermitView {
    pub rcd_permit_id: PermitNumber,
    pub applicant_id: ApplicantId,
    pub application_id: ApplicationId,
    pub permit_type: PermitType,
    pub expiry_date: DateTime<Utc>,
    pub active: bool,
    pub status: PermitStatus,
    pub days_until_expiry: i64,
}

/// Expiry timestamp (UTC midnight) for a permit issued at `issued_at`.
///
/// Returns `None` for a temporary permit without a declared expiry date.
pub fn expiry_for(
    permit_type: PermitType,
    temporary_expiry: Option<NaiveDate>,
    issued_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let date = match permit_type {
        PermitType::Permanent => issued_at
            .date_naive()
            .checked_add_months(Months::new(PERMANENT_PERMIT_VALIDITY_MONTHS))?,
        PermitType::Temporary => temporary_expiry?,
    };
    date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc())
}
