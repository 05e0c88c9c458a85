use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::processing::ApplicationProcessing;
use crate::applicants::{
    full_name, Address, ApplicantId, Gender, Guardian, MedicalInformation, Physician,
};
use crate::permits::PermitType;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationType {
    New,
    Renewal,
    Replacement,
}

impl ApplicationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Renewal => "Renewal",
            Self::Replacement => "Replacement",
        }
    }
}

/// Name and contact details as entered on the request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantContact {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub address: Address,
}

impl ApplicantContact {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.middle_name.as_deref(), &self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Mastercard,
    Visa,
    Etransfer,
    Cash,
    Cheque,
    DebitCard,
    Shopify,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mastercard => "Mastercard",
            Self::Visa => "Visa",
            Self::Etransfer => "E-transfer",
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
            Self::DebitCard => "Debit",
            Self::Shopify => "Shopify",
        }
    }
}

/// Amounts are in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub processing_fee_cents: u32,
    #[serde(default)]
    pub donation_cents: u32,
    #[serde(default)]
    pub second_donation_cents: u32,
}

impl PaymentDetails {
    pub fn total_cents(&self) -> u64 {
        u64::from(self.processing_fee_cents)
            + u64::from(self.donation_cents)
            + u64::from(self.second_donation_cents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementReason {
    Lost,
    Stolen,
    Other,
}

/// Type-specific part of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationDetails {
    New {
        date_of_birth: NaiveDate,
        gender: Gender,
        medical_information: MedicalInformation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        guardian: Option<Guardian>,
    },
    Renewal {
        applicant_id: ApplicantId,
        /// Present only when the certifying physician changed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        physician: Option<Physician>,
    },
    Replacement {
        applicant_id: ApplicantId,
        reason: ReplacementReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lost_on: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event_description: Option<String>,
    },
}

impl ApplicationDetails {
    pub const fn application_type(&self) -> ApplicationType {
        match self {
            Self::New { .. } => ApplicationType::New,
            Self::Renewal { .. } => ApplicationType::Renewal,
            Self::Replacement { .. } => ApplicationType::Replacement,
        }
    }

    /// The existing permit holder a renewal or replacement refers to.
    pub const fn existing_applicant(&self) -> Option<ApplicantId> {
        match self {
            Self::New { .. } => None,
            Self::Renewal { applicant_id, .. } | Self::Replacement { applicant_id, .. } => {
                Some(*applicant_id)
            }
        }
    }
}

/// Applicant-supplied request data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub contact: ApplicantContact,
    pub permit_type: PermitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_permit_expiry: Option<NaiveDate>,
    pub payment: PaymentDetails,
    pub details: ApplicationDetails,
}

impl ApplicationSubmission {
    pub const fn application_type(&self) -> ApplicationType {
        self.details.application_type()
    }
}

/// Staff correction of submitted data; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEdit {
    #[serde(default)]
    pub contact: Option<ApplicantContact>,
    #[serde(default)]
    pub permit_type: Option<PermitType>,
    #[serde(default)]
    pub temporary_permit_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub payment: Option<PaymentDetails>,
}

impl SubmissionEdit {
    pub(crate) fn apply(self, submission: &mut ApplicationSubmission) {
        if let Some(contact) = self.contact {
            submission.contact = contact;
        }
        if let Some(permit_type) = self.permit_type {
            submission.permit_type = permit_type;
        }
        if let Some(expiry) = self.temporary_permit_expiry {
            submission.temporary_permit_expiry = Some(expiry);
        }
        if let Some(payment) = self.payment {
            submission.payment = payment;
        }
    }
}

/// Repository record: submitted data plus staff workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub submission: ApplicationSubmission,
    /// Set at submit for renewals and replacements, at completion for new applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<ApplicantId>,
    pub processing: ApplicationProcessing,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub const fn application_type(&self) -> ApplicationType {
        self.submission.application_type()
    }

    pub fn applicant_name(&self) -> String {
        self.submission.contact.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_total_sums_fee_and_donations() {
        let payment = PaymentDetails {
            method: PaymentMethod::Visa,
            processing_fee_cents: 2_600,
            donation_cents: 1_000,
            second_donation_cents: 250,
        };
        assert_eq!(payment.total_cents(), 3_850);
    }

    #[test]
    fn details_are_tagged_by_type() {
        let details: ApplicationDetails = serde_json::from_str(
            r#"{"type":"REPLACEMENT","applicant_id":4,"reason":"STOLEN","lost_on":"2026-01-03"}"#,
        )
        .expect("replacement details parse");
        assert_eq!(details.application_type(), ApplicationType::Replacement);
        assert_eq!(details.existing_applicant(), Some(ApplicantId(4)));
    }
}
