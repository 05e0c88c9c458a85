use serde::{Deserialize, Serialize};

/// A column that can be requested in a report.
pub trait ReportColumn: Copy {
    /// Header text written to the first row of the file.
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationsReportColumn {
    UserId,
    ApplicantName,
    ApplicantDateOfBirth,
    AppNumber,
    ApplicationDate,
    ApplicationType,
    ApplicationStatus,
    PaymentMethod,
    FeeAmount,
    DonationAmount,
    SecondDonationAmount,
    TotalAmount,
}

impl ReportColumn for ApplicationsReportColumn {
    fn label(self) -> &'static str {
        match self {
            Self::UserId => "User ID",
            Self::ApplicantName => "Applicant Name",
            Self::ApplicantDateOfBirth => "Applicant DoB",
            Self::AppNumber => "APP Number",
            Self::ApplicationDate => "Application Date",
            Self::ApplicationType => "Application Type",
            Self::ApplicationStatus => "Application Status",
            Self::PaymentMethod => "Payment Method",
            Self::FeeAmount => "Fee Amount",
            Self::DonationAmount => "Donation Amount",
            Self::SecondDonationAmount => "Second Donation Amount",
            Self::TotalAmount => "Total Amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitHoldersReportColumn {
    UserId,
    ApplicantName,
    ApplicantDateOfBirth,
    Address,
    Email,
    Phone,
    GuardianPoaName,
    GuardianPoaRelation,
    RecentAppNumber,
    RecentAppType,
    PermitExpiryDate,
    PermitStatus,
    UserStatus,
}

impl ReportColumn for PermitHoldersReportColumn {
    fn label(self) -> &'static str {
        match self {
            Self::UserId => "User ID",
            Self::ApplicantName => "Applicant Name",
            Self::ApplicantDateOfBirth => "Applicant DoB",
            Self::Address => "Address",
            Self::Email => "Email",
            Self::Phone => "Phone Number",
            Self::GuardianPoaName => "Guardian/POA Name",
            Self::GuardianPoaRelation => "Guardian/POA Relation",
            Self::RecentAppNumber => "Recent APP Number",
            Self::RecentAppType => "Recent APP Type",
            Self::PermitExpiryDate => "Permit Expiry Date",
            Self::PermitStatus => "Permit Status",
            Self::UserStatus => "User Status",
        }
    }
}
