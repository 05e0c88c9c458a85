use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for permit holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub u64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Soft-delete marker; applicants are never removed from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicantStatus {
    Active,
    Inactive,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    pub city: String,
    #[serde(default = "default_province")]
    pub province: String,
    pub postal_code: String,
}

fn default_province() -> String {
    "BC".to_string()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_line_1)?;
        if let Some(line_2) = &self.address_line_2 {
            write!(f, " {line_2}")?;
        }
        write!(f, ", {} {} {}", self.city, self.province, self.postal_code)
    }
}

/// Guardian or power of attorney acting on behalf of the permit holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    pub phone: String,
    pub address: Address,
}

impl Guardian {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Certifying physician, keyed externally by MSP number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physician {
    pub msp_number: u32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientCondition {
    Ambulatory,
    NonAmbulatory,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalInformation {
    pub disability: String,
    #[serde(default)]
    pub affected_areas: Vec<String>,
    pub patient_condition: PatientCondition,
    pub physician: Physician,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub address: Address,
    pub status: ApplicantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<Guardian>,
    pub medical_information: MedicalInformation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Applicant {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.middle_name.as_deref(), &self.last_name)
    }
}

pub(crate) fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    match middle.map(str::trim).filter(|middle| !middle.is_empty()) {
        Some(middle) => format!("{first} {middle} {last}"),
        None => format!("{first} {last}"),
    }
}

/// Staff edit of identity and contact fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantEdit {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub guardian: Option<Guardian>,
}

impl ApplicantEdit {
    pub(crate) fn apply(self, applicant: &mut Applicant) {
        if let Some(first_name) = self.first_name {
            applicant.first_name = first_name;
        }
        if let Some(middle_name) = self.middle_name {
            applicant.middle_name = Some(middle_name).filter(|name| !name.trim().is_empty());
        }
        if let Some(last_name) = self.last_name {
            applicant.last_name = last_name;
        }
        if let Some(email) = self.email {
            applicant.email = Some(email).filter(|email| !email.trim().is_empty());
        }
        if let Some(phone) = self.phone {
            applicant.phone = phone;
        }
        if let Some(address) = self.address {
            applicant.address = address;
        }
        if let Some(guardian) = self.guardian {
            applicant.guardian = Some(guardian);
        }
    }
}
