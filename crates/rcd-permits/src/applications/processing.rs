//! Staff workflow attached to every application.
//!
//! ```text
//! PENDING ──begin review──▶ IN_PROGRESS
//!    │                          │
//!    ├──approve / reject────────┤
//!    ▼                          ▼
//! APPROVED / REJECTED ──undo review──▶ PENDING
//!    │
//!    └──complete (all sub-tasks done)──▶ COMPLETED
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::documents::{Invoice, WalletCard};
use crate::permits::PermitNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    InProgress,
    Approved,
    Rejected,
    Completed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }

    /// Applicant data may still be corrected.
    pub const fn accepts_edits(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// The status reached by applying `action`, or the reason it is not allowed.
    ///
    /// Completion also depends on the sub-tasks; see [`ApplicationProcessing::complete`].
    pub fn next(self, action: ProcessingAction) -> Result<Self, ProcessingError> {
        use ApplicationStatus::*;
        use ProcessingAction::*;

        match (self, action) {
            (Pending, BeginReview) => Ok(InProgress),
            (Pending | InProgress, Approve) => Ok(Approved),
            (Pending | InProgress, Reject) => Ok(Rejected),
            (Approved | Rejected, UndoReview) => Ok(Pending),
            (Approved, Complete) => Ok(Completed),
            (from, action) => Err(ProcessingError::InvalidTransition { from, action }),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingAction {
    BeginReview,
    Approve,
    Reject,
    UndoReview,
    Complete,
}

impl ProcessingAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BeginReview => "begin review",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::UndoReview => "undo review",
            Self::Complete => "complete",
        }
    }
}

/// Steps staff finish between approval and completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingTask {
    AppNumberAssigned,
    AppHolePunched,
    WalletCardCreated,
    InvoiceGenerated,
}

impl ProcessingTask {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::AppNumberAssigned,
            Self::AppHolePunched,
            Self::WalletCardCreated,
            Self::InvoiceGenerated,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AppNumberAssigned => "APP number assigned",
            Self::AppHolePunched => "APP hole-punched",
            Self::WalletCardCreated => "wallet card created",
            Self::InvoiceGenerated => "invoice generated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffReview {
    pub reviewer: String,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationProcessing {
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_number: Option<PermitNumber>,
    #[serde(default)]
    pub app_hole_punched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_card: Option<WalletCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<StaffReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for ApplicationProcessing {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationProcessing {
    pub const fn new() -> Self {
        Self {
            status: ApplicationStatus::Pending,
            app_number: None,
            app_hole_punched: false,
            wallet_card: None,
            invoice: None,
            review: None,
            rejection_reason: None,
            completed_at: None,
        }
    }

    pub fn is_done(&self, task: ProcessingTask) -> bool {
        match task {
            ProcessingTask::AppNumberAssigned => self.app_number.is_some(),
            ProcessingTask::AppHolePunched => self.app_hole_punched,
            ProcessingTask::WalletCardCreated => self.wallet_card.is_some(),
            ProcessingTask::InvoiceGenerated => self.invoice.is_some(),
        }
    }

    pub fn outstanding_tasks(&self) -> Vec<ProcessingTask> {
        ProcessingTask::ordered()
            .into_iter()
            .filter(|task| !self.is_done(*task))
            .collect()
    }

    pub fn begin_review(&mut self) -> Result<(), ProcessingError> {
        self.status = self.status.next(ProcessingAction::BeginReview)?;
        Ok(())
    }

    pub fn approve(&mut self, reviewer: &str, now: DateTime<Utc>) -> Result<(), ProcessingError> {
        self.status = self.status.next(ProcessingAction::Approve)?;
        self.review = Some(StaffReview {
            reviewer: reviewer.to_string(),
            reviewed_at: now,
        });
        self.rejection_reason = None;
        Ok(())
    }

    pub fn reject(
        &mut self,
        reviewer: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ProcessingError> {
        self.status = self.status.next(ProcessingAction::Reject)?;
        self.review = Some(StaffReview {
            reviewer: reviewer.to_string(),
            reviewed_at: now,
        });
        self.rejection_reason = reason;
        Ok(())
    }

    /// Back to `Pending` with every downstream step cleared.
    pub fn undo_review(&mut self) -> Result<(), ProcessingError> {
        let status = self.status.next(ProcessingAction::UndoReview)?;
        *self = Self {
            status,
            ..Self::new()
        };
        Ok(())
    }

    /// Verify completion is allowed without changing anything.
    pub fn ensure_completable(&self) -> Result<(), ProcessingError> {
        self.status.next(ProcessingAction::Complete)?;
        let outstanding = self.outstanding_tasks();
        if outstanding.is_empty() {
            Ok(())
        } else {
            Err(ProcessingError::IncompleteTasks(outstanding))
        }
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), ProcessingError> {
        self.ensure_completable()?;
        self.status = ApplicationStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Sub-tasks can only be worked while the application is approved.
    pub fn ensure_tasks_open(&self) -> Result<(), ProcessingError> {
        if self.status == ApplicationStatus::Approved {
            Ok(())
        } else {
            Err(ProcessingError::TasksLocked(self.status))
        }
    }

    pub fn ensure_accepts_edits(&self) -> Result<(), ProcessingError> {
        if self.status.accepts_edits() {
            Ok(())
        } else {
            Err(ProcessingError::SubmissionLocked(self.status))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessingError {
    #[error("cannot {} an application that is {from}", .action.label())]
    InvalidTransition {
        from: ApplicationStatus,
        action: ProcessingAction,
    },
    #[error("processing is incomplete: {}", describe_tasks(.0))]
    IncompleteTasks(Vec<ProcessingTask>),
    #[error("processing steps are locked while the application is {0}")]
    TasksLocked(ApplicationStatus),
    #[error("submitted data is final while the application is {0}")]
    SubmissionLocked(ApplicationStatus),
    #[error("an APP number must be assigned first")]
    AppNumberRequired,
}

fn describe_tasks(tasks: &[ProcessingTask]) -> String {
    tasks
        .iter()
        .map(|task| task.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ProcessingError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::IncompleteTasks(_) => "INCOMPLETE_PROCESSING",
            Self::TasksLocked(_) => "PROCESSING_LOCKED",
            Self::SubmissionLocked(_) => "SUBMISSION_LOCKED",
            Self::AppNumberRequired => "APP_NUMBER_REQUIRED",
        }
    }
}
