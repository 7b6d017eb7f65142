//! Collaborator interface: the three calls the dialog engine delegates.
//!
//! The engine never talks to storage, email or pricing directly. It hands a
//! [`LeadSnapshot`] to a [`LeadBackend`] and reacts to the receipt:
//! - **in-process**: [`crate::service::LeadService`]
//! - **remote**: [`HttpBackend`] against the HTTP surface in [`crate::server`]

pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dialog::session::{
    Budget, BudgetBucket, Category, EmployeeSize, LeadPath, SessionRecord, StartTime,
};
use crate::error::BackendError;
use crate::uploads::CvFile;

/// Wire form of a session, sent with every collaborator call.
///
/// Budget is flattened the way the lead backend stores it: a bucket label, or
/// `"Custom"` together with `budget_amount`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<LeadPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_requirements: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_size: Option<EmployeeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<StartTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_filename: Option<String>,
}

impl LeadSnapshot {
    /// Rebuild the typed budget. A stray amount without `"Custom"` is ignored.
    pub fn budget(&self) -> Option<Budget> {
        match self.budget.as_deref()? {
            "Custom" => self.budget_amount.map(|amount| Budget::Custom { amount }),
            label => BudgetBucket::from_label(label).map(Budget::Bucket),
        }
    }
}

impl From<&SessionRecord> for LeadSnapshot {
    fn from(session: &SessionRecord) -> Self {
        Self {
            name: session.name.clone(),
            company_name: session.company_name.clone(),
            phone: session.phone.clone(),
            email: session.email.clone(),
            path: (!session.path.is_unset()).then_some(session.path),
            category: session.category,
            has_requirements: session.has_requirements,
            requirement_text: session.requirement_text.clone(),
            employee_size: session.employee_size,
            budget: session.budget.map(|b| b.label().to_string()),
            budget_amount: session.budget.and_then(|b| b.custom_amount()),
            start_time: session.start_time,
            cv_filename: session.cv_filename.clone(),
        }
    }
}

/// Successful CV upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Name the file was stored under.
    pub filename: String,
    pub email_sent: bool,
    pub email_error: Option<String>,
}

/// Successful lead save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub email_sent: bool,
    pub email_error: Option<String>,
}

/// The collaborators behind the dialog: upload, summarize, save.
#[async_trait]
pub trait LeadBackend: Send + Sync {
    /// Store a CV for a job applicant and notify the team.
    async fn upload(
        &self,
        file: CvFile,
        snapshot: &LeadSnapshot,
    ) -> Result<UploadReceipt, BackendError>;

    /// Render the cost summary (markup, displayed verbatim).
    async fn summarize(&self, snapshot: &LeadSnapshot) -> Result<String, BackendError>;

    /// Persist the lead and notify the team.
    async fn save(&self, snapshot: &LeadSnapshot) -> Result<SaveReceipt, BackendError>;
}
