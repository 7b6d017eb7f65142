//! Events delivered to the dialog engine.

use crate::backend::{SaveReceipt, UploadReceipt};
use crate::dialog::session::{BudgetBucket, Category, EmployeeSize, StartTime};
use crate::error::BackendError;
use crate::uploads::CvFile;

/// Identifies one presented option set. Ids are never reused, so a set that
/// was consumed (or dropped by a restart) stays inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OfferId(pub u64);

impl std::fmt::Display for OfferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "offer-{}", self.0)
    }
}

/// Identifies one collaborator call. A completion is accepted only while
/// its call is the one outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u64);

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// One option the visitor can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Job,
    Product,
    Category(Category),
    /// Requirements fork: `true` = "Yes".
    Requirements(bool),
    EmployeeSize(EmployeeSize),
    Budget(BudgetBucket),
    /// "Other (enter amount)".
    CustomBudget,
    StartTime(StartTime),
    Agree,
    Edit,
}

impl Choice {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Job => "I'm looking for a job",
            Self::Product => "I'm interested in your services",
            Self::Category(c) => c.label(),
            Self::Requirements(true) => "Yes",
            Self::Requirements(false) => "No",
            Self::EmployeeSize(s) => s.label(),
            Self::Budget(b) => b.label(),
            Self::CustomBudget => "Other (enter amount)",
            Self::StartTime(t) => t.label(),
            Self::Agree => "I agree",
            Self::Edit => "No, I want to edit",
        }
    }
}

/// A set of mutually exclusive options presented together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    pub id: OfferId,
    pub options: Vec<Choice>,
}

impl OptionSet {
    pub fn contains(&self, choice: &Choice) -> bool {
        self.options.contains(choice)
    }
}

/// Everything that can happen to a conversation.
#[derive(Debug, Clone)]
pub enum Event {
    /// Open the conversation (emits the opening prompt once).
    Start,
    /// The visitor typed and submitted text.
    FreeText(String),
    /// The visitor activated an option of a presented set.
    Selection { offer: OfferId, choice: Choice },
    /// The visitor picked a CV after an upload was requested.
    UploadSubmitted(CvFile),
    UploadFinished(CallId, Result<UploadReceipt, BackendError>),
    SummaryFinished(CallId, Result<String, BackendError>),
    SaveFinished(CallId, Result<SaveReceipt, BackendError>),
    /// Throw the session away and start over.
    Restart,
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Self::FreeText(text.into())
    }

    pub fn select(offer: OfferId, choice: Choice) -> Self {
        Self::Selection { offer, choice }
    }
}
