//! Session record: the answers and control flags of one conversation.

use serde::{Deserialize, Serialize};

/// Where the conversation currently is.
///
/// Text steps decide which validator runs on the next free-text submission;
/// the remaining steps wait for a selection, an upload or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitName,
    AwaitCompany,
    AwaitPhone,
    AwaitEmail,
    ChoosePath,
    AwaitCvUpload,
    ChooseCategory,
    ChooseRequirements,
    AwaitRequirementText,
    ChooseEmployeeSize,
    ChooseBudget,
    AwaitCustomBudgetAmount,
    ChooseStartTime,
    Declaration,
    Closing,
}

impl Step {
    /// Whether this step consumes free text.
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            Self::AwaitName
                | Self::AwaitCompany
                | Self::AwaitPhone
                | Self::AwaitEmail
                | Self::AwaitRequirementText
                | Self::AwaitCustomBudgetAmount
        )
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::AwaitName
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitName => "await_name",
            Self::AwaitCompany => "await_company",
            Self::AwaitPhone => "await_phone",
            Self::AwaitEmail => "await_email",
            Self::ChoosePath => "choose_path",
            Self::AwaitCvUpload => "await_cv_upload",
            Self::ChooseCategory => "choose_category",
            Self::ChooseRequirements => "choose_requirements",
            Self::AwaitRequirementText => "await_requirement_text",
            Self::ChooseEmployeeSize => "choose_employee_size",
            Self::ChooseBudget => "choose_budget",
            Self::AwaitCustomBudgetAmount => "await_custom_budget_amount",
            Self::ChooseStartTime => "choose_start_time",
            Self::Declaration => "declaration",
            Self::Closing => "closing",
        };
        write!(f, "{s}")
    }
}

/// Branch chosen at the main fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadPath {
    Unset,
    Job,
    Product,
}

impl Default for LeadPath {
    fn default() -> Self {
        Self::Unset
    }
}

impl LeadPath {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

/// Service categories offered on the product branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Digital Marketing")]
    DigitalMarketing,
    #[serde(rename = "SEO")]
    Seo,
    #[serde(rename = "Software Development")]
    SoftwareDevelopment,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "App Development")]
    AppDevelopment,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Ai,
        Self::DigitalMarketing,
        Self::Seo,
        Self::SoftwareDevelopment,
        Self::WebDevelopment,
        Self::AppDevelopment,
    ];

    /// Build categories are priced from a budget; retainer categories
    /// (Digital Marketing, SEO) are priced from company size alone.
    pub fn needs_budget(&self) -> bool {
        !matches!(self, Self::DigitalMarketing | Self::Seo)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::DigitalMarketing => "Digital Marketing",
            Self::Seo => "SEO",
            Self::SoftwareDevelopment => "Software Development",
            Self::WebDevelopment => "Web Development",
            Self::AppDevelopment => "App Development",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Company size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeSize {
    #[serde(rename = "0-10")]
    Small,
    #[serde(rename = "10-100")]
    Medium,
    #[serde(rename = "100+")]
    Large,
}

impl EmployeeSize {
    pub const ALL: [EmployeeSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "0-10",
            Self::Medium => "10-100",
            Self::Large => "100+",
        }
    }
}

impl std::fmt::Display for EmployeeSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed budget buckets (INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetBucket {
    #[serde(rename = "Under ₹50K")]
    Under50K,
    #[serde(rename = "₹50K - ₹1L")]
    From50KTo1L,
    #[serde(rename = "₹1L - ₹5L")]
    From1LTo5L,
    #[serde(rename = "Above ₹5L")]
    Above5L,
}

impl BudgetBucket {
    pub const ALL: [BudgetBucket; 4] = [
        Self::Under50K,
        Self::From50KTo1L,
        Self::From1LTo5L,
        Self::Above5L,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Under50K => "Under ₹50K",
            Self::From50KTo1L => "₹50K - ₹1L",
            Self::From1LTo5L => "₹1L - ₹5L",
            Self::Above5L => "Above ₹5L",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

impl std::fmt::Display for BudgetBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Budget answer. A custom amount exists only when the visitor typed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Bucket(BudgetBucket),
    Custom { amount: u64 },
}

impl Budget {
    /// Label as shown to the visitor and sent on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bucket(bucket) => bucket.label(),
            Self::Custom { .. } => "Custom",
        }
    }

    pub fn custom_amount(&self) -> Option<u64> {
        match self {
            Self::Custom { amount } => Some(*amount),
            Self::Bucket(_) => None,
        }
    }
}

/// When the visitor wants to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartTime {
    Immediately,
    #[serde(rename = "1 week")]
    OneWeek,
    #[serde(rename = "2 weeks")]
    TwoWeeks,
    #[serde(rename = "1 month")]
    OneMonth,
}

impl StartTime {
    pub const ALL: [StartTime; 4] = [
        Self::Immediately,
        Self::OneWeek,
        Self::TwoWeeks,
        Self::OneMonth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Immediately => "Immediately",
            Self::OneWeek => "1 week",
            Self::TwoWeeks => "2 weeks",
            Self::OneMonth => "1 month",
        }
    }
}

impl std::fmt::Display for StartTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything collected during one conversation.
///
/// Owned by the engine and replaced wholesale on restart, so no answer from a
/// previous run can survive a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub step: Step,
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub path: LeadPath,
    pub has_requirements: Option<bool>,
    pub requirement_text: Option<String>,
    pub category: Option<Category>,
    pub employee_size: Option<EmployeeSize>,
    pub budget: Option<Budget>,
    pub start_time: Option<StartTime>,
    pub cv_filename: Option<String>,
    /// A terminal acknowledgment has been shown; a closing utterance ends the chat.
    pub closing_ready: bool,
    /// The farewell has been sent; the conversation is frozen.
    pub closing_sent: bool,
}

impl SessionRecord {
    /// A fresh record: every answer unset, waiting for the visitor's name.
    pub fn create() -> Self {
        Self::default()
    }
}
