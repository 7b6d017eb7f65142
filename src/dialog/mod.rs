//! Lead-capture dialog: a scripted conversation that qualifies a visitor.
//!
//! The visitor gives a name, company, phone and email, then forks: job
//! seekers upload a CV, product leads pick a service, describe their needs and
//! receive an estimate to accept. The [`Engine`] is a pure state machine; the
//! [`DialogManager`] runs it against a [`crate::backend::LeadBackend`].

pub mod effect;
pub mod engine;
pub mod event;
pub mod manager;
pub mod prompts;
pub mod session;
pub mod validate;

pub use effect::{BotMessage, Call, Effect, MessageKind};
pub use engine::{Engine, PendingCall};
pub use event::{CallId, Choice, Event, OfferId, OptionSet};
pub use manager::DialogManager;
pub use session::{
    Budget, BudgetBucket, Category, EmployeeSize, LeadPath, SessionRecord, StartTime, Step,
};
