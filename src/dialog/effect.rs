//! Effects produced by the dialog engine, in emission order.

use std::time::Duration;

use crate::backend::LeadSnapshot;
use crate::dialog::event::{CallId, OptionSet};
use crate::uploads::CvFile;

/// How a bot message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Bot,
    /// Validation problem; the same question is still open.
    Warning,
    /// A collaborator call failed.
    Error,
    /// Pre-rendered markup, displayed verbatim.
    Markup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotMessage {
    pub kind: MessageKind,
    pub text: String,
}

/// A collaborator call the engine is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload {
        file: CvFile,
        snapshot: LeadSnapshot,
    },
    Summarize {
        snapshot: LeadSnapshot,
    },
    Save {
        snapshot: LeadSnapshot,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::Summarize { .. } => "summarize",
            Self::Save { .. } => "save",
        }
    }
}

/// Effects to be carried out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a message.
    Say(BotMessage),
    /// Present an option set; the next step waits for a selection from it.
    Offer(OptionSet),
    /// Ask the presentation layer for a CV file.
    RequestUpload,
    /// Enable or disable free-text input.
    InputEnabled(bool),
    /// Hold further output for a moment.
    Pause(Duration),
    /// Invoke a collaborator; its completion comes back as an event tagged
    /// with the same id.
    Call(CallId, Call),
}

impl Effect {
    pub fn say(text: impl Into<String>) -> Self {
        Self::Say(BotMessage {
            kind: MessageKind::Bot,
            text: text.into(),
        })
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::Say(BotMessage {
            kind: MessageKind::Warning,
            text: text.into(),
        })
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Say(BotMessage {
            kind: MessageKind::Error,
            text: text.into(),
        })
    }

    pub fn markup(html: impl Into<String>) -> Self {
        Self::Say(BotMessage {
            kind: MessageKind::Markup,
            text: html.into(),
        })
    }

    /// The message, if this effect shows one.
    pub fn message(&self) -> Option<&BotMessage> {
        match self {
            Self::Say(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call(..))
    }
}
