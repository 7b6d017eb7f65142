//! JSON bodies of the lead HTTP surface, shared by the server and
//! [`crate::backend::HttpBackend`].

use serde::{Deserialize, Serialize};

/// Any failed request: `{"ok": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBody {
    pub ok: bool,
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingBody {
    pub ok: bool,
    pub pong: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryBody {
    pub ok: bool,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveBody {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub db_saved: bool,
    #[serde(default)]
    pub email_sent: bool,
    /// Empty when the email went out.
    #[serde(default)]
    pub email_error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadBody {
    pub ok: bool,
    pub filename: String,
    #[serde(default)]
    pub db_saved: bool,
    #[serde(default)]
    pub email_sent: bool,
    #[serde(default)]
    pub email_error: String,
}
