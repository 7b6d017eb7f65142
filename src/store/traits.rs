//! `LeadStore` trait: the async persistence interface for captured leads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::LeadSnapshot;
use crate::error::DatabaseError;

/// A product lead accepted through the declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLead {
    pub id: Uuid,
    pub lead: LeadSnapshot,
    pub created_at: DateTime<Utc>,
}

/// A job application with its stored CV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredApplication {
    pub id: Uuid,
    pub cv_filename: String,
    pub lead: LeadSnapshot,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    /// Persist a lead document. Returns its generated id.
    async fn insert_lead(&self, lead: &LeadSnapshot) -> Result<Uuid, DatabaseError>;

    async fn get_lead(&self, id: Uuid) -> Result<Option<StoredLead>, DatabaseError>;

    /// Most recent leads first.
    async fn recent_leads(&self, limit: usize) -> Result<Vec<StoredLead>, DatabaseError>;

    /// Record a job application against a stored CV.
    async fn insert_application(
        &self,
        lead: &LeadSnapshot,
        cv_filename: &str,
    ) -> Result<Uuid, DatabaseError>;

    async fn recent_applications(
        &self,
        limit: usize,
    ) -> Result<Vec<StoredApplication>, DatabaseError>;
}
