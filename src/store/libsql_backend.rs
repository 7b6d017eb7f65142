//! libSQL backend: async `LeadStore` implementation.
//!
//! Leads are stored as JSON documents with a few indexed columns pulled out.
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::LeadSnapshot;
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{LeadStore, StoredApplication, StoredLead};

/// libSQL lead store.
///
/// Holds a single connection reused for all operations.
pub struct LibSqlLeadStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlLeadStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db)?;
        store.init_schema().await?;
        info!(path = %path.display(), "Lead store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let store = Self::from_database(db)?;
        store.init_schema().await?;
        Ok(store)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Fixed-width RFC 3339, so `created_at` sorts as text.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn parse_id(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Serialization(format!("bad id '{s}': {e}")))
}

fn parse_document(s: &str) -> Result<LeadSnapshot, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Serialization(format!("lead document: {e}")))
}

fn row_to_lead(row: &libsql::Row) -> Result<StoredLead, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("lead row parse: {e}"));
    let id: String = row.get(0).map_err(read)?;
    let document: String = row.get(1).map_err(read)?;
    let created: String = row.get(2).map_err(read)?;
    Ok(StoredLead {
        id: parse_id(&id)?,
        lead: parse_document(&document)?,
        created_at: parse_datetime(&created),
    })
}

fn row_to_application(row: &libsql::Row) -> Result<StoredApplication, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("application row parse: {e}"));
    let id: String = row.get(0).map_err(read)?;
    let cv_filename: String = row.get(1).map_err(read)?;
    let document: String = row.get(2).map_err(read)?;
    let created: String = row.get(3).map_err(read)?;
    Ok(StoredApplication {
        id: parse_id(&id)?,
        cv_filename,
        lead: parse_document(&document)?,
        created_at: parse_datetime(&created),
    })
}

#[async_trait]
impl LeadStore for LibSqlLeadStore {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn insert_lead(&self, lead: &LeadSnapshot) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        let document = serde_json::to_string(lead)
            .map_err(|e| DatabaseError::Serialization(format!("lead document: {e}")))?;
        let now = timestamp();

        self.conn()
            .execute(
                "INSERT INTO leads (id, email, category, document, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    opt_text(lead.email.as_deref()),
                    opt_text(lead.category.map(|c| c.label())),
                    document,
                    now
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_lead: {e}")))?;

        debug!(lead_id = %id, "Lead inserted");
        Ok(id)
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<StoredLead>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, document, created_at FROM leads WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_lead: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_lead(&row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_lead: {e}"))),
        }
    }

    async fn recent_leads(&self, limit: usize) -> Result<Vec<StoredLead>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, document, created_at FROM leads ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_leads: {e}")))?;

        let mut leads = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_leads: {e}")))?
        {
            leads.push(row_to_lead(&row)?);
        }
        Ok(leads)
    }

    async fn insert_application(
        &self,
        lead: &LeadSnapshot,
        cv_filename: &str,
    ) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        let document = serde_json::to_string(lead)
            .map_err(|e| DatabaseError::Serialization(format!("application document: {e}")))?;
        let now = timestamp();

        self.conn()
            .execute(
                "INSERT INTO applications (id, email, cv_filename, document, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    opt_text(lead.email.as_deref()),
                    cv_filename,
                    document,
                    now
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_application: {e}")))?;

        debug!(application_id = %id, cv = cv_filename, "Application inserted");
        Ok(id)
    }

    async fn recent_applications(
        &self,
        limit: usize,
    ) -> Result<Vec<StoredApplication>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, cv_filename, document, created_at FROM applications ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_applications: {e}")))?;

        let mut applications = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_applications: {e}")))?
        {
            applications.push(row_to_application(&row)?);
        }
        Ok(applications)
    }
}
