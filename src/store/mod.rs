//! Persistence layer: libSQL-backed storage for leads and applications.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlLeadStore;
pub use traits::{LeadStore, StoredApplication, StoredLead};
