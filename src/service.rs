//! LeadService: the in-process collaborator behind the dialog.
//!
//! Renders estimates, persists leads and applications, stores CVs and mails
//! the sales team. Storage and email failures are reported, not fatal: the
//! visitor's submission succeeds as long as the request itself was sound.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::backend::{LeadBackend, LeadSnapshot, SaveReceipt, UploadReceipt};
use crate::config::ContactConfig;
use crate::dialog::session::LeadPath;
use crate::error::{BackendError, UploadError};
use crate::estimate;
use crate::notify::{Attachment, Notifier, SalesMail, truncate_error};
use crate::store::LeadStore;
use crate::uploads::{CvFile, CvStorage};

/// What happened to a saved lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub db_saved: bool,
    pub email_sent: bool,
    /// Truncated; empty when the email went out.
    pub email_error: String,
}

/// What happened to an uploaded CV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub filename: String,
    pub db_saved: bool,
    pub email_sent: bool,
    pub email_error: String,
}

pub struct LeadService {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
    uploads: CvStorage,
    contact: ContactConfig,
}

impl LeadService {
    pub fn new(
        store: Arc<dyn LeadStore>,
        notifier: Arc<dyn Notifier>,
        uploads: CvStorage,
        contact: ContactConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            uploads,
            contact,
        }
    }

    pub fn summary(&self, lead: &LeadSnapshot) -> String {
        estimate::render_summary(lead, &self.contact)
    }

    /// Store the lead and notify the sales team with the overview and estimate.
    pub async fn save_lead(&self, lead: &LeadSnapshot) -> SaveOutcome {
        let db_saved = match self.store.insert_lead(lead).await {
            Ok(id) => {
                info!(lead_id = %id, "Lead saved");
                true
            }
            Err(e) => {
                warn!("Failed to save lead: {}", e);
                false
            }
        };

        let html = format!(
            "<div style='font-family:Arial,sans-serif;line-height:1.45;color:#222'>\
             <h2 style='margin:0 0 10px'>New Lead Received</h2>{}\
             <div style='margin:12px 0'>{}</div></div>",
            estimate::lead_overview(lead),
            self.summary(lead)
        );
        let subject = format!(
            "New Lead: {} - {}",
            lead.company_name.as_deref().unwrap_or(""),
            lead.category.map(|c| c.label()).unwrap_or("Service")
        );
        let (email_sent, email_error) = self
            .mail_sales(SalesMail {
                subject,
                html,
                reply_to: lead.email.clone(),
                attachments: Vec::new(),
            })
            .await;

        SaveOutcome {
            db_saved,
            email_sent,
            email_error,
        }
    }

    /// Store the CV, mail it to the sales team and record the application.
    pub async fn upload_cv(
        &self,
        file: CvFile,
        lead: &LeadSnapshot,
    ) -> Result<UploadOutcome, UploadError> {
        let filename = self.uploads.store(&file, Utc::now()).await?;

        let mut lead = lead.clone();
        lead.cv_filename = Some(filename.clone());
        if lead.path.is_none() {
            lead.path = Some(LeadPath::Job);
        }

        let html = format!(
            "<div style='font-family:Arial,sans-serif;line-height:1.45;color:#222'>\
             <h2 style='margin:0 0 10px'>New CV Upload</h2>{}\
             <p style='margin:8px 0 0;'>CV attached.</p></div>",
            estimate::lead_overview(&lead)
        );
        let subject = format!(
            "New CV Upload: {}",
            lead.name.as_deref().unwrap_or("Candidate")
        );
        let (email_sent, email_error) = self
            .mail_sales(SalesMail {
                subject,
                html,
                reply_to: lead.email.clone(),
                attachments: vec![Attachment::pdf(filename.clone(), file.content)],
            })
            .await;

        let db_saved = match self.store.insert_application(&lead, &filename).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to record application: {}", e);
                false
            }
        };

        Ok(UploadOutcome {
            filename,
            db_saved,
            email_sent,
            email_error,
        })
    }

    async fn mail_sales(&self, mail: SalesMail) -> (bool, String) {
        match self.notifier.notify_sales(mail).await {
            Ok(_) => (true, String::new()),
            Err(e) => {
                warn!("Sales notification failed: {}", e);
                (false, truncate_error(&e.to_string()))
            }
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[async_trait]
impl LeadBackend for LeadService {
    async fn upload(
        &self,
        file: CvFile,
        snapshot: &LeadSnapshot,
    ) -> Result<UploadReceipt, BackendError> {
        let outcome = self.upload_cv(file, snapshot).await?;
        Ok(UploadReceipt {
            filename: outcome.filename,
            email_sent: outcome.email_sent,
            email_error: non_empty(outcome.email_error),
        })
    }

    async fn summarize(&self, snapshot: &LeadSnapshot) -> Result<String, BackendError> {
        Ok(self.summary(snapshot))
    }

    async fn save(&self, snapshot: &LeadSnapshot) -> Result<SaveReceipt, BackendError> {
        let outcome = self.save_lead(snapshot).await;
        Ok(SaveReceipt {
            email_sent: outcome.email_sent,
            email_error: non_empty(outcome.email_error),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::dialog::session::{Category, EmployeeSize, StartTime};
    use crate::error::NotifyError;
    use crate::store::LibSqlLeadStore;

    /// Captures mail instead of sending it.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<SalesMail>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify_sales(&self, mail: SalesMail) -> Result<usize, NotifyError> {
            if let Some(reason) = &self.fail_with {
                return Err(NotifyError::Send(reason.clone()));
            }
            self.sent.lock().unwrap().push(mail);
            Ok(1)
        }
    }

    struct Fixture {
        service: LeadService,
        store: Arc<LibSqlLeadStore>,
        notifier: Arc<RecordingNotifier>,
        dir: tempfile::TempDir,
    }

    async fn fixture(notifier: RecordingNotifier) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LibSqlLeadStore::new_memory().await.unwrap());
        let notifier = Arc::new(notifier);
        let service = LeadService::new(
            store.clone(),
            notifier.clone(),
            CvStorage::new(dir.path()),
            ContactConfig::default(),
        );
        Fixture {
            service,
            store,
            notifier,
            dir,
        }
    }

    fn seo_lead() -> LeadSnapshot {
        LeadSnapshot {
            name: Some("Ann".into()),
            company_name: Some("Acme".into()),
            email: Some("ann@acme.com".into()),
            path: Some(LeadPath::Product),
            category: Some(Category::Seo),
            employee_size: Some(EmployeeSize::Medium),
            start_time: Some(StartTime::OneWeek),
            ..LeadSnapshot::default()
        }
    }

    #[tokio::test]
    async fn save_stores_and_notifies() {
        let fx = fixture(RecordingNotifier::default()).await;
        let outcome = fx.service.save_lead(&seo_lead()).await;

        assert_eq!(
            outcome,
            SaveOutcome {
                db_saved: true,
                email_sent: true,
                email_error: String::new(),
            }
        );
        let leads = fx.store.recent_leads(10).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].lead, seo_lead());

        let sent = fx.notifier.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "New Lead: Acme - SEO");
        assert_eq!(sent[0].reply_to.as_deref(), Some("ann@acme.com"));
        assert!(sent[0].html.contains("₹15,000"));
        assert!(sent[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn email_failure_is_reported_and_truncated() {
        let fx = fixture(RecordingNotifier {
            fail_with: Some("x".repeat(400)),
            ..RecordingNotifier::default()
        })
        .await;

        let receipt = fx.service.save(&seo_lead()).await.unwrap();
        assert!(!receipt.email_sent);
        assert_eq!(
            receipt.email_error.unwrap().chars().count(),
            crate::notify::MAX_ERROR_CHARS
        );
        // Storage still happened.
        assert_eq!(fx.store.recent_leads(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_stores_file_and_application() {
        let fx = fixture(RecordingNotifier::default()).await;
        let lead = LeadSnapshot {
            name: Some("Ann".into()),
            ..LeadSnapshot::default()
        };

        let receipt = fx
            .service
            .upload(CvFile::new("My CV.pdf", b"%PDF-1.4".to_vec()), &lead)
            .await
            .unwrap();
        assert!(receipt.filename.ends_with("_My_CV.pdf"));
        assert!(receipt.email_sent);
        assert!(fx.dir.path().join(&receipt.filename).exists());

        let apps = fx.store.recent_applications(5).await.unwrap();
        assert_eq!(apps[0].cv_filename, receipt.filename);
        assert_eq!(apps[0].lead.path, Some(LeadPath::Job));

        let sent = fx.notifier.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "New CV Upload: Ann");
        assert_eq!(sent[0].attachments[0].filename, receipt.filename);
    }

    #[tokio::test]
    async fn upload_rejects_non_pdf() {
        let fx = fixture(RecordingNotifier::default()).await;
        let err = fx
            .service
            .upload(CvFile::new("cv.docx", vec![1]), &LeadSnapshot::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Only PDF files allowed");
        assert!(fx.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_uses_contact() {
        let fx = fixture(RecordingNotifier::default()).await;
        let html = fx.service.summarize(&seo_lead()).await.unwrap();
        assert!(html.contains("6 months"));
        assert!(html.contains(&ContactConfig::default().email));
    }
}
