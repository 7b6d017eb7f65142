//! Sales-team notifications: HTML mail through the SendGrid v3 API with an
//! SMTP fallback over lettre.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::parse_var;
use crate::error::{ConfigError, NotifyError};

/// Longest error text reported back to the visitor.
pub const MAX_ERROR_CHARS: usize = 180;

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

// ── Configuration ───────────────────────────────────────────────────

/// Which delivery paths to try, from `SENDGRID_TRANSPORT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailTransport {
    /// API first, SMTP when no recipient got the mail.
    #[default]
    Auto,
    Api,
    Smtp,
}

impl FromStr for MailTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "api" => Ok(Self::Api),
            "smtp" => Ok(Self::Smtp),
            other => Err(format!("unknown transport '{other}' (expected auto, api or smtp)")),
        }
    }
}

impl MailTransport {
    fn uses_api(self) -> bool {
        matches!(self, Self::Auto | Self::Api)
    }

    fn uses_smtp(self) -> bool {
        matches!(self, Self::Auto | Self::Smtp)
    }
}

/// Mail settings, built from environment variables.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub transport: MailTransport,
    pub sendgrid_api_key: Option<SecretString>,
    pub sendgrid_url: String,
    /// SendGrid validates the request but delivers nothing.
    pub sandbox: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Option<SecretString>,
    pub from_address: String,
    pub sales_recipients: Vec<String>,
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl EmailConfig {
    /// Build config from environment variables.
    ///
    /// `Ok(None)` when there are no sales recipients or no credential at
    /// all. The SMTP password defaults to the SendGrid API key.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let sales_recipients = parse_recipients(&std::env::var("SALES_EMAILS").unwrap_or_default());
        let sendgrid_api_key = non_empty_var("SENDGRID_API_KEY");
        let password = non_empty_var("SMTP_PASSWORD").or_else(|| sendgrid_api_key.clone());
        if sales_recipients.is_empty() || password.is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            transport: parse_var("SENDGRID_TRANSPORT", MailTransport::Auto)?,
            sendgrid_api_key: sendgrid_api_key.map(SecretString::from),
            sendgrid_url: non_empty_var("SENDGRID_API_URL")
                .unwrap_or_else(|| SENDGRID_API_URL.to_string()),
            sandbox: std::env::var("SENDGRID_SANDBOX").is_ok_and(|v| v.trim() == "1"),
            smtp_host: non_empty_var("SMTP_HOST").unwrap_or_else(|| "smtp.sendgrid.net".to_string()),
            smtp_port: parse_var("SMTP_PORT", 587)?,
            username: non_empty_var("SMTP_USER").unwrap_or_else(|| "apikey".to_string()),
            password: password.map(SecretString::from),
            from_address: non_empty_var("FROM_EMAIL")
                .unwrap_or_else(|| "no-reply@example.com".to_string()),
            sales_recipients,
        }))
    }
}

/// Split a comma-separated recipient list, dropping blanks.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Cut an error message down to [`MAX_ERROR_CHARS`] characters.
pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

// ── Mail ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn pdf(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf".to_string(),
            content,
        }
    }
}

/// One notification for the sales team.
#[derive(Debug, Clone)]
pub struct SalesMail {
    pub subject: String,
    pub html: String,
    /// The lead's own address, so replies go straight to them.
    pub reply_to: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver to every sales recipient. Returns how many accepted the mail;
    /// fails only when none did.
    async fn notify_sales(&self, mail: SalesMail) -> Result<usize, NotifyError>;
}

/// Used when mail is not configured; every notification fails softly.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify_sales(&self, _mail: SalesMail) -> Result<usize, NotifyError> {
        Err(NotifyError::NotConfigured(
            "missing mail credentials or sales recipients".into(),
        ))
    }
}

// ── Transport order ─────────────────────────────────────────────────

/// Tries the API path, then SMTP if the API reached nobody.
pub struct SalesMailer {
    api: Option<Arc<dyn Notifier>>,
    smtp: Option<Arc<dyn Notifier>>,
}

impl SalesMailer {
    pub fn new(api: Option<Arc<dyn Notifier>>, smtp: Option<Arc<dyn Notifier>>) -> Self {
        Self { api, smtp }
    }

    /// Pick the transports `config` allows and has credentials for.
    pub fn from_config(config: EmailConfig) -> Result<Self, NotifyError> {
        let use_api = config.transport.uses_api() && config.sendgrid_api_key.is_some();
        let use_smtp = config.transport.uses_smtp() && config.password.is_some();

        let api: Option<Arc<dyn Notifier>> = if use_api {
            Some(Arc::new(SendGridApiNotifier::new(config.clone())?))
        } else {
            None
        };
        let smtp: Option<Arc<dyn Notifier>> = if use_smtp {
            Some(Arc::new(SmtpNotifier::new(config)))
        } else {
            None
        };
        Ok(Self::new(api, smtp))
    }

    /// Transports in the order they are tried.
    pub fn transports(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.api.is_some() {
            names.push("api");
        }
        if self.smtp.is_some() {
            names.push("smtp");
        }
        names
    }
}

#[async_trait]
impl Notifier for SalesMailer {
    async fn notify_sales(&self, mail: SalesMail) -> Result<usize, NotifyError> {
        let mut last_error = None;
        for (name, notifier) in [("api", &self.api), ("smtp", &self.smtp)] {
            let Some(notifier) = notifier else { continue };
            match notifier.notify_sales(mail.clone()).await {
                Ok(delivered) => return Ok(delivered),
                Err(e) => {
                    warn!(transport = name, "Sales email transport failed: {}", e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            NotifyError::NotConfigured("no usable mail transport".into())
        }))
    }
}

// ── SendGrid API ────────────────────────────────────────────────────

pub struct SendGridApiNotifier {
    config: EmailConfig,
    api_key: SecretString,
    client: reqwest::Client,
}

impl SendGridApiNotifier {
    pub fn new(config: EmailConfig) -> Result<Self, NotifyError> {
        let api_key = config
            .sendgrid_api_key
            .clone()
            .ok_or_else(|| NotifyError::NotConfigured("missing SENDGRID_API_KEY".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Api(e.to_string()))?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// The v3 `mail/send` request body for one recipient.
    fn payload(&self, to: &str, mail: &SalesMail) -> serde_json::Value {
        let mut body = json!({
            "personalizations": [{ "to": [{ "email": to }], "subject": mail.subject }],
            "from": { "email": self.config.from_address },
            "content": [{ "type": "text/html", "value": mail.html }],
            "tracking_settings": {
                "click_tracking": { "enable": false, "enable_text": false }
            },
        });
        if let Some(reply_to) = mail.reply_to.as_deref() {
            body["reply_to"] = json!({ "email": reply_to });
        }
        if self.config.sandbox {
            body["mail_settings"] = json!({ "sandbox_mode": { "enable": true } });
        }
        if !mail.attachments.is_empty() {
            body["attachments"] = mail
                .attachments
                .iter()
                .map(|a| {
                    json!({
                        "content": BASE64.encode(&a.content),
                        "type": a.content_type,
                        "filename": a.filename,
                        "disposition": "attachment",
                    })
                })
                .collect();
        }
        body
    }

    async fn send_one(&self, to: &str, mail: &SalesMail) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.config.sendgrid_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.payload(to, mail))
            .send()
            .await
            .map_err(|e| NotifyError::Api(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Api(format!("status {}", status.as_u16())));
        }
        debug!(recipient = %to, status = status.as_u16(), "SendGrid accepted mail");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SendGridApiNotifier {
    async fn notify_sales(&self, mail: SalesMail) -> Result<usize, NotifyError> {
        let mut delivered = 0;
        let mut last_error = None;
        for to in &self.config.sales_recipients {
            match self.send_one(to, &mail).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(recipient = %to, "Sales email via API failed: {}", e);
                    last_error = Some(e);
                }
            }
        }
        match (delivered, last_error) {
            (0, Some(e)) => Err(e),
            (0, None) => Err(NotifyError::NotConfigured("no sales recipients".into())),
            (n, _) => {
                info!(
                    subject = %mail.subject,
                    delivered = n,
                    sandbox = self.config.sandbox,
                    "Sales email sent via API"
                );
                Ok(n)
            }
        }
    }
}

// ── SMTP ────────────────────────────────────────────────────────────

pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, mail: &SalesMail) -> Result<Message, NotifyError> {
        let from: Mailbox = parse_mailbox(&self.config.from_address)?;
        let mut builder = Message::builder()
            .from(from)
            .to(parse_mailbox(to)?)
            .subject(mail.subject.clone());

        if let Some(reply_to) = mail.reply_to.as_deref() {
            match parse_mailbox(reply_to) {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(e) => warn!("Skipping reply-to: {}", e),
            }
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(mail.html.clone()));
        for attachment in &mail.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| NotifyError::Build(format!("content type: {e}")))?;
            body = body.singlepart(
                MailAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }

        builder
            .multipart(body)
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    /// Blocking send to every recipient.
    fn send_all(&self, mail: &SalesMail) -> Result<usize, NotifyError> {
        let password = self
            .config
            .password
            .as_ref()
            .ok_or_else(|| NotifyError::NotConfigured("missing SMTP password".into()))?;
        let creds = Credentials::new(
            self.config.username.clone(),
            password.expose_secret().to_string(),
        );
        let transport = SmtpTransport::starttls_relay(&self.config.smtp_host)
            .map_err(|e| NotifyError::Send(format!("SMTP relay error: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .timeout(Some(Duration::from_secs(15)))
            .build();

        let mut delivered = 0;
        let mut last_error = None;
        for to in &self.config.sales_recipients {
            let result = self
                .build_message(to, mail)
                .and_then(|message| {
                    transport
                        .send(&message)
                        .map_err(|e| NotifyError::Send(e.to_string()))
                });
            match result {
                Ok(_) => delivered += 1,
                Err(e) => {
                    warn!(recipient = %to, "Sales email failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match (delivered, last_error) {
            (0, Some(e)) => Err(e),
            (0, None) => Err(NotifyError::NotConfigured("no sales recipients".into())),
            (n, _) => Ok(n),
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_sales(&self, mail: SalesMail) -> Result<usize, NotifyError> {
        let notifier = SmtpNotifier::new(self.config.clone());
        let subject = mail.subject.clone();
        let delivered = tokio::task::spawn_blocking(move || notifier.send_all(&mail))
            .await
            .map_err(|e| NotifyError::Send(format!("send task failed: {e}")))??;
        info!(subject = %subject, delivered, "Sales email sent via SMTP");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            transport: MailTransport::Auto,
            sendgrid_api_key: Some(SecretString::from("SG.key")),
            sendgrid_url: SENDGRID_API_URL.into(),
            sandbox: false,
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            username: "apikey".into(),
            password: Some(SecretString::from("secret")),
            from_address: "no-reply@example.com".into(),
            sales_recipients: vec!["sales@example.com".into()],
        }
    }

    fn mail() -> SalesMail {
        SalesMail {
            subject: "New Lead: Acme - SEO".into(),
            html: "<p>hello</p>".into(),
            reply_to: Some("ann@acme.com".into()),
            attachments: vec![],
        }
    }

    #[test]
    fn recipients_parsing() {
        assert_eq!(
            parse_recipients(" a@x.com, ,b@y.com "),
            vec!["a@x.com".to_string(), "b@y.com".to_string()]
        );
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn error_truncation_counts_chars() {
        let long = "é".repeat(500);
        let cut = truncate_error(&long);
        assert_eq!(cut.chars().count(), MAX_ERROR_CHARS);
        assert_eq!(truncate_error("short"), "short");
    }

    #[test]
    fn builds_message_with_attachment() {
        let notifier = SmtpNotifier::new(config());
        let mut mail = mail();
        mail.attachments.push(Attachment::pdf("cv.pdf", b"%PDF-1.4".to_vec()));

        let message = notifier.build_message("sales@example.com", &mail).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: New Lead: Acme - SEO"));
        assert!(raw.contains("Reply-To: ann@acme.com"));
        assert!(raw.contains("cv.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[test]
    fn invalid_recipient_is_reported() {
        let notifier = SmtpNotifier::new(config());
        let err = notifier.build_message("not an address", &mail()).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn disabled_notifier_fails_softly() {
        let err = DisabledNotifier.notify_sales(mail()).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured(_)));
    }

    #[test]
    fn transport_names_parse() {
        assert_eq!("auto".parse::<MailTransport>(), Ok(MailTransport::Auto));
        assert_eq!("API".parse::<MailTransport>(), Ok(MailTransport::Api));
        assert_eq!("smtp".parse::<MailTransport>(), Ok(MailTransport::Smtp));
        assert!("pigeon".parse::<MailTransport>().is_err());
    }

    #[test]
    fn mail_env_rejects_bad_port() {
        // The only test that touches these variables.
        unsafe {
            std::env::set_var("SALES_EMAILS", "sales@example.com");
            std::env::set_var("SMTP_PASSWORD", "secret");
            std::env::set_var("SMTP_PORT", "not-a-port");
        }
        let err = EmailConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));

        unsafe { std::env::set_var("SMTP_PORT", "2525") };
        let config = EmailConfig::from_env().unwrap().unwrap();
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.transport, MailTransport::Auto);

        unsafe {
            std::env::remove_var("SMTP_PORT");
            std::env::remove_var("SMTP_PASSWORD");
            std::env::remove_var("SALES_EMAILS");
        }
    }

    #[test]
    fn api_payload_carries_reply_to_sandbox_and_attachments() {
        let mut config = config();
        config.sandbox = true;
        let notifier = SendGridApiNotifier::new(config).unwrap();
        let mut mail = mail();
        mail.attachments.push(Attachment::pdf("cv.pdf", b"%PDF".to_vec()));

        let body = notifier.payload("sales@example.com", &mail);
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "sales@example.com");
        assert_eq!(body["personalizations"][0]["subject"], "New Lead: Acme - SEO");
        assert_eq!(body["from"]["email"], "no-reply@example.com");
        assert_eq!(body["content"][0]["type"], "text/html");
        assert_eq!(body["reply_to"]["email"], "ann@acme.com");
        assert_eq!(body["mail_settings"]["sandbox_mode"]["enable"], true);
        assert_eq!(body["attachments"][0]["content"], "JVBERg==");
        assert_eq!(body["attachments"][0]["type"], "application/pdf");
        assert_eq!(body["attachments"][0]["filename"], "cv.pdf");

        let plain = SendGridApiNotifier::new(self::config()).unwrap();
        let body = plain.payload("sales@example.com", &SalesMail {
            reply_to: None,
            ..self::mail()
        });
        assert!(body.get("reply_to").is_none());
        assert!(body.get("mail_settings").is_none());
        assert!(body.get("attachments").is_none());
    }

    #[test]
    fn transports_follow_config() {
        let names = |transport, api_key: Option<&str>| {
            let mut config = config();
            config.transport = transport;
            config.sendgrid_api_key = api_key.map(SecretString::from);
            SalesMailer::from_config(config).unwrap().transports()
        };
        assert_eq!(names(MailTransport::Auto, Some("SG.key")), vec!["api", "smtp"]);
        assert_eq!(names(MailTransport::Auto, None), vec!["smtp"]);
        assert_eq!(names(MailTransport::Api, Some("SG.key")), vec!["api"]);
        assert_eq!(names(MailTransport::Smtp, Some("SG.key")), vec!["smtp"]);
    }

    /// Notes each attempt in a shared log and answers with a fixed outcome.
    struct ScriptedNotifier {
        name: &'static str,
        delivers: bool,
        log: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Notifier for ScriptedNotifier {
        async fn notify_sales(&self, _mail: SalesMail) -> Result<usize, NotifyError> {
            self.log.lock().unwrap().push(self.name);
            if self.delivers {
                Ok(1)
            } else {
                Err(NotifyError::Send(format!("{} down", self.name)))
            }
        }
    }

    fn mailer(api: bool, smtp: bool) -> (SalesMailer, Arc<std::sync::Mutex<Vec<&'static str>>>) {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let scripted = |name, delivers| -> Option<Arc<dyn Notifier>> {
            Some(Arc::new(ScriptedNotifier {
                name,
                delivers,
                log: Arc::clone(&log),
            }))
        };
        (SalesMailer::new(scripted("api", api), scripted("smtp", smtp)), log)
    }

    #[tokio::test]
    async fn api_success_skips_smtp() {
        let (mailer, log) = mailer(true, true);
        assert_eq!(mailer.notify_sales(mail()).await.unwrap(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["api"]);
    }

    #[tokio::test]
    async fn api_failure_falls_back_to_smtp() {
        let (mailer, log) = mailer(false, true);
        assert_eq!(mailer.notify_sales(mail()).await.unwrap(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["api", "smtp"]);
    }

    #[tokio::test]
    async fn both_failing_reports_last_error() {
        let (mailer, log) = mailer(false, false);
        let err = mailer.notify_sales(mail()).await.unwrap_err();
        assert!(err.to_string().contains("smtp down"));
        assert_eq!(*log.lock().unwrap(), vec!["api", "smtp"]);
    }

    #[tokio::test]
    async fn no_transport_is_not_configured() {
        let err = SalesMailer::new(None, None).notify_sales(mail()).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured(_)));
    }

    /// Local stand-in for the SendGrid endpoint; records each request and
    /// rejects mail addressed to `bounce@example.com`.
    async fn start_sendgrid() -> (String, Arc<std::sync::Mutex<Vec<(String, serde_json::Value)>>>) {
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::post;
        use axum::{Json, Router};

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let app = Router::new().route(
            "/v3/mail/send",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let record = Arc::clone(&record);
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let bounce = body["personalizations"][0]["to"][0]["email"] == "bounce@example.com";
                    record.lock().unwrap().push((auth, body));
                    if bounce {
                        StatusCode::BAD_REQUEST
                    } else {
                        StatusCode::ACCEPTED
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v3/mail/send"), seen)
    }

    #[tokio::test]
    async fn api_sends_to_each_recipient() {
        let (url, seen) = start_sendgrid().await;
        let mut config = config();
        config.sendgrid_url = url;
        config.sales_recipients = vec!["a@example.com".into(), "bounce@example.com".into()];
        let notifier = SendGridApiNotifier::new(config).unwrap();

        assert_eq!(notifier.notify_sales(mail()).await.unwrap(), 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "Bearer SG.key");
        assert_eq!(seen[0].1["personalizations"][0]["to"][0]["email"], "a@example.com");
    }

    #[tokio::test]
    async fn api_rejection_is_an_error() {
        let (url, _seen) = start_sendgrid().await;
        let mut config = config();
        config.sendgrid_url = url;
        config.sales_recipients = vec!["bounce@example.com".into()];
        let notifier = SendGridApiNotifier::new(config).unwrap();

        let err = notifier.notify_sales(mail()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Api(ref m) if m.contains("400")));
    }
}
