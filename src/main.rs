use std::sync::Arc;

use anyhow::Context;

use leadbot::backend::{HttpBackend, LeadBackend};
use leadbot::channels::CliWidget;
use leadbot::config::{ContactConfig, DialogConfig, ServerConfig};
use leadbot::notify::{DisabledNotifier, EmailConfig, Notifier, SalesMailer};
use leadbot::server::{AppState, build_router};
use leadbot::service::LeadService;
use leadbot::store::{LeadStore, LibSqlLeadStore};
use leadbot::uploads::CvStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "chat".to_string());
    match mode.as_str() {
        "serve" => serve().await,
        "chat" => chat().await,
        other => {
            eprintln!("Unknown mode '{other}'. Usage: leadbot [serve|chat]");
            std::process::exit(2);
        }
    }
}

/// Wire the store, notifier and upload directory into a service.
async fn build_service(config: &ServerConfig) -> anyhow::Result<LeadService> {
    let store: Arc<dyn LeadStore> = Arc::new(
        LibSqlLeadStore::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );

    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env()? {
        Some(email) => {
            let recipients = email.sales_recipients.len();
            let mailer = SalesMailer::from_config(email)?;
            eprintln!(
                "   Sales email: {} recipient(s) via {}",
                recipients,
                mailer.transports().join(" then ")
            );
            Arc::new(mailer)
        }
        None => {
            eprintln!("   Sales email: disabled (set SENDGRID_API_KEY or SMTP_PASSWORD, and SALES_EMAILS)");
            Arc::new(DisabledNotifier)
        }
    };

    Ok(LeadService::new(
        store,
        notifier,
        CvStorage::new(&config.upload_dir),
        ContactConfig::from_env(),
    ))
}

async fn serve() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    eprintln!("🧾 Leadbot server v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Uploads: {}", config.upload_dir.display());

    let service = Arc::new(build_service(&config).await?);
    let app = build_router(AppState { service }, &config.cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Lead server started");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn chat() -> anyhow::Result<()> {
    eprintln!("🧾 Leadbot v{}", env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn LeadBackend> = match std::env::var("LEADBOT_BACKEND_URL") {
        Ok(url) if !url.trim().is_empty() => {
            eprintln!("   Backend: {url}");
            Arc::new(HttpBackend::new(url)?)
        }
        _ => {
            let config = ServerConfig::from_env()?;
            eprintln!("   Backend: in-process ({})", config.db_path.display());
            Arc::new(build_service(&config).await?)
        }
    };
    eprintln!("   Type your answers and press Enter. /restart to start over, /quit to exit.\n");

    CliWidget::new(DialogConfig::from_env()?, backend)
        .run()
        .await?;
    Ok(())
}
