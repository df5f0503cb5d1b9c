//! Pipeline worker binary.
//!
//! Constructs every dependency explicitly (pool, classifier, mailer,
//! dispatcher, bus), subscribes the orchestrator, and shuts down
//! gracefully on ctrl-c. There are no ambient singletons: everything the
//! pipeline touches is built here and injected.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deskpilot_classifier::{ClassifierClient, ClassifierConfig, FallbackTriage, Triage};
use deskpilot_events::{
    EventBus, MailTransport, NoopMailer, NotificationDispatcher, SmtpConfig, SmtpMailer,
};
use deskpilot_pipeline::{Orchestrator, PipelineContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = deskpilot_db::connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    deskpilot_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    deskpilot_db::health_check(&pool).await?;
    tracing::info!("Database ready");

    let triage: Arc<dyn Triage> = match ClassifierConfig::from_env() {
        Some(config) => {
            tracing::info!(model = %config.model, "Classifier configured");
            Arc::new(ClassifierClient::new(config)?)
        }
        None => {
            tracing::warn!("CLASSIFIER_URL not set, every ticket will get fallback triage");
            Arc::new(FallbackTriage)
        }
    };

    let transport: Arc<dyn MailTransport> = match SmtpConfig::from_env() {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, notifications will be logged and dropped");
            Arc::new(NoopMailer)
        }
    };

    let bus = Arc::new(EventBus::default());
    let receiver = bus.subscribe();

    let mut ctx = PipelineContext::new(
        pool,
        triage,
        NotificationDispatcher::new(transport),
        bus.clone(),
    );
    if let Some(delay) = rating_reminder_delay_from_env() {
        ctx = ctx.with_rating_reminder_delay(delay);
    }

    let cancel = CancellationToken::new();
    let orchestrator = Orchestrator::new(Arc::new(ctx));
    let orchestrator_handle = tokio::spawn(orchestrator.run(receiver, cancel.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    cancel.cancel();
    orchestrator_handle.await?;

    Ok(())
}

/// Optional `RATING_REMINDER_DELAY_SECS` override.
fn rating_reminder_delay_from_env() -> Option<Duration> {
    std::env::var("RATING_REMINDER_DELAY_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}
