pub mod alert;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::alert::{AlertOrchestrator, AlertOutcome};
use crate::core::config::AppConfig;
use crate::core::error::AlertError;
use crate::core::notify::Notifier;
use crate::core::reference::ReferenceStore;
use crate::providers::{HttpEmailNotifier, LogNotifier, OpenExchangeRatesProvider};
use crate::store::memory::MemoryReferenceStore;
use anyhow::Result;
use chrono::Utc;
use chrono_tz::Australia::Melbourne;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Evaluate the configured pair once and alert if warranted.
    Run { trigger: String, dry_run: bool },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Run { trigger, dry_run } => {
            run(config_path, &trigger, dry_run).await?;
            Ok(())
        }
    }
}

/// A single stateless invocation. The trigger name is only logged.
pub async fn run(config_path: Option<&str>, trigger: &str, dry_run: bool) -> Result<AlertOutcome> {
    info!(
        trigger,
        date = %Utc::now().with_timezone(&Melbourne).format("%a %b %-d %H:%M:%S"),
        "FX alert run starting"
    );

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    let settings = config.alert_settings()?;

    let app_id = config
        .providers
        .exchange
        .app_id
        .as_deref()
        .ok_or_else(|| AlertError::Config("providers.exchange.app_id is not set".to_string()))?;
    let rates = Arc::new(OpenExchangeRatesProvider::new(
        &config.providers.exchange.base_url,
        app_id,
    ));

    let (store, notifier): (Arc<dyn ReferenceStore>, Arc<dyn Notifier>) = if dry_run {
        (Arc::new(MemoryReferenceStore::new()), Arc::new(LogNotifier))
    } else {
        let email = config.providers.email.as_ref().ok_or_else(|| {
            AlertError::Config("providers.email is not configured".to_string())
        })?;
        (
            store::open_reference_store(&config)?,
            Arc::new(HttpEmailNotifier::new(
                &email.base_url,
                email.api_key.as_deref(),
                &settings.from_email,
            )),
        )
    };

    let orchestrator = AlertOrchestrator::new(rates, store, notifier);
    let outcome = orchestrator
        .process(
            &settings.request,
            &settings.bounds,
            settings.threshold_percent,
            &settings.to_email,
        )
        .await?;

    info!(
        rate = outcome.rate,
        notified = outcome.notified,
        "FX alert run finished"
    );
    Ok(outcome)
}
