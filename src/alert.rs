//! One alert run: fetch, convert, decide, notify

use crate::core::decision::{AlertBounds, AlertDecision, evaluate};
use crate::core::error::Result;
use crate::core::notify::{Notification, Notifier};
use crate::core::rate::{ConversionRequest, RateSource, convert};
use crate::core::reference::ReferenceStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertOutcome {
    pub rate: f32,
    pub decision: AlertDecision,
    pub notified: bool,
}

pub struct AlertOrchestrator {
    rates: Arc<dyn RateSource>,
    store: Arc<dyn ReferenceStore>,
    notifier: Arc<dyn Notifier>,
}

impl AlertOrchestrator {
    pub fn new(
        rates: Arc<dyn RateSource>,
        store: Arc<dyn ReferenceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            rates,
            store,
            notifier,
        }
    }

    pub async fn process(
        &self,
        request: &ConversionRequest,
        bounds: &AlertBounds,
        threshold_percent: f64,
        notify_address: &str,
    ) -> Result<AlertOutcome> {
        self.process_at(request, bounds, threshold_percent, notify_address, Utc::now())
            .await
    }

    /// Same as [`process`](Self::process) with an explicit invocation time.
    ///
    /// A reference record written during the run is kept even when the
    /// notification fails afterwards.
    pub async fn process_at(
        &self,
        request: &ConversionRequest,
        bounds: &AlertBounds,
        threshold_percent: f64,
        notify_address: &str,
        now: DateTime<Utc>,
    ) -> Result<AlertOutcome> {
        info!("Calling exchange rate API");
        let quote = self.rates.get_rate(request).await.inspect_err(|e| {
            error!(error = %e, "Error when getting the exchange rate");
        })?;

        let rate = convert(&quote, request)?;
        info!(pair = %request, rate, "Exchange rate API returned fx rate");

        let decision = evaluate(
            rate,
            bounds,
            threshold_percent,
            now,
            self.store.as_ref(),
        )
        .await?;

        let notified = match (decision.send, decision.direction) {
            (true, Some(direction)) => {
                info!("Send email notification");
                let message = Notification::rate_alert(request, direction, rate);
                self.notifier
                    .send(&message.subject, &message.body, notify_address)
                    .await?;
                true
            }
            _ => {
                info!("FX alert threshold not met");
                false
            }
        };

        Ok(AlertOutcome {
            rate,
            decision,
            notified,
        })
    }
}
