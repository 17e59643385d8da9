//! Decides whether the current rate is worth an alert

use crate::core::error::Result;
use crate::core::reference::{ReferenceRecord, ReferenceStore, daily_key};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Inclusive trigger points: a rate at or beyond either bound is a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertBounds {
    pub lower: f32,
    pub upper: f32,
}

impl AlertBounds {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn crossed_by(&self, rate: f32) -> Option<Direction> {
        if rate < self.upper && rate > self.lower {
            None
        } else if rate <= self.lower {
            Some(Direction::Low)
        } else {
            Some(Direction::High)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    High,
    Low,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::High => "HIGH",
                Direction::Low => "LOW",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertDecision {
    pub send: bool,
    /// Set whenever a bound was crossed, even if no alert goes out.
    pub direction: Option<Direction>,
    /// Value written as the day's new reference, if one was created.
    pub recorded: Option<f32>,
}

/// Runs the bound check, the daily reference lookup and the drift check.
///
/// The first crossing of a day always alerts and records the rate. Later
/// crossings that day only alert when they drift more than
/// `threshold_percent` from the recorded rate. A failed lookup counts as
/// "no record"; a failed write aborts the evaluation.
pub async fn evaluate(
    current: f32,
    bounds: &AlertBounds,
    threshold_percent: f64,
    now: DateTime<Utc>,
    store: &dyn ReferenceStore,
) -> Result<AlertDecision> {
    let Some(direction) = bounds.crossed_by(current) else {
        debug!(rate = current, ?bounds, "Rate within bounds");
        return Ok(AlertDecision::default());
    };
    info!(rate = current, %direction, "Alert bound crossed");

    let mut decision = AlertDecision {
        direction: Some(direction),
        ..Default::default()
    };

    let key = daily_key(&now);
    debug!(%key, "Computed daily reference key");

    let existing = match store.get(&key).await {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, %key, "Reference lookup failed, treating as absent");
            None
        }
    };

    let reference = match existing {
        Some(record) => {
            info!(%key, reference = record.rate, "Found reference record");
            record.rate
        }
        None => {
            info!(%key, "No reference record for today, creating one");
            store
                .put(ReferenceRecord::new(key, current, now))
                .await?;
            decision.send = true;
            decision.recorded = Some(current);
            current
        }
    };

    if drift_exceeds(threshold_percent, current, reference) {
        decision.send = true;
    }

    Ok(decision)
}

fn drift_exceeds(threshold_percent: f64, current: f32, reference: f32) -> bool {
    if current == reference {
        return false;
    }

    let diff = (f64::from(current) - f64::from(reference)).abs();
    let delta = diff / f64::from(reference) * 100.0;
    debug!(delta, threshold_percent, "Percent drift from reference");
    delta > threshold_percent
}
