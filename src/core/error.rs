//! Error kinds raised while deciding on and delivering an alert

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    /// Transport, non-2xx or decode failure from the quote provider.
    #[error("failed to get the exchange rate: {0}")]
    RateFetch(String),

    /// The quote table has no entry for a requested currency.
    #[error("exchange rate not found for currency: {0}")]
    RateNotFound(String),

    /// Reading the day's reference record failed. Never fatal to an evaluation.
    #[error("failed to read reference record: {0}")]
    StoreRead(String),

    #[error("failed to check threshold: {0}")]
    StoreWrite(String),

    #[error("failed to send email: {0}")]
    Notification(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = AlertError> = std::result::Result<T, E>;
