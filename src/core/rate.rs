//! Quote tables and cross-rate conversion

use crate::core::error::{AlertError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

pub const USD: &str = "USD";

/// A USD based quote table: units of each currency per 1 USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    #[serde(default = "default_base")]
    pub base: String,
    pub rates: HashMap<String, f64>,
}

fn default_base() -> String {
    USD.to_string()
}

impl RateQuote {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self {
            base: default_base(),
            rates,
        }
    }

    /// Case-insensitive lookup, narrowed to single precision.
    pub fn rate_for(&self, currency: &str) -> Result<f32> {
        self.rates
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(currency))
            .map(|(_, rate)| *rate as f32)
            .ok_or_else(|| AlertError::RateNotFound(currency.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    #[serde(rename = "from")]
    pub from_currency: String,
    #[serde(rename = "to")]
    pub to_currency: String,
}

impl ConversionRequest {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
        }
    }
}

impl Display for ConversionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.from_currency, self.to_currency)
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn get_rate(&self, request: &ConversionRequest) -> Result<RateQuote>;
}

/// Computes the multiplier that turns one unit of `from` into `to`.
///
/// Non-USD pairs go through USD in two steps. The intermediate reciprocals
/// are kept (instead of `rate(to) / rate(from)`) because the single precision
/// rounding differs.
pub fn convert(quote: &RateQuote, request: &ConversionRequest) -> Result<f32> {
    let from = request.from_currency.as_str();
    let to = request.to_currency.as_str();

    if from.eq_ignore_ascii_case(USD) {
        quote.rate_for(to)
    } else if to.eq_ignore_ascii_case(USD) {
        Ok(1.0_f32 / quote.rate_for(from)?)
    } else {
        let to_currency_to_usd = 1.0_f32 / quote.rate_for(to)?;
        let from_currency_factor = 1.0_f32 / quote.rate_for(from)?;
        Ok(from_currency_factor / to_currency_to_usd)
    }
}
