//! Alert delivery abstractions

use crate::core::decision::Direction;
use crate::core::error::Result;
use crate::core::rate::ConversionRequest;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn rate_alert(request: &ConversionRequest, direction: Direction, rate: f32) -> Self {
        Self {
            subject: format!("{request} Alert"),
            body: format!("{request} value is {direction}. Current value is {rate:.6}"),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str, to_address: &str) -> Result<()>;
}
