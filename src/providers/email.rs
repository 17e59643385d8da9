use crate::core::error::{AlertError, Result};
use crate::core::notify::Notifier;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

/// Notifier for transactional email services that accept a JSON POST
/// with a bearer API key.
pub struct HttpEmailNotifier {
    base_url: String,
    api_key: Option<String>,
    from_email: String,
}

impl HttpEmailNotifier {
    pub fn new(base_url: &str, api_key: Option<&str>, from_email: &str) -> Self {
        HttpEmailNotifier {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            from_email: from_email.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    #[instrument(name = "EmailSend", skip(self, body), fields(to = %to_address))]
    async fn send(&self, subject: &str, body: &str, to_address: &str) -> Result<()> {
        let payload = SendEmailRequest {
            from: &self.from_email,
            to: vec![to_address],
            subject,
            text: body,
        };

        let client = reqwest::Client::builder()
            .user_agent("fxalert/1.0")
            .build()
            .map_err(|e| AlertError::Notification(e.to_string()))?;

        let mut request = client.post(&self.base_url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AlertError::Notification(format!("request error: {e}")))?;

        if !response.status().is_success() {
            return Err(AlertError::Notification(format!(
                "email service returned status: {}",
                response.status()
            )));
        }

        debug!(status = %response.status(), "Email accepted");
        Ok(())
    }
}

/// Logs the alert instead of delivering it.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str, to_address: &str) -> Result<()> {
        info!(to = %to_address, %subject, %body, "Dry run, email not sent");
        Ok(())
    }
}
