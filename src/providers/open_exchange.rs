use crate::core::error::{AlertError, Result};
use crate::core::rate::{ConversionRequest, RateQuote, RateSource};
use async_trait::async_trait;
use tracing::{debug, error, instrument};

/// Rate source backed by an openexchangerates.org style `latest.json`
/// endpoint: `{"base": "USD", "rates": {"AED": 3.67, ...}}`.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: String,
}

impl OpenExchangeRatesProvider {
    pub fn new(base_url: &str, app_id: &str) -> Self {
        OpenExchangeRatesProvider {
            base_url: base_url.to_string(),
            app_id: app_id.to_string(),
        }
    }

    fn endpoint(&self, request: &ConversionRequest) -> String {
        format!(
            "{}?app_id={}&symbols={},{}",
            self.base_url, self.app_id, request.from_currency, request.to_currency
        )
    }
}

#[async_trait]
impl RateSource for OpenExchangeRatesProvider {
    #[instrument(
        name = "ExchangeRateFetch",
        skip(self),
        fields(pair = %request)
    )]
    async fn get_rate(&self, request: &ConversionRequest) -> Result<RateQuote> {
        let url = self.endpoint(request);
        debug!("Requesting exchange rates from {}", self.base_url);

        let client = reqwest::Client::builder()
            .user_agent("fxalert/1.0")
            .build()
            .map_err(|e| AlertError::RateFetch(e.to_string()))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| AlertError::RateFetch(format!("request error: {e}")))?;

        if !response.status().is_success() {
            return Err(AlertError::RateFetch(format!(
                "currency exchange service returned status: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AlertError::RateFetch(e.to_string()))?;

        let quote: RateQuote = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse exchange rate response");
            AlertError::RateFetch(format!("failed to parse JSON response: {e}"))
        })?;

        debug!(base = %quote.base, rates = quote.rates.len(), "Received exchange rates");
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::convert;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{
        "base": "USD",
        "rates": {
            "AED": 3.672538,
            "AUD": 1.390866,
            "ALL": 125.716501,
            "USD": 1
        }
    }"#;

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/latest.json"))
            .and(query_param("app_id", "test-app"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(server: &MockServer) -> OpenExchangeRatesProvider {
        OpenExchangeRatesProvider::new(&format!("{}/api/latest.json", server.uri()), "test-app")
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = create_mock_server(200, MOCK_JSON).await;
        let request = ConversionRequest::new("AUD", "AED");

        let quote = provider(&mock_server).get_rate(&request).await.unwrap();
        assert_eq!(quote.base, "USD");
        assert_eq!(quote.rates.len(), 4);
        assert_eq!(convert(&quote, &request).unwrap(), 2.6404686_f32);
    }

    #[tokio::test]
    async fn test_requested_symbols_are_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/latest.json"))
            .and(query_param("symbols", "AED,USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = ConversionRequest::new("AED", "USD");
        let quote = provider(&mock_server).get_rate(&request).await.unwrap();
        assert_eq!(convert(&quote, &request).unwrap(), 0.27229124_f32);
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server(500, "").await;

        let err = provider(&mock_server)
            .get_rate(&ConversionRequest::new("AUD", "INR"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to get the exchange rate: currency exchange service returned status: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_empty_response_is_an_error() {
        let mock_server = create_mock_server(204, "").await;

        let err = provider(&mock_server)
            .get_rate(&ConversionRequest::new("AUD", "INR"))
            .await
            .unwrap_err();
        assert!(matches!(err, AlertError::RateFetch(_)));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(200, r#"{"base": "USD", "rates": {"AUD": "x"}}"#).await;

        let err = provider(&mock_server)
            .get_rate(&ConversionRequest::new("AUD", "INR"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse JSON response"));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let provider = OpenExchangeRatesProvider::new("http://127.0.0.1:1/latest.json", "test-app");

        let err = provider
            .get_rate(&ConversionRequest::new("AUD", "INR"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to get the exchange rate: request error"));
    }
}
