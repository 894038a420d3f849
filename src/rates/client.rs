use std::time::Duration;

use super::parser::parse_rate;

const SOAP_ACTION: &str = "http://www.cba.am/ExchangeRatesLatest";

const REQUEST_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
               xmlns:xsd="http://www.w3.org/2001/XMLSchema"
               xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ExchangeRatesLatest xmlns="http://www.cba.am/" />
  </soap:Body>
</soap:Envelope>"#;

/// Client for the remote rate listing
#[derive(Debug, Clone)]
pub struct RateClient {
    http_client: reqwest::Client,
    url: String,
    currency: String,
}

impl RateClient {
    pub fn new(
        url: impl Into<String>,
        currency: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            currency: currency.into(),
        })
    }

    /// Currency code this client looks up
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Fetch the latest rate for the configured currency
    pub async fn fetch_rate(&self) -> Result<f64, FetchError> {
        let response = self
            .http_client
            .post(&self.url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(REQUEST_BODY)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let rate = parse_rate(&body, &self.currency)?;
        tracing::debug!(currency = %self.currency, rate, "Fetched exchange rate");
        Ok(rate)
    }
}

/// Rate fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Rate source returned status {0}")]
    Status(u16),

    #[error("Malformed rate listing: {0}")]
    Xml(String),

    #[error("Currency {0} not found in rate listing")]
    MissingCurrency(String),

    #[error("Invalid rate value: {0:?}")]
    InvalidRate(String),
}
