//! Async client for the Vatify API.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use super::config::ClientConfig;
use super::endpoint::{self, ApiRequest, ApiResponse, HttpMethod};
use crate::core::{CalculationRequest, CalculationResult, RatesResponse, ValidationResult, VatifyError};

/// Async Vatify client.
///
/// The underlying `reqwest::Client` is created on the first call and reused
/// until [`close`](Self::close); a later call opens a new one. The handle is
/// `Send + Sync`, so it can be shared between tasks behind an `Arc`.
///
/// Dropping an in-flight future aborts that exchange and leaves the handle
/// usable.
///
/// ```no_run
/// # async fn run() -> Result<(), vatify::VatifyError> {
/// let client = vatify::VatifyClient::new("sk_live_...");
/// let result = client.validate_vat("DE811907980").await?;
/// println!("valid: {}", result.valid);
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VatifyClient {
    config: ClientConfig,
    http: Mutex<Option<reqwest::Client>>,
}

impl VatifyClient {
    /// Client for the production API with default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            http: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Release the connection. The next call opens a new one.
    pub fn close(&self) {
        let previous = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!(base_url = %self.config.base_url(), "closed connection");
        }
    }

    /// Validate a VAT number.
    ///
    /// A number the service reports as invalid comes back as `Ok` with
    /// `valid == false`.
    ///
    /// # Errors
    ///
    /// `HttpStatus` for status ≥ 400, `Transport`/`Timeout` when no response
    /// arrived, `Schema` when the body does not decode.
    pub async fn validate_vat(&self, vat_number: &str) -> Result<ValidationResult, VatifyError> {
        let response = self.execute(endpoint::validate_request(vat_number)).await?;
        endpoint::parse_validate(response)
    }

    /// Fetch the VAT rates of a country.
    pub async fn rates(&self, country_code: &str) -> Result<RatesResponse, VatifyError> {
        let request = endpoint::rates_request(country_code)?;
        let response = self.execute(request).await?;
        endpoint::parse_rates(response)
    }

    /// Calculate VAT for a transaction.
    ///
    /// The request is checked locally first; an invalid request fails without
    /// a network call.
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, VatifyError> {
        let request = endpoint::calculate_request(request)?;
        let response = self.execute(request).await?;
        endpoint::parse_calculate(response)
    }

    fn connection(&self) -> Result<reqwest::Client, VatifyError> {
        let mut slot = self.http.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(http) = slot.as_ref() {
            return Ok(http.clone());
        }

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout())
            .user_agent(self.config.user_agent())
            .default_headers(self.config.default_headers()?)
            .build()?;
        debug!(base_url = %self.config.base_url(), "opened connection");
        *slot = Some(http.clone());
        Ok(http)
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, VatifyError> {
        let http = self.connection()?;
        let url = self.config.url(&request.path);
        debug!(method = ?request.method, path = %request.path, "sending request");

        let mut builder = match request.method {
            HttpMethod::Get => http.get(&url),
            HttpMethod::Post => http.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if status >= 400 {
            warn!(status, path = %request.path, "request rejected");
        } else {
            debug!(status, path = %request.path, "response received");
        }
        Ok(ApiResponse { status, body })
    }
}
