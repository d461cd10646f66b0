//! Blocking client for the Vatify API.
//!
//! Same contract as [`VatifyClient`](super::VatifyClient); every call occupies
//! the calling thread until the exchange completes. Like
//! `reqwest::blocking`, it must not be used from inside an async runtime.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use super::config::ClientConfig;
use super::endpoint::{self, ApiRequest, ApiResponse, HttpMethod};
use crate::core::{CalculationRequest, CalculationResult, RatesResponse, ValidationResult, VatifyError};

/// Blocking Vatify client.
///
/// ```no_run
/// use vatify::BlockingVatifyClient;
///
/// let client = BlockingVatifyClient::new("sk_live_...");
/// let rates = client.rates("DE")?;
/// for rate in rates.rates() {
///     println!("{}: {}%", rate.label, rate.rate);
/// }
/// client.close();
/// # Ok::<(), vatify::VatifyError>(())
/// ```
#[derive(Debug)]
pub struct BlockingVatifyClient {
    config: ClientConfig,
    http: Mutex<Option<reqwest::blocking::Client>>,
}

impl BlockingVatifyClient {
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

    /// Validate a VAT number. `valid == false` is a normal result.
    pub fn validate_vat(&self, vat_number: &str) -> Result<ValidationResult, VatifyError> {
        let response = self.execute(endpoint::validate_request(vat_number))?;
        endpoint::parse_validate(response)
    }

    pub fn rates(&self, country_code: &str) -> Result<RatesResponse, VatifyError> {
        let request = endpoint::rates_request(country_code)?;
        endpoint::parse_rates(self.execute(request)?)
    }

    /// Calculate VAT; an invalid request fails before any network call.
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult, VatifyError> {
        let request = endpoint::calculate_request(request)?;
        endpoint::parse_calculate(self.execute(request)?)
    }

    fn connection(&self) -> Result<reqwest::blocking::Client, VatifyError> {
        let mut slot = self.http.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(http) = slot.as_ref() {
            return Ok(http.clone());
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout())
            .user_agent(self.config.user_agent())
            .default_headers(self.config.default_headers()?)
            .build()?;
        debug!(base_url = %self.config.base_url(), "opened connection");
        *slot = Some(http.clone());
        Ok(http)
    }

    fn execute(&self, request: ApiRequest) -> Result<ApiResponse, VatifyError> {
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

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        if status >= 400 {
            warn!(status, path = %request.path, "request rejected");
        } else {
            debug!(status, path = %request.path, "response received");
        }
        Ok(ApiResponse { status, body })
    }
}
