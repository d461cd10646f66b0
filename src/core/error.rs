use thiserror::Error;

/// Errors returned by every client operation.
///
/// Transport-level failures carry no status code; HTTP failures carry the
/// status and the raw response body. A VAT number the service reports as
/// invalid is *not* an error; see [`ValidationResult::valid`](crate::ValidationResult).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VatifyError {
    /// Connection, DNS, TLS, or body-read failure before a usable response arrived.
    #[error("network error: {message}")]
    Transport {
        /// Short description of the failing step.
        message: String,
        /// Description from the underlying HTTP library.
        details: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout {
        /// Description from the underlying HTTP library.
        details: String,
    },

    /// The service answered with a status of 400 or above.
    #[error("{message}")]
    HttpStatus {
        /// Which operation failed (e.g. "Validation failed").
        message: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body, never parsed.
        body: String,
    },

    /// A request or response did not satisfy the typed model.
    #[error("schema error: {}", join_errors(.errors))]
    Schema {
        /// Every violated field.
        errors: Vec<ValidationError>,
        /// Raw response body, when the violation came from a response.
        details: Option<String>,
    },
}

/// Coarse classification of a [`VatifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Timeout,
    HttpStatus,
    Schema,
}

impl VatifyError {
    /// Schema error for a single field, without a response body.
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            errors: vec![ValidationError::new(field, message)],
            details: None,
        }
    }

    pub(crate) fn schema_with_body(
        errors: Vec<ValidationError>,
        body: impl Into<String>,
    ) -> Self {
        Self::Schema {
            errors,
            details: Some(body.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Schema { .. } => ErrorKind::Schema,
        }
    }

    /// HTTP status code, present only for [`VatifyError::HttpStatus`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw diagnostic payload: response body or transport error text.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Transport { details, .. } | Self::Timeout { details } => Some(details),
            Self::HttpStatus { body, .. } => Some(body),
            Self::Schema { details, .. } => details.as_deref(),
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    ///
    /// Advisory only: the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Schema { .. } => false,
        }
    }
}

impl From<reqwest::Error> for VatifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                details: err.to_string(),
            };
        }
        let message = if err.is_connect() {
            "connection failed"
        } else if err.is_body() || err.is_decode() {
            "failed to read response body"
        } else if err.is_builder() {
            "invalid client configuration"
        } else {
            "request failed"
        };
        Self::Transport {
            message: message.into(),
            details: err.to_string(),
        }
    }
}

/// A single constraint violation with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "supplier.country_code").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
