use rust_decimal::Decimal;
use tracing::warn;

use super::countries::is_known_country_code;
use super::error::{ValidationError, VatifyError};
use super::types::{CalculationRequest, Party};

/// Validate a calculation request before it is sent.
/// Returns all validation errors found (not just the first).
pub fn validate_calculation_request(request: &CalculationRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if request.amount <= Decimal::ZERO {
        errors.push(ValidationError::new(
            "amount",
            format!("must be greater than zero, got {}", request.amount),
        ));
    }

    validate_party(&request.supplier, "supplier", &mut errors);
    validate_party(&request.customer, "customer", &mut errors);

    if let Some(hint) = &request.category_hint {
        if hint.trim().is_empty() {
            errors.push(ValidationError::new(
                "category_hint",
                "must not be blank when present",
            ));
        }
    }

    errors
}

fn validate_party(party: &Party, prefix: &str, errors: &mut Vec<ValidationError>) {
    if let Some(message) = country_code_problem(&party.country_code) {
        errors.push(ValidationError::new(
            format!("{prefix}.country_code"),
            message,
        ));
    } else if party.country_code.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(ValidationError::new(
            format!("{prefix}.country_code"),
            "must be uppercase",
        ));
    }

    if let Some(vat) = &party.vat_number {
        if vat.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{prefix}.vat_number"),
                "must not be blank when present",
            ));
        }
    }
}

/// Check a country code and return it uppercased.
///
/// Codes outside ISO 3166-1 alpha-2 are accepted (the service decides) but logged.
pub(crate) fn check_country_code(field: &str, code: &str) -> Result<String, VatifyError> {
    if let Some(message) = country_code_problem(code) {
        return Err(VatifyError::schema(field, message));
    }
    let upper = code.to_ascii_uppercase();
    if !is_known_country_code(&upper) {
        warn!(country_code = %upper, "country code is not a known ISO 3166-1 alpha-2 code");
    }
    Ok(upper)
}

fn country_code_problem(code: &str) -> Option<String> {
    let len = code.chars().count();
    if len != 2 {
        return Some(format!("must be exactly 2 letters, got {len} characters"));
    }
    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(format!("must be 2 ASCII letters, got '{code}'"));
    }
    None
}
