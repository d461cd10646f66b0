//! Request building and response normalization, shared by both clients.
//!
//! Nothing here touches the network: `*_request` functions describe the HTTP
//! exchange as plain data, and `parse_*` functions turn a status code and raw
//! body into a typed result or a [`VatifyError`]. The async and blocking
//! clients only execute the exchange in between.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::core::{
    CalculationRequest, CalculationResult, Rate, RatesResponse, RatesTable, ValidationError,
    ValidationResult, VatifyError, validate_calculation_request,
};

pub const VALIDATE_PATH: &str = "/v1/validate-vat";
pub const RATES_PATH: &str = "/v1/rates";
pub const CALCULATE_PATH: &str = "/v1/calculate";

const TABLE_FIELDS: [&str; 3] = ["country", "standard_rate", "reduced_rates"];

/// HTTP method of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An API call described as plain data. `path` is relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// `POST /v1/validate-vat`.
pub fn validate_request(vat_number: &str) -> ApiRequest {
    ApiRequest {
        method: HttpMethod::Post,
        path: VALIDATE_PATH.to_string(),
        body: Some(json!({ "vat_number": vat_number })),
    }
}

/// `GET /v1/rates/{country_code}`. The code is trimmed and uppercased.
pub fn rates_request(country_code: &str) -> Result<ApiRequest, VatifyError> {
    let code = country_code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(VatifyError::schema(
            "country_code",
            format!("must be exactly 2 letters, got '{country_code}'"),
        ));
    }
    Ok(ApiRequest {
        method: HttpMethod::Get,
        path: format!("{RATES_PATH}/{}", code.to_ascii_uppercase()),
        body: None,
    })
}

/// `POST /v1/calculate`. Fails with a Schema error, before any I/O, if the
/// request violates the model constraints.
pub fn calculate_request(request: &CalculationRequest) -> Result<ApiRequest, VatifyError> {
    let errors = validate_calculation_request(request);
    if !errors.is_empty() {
        return Err(VatifyError::Schema {
            errors,
            details: None,
        });
    }
    let body = serde_json::to_value(request)
        .map_err(|e| VatifyError::schema("$", format!("failed to serialize request: {e}")))?;
    Ok(ApiRequest {
        method: HttpMethod::Post,
        path: CALCULATE_PATH.to_string(),
        body: Some(body),
    })
}

pub fn parse_validate(response: ApiResponse) -> Result<ValidationResult, VatifyError> {
    check_status(&response, "Validation failed")?;
    decode(response.body)
}

pub fn parse_calculate(response: ApiResponse) -> Result<CalculationResult, VatifyError> {
    check_status(&response, "Calculation failed")?;
    decode(response.body)
}

pub fn parse_rates(response: ApiResponse) -> Result<RatesResponse, VatifyError> {
    check_status(&response, "Fetching rates failed")?;
    let value: Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(e) => return Err(decode_error(e, response.body)),
    };
    normalize_rates(value).map_err(|errors| VatifyError::schema_with_body(errors, response.body))
}

/// Detect which shape the rates endpoint answered with.
///
/// A mapping root with a `rates` key is unwrapped first. What remains must be
/// a table (mapping) or a legacy rate list.
pub fn normalize_rates(value: Value) -> Result<RatesResponse, Vec<ValidationError>> {
    let inner = match value {
        Value::Object(mut root) => match root.remove("rates") {
            Some(wrapped) => wrapped,
            None => Value::Object(root),
        },
        other => other,
    };

    match inner {
        Value::Object(table) => rates_table(table).map(RatesResponse::Table),
        Value::Array(items) => rate_list(items).map(RatesResponse::Legacy),
        other => Err(vec![ValidationError::new(
            "rates",
            format!("expected a rate table or a list of rates, got {}", json_type(&other)),
        )]),
    }
}

fn rates_table(table: Map<String, Value>) -> Result<RatesTable, Vec<ValidationError>> {
    let missing: Vec<ValidationError> = TABLE_FIELDS
        .iter()
        .filter(|field| !table.contains_key(**field))
        .map(|field| ValidationError::new(*field, "missing required field"))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    serde_json::from_value(Value::Object(table))
        .map_err(|e| vec![ValidationError::new("rates", e.to_string())])
}

fn rate_list(items: Vec<Value>) -> Result<Vec<Rate>, Vec<ValidationError>> {
    let mut rates = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Rate>(item) {
            Ok(rate) => rates.push(rate),
            Err(e) => errors.push(ValidationError::new(format!("rates[{i}]"), e.to_string())),
        }
    }
    if errors.is_empty() { Ok(rates) } else { Err(errors) }
}

/// Map error statuses to [`VatifyError::HttpStatus`]. Anything below 400 is
/// treated as a success.
fn check_status(response: &ApiResponse, message: &str) -> Result<(), VatifyError> {
    if response.status < 400 {
        return Ok(());
    }
    Err(VatifyError::HttpStatus {
        message: message.to_string(),
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, VatifyError> {
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => Err(decode_error(e, body)),
    }
}

fn decode_error(err: serde_json::Error, body: String) -> VatifyError {
    let field = if err.is_syntax() || err.is_eof() {
        "body"
    } else {
        "$"
    };
    VatifyError::schema_with_body(vec![ValidationError::new(field, err.to_string())], body)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
