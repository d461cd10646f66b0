//! In-process mock of the Vatify API for integration tests.
//!
//! Serves the three endpoints on a random local port. Country and VAT number
//! inputs select canned behaviors:
//!
//! | Input | Behavior |
//! |-------|----------|
//! | validate `DE811907980` | valid, with name/address and extra fields |
//! | validate `FAIL` | 500 with a plain-text body |
//! | validate anything else | `valid: false` |
//! | rates `DE` | wrapped table `{"rates": {...}}` |
//! | rates `AT` | unwrapped table, numeric `standard_rate` |
//! | rates `IT` | bare legacy list |
//! | rates `XX` | table missing fields |
//! | rates `SL` | sleeps 2 s |
//! | rates `ZZ` | 404 |
//!
//! Any request without `Authorization: Bearer test-key` gets a 401.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, HeaderName, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

pub const API_KEY: &str = "test-key";
pub const NOT_FOUND_BODY: &str = r#"{"detail":"Unknown country"}"#;

#[derive(Default)]
pub struct MockState {
    hits: AtomicUsize,
    last_user_agent: Mutex<Option<String>>,
    last_body: Mutex<Option<Value>>,
}

impl MockState {
    fn record(&self, headers: &HeaderMap) -> Result<(), Response> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        *self.last_user_agent.lock().unwrap() = header(USER_AGENT);
        let expected = format!("Bearer {API_KEY}");
        if header(AUTHORIZATION).as_deref() != Some(expected.as_str()) {
            return Err((StatusCode::UNAUTHORIZED, r#"{"detail":"invalid api key"}"#).into_response());
        }
        Ok(())
    }
}

pub struct MockVatify {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockVatify {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_user_agent(&self) -> Option<String> {
        self.state.last_user_agent.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/v1/validate-vat", post(validate))
        .route("/v1/rates/{country}", get(rates))
        .route("/v1/calculate", post(calculate))
        .with_state(state)
}

/// Start the mock on the current tokio runtime.
pub async fn start() -> MockVatify {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(MockState::default());
    let app = router(state.clone());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    MockVatify {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Start the mock on its own thread and runtime, for blocking clients.
pub fn start_in_thread() -> MockVatify {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let state = Arc::new(MockState::default());
    let app = router(state.clone());

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app).await
        })
        .unwrap();
    });

    MockVatify {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// A local address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn validate(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejected) = state.record(&headers) {
        return rejected;
    }
    let vat = body["vat_number"].as_str().unwrap_or_default().to_string();
    *state.last_body.lock().unwrap() = Some(body);

    match vat.as_str() {
        "DE811907980" => Json(json!({
            "vat_number": vat,
            "valid": true,
            "country_code": "DE",
            "name": "ACME GMBH",
            "address": "MUSTERSTR 1, 10115 BERLIN",
            "consultation_number": "WAPIAAAAYxyz",
            "meta": {"source": "vies"}
        }))
        .into_response(),
        "FAIL" => (StatusCode::INTERNAL_SERVER_ERROR, "VIES unavailable").into_response(),
        _ => Json(json!({"vat_number": vat, "valid": false})).into_response(),
    }
}

async fn rates(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(country): Path<String>,
) -> Response {
    if let Err(rejected) = state.record(&headers) {
        return rejected;
    }
    match country.as_str() {
        "DE" => Json(json!({
            "rates": {
                "country": "DE",
                "standard_rate": "19",
                "reduced_rates": [{"rate": 7, "label": "reduced"}]
            }
        }))
        .into_response(),
        "AT" => Json(json!({
            "country": "AT",
            "standard_rate": 20,
            "reduced_rates": [
                {"rate": 10, "label": "reduced"},
                {"rate": 13, "label": "reduced_2"}
            ],
            "currency": "EUR"
        }))
        .into_response(),
        "IT" => Json(json!([
            {"rate": 22, "label": "standard"},
            {"rate": 10, "label": "reduced"},
            {"rate": 4, "label": "super_reduced"}
        ]))
        .into_response(),
        "XX" => Json(json!({"rates": {"country": "XX"}})).into_response(),
        "SL" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([])).into_response()
        }
        _ => (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response(),
    }
}

async fn calculate(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejected) = state.record(&headers) {
        return rejected;
    }
    *state.last_body.lock().unwrap() = Some(body.clone());

    let amount = body["amount"].as_f64().unwrap_or_default();
    let rate = match body["rate_type"].as_str() {
        Some("reduced") => 10.0,
        Some("zero") => 0.0,
        _ => 20.0,
    };
    let (net, gross) = if body["basis"] == "gross" {
        (amount * 100.0 / (100.0 + rate), amount)
    } else {
        (amount, amount * (100.0 + rate) / 100.0)
    };
    let b2b = body["b2x"] == "B2B";
    let mechanism = if b2b { Some("reverse_charge") } else { None };
    let vat_check_status = if b2b { "valid" } else { "not_checked" };
    let messages = if b2b {
        vec!["Reverse charge applies"]
    } else {
        Vec::new()
    };

    Json(json!({
        "country_code": body["customer"]["country_code"],
        "applied_rate": rate,
        "net": net,
        "vat": gross - net,
        "gross": gross,
        "mechanism": mechanism,
        "messages": messages,
        "vat_check_status": vat_check_status,
        "rate_type": body["rate_type"],
        "supply_date": body["supply_date"]
    }))
    .into_response()
}
