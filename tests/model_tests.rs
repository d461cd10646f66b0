//! Property-based and wire-format tests for the request/response model.
//!
//! Run with: `cargo test --test model_tests`

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use vatify::api::endpoint;
use vatify::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(amount: Decimal) -> Result<CalculationRequest, VatifyError> {
    CalculationRequestBuilder::new(
        amount,
        date(2024, 1, 1),
        Party::new("DE").unwrap(),
        Party::new("FR").unwrap(),
    )
    .build()
}

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// Amount with two decimal places, strictly positive.
fn arb_positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_non_positive_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_rate_type() -> impl Strategy<Value = RateType> {
    prop::sample::select(RateType::ALL.to_vec())
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d))
}

proptest! {
    #[test]
    fn two_letter_codes_accepted(code in "[A-Z]{2}") {
        let party = Party::new(&code).unwrap();
        prop_assert_eq!(party.country_code, code);
    }

    #[test]
    fn other_lengths_rejected(code in "[A-Z]{0,1}|[A-Z]{3,6}") {
        let err = Party::new(&code).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn positive_amounts_accepted(amount in arb_positive_amount()) {
        prop_assert!(request(amount).is_ok());
    }

    #[test]
    fn non_positive_amounts_rejected(amount in arb_non_positive_amount()) {
        let err = request(amount).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn echo_preserves_request(
        amount in arb_positive_amount(),
        rate_type in arb_rate_type(),
        supply_date in arb_date(),
    ) {
        let original = CalculationRequestBuilder::new(
            amount,
            supply_date,
            Party::new("DE").unwrap(),
            Party::new("FR").unwrap().with_vat_number("FR40303265045"),
        )
        .rate_type(rate_type)
        .build()
        .unwrap();

        let wire = serde_json::to_value(&original).unwrap();
        let echoed = CalculationRequest::from_value(wire).unwrap();
        prop_assert_eq!(&echoed.customer.country_code, "FR");
        prop_assert_eq!(echoed.rate_type, original.rate_type);
        prop_assert_eq!(echoed.supply_date, original.supply_date);
        prop_assert_eq!(echoed.amount, original.amount);
    }

    #[test]
    fn rates_parser_never_panics(body in ".{0,200}") {
        let _ = endpoint::parse_rates(endpoint::ApiResponse { status: 200, body });
    }
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[test]
fn calculation_request_wire_format() {
    let request = CalculationRequestBuilder::new(
        dec!(100),
        date(2024, 1, 1),
        Party::new("DE").unwrap().with_vat_number("DE811907980"),
        Party::new("FR").unwrap().with_vat_number("FR40303265045"),
    )
    .rate_type(RateType::Reduced)
    .supply_type(SupplyType::Services)
    .b2x(B2x::B2b)
    .category_hint("ACCOMMODATION")
    .build()
    .unwrap();

    let wire = serde_json::to_string(&request).unwrap();
    insta::assert_snapshot!(wire, @r#"{"amount":100.0,"basis":"net","rate_type":"reduced","supply_date":"2024-01-01","supplier":{"country_code":"DE","vat_number":"DE811907980"},"customer":{"country_code":"FR","vat_number":"FR40303265045"},"supply_type":"services","b2x":"B2B","category_hint":"ACCOMMODATION"}"#);
}

#[test]
fn decoding_applies_defaults() {
    let request = CalculationRequest::from_value(json!({
        "amount": 49.99,
        "supply_date": "2024-06-15",
        "supplier": {"country_code": "de"},
        "customer": {"country_code": "AT", "vat_number": "ATU12345678"}
    }))
    .unwrap();
    assert_eq!(request.amount, dec!(49.99));
    assert_eq!(request.basis, Basis::Net);
    assert_eq!(request.rate_type, RateType::Standard);
    assert_eq!(request.supply_type, SupplyType::Goods);
    assert_eq!(request.b2x, B2x::B2c);
    assert_eq!(request.supplier.country_code, "DE");
}

#[test]
fn decoding_rejects_constraint_violations() {
    let base = json!({
        "amount": 10,
        "supply_date": "2024-06-15",
        "supplier": {"country_code": "DE"},
        "customer": {"country_code": "AT"}
    });

    let mut negative = base.clone();
    negative["amount"] = json!(-1);
    assert!(CalculationRequest::from_value(negative).is_err());

    let mut bad_enum = base.clone();
    bad_enum["rate_type"] = json!("luxury");
    assert!(CalculationRequest::from_value(bad_enum).is_err());

    let mut bad_date = base.clone();
    bad_date["supply_date"] = json!("01.01.2024");
    assert!(CalculationRequest::from_value(bad_date).is_err());

    let mut bad_country = base.clone();
    bad_country["customer"] = json!({"country_code": "AUT"});
    assert!(CalculationRequest::from_value(bad_country).is_err());

    let mut missing = base;
    missing.as_object_mut().unwrap().remove("supplier");
    let err = CalculationRequest::from_value(missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.to_string().contains("supplier"));
}

#[test]
fn decoding_names_the_failing_party() {
    let err = CalculationRequest::from_value(json!({
        "amount": 0,
        "supply_date": "2024-06-15",
        "supplier": {"country_code": "DEU"},
        "customer": {"country_code": "A1", "vat_number": " "}
    }))
    .unwrap_err();

    let VatifyError::Schema { errors, .. } = err else {
        panic!("expected a schema error, got {err:?}");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        [
            "amount",
            "supplier.country_code",
            "customer.country_code",
            "customer.vat_number"
        ]
    );
}

#[test]
fn decoding_uppercases_only_well_formed_codes() {
    let err = CalculationRequest::from_value(json!({
        "amount": 10,
        "supply_date": "2024-06-15",
        "supplier": {"country_code": "de"},
        "customer": {"country_code": "aut"}
    }))
    .unwrap_err();
    let VatifyError::Schema { errors, .. } = err else {
        panic!("expected a schema error, got {err:?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "customer.country_code");
}

#[test]
fn validation_result_round_trips_extra_fields() {
    let result: ValidationResult = serde_json::from_value(json!({
        "vat_number": "FR40303265045",
        "valid": true,
        "request_date": "2024-01-15"
    }))
    .unwrap();
    let back = serde_json::to_value(&result).unwrap();
    assert_eq!(back["request_date"], "2024-01-15");
    assert!(back.get("meta").is_none());
    assert!(back.get("name").is_none());
}
