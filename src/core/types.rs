use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::VatifyError;
use super::validation::{check_country_code, validate_calculation_request};

/// Result of a VAT number validation.
///
/// `valid == false` is a normal answer from the service, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The VAT number as echoed by the service.
    pub vat_number: String,
    /// Whether the service considers the number valid.
    pub valid: bool,
    /// Country prefix of the VAT number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Registered company name (if available).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Registered address (if available).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Service metadata object, if sent. `null` decodes as empty.
    #[serde(
        default,
        deserialize_with = "null_as_empty_map",
        skip_serializing_if = "Map::is_empty"
    )]
    pub meta: Map<String, Value>,
    /// Fields this crate does not know about yet.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Supplier or customer of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PartyRepr")]
pub struct Party {
    /// ISO 3166-1 alpha-2 country code, uppercase.
    pub country_code: String,
    /// VAT identifier, used by the service for B2B / VIES checks.
    pub vat_number: Option<String>,
}

/// Supplier descriptor.
pub type Supplier = Party;
/// Customer descriptor.
pub type Customer = Party;

impl Party {
    /// Create a party in `country_code` (exactly two ASCII letters).
    ///
    /// Lowercase input is normalized to uppercase.
    pub fn new(country_code: impl AsRef<str>) -> Result<Self, VatifyError> {
        let country_code = check_country_code("country_code", country_code.as_ref())?;
        Ok(Self {
            country_code,
            vat_number: None,
        })
    }

    pub fn with_vat_number(mut self, vat_number: impl Into<String>) -> Self {
        self.vat_number = Some(vat_number.into());
        self
    }
}

#[derive(Deserialize)]
struct PartyRepr {
    country_code: String,
    #[serde(default)]
    vat_number: Option<String>,
}

impl TryFrom<PartyRepr> for Party {
    type Error = VatifyError;

    fn try_from(repr: PartyRepr) -> Result<Self, Self::Error> {
        let party = Party::new(&repr.country_code)?;
        Ok(match repr.vat_number {
            Some(vat) => party.with_vat_number(vat),
            None => party,
        })
    }
}

impl PartyRepr {
    /// Uppercase a well-formed code, keep a malformed one as sent so that
    /// request validation reports it under `supplier.` / `customer.`.
    fn into_unchecked(self) -> Party {
        let country_code = match check_country_code("country_code", &self.country_code) {
            Ok(code) => code,
            Err(_) => self.country_code,
        };
        Party {
            country_code,
            vat_number: self.vat_number,
        }
    }
}

/// Implements `as_str`, `Display` and `FromStr` over the wire spelling of a
/// fieldless enum.
macro_rules! wire_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = VatifyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(VatifyError::schema(
                        $field,
                        format!(
                            "unknown value '{other}', expected one of: {}",
                            [$($text),+].join(", ")
                        ),
                    )),
                }
            }
        }
    };
}

/// Whether the amount excludes (`net`) or includes (`gross`) VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    #[default]
    Net,
    Gross,
}

wire_enum!(Basis, "basis", { Net => "net", Gross => "gross" });

/// Category of VAT rate applied to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    #[default]
    Standard,
    Reduced,
    SuperReduced,
    Parking,
    Zero,
}

wire_enum!(RateType, "rate_type", {
    Standard => "standard",
    Reduced => "reduced",
    SuperReduced => "super_reduced",
    Parking => "parking",
    Zero => "zero",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyType {
    #[default]
    Goods,
    Services,
}

wire_enum!(SupplyType, "supply_type", { Goods => "goods", Services => "services" });

/// Business-to-consumer or business-to-business transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum B2x {
    #[default]
    #[serde(rename = "B2C")]
    B2c,
    #[serde(rename = "B2B")]
    B2b,
}

wire_enum!(B2x, "b2x", { B2c => "B2C", B2b => "B2B" });

/// Body of `POST /v1/calculate`.
///
/// Build with [`CalculationRequestBuilder`](super::CalculationRequestBuilder);
/// deserializing runs the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCalculationRequest")]
pub struct CalculationRequest {
    /// Input amount, net or gross depending on `basis`. Must be > 0.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub basis: Basis,
    pub rate_type: RateType,
    /// Date of supply (tax point), sent as `YYYY-MM-DD`.
    pub supply_date: NaiveDate,
    pub supplier: Supplier,
    pub customer: Customer,
    pub supply_type: SupplyType,
    pub b2x: B2x,
    /// Free-text classification signal (e.g. "ebooks", "ACCOMMODATION").
    pub category_hint: Option<String>,
}

impl CalculationRequest {
    /// Decode a request from JSON, enforcing every model constraint.
    ///
    /// Constraint violations keep their field paths (`amount`,
    /// `supplier.country_code`, ...); structural problems are reported on `$`.
    pub fn from_value(value: Value) -> Result<Self, VatifyError> {
        let raw: UncheckedCalculationRequest =
            serde_json::from_value(value).map_err(|e| VatifyError::schema("$", e.to_string()))?;
        Self::try_from(raw)
    }
}

#[derive(Deserialize)]
struct UncheckedCalculationRequest {
    amount: Decimal,
    #[serde(default)]
    basis: Basis,
    #[serde(default)]
    rate_type: RateType,
    supply_date: NaiveDate,
    supplier: PartyRepr,
    customer: PartyRepr,
    #[serde(default)]
    supply_type: SupplyType,
    #[serde(default)]
    b2x: B2x,
    #[serde(default)]
    category_hint: Option<String>,
}

impl TryFrom<UncheckedCalculationRequest> for CalculationRequest {
    type Error = VatifyError;

    fn try_from(raw: UncheckedCalculationRequest) -> Result<Self, Self::Error> {
        let request = CalculationRequest {
            amount: raw.amount,
            basis: raw.basis,
            rate_type: raw.rate_type,
            supply_date: raw.supply_date,
            supplier: raw.supplier.into_unchecked(),
            customer: raw.customer.into_unchecked(),
            supply_type: raw.supply_type,
            b2x: raw.b2x,
            category_hint: raw.category_hint,
        };
        let errors = validate_calculation_request(&request);
        if errors.is_empty() {
            Ok(request)
        } else {
            Err(VatifyError::Schema {
                errors,
                details: None,
            })
        }
    }
}

/// Result of a VAT calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Country whose VAT rules were applied.
    pub country_code: String,
    /// Applied rate in percent.
    pub applied_rate: Decimal,
    pub net: Decimal,
    pub vat: Decimal,
    pub gross: Decimal,
    /// Special mechanism label (e.g. reverse charge, OSS).
    #[serde(default)]
    pub mechanism: Option<String>,
    /// Informational messages, in service order.
    #[serde(default)]
    pub messages: Vec<String>,
    /// Outcome of the VIES check the service ran for the parties.
    pub vat_check_status: String,
}

/// A single VAT rate entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// Rate in percent.
    pub rate: Decimal,
    pub label: String,
}

/// VAT rate table of one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesTable {
    pub country: String,
    /// Standard rate as sent by the service (may be unparsed text such as "19").
    #[serde(deserialize_with = "string_or_number")]
    pub standard_rate: String,
    pub reduced_rates: Vec<Rate>,
}

impl RatesTable {
    /// Standard rate as a number, if the service sent something numeric.
    pub fn standard_rate_decimal(&self) -> Option<Decimal> {
        self.standard_rate.trim().trim_end_matches('%').trim().parse().ok()
    }
}

/// Result of `GET /v1/rates/{country_code}`.
///
/// The endpoint has answered with two shapes over time: a rate table, and a
/// bare list of rates. Both are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RatesResponse {
    Table(RatesTable),
    Legacy(Vec<Rate>),
}

impl RatesResponse {
    pub fn as_table(&self) -> Option<&RatesTable> {
        match self {
            Self::Table(table) => Some(table),
            Self::Legacy(_) => None,
        }
    }

    pub fn into_table(self) -> Option<RatesTable> {
        match self {
            Self::Table(table) => Some(table),
            Self::Legacy(_) => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Reduced rates of a table, or every entry of a legacy list.
    pub fn rates(&self) -> &[Rate] {
        match self {
            Self::Table(table) => &table.reduced_rates,
            Self::Legacy(rates) => rates,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
