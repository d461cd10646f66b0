use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::VatifyError;
use super::types::*;
use super::validation::validate_calculation_request;

/// Builder for calculation requests.
///
/// Defaults: `net` basis, `standard` rate, `goods`, `B2C`, no category hint.
///
/// ```
/// use vatify::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let request = CalculationRequestBuilder::new(
///     dec!(100),
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     Party::new("DE").unwrap().with_vat_number("DE811907980"),
///     Party::new("FR").unwrap().with_vat_number("FR40303265045"),
/// )
/// .rate_type(RateType::Reduced)
/// .supply_type(SupplyType::Services)
/// .b2x(B2x::B2b)
/// .category_hint("ACCOMMODATION")
/// .build()
/// .unwrap();
///
/// assert_eq!(request.basis, Basis::Net);
/// ```
pub struct CalculationRequestBuilder {
    amount: Decimal,
    basis: Basis,
    rate_type: RateType,
    supply_date: NaiveDate,
    supplier: Supplier,
    customer: Customer,
    supply_type: SupplyType,
    b2x: B2x,
    category_hint: Option<String>,
}

impl CalculationRequestBuilder {
    pub fn new(
        amount: Decimal,
        supply_date: NaiveDate,
        supplier: Supplier,
        customer: Customer,
    ) -> Self {
        Self {
            amount,
            basis: Basis::default(),
            rate_type: RateType::default(),
            supply_date,
            supplier,
            customer,
            supply_type: SupplyType::default(),
            b2x: B2x::default(),
            category_hint: None,
        }
    }

    pub fn basis(mut self, basis: Basis) -> Self {
        self.basis = basis;
        self
    }

    pub fn rate_type(mut self, rate_type: RateType) -> Self {
        self.rate_type = rate_type;
        self
    }

    pub fn supply_type(mut self, supply_type: SupplyType) -> Self {
        self.supply_type = supply_type;
        self
    }

    pub fn b2x(mut self, b2x: B2x) -> Self {
        self.b2x = b2x;
        self
    }

    pub fn category_hint(mut self, hint: impl Into<String>) -> Self {
        self.category_hint = Some(hint.into());
        self
    }

    /// Build the request, returning a Schema error listing every violated field.
    pub fn build(self) -> Result<CalculationRequest, VatifyError> {
        let request = CalculationRequest {
            amount: self.amount,
            basis: self.basis,
            rate_type: self.rate_type,
            supply_date: self.supply_date,
            supplier: self.supplier,
            customer: self.customer,
            supply_type: self.supply_type,
            b2x: self.b2x,
            category_hint: self.category_hint,
        };

        let errors = validate_calculation_request(&request);
        if !errors.is_empty() {
            return Err(VatifyError::Schema {
                errors,
                details: None,
            });
        }
        Ok(request)
    }
}
