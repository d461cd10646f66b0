//! # vatify
//!
//! Typed client for the Vatify VAT API: validate VAT numbers, look up
//! country rate tables, and calculate the VAT of a transaction.
//!
//! All amounts and rates use [`rust_decimal::Decimal`], never floating point.
//! Every operation returns [`VatifyError`] on failure; a VAT number the
//! service reports as invalid is a normal [`ValidationResult`] with
//! `valid == false`.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use vatify::*;
//! use rust_decimal_macros::dec;
//!
//! let request = CalculationRequestBuilder::new(
//!     dec!(100),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     Party::new("DE").unwrap().with_vat_number("DE811907980"),
//!     Party::new("FR").unwrap().with_vat_number("FR40303265045"),
//! )
//! .rate_type(RateType::Reduced)
//! .supply_type(SupplyType::Services)
//! .b2x(B2x::B2b)
//! .build()
//! .unwrap();
//!
//! // Amounts must be positive; this never reaches the network.
//! let err = CalculationRequestBuilder::new(
//!     dec!(0),
//!     request.supply_date,
//!     request.supplier.clone(),
//!     request.customer.clone(),
//! )
//! .build()
//! .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Schema);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `blocking` (default) | [`BlockingVatifyClient`] on top of `reqwest::blocking` |
//! | `cli` | The `vatify` command-line tool |

pub mod api;
pub mod core;

pub use crate::api::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, USER_AGENT, VatifyClient};
#[cfg(feature = "blocking")]
pub use crate::api::BlockingVatifyClient;

// Re-export core types at crate root for convenience
pub use crate::core::*;
