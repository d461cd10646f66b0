//! Wire model and error type.
//!
//! Request and response shapes of the Vatify API, their local constraint
//! checks, and the single error type every operation returns.

mod builder;
pub mod countries;
mod error;
mod types;
mod validation;

pub use builder::*;
pub use countries::is_known_country_code;
pub use error::*;
pub use types::*;
pub use validation::validate_calculation_request;
