#![no_main]

use libfuzzer_sys::fuzz_target;
use vatify::CalculationRequest;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        // Anything that decodes must satisfy the model constraints.
        if let Ok(request) = CalculationRequest::from_value(value) {
            assert!(vatify::validate_calculation_request(&request).is_empty());
        }
    }
});
