#![no_main]

use libfuzzer_sys::fuzz_target;
use vatify::api::endpoint::{ApiResponse, parse_rates};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are fine, panics are bugs.
        let _ = parse_rates(ApiResponse {
            status: 200,
            body: s.to_string(),
        });
    }
});
