#![no_main]

use libfuzzer_sys::fuzz_target;
use vatify::api::endpoint::{ApiResponse, parse_calculate, parse_validate};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_validate(ApiResponse {
            status: 200,
            body: s.to_string(),
        });
        let _ = parse_calculate(ApiResponse {
            status: 200,
            body: s.to_string(),
        });
    }
});
