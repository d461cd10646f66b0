use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use vatify::*;

#[tokio::main]
async fn main() -> Result<(), VatifyError> {
    // Local checks need no network
    println!("=== Request Validation ===\n");

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let de = Party::new("DE")?.with_vat_number("DE811907980");
    let fr = Party::new("FR")?.with_vat_number("FR40303265045");

    match CalculationRequestBuilder::new(dec!(0), date, de.clone(), fr.clone()).build() {
        Ok(_) => println!("  amount 0 => accepted?"),
        Err(e) => println!("  amount 0 => rejected: {e}"),
    }
    match Party::new("FRA") {
        Ok(_) => println!("  FRA => accepted?"),
        Err(e) => println!("  FRA => rejected: {e}"),
    }

    let Ok(api_key) = std::env::var("VATIFY_API_KEY") else {
        eprintln!("\nSet VATIFY_API_KEY to run the calculations.");
        return Ok(());
    };

    println!("\n=== Calculations ===\n");

    let client = Arc::new(VatifyClient::new(api_key));
    let requests = [
        CalculationRequestBuilder::new(dec!(100), date, de.clone(), fr.clone())
            .rate_type(RateType::Reduced)
            .supply_type(SupplyType::Services)
            .b2x(B2x::B2b)
            .category_hint("ACCOMMODATION")
            .build()?,
        CalculationRequestBuilder::new(dec!(119), date, de.clone(), Party::new("DE")?)
            .basis(Basis::Gross)
            .build()?,
    ];

    // One handle, shared across tasks
    let mut tasks = Vec::new();
    for request in requests {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move { client.calculate(&request).await }));
    }

    for task in tasks {
        match task.await {
            Ok(Ok(result)) => {
                println!(
                    "  {}: net={} vat={} gross={} rate={}%",
                    result.country_code, result.net, result.vat, result.gross, result.applied_rate
                );
                if let Some(mechanism) = &result.mechanism {
                    println!("    mechanism: {mechanism}");
                }
                for message in &result.messages {
                    println!("    {message}");
                }
            }
            Ok(Err(e)) => println!("  ERROR (retryable={}): {e}", e.is_retryable()),
            Err(e) => println!("  task failed: {e}"),
        }
    }

    client.close();
    Ok(())
}
