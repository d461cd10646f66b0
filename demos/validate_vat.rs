use vatify::*;

fn main() {
    let Ok(api_key) = std::env::var("VATIFY_API_KEY") else {
        eprintln!("Set VATIFY_API_KEY to run this example.");
        return;
    };
    let client = BlockingVatifyClient::new(api_key);

    println!("=== VAT Number Validation ===\n");

    for vat in ["DE811907980", "FR40303265045", "DE000000000"] {
        match client.validate_vat(vat) {
            Ok(result) if result.valid => println!(
                "  {vat} => valid ({})",
                result.name.as_deref().unwrap_or("no name on record")
            ),
            Ok(_) => println!("  {vat} => not valid"),
            Err(e) => println!("  {vat} => ERROR [{:?}]: {e}", e.kind()),
        }
    }

    println!("\n=== Rates ===\n");

    for country in ["DE", "at", "DEU"] {
        match client.rates(country) {
            Ok(RatesResponse::Table(table)) => {
                println!("  {}: standard {}%", table.country, table.standard_rate);
                for rate in &table.reduced_rates {
                    println!("    {}: {}%", rate.label, rate.rate);
                }
            }
            Ok(RatesResponse::Legacy(rates)) => {
                for rate in &rates {
                    println!("  {country} {}: {}%", rate.label, rate.rate);
                }
            }
            // "DEU" fails here without a request
            Err(e) => println!("  {country} => ERROR: {e}"),
        }
    }

    client.close();
}
