use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vatify::{
    B2x, Basis, BlockingVatifyClient, CalculationRequestBuilder, ClientConfig, DEFAULT_BASE_URL,
    Party, RateType, SupplyType, VatifyError,
};

#[derive(Parser)]
#[command(name = "vatify")]
#[command(author, version, about = "Vatify CLI", long_about = None)]
struct Cli {
    /// Vatify API key
    #[arg(long, global = true, env = "VATIFY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "VATIFY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "VATIFY_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a VAT number
    Validate { vat_number: String },

    /// Get VAT rates for a country
    Rates { country_code: String },

    /// Calculate VAT for a transaction
    Calculate {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,

        #[arg(long)]
        supplier_country: String,

        #[arg(long)]
        supplier_vat: Option<String>,

        #[arg(long)]
        customer_country: String,

        #[arg(long)]
        customer_vat: Option<String>,

        #[arg(long, default_value_t)]
        basis: Basis,

        #[arg(long, default_value_t)]
        rate_type: RateType,

        /// Date of supply, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        supply_date: Option<NaiveDate>,

        #[arg(long, default_value_t)]
        supply_type: SupplyType,

        #[arg(long, default_value_t)]
        b2x: B2x,

        #[arg(long)]
        category_hint: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vatify={level}")));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install logger: {e}");
    }

    let Some(api_key) = cli.api_key.filter(|key| !key.trim().is_empty()) else {
        eprintln!("Missing API key. Use --api-key or set VATIFY_API_KEY.");
        return ExitCode::from(2);
    };

    let config = ClientConfig::new(api_key)
        .with_base_url(&cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout));
    let client = BlockingVatifyClient::with_config(config);

    let outcome = run(&client, cli.command);
    client.close();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(client: &BlockingVatifyClient, command: Commands) -> Result<()> {
    match command {
        Commands::Validate { vat_number } => print_json(&client.validate_vat(&vat_number)?),
        Commands::Rates { country_code } => print_json(&client.rates(&country_code)?),
        Commands::Calculate {
            amount,
            supplier_country,
            supplier_vat,
            customer_country,
            customer_vat,
            basis,
            rate_type,
            supply_date,
            supply_type,
            b2x,
            category_hint,
        } => {
            let supplier = party(&supplier_country, supplier_vat)?;
            let customer = party(&customer_country, customer_vat)?;
            let supply_date = supply_date.unwrap_or_else(|| Local::now().date_naive());

            let mut builder = CalculationRequestBuilder::new(amount, supply_date, supplier, customer)
                .basis(basis)
                .rate_type(rate_type)
                .supply_type(supply_type)
                .b2x(b2x);
            if let Some(hint) = category_hint {
                builder = builder.category_hint(hint);
            }
            let request = builder.build()?;
            print_json(&client.calculate(&request)?)
        }
    }
}

fn party(country_code: &str, vat_number: Option<String>) -> Result<Party, VatifyError> {
    let party = Party::new(country_code)?;
    Ok(match vat_number {
        Some(vat) => party.with_vat_number(vat),
        None => party,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(err: &anyhow::Error) {
    let Some(err) = err.downcast_ref::<VatifyError>() else {
        eprintln!("Error: {err:#}");
        return;
    };
    let status = err
        .status_code()
        .map_or_else(|| "none".to_string(), |s| s.to_string());
    eprintln!("Error: {err} (status={status})");
    if let Some(details) = err.details() {
        debug!(details, "error details");
    }
}
