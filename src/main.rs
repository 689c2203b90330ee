use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::env;
use std::sync::Arc;

use tiv_advisor::AdvisorClient;
use tiv_cli::{display_banner, print_report, render_progress, VehicleArgs};
use tiv_core::{progress_channel, RegistrationLookup, VehicleDescriptor};
use tiv_history::{HistoryClient, HistoryConfig};
use tiv_jpcars::JpCarsClient;
use tiv_marketscan::{AggregatorScanner, ScannerConfig};
use tiv_rdw::{RdwClient, RdwConfig};
use tiv_store::{RestStore, StoreConfig};
use tiv_valuation::ValuationOrchestrator;

#[derive(Parser)]
#[command(name = "tiv")]
#[command(about = "Trade-in vehicle valuation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a trade-in valuation
    Value {
        /// License plate; resolves the vehicle through the registry
        #[arg(long)]
        plate: Option<String>,

        #[command(flatten)]
        vehicle: VehicleArgs,
    },
    /// Registration lookup only, for front-desk use
    Lookup {
        /// License plate to resolve
        plate: String,

        /// Print the raw descriptor as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Value { plate, vehicle } => run_valuation(plate, vehicle).await,
        Commands::Lookup { plate, json } => run_lookup(&plate, json).await,
    }
}

async fn run_valuation(plate: Option<String>, vehicle: VehicleArgs) -> Result<()> {
    display_banner();

    let base = match plate {
        Some(plate) => {
            let rdw = RdwClient::new(RdwConfig::default())?;
            match rdw.lookup(&plate).await? {
                Some(descriptor) => {
                    println!("{} plate resolved: {}", "✓".green(), descriptor.summary());
                    Some(descriptor)
                }
                None => {
                    println!(
                        "{} plate {} unknown to the registry, using manual entry",
                        "⚠".yellow(),
                        plate
                    );
                    None
                }
            }
        }
        None => None,
    };

    let descriptor = vehicle.into_descriptor(base)?;

    let backend_url = env::var("TIV_BACKEND_URL").context("TIV_BACKEND_URL not set")?;
    let service_key = env::var("TIV_SERVICE_KEY").context("TIV_SERVICE_KEY not set")?;

    let catalog = Arc::new(JpCarsClient::from_env()?);
    let history = Arc::new(HistoryClient::new(HistoryConfig::new(
        backend_url.clone(),
        service_key.clone(),
    ))?);
    let market = Arc::new(AggregatorScanner::new(ScannerConfig::default())?);
    let advisor = Arc::new(AdvisorClient::from_env()?);
    let store = Arc::new(RestStore::new(StoreConfig::new(backend_url, service_key))?);

    let (tx, rx) = progress_channel();
    let orchestrator =
        ValuationOrchestrator::new(catalog, history, market, advisor, store).with_progress(tx);

    let renderer = tokio::spawn(render_progress(rx));
    let result = orchestrator.run(descriptor).await;
    let _ = renderer.await;

    let record = result?;
    print_report(&record);
    Ok(())
}

async fn run_lookup(plate: &str, json: bool) -> Result<()> {
    let rdw = RdwClient::new(RdwConfig::default())?;

    match rdw.lookup(plate).await? {
        Some(descriptor) => print_descriptor(&descriptor, json)?,
        None => println!("{} plate {} unknown to the registry", "✗".red(), plate),
    }
    Ok(())
}

fn print_descriptor(descriptor: &VehicleDescriptor, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    println!("{}", descriptor.summary().bold());
    if let Some(body) = &descriptor.body_type {
        println!("  body:  {}", body);
    }
    if let Some(color) = &descriptor.color {
        println!("  color: {}", color);
    }
    if let Some(hp) = descriptor.power_hp {
        println!("  power: {} hp", hp);
    }
    println!(
        "{}",
        "mileage and transmission must be supplied by hand for a valuation".dimmed()
    );
    Ok(())
}
