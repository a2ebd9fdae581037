//! Zippin command-line front end.
//!
//! Wallet view, top-ups and transaction history over a locally persisted
//! ledger, plus simulated scooter rides: pick a scooter, ride while the timer
//! ticks, and pay when the ride ends.

mod config;
mod render;
mod ride_loop;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use zippin_common::currency::{format_quantity, format_usd};
use zippin_common::location::{GeoLocation, MapRegion};
use zippin_common::scooter::{spawn_fleet, DEFAULT_FLEET_SIZE};
use zippin_common::wallet::TransactionId;
use zippin_common::{RideError, RideSession, WalletLedger};

use crate::config::{AppConfig, ConfigArgs, WalletStore};

/// Amount added by a plain `top-up`, matching the wallet screen's "Add $5" button.
const DEFAULT_TOP_UP: &str = "5";

#[derive(Parser)]
#[command(name = "zippin", about = "Zippin scooter rental: wallet and simulated rides")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the balance and recent transactions.
    Wallet {
        /// Number of transactions to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Add funds to the wallet.
    TopUp {
        #[arg(long, default_value = DEFAULT_TOP_UP)]
        amount: Decimal,
    },
    /// List every transaction, newest first.
    History,
    /// Show one transaction in detail.
    Show { id: String },
    /// Unlock a scooter and ride until the time is up or Ctrl-C is pressed.
    Ride {
        /// Stop automatically after this many ridden seconds.
        #[arg(long)]
        seconds: Option<u64>,
        /// Scooter being ridden, as listed by `scooters`.
        #[arg(long)]
        scooter: Option<u32>,
    },
    /// List simulated scooters around a location, nearest first.
    Scooters {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long, default_value_t = DEFAULT_FLEET_SIZE)]
        count: u32,
        /// Seed for a reproducible fleet.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Ride together with friends.
    GroupRide,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_args(&cli.config)?;

    match cli.command {
        Command::Wallet { limit } => {
            let ledger = open_ledger(&config)?;
            print!("{}", render::wallet(ledger.state(), limit));
        }
        Command::TopUp { amount } => {
            let mut ledger = open_ledger(&config)?;
            let receipt = ledger.credit(amount)?;
            if let Some(err) = &receipt.persist_warning {
                tracing::warn!(error = %err, "top-up not saved yet; it will be written with the next change");
            }
            println!(
                "Added {}. Balance: {}",
                format_usd(amount),
                format_usd(receipt.balance)
            );
            save(&mut ledger)?;
        }
        Command::History => {
            let ledger = open_ledger(&config)?;
            if ledger.history().is_empty() {
                println!("No transactions yet");
            }
            for tx in ledger.history() {
                println!("{}", render::transaction_row(tx));
            }
        }
        Command::Show { id } => {
            let ledger = open_ledger(&config)?;
            let tx = ledger
                .get(&TransactionId(id.clone()))
                .with_context(|| format!("no transaction with id {id}"))?;
            print!("{}", render::transaction_details(tx));
        }
        Command::Ride { seconds, scooter } => {
            let mut ledger = open_ledger(&config)?;
            ride(&config, &mut ledger, seconds, scooter).await?;
            save(&mut ledger)?;
        }
        Command::Scooters {
            lat,
            lon,
            count,
            seed,
        } => show_scooters(lat, lon, count, seed),
        Command::GroupRide => println!("Group Ride feature coming soon!"),
    }
    Ok(())
}

fn open_ledger(config: &AppConfig) -> anyhow::Result<WalletLedger<WalletStore>> {
    let store = config.open_store()?;
    WalletLedger::open(store, config.seed_balance).context("loading wallet")
}

/// Last chance to write anything a failed save left behind.
fn save(ledger: &mut WalletLedger<WalletStore>) -> anyhow::Result<()> {
    if ledger.needs_flush() {
        ledger.flush().context("saving wallet")?;
    }
    Ok(())
}

async fn ride(
    config: &AppConfig,
    ledger: &mut WalletLedger<WalletStore>,
    seconds: Option<u64>,
    scooter: Option<u32>,
) -> anyhow::Result<()> {
    let mut session = RideSession::new(config.fare.clone());
    if let Some(id) = scooter {
        session = session.for_scooter(id);
    }

    match ledger.start_ride(&mut session) {
        Ok(()) => {}
        Err(RideError::InsufficientFunds { available, .. }) => bail!(
            "Not enough funds ({}). Please top up your wallet.",
            format_usd(available)
        ),
        Err(e) => return Err(e.into()),
    }
    println!(
        "Ride started: {} to unlock, then {} per minute. Press Ctrl-C to end the ride.",
        format_usd(config.fare.unlock_fee),
        format_usd(config.fare.per_minute_rate)
    );

    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    ride_loop::drive_ride(&mut session, seconds, stop, |progress| {
        eprint!(
            "\rTime: {}s  Distance: {} km",
            progress.elapsed_seconds,
            format_quantity(progress.distance_km)
        );
    })
    .await;
    eprintln!();

    let receipt = ledger
        .finish_ride(&mut session)?
        .context("ride ended before it was settled")?;
    if let Some(warning) = receipt.payment.as_ref().and_then(|p| p.persist_warning.as_ref()) {
        tracing::warn!(error = %warning, "ride payment not saved yet");
    }

    print!("{}", render::ride_summary(&receipt.summary));
    println!("Balance: {}", format_usd(ledger.balance()));
    Ok(())
}

fn show_scooters(lat: Option<f64>, lon: Option<f64>, count: u32, seed: Option<u64>) {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        tracing::info!("no location given; nothing to show on the map");
        return;
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let region = MapRegion::around(GeoLocation::new(lat, lon));
    let fleet = spawn_fleet(region.center, count, &mut rng);
    print!("{}", render::scooter_map(&region, &fleet));
}
