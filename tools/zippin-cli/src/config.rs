use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;
use rust_decimal::Decimal;
use zippin_common::ledger::DEFAULT_SEED_BALANCE;
use zippin_common::{FareSchedule, FileStore, KeyValueStore, MemoryStore, StorageError};

/// Settings shared by every subcommand. Each can also come from the environment.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Directory holding the wallet files (default: <user data dir>/zippin).
    #[arg(long, env = "ZIPPIN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep the wallet in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Balance a brand-new wallet starts with.
    #[arg(long, env = "ZIPPIN_SEED_BALANCE", default_value_t = DEFAULT_SEED_BALANCE, global = true)]
    pub seed_balance: Decimal,

    /// Fee charged when a scooter is unlocked.
    #[arg(long, env = "ZIPPIN_UNLOCK_FEE", global = true)]
    pub unlock_fee: Option<Decimal>,

    /// Price per ridden minute.
    #[arg(long, env = "ZIPPIN_PER_MINUTE_RATE", global = true)]
    pub per_minute_rate: Option<Decimal>,

    /// Milliseconds between ride ticks; each tick counts as one ridden second.
    #[arg(long, env = "ZIPPIN_TICK_MS", default_value_t = 1000, global = true)]
    pub tick_ms: u64,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` means an in-memory wallet.
    pub data_dir: Option<PathBuf>,
    pub seed_balance: Decimal,
    pub fare: FareSchedule,
}

impl AppConfig {
    pub fn from_args(args: &ConfigArgs) -> anyhow::Result<Self> {
        let defaults = FareSchedule::default();
        let fare = FareSchedule {
            unlock_fee: args.unlock_fee.unwrap_or(defaults.unlock_fee),
            per_minute_rate: args.per_minute_rate.unwrap_or(defaults.per_minute_rate),
            tick_interval: Duration::from_millis(args.tick_ms),
            ..defaults
        };
        if fare.unlock_fee.is_sign_negative() || fare.per_minute_rate.is_sign_negative() {
            bail!("fares must not be negative");
        }
        if args.tick_ms == 0 {
            bail!("--tick-ms must be at least 1");
        }

        let data_dir = if args.ephemeral {
            None
        } else {
            let dir = match &args.data_dir {
                Some(dir) => dir.clone(),
                None => dirs::data_dir()
                    .context("no user data directory; pass --data-dir or --ephemeral")?
                    .join("zippin"),
            };
            Some(dir)
        };

        Ok(Self {
            data_dir,
            seed_balance: args.seed_balance,
            fare,
        })
    }

    /// Open the configured wallet storage.
    pub fn open_store(&self) -> anyhow::Result<WalletStore> {
        match &self.data_dir {
            Some(dir) => {
                let store = FileStore::open(dir)
                    .with_context(|| format!("opening wallet directory {}", dir.display()))?;
                Ok(WalletStore::File(store))
            }
            None => Ok(WalletStore::Memory(MemoryStore::new())),
        }
    }
}

/// Storage picked at startup: files under the data directory, or memory with `--ephemeral`.
pub enum WalletStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for WalletStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            WalletStore::File(s) => s.get(key),
            WalletStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            WalletStore::File(s) => s.set(key, value),
            WalletStore::Memory(s) => s.set(key, value),
        }
    }

    fn backend_name(&self) -> &str {
        match self {
            WalletStore::File(s) => s.backend_name(),
            WalletStore::Memory(s) => s.backend_name(),
        }
    }
}
