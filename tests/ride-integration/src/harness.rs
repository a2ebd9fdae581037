use rust_decimal::Decimal;
use tempfile::TempDir;
use zippin_common::ledger::DEFAULT_SEED_BALANCE;
use zippin_common::{
    FareSchedule, FileStore, LedgerReceipt, RideError, RideReceipt, RideSession, WalletLedger,
};

use crate::{at, init_tracing};

/// A rider with a wallet persisted to a throwaway directory.
pub struct Rider {
    dir: TempDir,
    pub fare: FareSchedule,
    pub ledger: WalletLedger<FileStore>,
    clock: i64,
}

impl Rider {
    /// New rider with the default seed balance and fares.
    pub fn setup() -> Self {
        Self::with_seed(DEFAULT_SEED_BALANCE)
    }

    pub fn with_seed(seed: Decimal) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("wallet")).unwrap();
        let ledger = WalletLedger::open(store, seed).unwrap();
        Self {
            dir,
            fare: FareSchedule::default(),
            ledger,
            clock: 0,
        }
    }

    /// Drop the ledger and load it again from disk, as an app restart would.
    pub fn restart(&mut self) {
        let store = FileStore::open(self.dir.path().join("wallet")).unwrap();
        self.ledger = WalletLedger::open(store, Decimal::ZERO).unwrap();
    }

    fn tick_clock(&mut self, secs: i64) -> chrono::DateTime<chrono::Utc> {
        self.clock += secs;
        at(self.clock)
    }

    pub fn top_up(&mut self, amount: Decimal) -> LedgerReceipt {
        let now = self.tick_clock(1);
        self.ledger.credit_at(amount, now).unwrap()
    }

    /// Unlock a scooter, ride for `seconds` ticks and settle.
    pub fn ride_for(&mut self, seconds: u64) -> Result<RideReceipt, RideError> {
        let mut session = RideSession::new(self.fare.clone());
        self.ledger.start_ride(&mut session)?;
        for _ in 0..seconds {
            session.tick();
        }
        let now = self.tick_clock(seconds as i64);
        let receipt = self
            .ledger
            .finish_ride_at(&mut session, now)
            .unwrap()
            .unwrap();
        Ok(receipt)
    }
}
