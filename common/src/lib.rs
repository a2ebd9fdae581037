pub mod currency;
pub mod error;
pub mod ledger;
pub mod location;
pub mod ride;
pub mod scooter;
pub mod storage;
pub mod wallet;

pub use error::{LedgerError, RideError, StorageError};
pub use ledger::{LedgerReceipt, RideReceipt, WalletLedger};
pub use ride::{FareSchedule, RideSession, RideSummary};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use wallet::{Transaction, TransactionKind, WalletState};
