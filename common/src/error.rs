use rust_decimal::Decimal;
use thiserror::Error;

/// Failures of the key-value backend behind the ledger.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error("amount {0} would take the balance out of range")]
    AmountOutOfRange(Decimal),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("corrupt entry `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("entry `{key}` has unsupported format version {found}")]
    UnsupportedVersion { key: String, found: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RideError {
    #[error("insufficient funds: have {available}, need {required} to unlock")]
    InsufficientFunds { available: Decimal, required: Decimal },
    #[error("a ride is already active")]
    AlreadyActive,
}
