use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique transaction identifier: `tx-{unix_millis}-{sequence}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    /// `sequence` is the 1-based position of the entry in the append-only history,
    /// so two entries created in the same millisecond still get distinct ids.
    pub fn new(created_at: DateTime<Utc>, sequence: usize) -> Self {
        Self(format!("tx-{}-{sequence}", created_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Metadata of the ride a payment settled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideDetails {
    pub duration_seconds: u64,
    pub distance_km: Decimal,
    pub co2_saved_kg: Decimal,
}

/// What a ledger entry records. Direction is implied by the variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionEntry {
    TopUp { amount: Decimal },
    RidePayment { amount: Decimal, ride: RideDetails },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    TopUp,
    RidePayment,
}

/// A single wallet transaction. Fields are private: entries never change after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    entry: TransactionEntry,
}

impl Transaction {
    pub(crate) fn new(id: TransactionId, timestamp: DateTime<Utc>, entry: TransactionEntry) -> Self {
        Self {
            id,
            timestamp,
            entry,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn entry(&self) -> &TransactionEntry {
        &self.entry
    }

    pub fn kind(&self) -> TransactionKind {
        match self.entry {
            TransactionEntry::TopUp { .. } => TransactionKind::TopUp,
            TransactionEntry::RidePayment { .. } => TransactionKind::RidePayment,
        }
    }

    /// Magnitude of the transaction, always positive.
    pub fn amount(&self) -> Decimal {
        match &self.entry {
            TransactionEntry::TopUp { amount } | TransactionEntry::RidePayment { amount, .. } => {
                *amount
            }
        }
    }

    /// Effect on the balance: positive for top-ups, negative for ride payments.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind() {
            TransactionKind::TopUp => self.amount(),
            TransactionKind::RidePayment => -self.amount(),
        }
    }

    pub fn ride(&self) -> Option<&RideDetails> {
        match &self.entry {
            TransactionEntry::RidePayment { ride, .. } => Some(ride),
            TransactionEntry::TopUp { .. } => None,
        }
    }

    /// Heading shown in transaction lists.
    pub fn title(&self) -> &'static str {
        match self.kind() {
            TransactionKind::TopUp => "Funds Added",
            TransactionKind::RidePayment => "Ride Payment",
        }
    }
}

/// Balance plus history, newest entry first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub balance: Decimal,
    pub history: Vec<Transaction>,
}

impl WalletState {
    pub fn seeded(seed_balance: Decimal) -> Self {
        Self {
            balance: seed_balance,
            history: Vec::new(),
        }
    }

    /// Recompute the balance from the seed and every recorded transaction,
    /// oldest first. `None` if the running total leaves the `Decimal` range.
    pub fn derive_balance(&self, seed_balance: Decimal) -> Option<Decimal> {
        self.history
            .iter()
            .rev()
            .try_fold(seed_balance, |acc, tx| acc.checked_add(tx.signed_amount()))
    }

    /// Prepend a transaction and apply it to the balance in one step, returning
    /// the new balance. On overflow nothing changes and `None` is returned.
    pub(crate) fn record(&mut self, tx: Transaction) -> Option<Decimal> {
        let balance = self.balance.checked_add(tx.signed_amount())?;
        self.balance = balance;
        self.history.insert(0, tx);
        Some(balance)
    }

    pub fn find(&self, id: &TransactionId) -> Option<&Transaction> {
        self.history.iter().find(|tx| tx.id() == id)
    }
}
