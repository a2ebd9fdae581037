//! Wallet ledger: balance plus append-only transaction history, persisted to a
//! [`KeyValueStore`].
//!
//! Two entries are written on every change, `transactions` then `balance`,
//! each wrapped in a versioned JSON envelope. In-memory state is updated
//! before the write is issued, so reads always reflect the last operation even
//! when the write fails. A failed write is retried once; after that the
//! failure is reported on the receipt and the ledger stays dirty until a later
//! write or [`WalletLedger::flush`] succeeds.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, RideError, StorageError};
use crate::ride::{RideSession, RideSummary};
use crate::storage::KeyValueStore;
use crate::wallet::{RideDetails, Transaction, TransactionEntry, TransactionId, WalletState};

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BALANCE_KEY: &str = "balance";
pub const FORMAT_VERSION: u32 = 1;

/// Starting balance of a brand-new wallet.
pub const DEFAULT_SEED_BALANCE: Decimal = Decimal::from_parts(1242, 0, 0, false, 2);

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Persisted balance. `entries` is the history length it was computed for, so a
/// crash between the two writes can be detected on the next open.
#[derive(Serialize, Deserialize)]
struct BalanceRecord {
    balance: Decimal,
    seed: Decimal,
    entries: usize,
}

/// Result of a successful credit or debit.
#[derive(Debug)]
pub struct LedgerReceipt {
    pub transaction: Transaction,
    /// Balance right after this transaction.
    pub balance: Decimal,
    /// Set when the durable write failed even after a retry. The transaction
    /// still stands in memory.
    pub persist_warning: Option<StorageError>,
}

/// A settled ride: its summary plus the payment, if anything was charged.
#[derive(Debug)]
pub struct RideReceipt {
    pub summary: RideSummary,
    pub payment: Option<LedgerReceipt>,
}

pub struct WalletLedger<S: KeyValueStore> {
    store: S,
    seed_balance: Decimal,
    state: WalletState,
    dirty: bool,
}

impl<S: KeyValueStore> WalletLedger<S> {
    /// Load the wallet from `store`, or start a fresh one at `seed_balance`.
    ///
    /// A wallet that was persisted before keeps its own seed; `seed_balance`
    /// only applies to brand-new wallets.
    pub fn open(store: S, seed_balance: Decimal) -> Result<Self, LedgerError> {
        let history: Option<Vec<Transaction>> = load(&store, TRANSACTIONS_KEY)?;
        let record: Option<BalanceRecord> = load(&store, BALANCE_KEY)?;

        let out_of_range = || LedgerError::Corrupt {
            key: TRANSACTIONS_KEY.to_string(),
            reason: "balance out of range".to_string(),
        };
        let mut dirty = false;
        let (state, seed_balance) = match (history, record) {
            (None, None) => (WalletState::seeded(seed_balance), seed_balance),
            (history, Some(record)) => {
                let mut state = WalletState {
                    balance: record.balance,
                    history: history.unwrap_or_default(),
                };
                if record.entries != state.history.len() {
                    tracing::warn!(
                        recorded = record.entries,
                        found = state.history.len(),
                        "balance out of step with history, re-deriving"
                    );
                    state.balance = state.derive_balance(record.seed).ok_or_else(out_of_range)?;
                    dirty = true;
                }
                (state, record.seed)
            }
            (Some(history), None) => {
                tracing::warn!("balance entry missing, re-deriving from history");
                let mut state = WalletState {
                    balance: seed_balance,
                    history,
                };
                state.balance = state.derive_balance(seed_balance).ok_or_else(out_of_range)?;
                dirty = true;
                (state, seed_balance)
            }
        };

        tracing::debug!(
            backend = store.backend_name(),
            balance = %state.balance,
            entries = state.history.len(),
            "wallet opened"
        );

        Ok(Self {
            store,
            seed_balance,
            state,
            dirty,
        })
    }

    pub fn balance(&self) -> Decimal {
        self.state.balance
    }

    /// Transactions, newest first.
    pub fn history(&self) -> &[Transaction] {
        &self.state.history
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn seed_balance(&self) -> Decimal {
        self.seed_balance
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.state.find(id)
    }

    /// True while the last write failed and has not been redone.
    pub fn needs_flush(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Add funds.
    pub fn credit_at(
        &mut self,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<LedgerReceipt, LedgerError> {
        ensure_positive(amount)?;
        self.commit(TransactionEntry::TopUp { amount }, now)
    }

    /// Charge the wallet. No floor is enforced here: the balance may go negative.
    pub fn debit_at(
        &mut self,
        amount: Decimal,
        ride: Option<RideDetails>,
        now: DateTime<Utc>,
    ) -> Result<LedgerReceipt, LedgerError> {
        ensure_positive(amount)?;
        let entry = TransactionEntry::RidePayment {
            amount,
            ride: ride.unwrap_or_default(),
        };
        self.commit(entry, now)
    }

    /// Start `session` against the current balance. Taking `&mut self` means no
    /// credit or debit can slip in between the funds check and the start.
    pub fn start_ride(&mut self, session: &mut RideSession) -> Result<(), RideError> {
        session.start(self.state.balance)
    }

    /// Stop `session` and charge its cost in one step. Returns `None` when no
    /// ride was active.
    pub fn finish_ride_at(
        &mut self,
        session: &mut RideSession,
        now: DateTime<Utc>,
    ) -> Result<Option<RideReceipt>, LedgerError> {
        let Some(summary) = session.stop(now) else {
            return Ok(None);
        };
        // A zero fare schedule can produce a free ride; nothing to record then.
        let payment = if summary.cost > Decimal::ZERO {
            Some(self.debit_at(summary.cost, Some(summary.details()), now)?)
        } else {
            None
        };
        Ok(Some(RideReceipt { summary, payment }))
    }

    /// Redo a write that failed earlier. No-op when nothing is pending.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        self.write_all()?;
        self.dirty = false;
        Ok(())
    }

    fn commit(
        &mut self,
        entry: TransactionEntry,
        now: DateTime<Utc>,
    ) -> Result<LedgerReceipt, LedgerError> {
        let id = TransactionId::new(now, self.state.history.len() + 1);
        let transaction = Transaction::new(id, now, entry);
        if self.state.record(transaction.clone()).is_none() {
            tracing::warn!(
                kind = ?transaction.kind(),
                amount = %transaction.amount(),
                balance = %self.state.balance,
                "transaction rejected: balance would overflow"
            );
            return Err(LedgerError::AmountOutOfRange(transaction.amount()));
        }
        tracing::info!(
            id = %transaction.id(),
            kind = ?transaction.kind(),
            amount = %transaction.amount(),
            balance = %self.state.balance,
            "transaction recorded"
        );

        let persist_warning = self.persist();
        Ok(LedgerReceipt {
            transaction,
            balance: self.state.balance,
            persist_warning,
        })
    }

    fn persist(&mut self) -> Option<StorageError> {
        if let Err(first) = self.write_all() {
            tracing::warn!(error = %first, "wallet write failed, retrying once");
            if let Err(second) = self.write_all() {
                tracing::warn!(error = %second, "wallet write failed, keeping in-memory state");
                self.dirty = true;
                return Some(second);
            }
        }
        self.dirty = false;
        None
    }

    fn write_all(&mut self) -> Result<(), StorageError> {
        let history = serde_json::to_string(&Envelope {
            version: FORMAT_VERSION,
            data: &self.state.history,
        })?;
        let balance = serde_json::to_string(&Envelope {
            version: FORMAT_VERSION,
            data: BalanceRecord {
                balance: self.state.balance,
                seed: self.seed_balance,
                entries: self.state.history.len(),
            },
        })?;
        self.store.set(TRANSACTIONS_KEY, &history)?;
        self.store.set(BALANCE_KEY, &balance)?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<S: KeyValueStore> WalletLedger<S> {
    /// [`credit_at`](Self::credit_at) stamped with the current time.
    pub fn credit(&mut self, amount: Decimal) -> Result<LedgerReceipt, LedgerError> {
        self.credit_at(amount, Utc::now())
    }

    /// [`debit_at`](Self::debit_at) stamped with the current time.
    pub fn debit(
        &mut self,
        amount: Decimal,
        ride: Option<RideDetails>,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.debit_at(amount, ride, Utc::now())
    }

    /// [`finish_ride_at`](Self::finish_ride_at) stamped with the current time.
    pub fn finish_ride(
        &mut self,
        session: &mut RideSession,
    ) -> Result<Option<RideReceipt>, LedgerError> {
        self.finish_ride_at(session, Utc::now())
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

fn load<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, LedgerError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let corrupt = |reason: String| LedgerError::Corrupt {
        key: key.to_string(),
        reason,
    };

    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
    let found = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    if found != u64::from(FORMAT_VERSION) {
        return Err(LedgerError::UnsupportedVersion {
            key: key.to_string(),
            found: u32::try_from(found).unwrap_or(u32::MAX),
        });
    }
    let envelope: Envelope<T> =
        serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;
    Ok(Some(envelope.data))
}
