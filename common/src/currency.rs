use rust_decimal::{Decimal, RoundingStrategy};

use crate::wallet::{Transaction, TransactionKind};

/// Places shown for money, distance and CO₂ on screen. Stored values keep full precision.
pub const DISPLAY_PLACES: u32 = 2;

/// Amounts are plain decimals of US dollars.
pub const CURRENCY_SYMBOL: &str = "$";

/// Round for display only (half away from zero, like `toFixed`).
pub fn round_for_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as `$12.42`; negative balances render as `-$0.58`.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_for_display(amount);
    let symbol = CURRENCY_SYMBOL;
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{symbol}{:.2}", rounded.abs())
    } else {
        format!("{symbol}{:.2}", rounded.abs())
    }
}

/// Format a transaction amount with its direction: `+$5.00` for top-ups, `-$1.50` for rides.
pub fn format_signed(tx: &Transaction) -> String {
    let sign = match tx.kind() {
        TransactionKind::TopUp => '+',
        TransactionKind::RidePayment => '-',
    };
    format!("{sign}{}", format_usd(tx.amount()))
}

/// Two-decimal rendering for kilometres and kilograms.
pub fn format_quantity(value: Decimal) -> String {
    format!("{:.2}", round_for_display(value))
}
