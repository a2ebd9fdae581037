//! Plain-text views of wallet and ride records.

use zippin_common::currency::{format_quantity, format_signed, format_usd};
use zippin_common::location::MapRegion;
use zippin_common::scooter::{nearest_first, Scooter};
use zippin_common::{RideSummary, Transaction, WalletState};

pub fn wallet(state: &WalletState, limit: usize) -> String {
    let mut lines = vec![
        format!("Your Balance: {}", format_usd(state.balance)),
        String::new(),
        "Recent Transactions".to_string(),
    ];
    if state.history.is_empty() {
        lines.push("  No transactions yet".to_string());
    }
    lines.extend(state.history.iter().take(limit).map(transaction_row));
    block(lines)
}

pub fn transaction_row(tx: &Transaction) -> String {
    format!(
        "  {:<14} {:<24} {:>10}  {}",
        tx.title(),
        tx.id(),
        format_signed(tx),
        tx.timestamp().format("%b %-d"),
    )
}

pub fn transaction_details(tx: &Transaction) -> String {
    let mut lines = vec![
        format_signed(tx),
        tx.title().to_string(),
        tx.timestamp().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        format!("id: {}", tx.id()),
    ];
    if let Some(ride) = tx.ride() {
        lines.push(format!("duration: {}s", ride.duration_seconds));
        lines.push(format!("distance: {} km", format_quantity(ride.distance_km)));
        lines.push(format!("CO₂ saved: {} kg", format_quantity(ride.co2_saved_kg)));
    }
    block(lines)
}

pub fn ride_summary(summary: &RideSummary) -> String {
    let mut lines = vec!["Ride Completed!".to_string()];
    if let Some(id) = summary.scooter_id {
        lines.push(format!("Scooter:    #{id}"));
    }
    lines.push(format!("Duration:   {:.1} min", summary.duration_minutes()));
    lines.push(format!("Distance:   {} km", format_quantity(summary.distance_km)));
    lines.push(format!("CO₂ Saved:  {} kg", format_quantity(summary.co2_saved_kg)));
    lines.push(format!("Total Cost: {}", format_usd(summary.cost)));
    block(lines)
}

pub fn scooter_map(region: &MapRegion, fleet: &[Scooter]) -> String {
    let mut lines = vec![format!(
        "Map around {:.5}, {:.5} (±{} deg)",
        region.center.latitude, region.center.longitude, region.latitude_delta
    )];
    lines.extend(
        nearest_first(fleet, &region.center)
            .into_iter()
            .map(|(scooter, km)| scooter_row(scooter, km)),
    );
    block(lines)
}

/// One line each, newline-terminated.
fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

fn scooter_row(scooter: &Scooter, km: f64) -> String {
    format!(
        "  {:<12} battery {:>3}%  {:>4.0} m  ({:.5}, {:.5})",
        scooter.label(),
        scooter.battery_percent,
        km * 1000.0,
        scooter.location.latitude,
        scooter.location.longitude,
    )
}
