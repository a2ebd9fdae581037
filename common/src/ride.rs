//! Simulated ride lifecycle.
//!
//! A [`RideSession`] goes `Idle -> Active -> Idle`. While active it is driven
//! by [`RideEvent::Tick`] messages from whatever scheduler the caller runs;
//! the transition itself is the pure [`RideState::apply`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RideError;
use crate::wallet::RideDetails;

/// Pricing and simulation constants for a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareSchedule {
    /// Charged on every ride and required as the minimum balance to start one.
    pub unlock_fee: Decimal,
    pub per_minute_rate: Decimal,
    /// Simulated distance covered per tick.
    pub distance_per_tick_km: Decimal,
    /// CO₂ saved per kilometre compared to a car trip.
    pub emission_factor_kg_per_km: Decimal,
    pub tick_interval: Duration,
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self {
            unlock_fee: Decimal::new(100, 2),
            per_minute_rate: Decimal::new(25, 2),
            distance_per_tick_km: Decimal::new(5, 3),
            emission_factor_kg_per_km: Decimal::new(21, 2),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl FareSchedule {
    /// `unlock_fee + (elapsed_seconds / 60) * per_minute_rate`, unrounded.
    /// Saturates at `Decimal::MAX` for absurd rates.
    pub fn cost(&self, elapsed_seconds: u64) -> Decimal {
        let minutes = Decimal::from(elapsed_seconds) / Decimal::from(60);
        self.unlock_fee
            .saturating_add(minutes.saturating_mul(self.per_minute_rate))
    }

    pub fn co2_saved(&self, distance_km: Decimal) -> Decimal {
        distance_km.saturating_mul(self.emission_factor_kg_per_km)
    }
}

/// Counters of an active ride.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideProgress {
    pub elapsed_seconds: u64,
    pub distance_km: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideEvent {
    Start,
    Tick,
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideState {
    #[default]
    Idle,
    Active(RideProgress),
}

impl RideState {
    /// Next state for `event`. Deterministic; events that make no sense in the
    /// current state leave it unchanged.
    pub fn apply(&self, event: &RideEvent, fare: &FareSchedule) -> RideState {
        match (self, event) {
            (RideState::Idle, RideEvent::Start) => RideState::Active(RideProgress::default()),
            (RideState::Active(p), RideEvent::Tick) => RideState::Active(RideProgress {
                elapsed_seconds: p.elapsed_seconds + 1,
                distance_km: p.distance_km.saturating_add(fare.distance_per_tick_km),
            }),
            (RideState::Active(_), RideEvent::Stop) => RideState::Idle,
            (state, _) => state.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RideState::Active(_))
    }
}

/// Final figures of a completed ride, handed to the presentation layer and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideSummary {
    pub scooter_id: Option<u32>,
    pub duration_seconds: u64,
    pub distance_km: Decimal,
    pub cost: Decimal,
    pub co2_saved_kg: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl RideSummary {
    pub fn details(&self) -> RideDetails {
        RideDetails {
            duration_seconds: self.duration_seconds,
            distance_km: self.distance_km,
            co2_saved_kg: self.co2_saved_kg,
        }
    }

    /// Duration in minutes with one decimal place, as shown on the summary screen.
    pub fn duration_minutes(&self) -> Decimal {
        (Decimal::from(self.duration_seconds) / Decimal::from(60)).round_dp(1)
    }
}

/// One rental. Holds no state across rides; `start` resets the counters.
#[derive(Debug, Clone, Default)]
pub struct RideSession {
    fare: FareSchedule,
    state: RideState,
    scooter_id: Option<u32>,
}

impl RideSession {
    pub fn new(fare: FareSchedule) -> Self {
        Self {
            fare,
            state: RideState::Idle,
            scooter_id: None,
        }
    }

    /// Tag the session with the scooter being ridden (shown in the summary).
    pub fn for_scooter(mut self, scooter_id: u32) -> Self {
        self.scooter_id = Some(scooter_id);
        self
    }

    pub fn fare(&self) -> &FareSchedule {
        &self.fare
    }

    pub fn state(&self) -> &RideState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn progress(&self) -> Option<&RideProgress> {
        match &self.state {
            RideState::Active(p) => Some(p),
            RideState::Idle => None,
        }
    }

    /// Begin a ride if `current_balance` covers the unlock fee.
    pub fn start(&mut self, current_balance: Decimal) -> Result<(), RideError> {
        if self.state.is_active() {
            return Err(RideError::AlreadyActive);
        }
        if current_balance < self.fare.unlock_fee {
            return Err(RideError::InsufficientFunds {
                available: current_balance,
                required: self.fare.unlock_fee,
            });
        }
        self.state = self.state.apply(&RideEvent::Start, &self.fare);
        tracing::info!(scooter = ?self.scooter_id, "ride started");
        Ok(())
    }

    /// Advance one tick. Returns false (and changes nothing) when no ride is active.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_active() {
            tracing::debug!("tick ignored: no active ride");
            return false;
        }
        self.state = self.state.apply(&RideEvent::Tick, &self.fare);
        true
    }

    /// End the ride and compute its summary from the counters as of cancellation.
    /// Stopping an idle session is a no-op.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<RideSummary> {
        let next = self.state.apply(&RideEvent::Stop, &self.fare);
        let RideState::Active(progress) = std::mem::replace(&mut self.state, next) else {
            tracing::warn!("stop ignored: no active ride");
            return None;
        };

        let summary = RideSummary {
            scooter_id: self.scooter_id,
            duration_seconds: progress.elapsed_seconds,
            distance_km: progress.distance_km,
            cost: self.fare.cost(progress.elapsed_seconds),
            co2_saved_kg: self.fare.co2_saved(progress.distance_km),
            timestamp: now,
        };
        tracing::info!(
            seconds = summary.duration_seconds,
            distance_km = %summary.distance_km,
            cost = %summary.cost,
            "ride stopped"
        );
        Some(summary)
    }
}
