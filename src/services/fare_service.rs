//! The fare pricing engine.
//!
//! A pure function from (distance, duration, trip attributes, tariff) to an
//! itemized breakdown. All surcharges are additive, so the order below only
//! fixes the enumeration for testing; it never changes the number.

use chrono::Timelike;

use crate::models::booking::{PassengerGroup, TripAttributes, VehicleType};
use crate::models::fare::FareBreakdown;
use crate::models::pricing::PricingConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FareError {
    /// The tariff is corrupt or incomplete. Quoting is refused outright
    /// rather than substituting zeros.
    InvalidConfiguration(String),
    /// The trip inputs themselves are out of range.
    InvalidAttributes(String),
}

impl std::fmt::Display for FareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FareError::InvalidConfiguration(msg) => write!(f, "Invalid pricing config: {}", msg),
            FareError::InvalidAttributes(msg) => write!(f, "Invalid trip attributes: {}", msg),
        }
    }
}

/// Round half-up to the cent, via integer cents to keep the result exact.
pub fn round_to_cents(amount: f64) -> f64 {
    ((amount * 100.0) + 0.5).floor() / 100.0
}

/// Night window is [22:00, 06:00) local time.
pub fn is_night_hour(hour: u32) -> bool {
    hour >= 22 || hour < 6
}

/// Computes the fare for a single one-way trip.
pub fn compute_fare(
    distance_km: f64,
    duration_min: u32,
    attrs: &TripAttributes,
    config: &PricingConfig,
) -> Result<FareBreakdown, FareError> {
    // Config problems must surface before any arithmetic happens.
    config.validate().map_err(FareError::InvalidConfiguration)?;

    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(FareError::InvalidAttributes(
            "distanceKm must be non-negative".to_string(),
        ));
    }
    if attrs.luggage_count < 0 {
        return Err(FareError::InvalidAttributes(
            "luggageCount must be non-negative".to_string(),
        ));
    }

    let base_fare = config.base_fare;
    let distance_fare = distance_km * config.price_per_km;

    let mut surcharges = 0.0;

    // Airport and port pickups carry no surcharge.

    if attrs.has_luggage && attrs.luggage_count > 2 {
        surcharges += config.extra_luggage_fee;
    }
    if attrs.passenger_group == PassengerGroup::MoreThanFour {
        surcharges += config.large_group_surcharge;
    }
    if attrs.vehicle_type == VehicleType::Accessible {
        surcharges += config.accessible_vehicle_fee;
    }
    if attrs.needs_child_seat {
        surcharges += config.child_seat_fee;
    }
    if let Some(at) = attrs.scheduled_at() {
        if is_night_hour(at.hour()) {
            surcharges += config.night_surcharge;
        }
    }

    let subtotal = base_fare + distance_fare + surcharges;
    let total = round_to_cents(subtotal.max(config.minimum_fare));

    Ok(FareBreakdown {
        distance_km,
        duration_min,
        base_fare,
        distance_fare,
        surcharges,
        total,
    })
}

/// A round trip is charged as exactly twice the one-way total. The return
/// leg is not re-priced from inverted coordinates.
pub fn amount_due(fare: &FareBreakdown, round_trip: bool) -> f64 {
    if round_trip {
        round_to_cents(fare.total * 2.0)
    } else {
        fare.total
    }
}
