use bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::booking::{Coordinates, TripAttributes};
use crate::models::fare::FareBreakdown;

/// Quotes are only honored for a bounded window; a stale quote forces the
/// customer back through pricing.
pub const QUOTE_TTL_MINUTES: i64 = 30;

/// A server-computed fare quote. Booking creation and payment-intent
/// creation only ever reference quotes by id, so the amount charged and
/// the fare frozen onto the booking can never come from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: String,
    pub attrs: TripAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_coords: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_coords: Option<Coordinates>,
    pub fare: FareBreakdown,
    pub round_trip: bool,
    /// `fare.total` one-way, or twice that when a return trip was
    /// requested. This is the amount the payment gateway authorizes.
    pub amount_due: f64,
    /// True when the distance provider was unavailable and the fixed
    /// fallback estimate was used.
    pub estimated: bool,
    pub created_at: DateTime,
    pub expires_at: DateTime,
}

impl Quote {
    pub fn is_expired(&self) -> bool {
        self.expires_at < DateTime::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::TripAttributes;

    fn quote_expiring_at(expires_at: DateTime) -> Quote {
        Quote {
            id: "test-quote".to_string(),
            attrs: TripAttributes::default(),
            pickup_coords: None,
            destination_coords: None,
            fare: FareBreakdown {
                distance_km: 5.0,
                duration_min: 15,
                base_fare: 2.50,
                distance_fare: 5.00,
                surcharges: 0.0,
                total: 7.50,
            },
            round_trip: false,
            amount_due: 7.50,
            estimated: false,
            created_at: DateTime::now(),
            expires_at,
        }
    }

    #[test]
    fn quote_expiry_is_checked_against_now() {
        let now = DateTime::now().timestamp_millis();

        let fresh = quote_expiring_at(DateTime::from_millis(now + 60_000));
        assert!(!fresh.is_expired());

        let stale = quote_expiring_at(DateTime::from_millis(now - 60_000));
        assert!(stale.is_expired());
    }
}
