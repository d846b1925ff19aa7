use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::fare::FareBreakdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Standard,
    Accessible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PassengerGroup {
    #[default]
    #[serde(rename = "4-or-less")]
    FourOrLess,
    #[serde(rename = "more-than-4")]
    MoreThanFour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    #[default]
    Now,
    Scheduled,
}

/// The pricing-relevant attributes of a trip, as submitted by the
/// reservation form. Airport and port pickups carry no surcharge; the
/// flags only drive the flight/port reference requirements at booking
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TripAttributes {
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub passenger_group: PassengerGroup,
    #[serde(default)]
    pub has_luggage: bool,
    #[serde(default)]
    pub luggage_count: i32,
    #[serde(default)]
    pub needs_child_seat: bool,
    #[serde(default)]
    pub is_airport_pickup: bool,
    #[serde(default)]
    pub is_port_pickup: bool,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub needs_return_trip: bool,
}

impl TripAttributes {
    /// Combines `scheduled_date` (YYYY-MM-DD) and `scheduled_time` (HH:MM)
    /// into the local datetime used for the night-surcharge window.
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        let date = self.scheduled_date.as_deref()?;
        let time = self.scheduled_time.as_deref()?;
        NaiveDateTime::parse_from_str(&format!("{}T{}", date, time), "%Y-%m-%dT%H:%M").ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRoute {
    pub pickup_address: String,
    pub destination_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_coords: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_coords: Option<Coordinates>,
}

/// How the customer pays. Card bookings always reference the payment
/// intent that was authorized before the booking was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Payment {
    Card {
        #[serde(rename = "paymentIntentId")]
        payment_intent_id: String,
    },
    Cash,
}

impl Payment {
    pub fn is_card(&self) -> bool {
        matches!(self, Payment::Card { .. })
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        match self {
            Payment::Card { payment_intent_id } => Some(payment_intent_id),
            Payment::Cash => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Lifecycle of a booking. `COMPLETED` and `CANCELLED` are terminal;
/// every other move is listed in `allowed_transitions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => &[BookingStatus::InProgress, BookingStatus::Cancelled],
            BookingStatus::InProgress => &[BookingStatus::Completed],
            BookingStatus::Completed | BookingStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown booking status: {}", s))
    }
}

/// The persisted booking record. The fare fields are a frozen snapshot of
/// the quote; only `status`, `payment_status` and `updated_at` change
/// after creation, and only through the lifecycle operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reference: String,
    pub contact: ContactInfo,
    pub route: TripRoute,
    pub attrs: TripAttributes,
    pub fare: FareBreakdown,
    pub amount_due: f64,
    pub quote_id: String,
    pub payment: Payment,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Booking creation input. The fare itself is never part of this payload;
/// it comes from the server-stored quote referenced by `quote_id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub contact: ContactInfo,
    pub route: TripRoute,
    pub quote_id: String,
    pub payment: Payment,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub port_info: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default)]
    pub return_time: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");

        let parsed: BookingStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, BookingStatus::Cancelled);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<BookingStatus>("\"ASSIGNED\"").is_err());
        assert!("ASSIGNED".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));

        assert!(Confirmed.can_transition_to(InProgress));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Completed));

        assert!(InProgress.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Cancelled));

        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        for next in BookingStatus::ALL {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in BookingStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn payment_is_a_tagged_variant() {
        let card: Payment =
            serde_json::from_str(r#"{"method":"card","paymentIntentId":"pi_123"}"#).unwrap();
        assert!(card.is_card());
        assert_eq!(card.payment_intent_id(), Some("pi_123"));

        let cash: Payment = serde_json::from_str(r#"{"method":"cash"}"#).unwrap();
        assert!(!cash.is_card());
        assert_eq!(cash.payment_intent_id(), None);
    }

    #[test]
    fn scheduled_at_combines_date_and_time() {
        let attrs = TripAttributes {
            timing: Timing::Scheduled,
            scheduled_date: Some("2025-03-10".to_string()),
            scheduled_time: Some("23:30".to_string()),
            ..Default::default()
        };

        let at = attrs.scheduled_at().unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M").to_string(), "2025-03-10 23:30");
    }

    #[test]
    fn scheduled_at_is_none_when_incomplete_or_malformed() {
        let mut attrs = TripAttributes {
            scheduled_date: Some("2025-03-10".to_string()),
            ..Default::default()
        };
        assert!(attrs.scheduled_at().is_none());

        attrs.scheduled_time = Some("not-a-time".to_string());
        assert!(attrs.scheduled_at().is_none());
    }

    #[test]
    fn passenger_group_uses_original_wire_values() {
        let group: PassengerGroup = serde_json::from_str("\"more-than-4\"").unwrap();
        assert_eq!(group, PassengerGroup::MoreThanFour);

        let json = serde_json::to_string(&PassengerGroup::FourOrLess).unwrap();
        assert_eq!(json, "\"4-or-less\"");
    }
}
