//! Booking validation, persistence and the lifecycle state machine.

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection};
use rand::Rng;

use crate::db::mongo::DB_NAME;
use crate::models::booking::{Booking, BookingRequest, BookingStatus, Timing, TripAttributes};

pub const COLLECTION: &str = "Bookings";

pub fn collection(client: &Client) -> Collection<Booking> {
    client.database(DB_NAME).collection(COLLECTION)
}

#[derive(Debug)]
pub enum TransitionError {
    NotFound,
    /// The requested status is not reachable from the booking's current one.
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// Another caller moved the booking between our read and our write.
    /// The transition is rejected, never applied over the newer status.
    Conflict,
    Database(mongodb::error::Error),
}

/// Field-level validation of a booking request, checked against the trip
/// attributes frozen on the quote. Returns the first offending field's
/// message.
pub fn validate_request(req: &BookingRequest, attrs: &TripAttributes) -> Result<(), String> {
    let contact = &req.contact;
    if contact.first_name.trim().is_empty() {
        return Err("firstName is required".to_string());
    }
    if contact.last_name.trim().is_empty() {
        return Err("lastName is required".to_string());
    }
    if contact.phone.trim().is_empty() {
        return Err("phone is required".to_string());
    }
    if contact.email.trim().is_empty() {
        return Err("email is required".to_string());
    }
    if !is_valid_email(&contact.email) {
        return Err("email is not a valid address".to_string());
    }

    if req.route.pickup_address.trim().is_empty() {
        return Err("pickupAddress is required".to_string());
    }
    if req.route.destination_address.trim().is_empty() {
        return Err("destinationAddress is required".to_string());
    }

    if attrs.timing == Timing::Scheduled && attrs.scheduled_at().is_none() {
        return Err("scheduledDate and scheduledTime are required for scheduled trips".to_string());
    }

    if attrs.is_airport_pickup && is_blank(&req.flight_number) {
        return Err("flightNumber is required for airport pickups".to_string());
    }
    if attrs.is_port_pickup && is_blank(&req.port_info) {
        return Err("portInfo is required for port pickups".to_string());
    }
    if attrs.needs_return_trip && (is_blank(&req.return_date) || is_blank(&req.return_time)) {
        return Err("returnDate and returnTime are required for return trips".to_string());
    }

    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    match re {
        Ok(re) => re.is_match(email),
        Err(_) => false,
    }
}

/// Human-readable reference printed on the confirmation page, e.g. `TB-8K2QXN`.
pub fn new_reference() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let code: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("TB-{}", code)
}

pub async fn find_by_id(client: &Client, id: ObjectId) -> mongodb::error::Result<Option<Booking>> {
    collection(client).find_one(doc! { "_id": id }).await
}

/// Applies a lifecycle transition with compare-and-swap semantics: the
/// write only lands if the stored status still matches the one we read.
pub async fn transition_status(
    client: &Client,
    id: ObjectId,
    requested: BookingStatus,
) -> Result<Booking, TransitionError> {
    let bookings = collection(client);

    let booking = bookings
        .find_one(doc! { "_id": id })
        .await
        .map_err(TransitionError::Database)?
        .ok_or(TransitionError::NotFound)?;

    let current = booking.status;
    if !current.can_transition_to(requested) {
        return Err(TransitionError::InvalidTransition {
            from: current,
            to: requested,
        });
    }

    let filter = doc! { "_id": id, "status": current.as_str() };
    let update = doc! {
        "$set": {
            "status": requested.as_str(),
            "updated_at": DateTime::now(),
        }
    };

    let result = bookings
        .update_one(filter, update)
        .await
        .map_err(TransitionError::Database)?;

    if result.matched_count == 0 {
        // Status changed underneath us.
        return Err(TransitionError::Conflict);
    }

    bookings
        .find_one(doc! { "_id": id })
        .await
        .map_err(TransitionError::Database)?
        .ok_or(TransitionError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{ContactInfo, Payment, TripRoute};

    fn request() -> BookingRequest {
        BookingRequest {
            contact: ContactInfo {
                first_name: "Maria".to_string(),
                last_name: "Serra".to_string(),
                phone: "+34 600 000 000".to_string(),
                email: "maria@example.com".to_string(),
            },
            route: TripRoute {
                pickup_address: "Carrer de Mallorca 401".to_string(),
                destination_address: "El Prat T1".to_string(),
                pickup_coords: None,
                destination_coords: None,
            },
            quote_id: "q-1".to_string(),
            payment: Payment::Cash,
            flight_number: None,
            port_info: None,
            return_date: None,
            return_time: None,
            observations: None,
        }
    }

    #[test]
    fn complete_cash_request_passes_validation() {
        assert!(validate_request(&request(), &TripAttributes::default()).is_ok());
    }

    #[test]
    fn blank_contact_fields_are_reported_first() {
        let mut req = request();
        req.contact.first_name = "  ".to_string();
        req.contact.email = String::new();

        let err = validate_request(&req, &TripAttributes::default()).unwrap_err();
        assert_eq!(err, "firstName is required");
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut req = request();
        req.contact.email = "not-an-email".to_string();

        let err = validate_request(&req, &TripAttributes::default()).unwrap_err();
        assert_eq!(err, "email is not a valid address");
    }

    #[test]
    fn addresses_are_required() {
        let mut req = request();
        req.route.destination_address = String::new();

        let err = validate_request(&req, &TripAttributes::default()).unwrap_err();
        assert_eq!(err, "destinationAddress is required");
    }

    #[test]
    fn airport_pickup_requires_a_flight_number() {
        let attrs = TripAttributes {
            is_airport_pickup: true,
            ..Default::default()
        };

        let err = validate_request(&request(), &attrs).unwrap_err();
        assert_eq!(err, "flightNumber is required for airport pickups");

        let mut req = request();
        req.flight_number = Some("VY1234".to_string());
        assert!(validate_request(&req, &attrs).is_ok());
    }

    #[test]
    fn port_pickup_requires_port_info() {
        let attrs = TripAttributes {
            is_port_pickup: true,
            ..Default::default()
        };

        let err = validate_request(&request(), &attrs).unwrap_err();
        assert_eq!(err, "portInfo is required for port pickups");
    }

    #[test]
    fn scheduled_trip_requires_date_and_time() {
        let attrs = TripAttributes {
            timing: Timing::Scheduled,
            scheduled_date: Some("2025-03-10".to_string()),
            scheduled_time: None,
            ..Default::default()
        };

        let err = validate_request(&request(), &attrs).unwrap_err();
        assert_eq!(
            err,
            "scheduledDate and scheduledTime are required for scheduled trips"
        );
    }

    #[test]
    fn return_trip_requires_date_and_time() {
        let attrs = TripAttributes {
            needs_return_trip: true,
            ..Default::default()
        };

        let err = validate_request(&request(), &attrs).unwrap_err();
        assert_eq!(err, "returnDate and returnTime are required for return trips");

        let mut req = request();
        req.return_date = Some("2025-03-12".to_string());
        req.return_time = Some("10:00".to_string());
        assert!(validate_request(&req, &attrs).is_ok());
    }

    #[test]
    fn references_are_prefixed_and_unambiguous() {
        for _ in 0..50 {
            let reference = new_reference();
            assert!(reference.starts_with("TB-"));
            assert_eq!(reference.len(), 9);
            // 0, 1, I and O are excluded from the alphabet.
            assert!(!reference[3..].contains(['0', '1', 'I', 'O']));
        }
    }
}
