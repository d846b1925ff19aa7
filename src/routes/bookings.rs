use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use bson::{oid::ObjectId, DateTime};
use mongodb::Client;

use crate::models::booking::{Booking, BookingRequest, BookingStatus, Payment, PaymentStatus};
use crate::routes::quote::find_valid_quote;
use crate::services::booking_service;
use crate::services::payment_service::{self, PaymentError};

/// Creates a booking from a server-stored quote.
///
/// Cash bookings are persisted immediately with payment pending. Card
/// bookings are the second step of a two-step flow: the payment intent
/// must already be authorized for exactly the quoted amount.
pub async fn create_booking(
    mongo: web::Data<Arc<Client>>,
    stripe: web::Data<Arc<stripe::Client>>,
    input: web::Json<BookingRequest>,
) -> impl Responder {
    let client = mongo.into_inner();
    let input = input.into_inner();

    let quote = match find_valid_quote(&client, &input.quote_id).await {
        Ok(quote) => quote,
        Err(resp) => return resp,
    };

    if let Err(message) = booking_service::validate_request(&input, &quote.attrs) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
    }

    let payment_status = match &input.payment {
        Payment::Cash => PaymentStatus::Pending,
        Payment::Card { payment_intent_id } => {
            match payment_service::verify_payment(stripe.as_ref(), payment_intent_id, quote.amount_due)
                .await
            {
                Ok(_) => PaymentStatus::Paid,
                Err(PaymentError::Gateway(msg)) => {
                    log::error!("Payment gateway failure verifying {}: {}", payment_intent_id, msg);
                    return HttpResponse::BadGateway().body("Payment gateway unavailable");
                }
                Err(e) => {
                    log::warn!("Rejected card booking: {}", e);
                    return HttpResponse::BadRequest()
                        .json(serde_json::json!({ "error": e.to_string() }));
                }
            }
        }
    };

    let now = DateTime::now();
    let booking = Booking {
        id: None,
        reference: booking_service::new_reference(),
        contact: input.contact,
        route: input.route,
        attrs: quote.attrs.clone(),
        fare: quote.fare.clone(),
        amount_due: quote.amount_due,
        quote_id: quote.id.clone(),
        payment: input.payment,
        payment_status,
        status: BookingStatus::Pending,
        flight_number: input.flight_number,
        port_info: input.port_info,
        return_date: input.return_date,
        return_time: input.return_time,
        observations: input.observations,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match booking_service::collection(&client).insert_one(&booking).await {
        Ok(result) => {
            let booking_id = result
                .inserted_id
                .as_object_id()
                .map(|id| id.to_string())
                .unwrap_or_default();

            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "bookingId": booking_id,
                "reference": booking.reference,
                "fare": booking.fare,
                "amountDue": booking.amount_due,
            }))
        }
        Err(e) => {
            // A charged customer must never be left without a recorded
            // booking; the intent id goes into the log for reconciliation.
            if let Some(intent_id) = booking.payment.payment_intent_id() {
                log::error!(
                    "Booking persistence failed after payment {} was verified (quote {}): {}",
                    intent_id,
                    booking.quote_id,
                    e
                );
            } else {
                log::error!("Booking persistence failed (quote {}): {}", booking.quote_id, e);
            }
            HttpResponse::InternalServerError()
                .body("Failed to save booking; please retry")
        }
    }
}

/// Confirmation-page lookup.
pub async fn get_booking(
    mongo: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = mongo.into_inner();
    let id = path.into_inner();

    let booking_id = match ObjectId::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };

    match booking_service::find_by_id(&client, booking_id).await {
        Ok(Some(booking)) => HttpResponse::Ok().json(booking),
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(e) => {
            log::error!("Failed to fetch booking {}: {}", id, e);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}
