use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;

use crate::models::booking::{Booking, BookingStatus};
use crate::services::booking_service::{self, TransitionError};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

/// Dashboard listing, newest first, optionally filtered by lifecycle
/// status.
pub async fn list_bookings(
    mongo: web::Data<Arc<Client>>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let client = mongo.into_inner();

    let filter = match &query.status {
        Some(raw) => match raw.parse::<BookingStatus>() {
            Ok(status) => doc! { "status": status.as_str() },
            Err(e) => return HttpResponse::BadRequest().body(e),
        },
        None => doc! {},
    };

    let cursor = booking_service::collection(&client)
        .find(filter)
        .sort(doc! { "created_at": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(e) => {
                log::error!("Failed to read bookings: {}", e);
                HttpResponse::InternalServerError().body("Failed to retrieve bookings")
            }
        },
        Err(e) => {
            log::error!("Failed to query bookings: {}", e);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

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

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    status: BookingStatus,
}

/// Lifecycle transition. Only reachable behind the admin middleware; the
/// state machine and compare-and-swap live in the booking service.
pub async fn update_status(
    mongo: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<StatusInput>,
) -> impl Responder {
    let client = mongo.into_inner();
    let id = path.into_inner();

    let booking_id = match ObjectId::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };

    match booking_service::transition_status(&client, booking_id, input.status).await {
        Ok(booking) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "booking": booking,
        })),
        Err(TransitionError::NotFound) => HttpResponse::NotFound().body("Booking not found"),
        Err(TransitionError::InvalidTransition { from, to }) => HttpResponse::Conflict().json(
            serde_json::json!({ "error": format!("Cannot transition booking from {} to {}", from, to) }),
        ),
        Err(TransitionError::Conflict) => HttpResponse::Conflict()
            .body("Booking status changed concurrently; reload and retry"),
        Err(TransitionError::Database(e)) => {
            log::error!("Failed to update booking {} status: {}", id, e);
            HttpResponse::InternalServerError().body("Failed to update booking status")
        }
    }
}
