use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use bson::DateTime;
use mongodb::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::booking::{Coordinates, TripAttributes};
use crate::models::quote::{Quote, QUOTE_TTL_MINUTES};
use crate::services::distance_service::DistanceService;
use crate::services::fare_service::{self, FareError};
use crate::services::pricing_service;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub pickup_coords: Option<Coordinates>,
    #[serde(default)]
    pub destination_coords: Option<Coordinates>,
    #[serde(flatten)]
    pub attrs: TripAttributes,
}

/// Computes and stores a fare quote. The quote id is the only thing the
/// client ever hands back; totals are never accepted from the outside.
pub async fn create_quote(
    mongo: web::Data<Arc<Client>>,
    distance: web::Data<Arc<DistanceService>>,
    input: web::Json<QuoteRequest>,
) -> impl Responder {
    let client = mongo.into_inner();
    let input = input.into_inner();

    // A broken tariff refuses to quote; it never silently prices at zero.
    let config = match pricing_service::current_config(&client).await {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load pricing configuration: {}", e);
            return HttpResponse::InternalServerError().body("Pricing configuration unavailable");
        }
    };

    let estimate = distance
        .distance_or_fallback(input.pickup_coords, input.destination_coords)
        .await;

    let fare = match fare_service::compute_fare(
        estimate.distance_km,
        estimate.duration_min,
        &input.attrs,
        &config,
    ) {
        Ok(fare) => fare,
        Err(FareError::InvalidAttributes(msg)) => {
            return HttpResponse::BadRequest().body(msg);
        }
        Err(FareError::InvalidConfiguration(msg)) => {
            log::error!("Refusing to quote with invalid configuration: {}", msg);
            return HttpResponse::InternalServerError().body("Pricing configuration unavailable");
        }
    };

    let round_trip = input.attrs.needs_return_trip;
    let amount_due = fare_service::amount_due(&fare, round_trip);

    let now = DateTime::now();
    let quote = Quote {
        id: Uuid::new_v4().to_string(),
        attrs: input.attrs,
        pickup_coords: input.pickup_coords,
        destination_coords: input.destination_coords,
        fare,
        round_trip,
        amount_due,
        estimated: estimate.estimated,
        created_at: now,
        expires_at: DateTime::from_millis(now.timestamp_millis() + QUOTE_TTL_MINUTES * 60 * 1000),
    };

    let collection: mongodb::Collection<Quote> = client
        .database(crate::db::mongo::DB_NAME)
        .collection("Quotes");

    match collection.insert_one(&quote).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "quoteId": quote.id,
            "fare": quote.fare,
            "roundTrip": quote.round_trip,
            "amountDue": quote.amount_due,
            "estimated": quote.estimated,
            "expiresAt": quote.expires_at.try_to_rfc3339_string().ok(),
        })),
        Err(e) => {
            log::error!("Failed to store quote: {}", e);
            HttpResponse::InternalServerError().body("Failed to store quote")
        }
    }
}

/// Loads a quote and enforces its expiry window.
pub async fn find_valid_quote(client: &Client, quote_id: &str) -> Result<Quote, HttpResponse> {
    let collection: mongodb::Collection<Quote> = client
        .database(crate::db::mongo::DB_NAME)
        .collection("Quotes");

    match collection
        .find_one(bson::doc! { "_id": quote_id })
        .await
    {
        Ok(Some(quote)) if quote.is_expired() => {
            Err(HttpResponse::BadRequest().body("Quote has expired; request a new one"))
        }
        Ok(Some(quote)) => Ok(quote),
        Ok(None) => Err(HttpResponse::BadRequest().body("Unknown quote")),
        Err(e) => {
            log::error!("Failed to fetch quote {}: {}", quote_id, e);
            Err(HttpResponse::InternalServerError().body("Failed to fetch quote"))
        }
    }
}
