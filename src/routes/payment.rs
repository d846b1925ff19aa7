use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use serde::Deserialize;

use crate::routes::quote::find_valid_quote;
use crate::services::payment_service::{self, PaymentError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentInput {
    pub quote_id: String,
}

/// First step of the card flow: authorize the quoted amount with the
/// gateway. The booking itself is only created after this succeeds.
pub async fn create_payment_intent(
    mongo: web::Data<Arc<Client>>,
    stripe: web::Data<Arc<stripe::Client>>,
    input: web::Json<PaymentIntentInput>,
) -> impl Responder {
    let client = mongo.into_inner();
    let input = input.into_inner();

    let quote = match find_valid_quote(&client, &input.quote_id).await {
        Ok(quote) => quote,
        Err(resp) => return resp,
    };

    match payment_service::create_intent(stripe.as_ref(), quote.amount_due, &quote.id).await {
        Ok(intent) => HttpResponse::Ok().json(serde_json::json!({
            "paymentIntentId": intent.id.to_string(),
            "clientSecret": intent.client_secret,
            "amount": intent.amount,
        })),
        Err(PaymentError::Gateway(msg)) => {
            log::error!("Payment gateway failure creating intent: {}", msg);
            HttpResponse::BadGateway().body("Payment gateway unavailable")
        }
        Err(e) => {
            log::error!("Unexpected payment error creating intent: {}", e);
            HttpResponse::InternalServerError().body("Failed to create payment intent")
        }
    }
}
