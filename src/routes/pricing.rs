use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;

use crate::services::pricing_service;

/// Current tariff. Public: the reservation form prices trips client-side
/// for display, but the binding quote is always computed server-side.
pub async fn get_pricing(mongo: web::Data<Arc<Client>>) -> impl Responder {
    let client = mongo.into_inner();

    match pricing_service::current_config(&client).await {
        Ok(config) => HttpResponse::Ok().json(config),
        Err(e) => {
            log::error!("Failed to fetch pricing configuration: {}", e);
            HttpResponse::InternalServerError().body("Failed to fetch pricing configuration")
        }
    }
}
