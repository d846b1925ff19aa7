use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;

use crate::models::pricing::PricingConfig;
use crate::services::pricing_service::{self, SaveConfigError};

/// Current tariff with version metadata, for the configuration screen.
pub async fn get_config(mongo: web::Data<Arc<Client>>) -> impl Responder {
    let client = mongo.into_inner();

    match pricing_service::current_version(&client).await {
        Ok(Some(version)) => HttpResponse::Ok().json(serde_json::json!({
            "config": version.config,
            "createdAt": version.created_at.try_to_rfc3339_string().ok(),
            "isDefault": false,
        })),
        Ok(None) => HttpResponse::Ok().json(serde_json::json!({
            "config": PricingConfig::default(),
            "createdAt": null,
            "isDefault": true,
        })),
        Err(e) => {
            log::error!("Failed to fetch pricing configuration: {}", e);
            HttpResponse::InternalServerError().body("Failed to fetch pricing configuration")
        }
    }
}

/// Appends a new tariff version. The payload must carry the complete
/// field set; there are no partial updates.
pub async fn update_config(
    mongo: web::Data<Arc<Client>>,
    input: web::Json<PricingConfig>,
) -> impl Responder {
    let client = mongo.into_inner();

    match pricing_service::save_config(&client, input.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Pricing configuration updated",
        })),
        Err(SaveConfigError::Validation(message)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        Err(SaveConfigError::Database(e)) => {
            log::error!("Failed to store pricing configuration: {}", e);
            HttpResponse::InternalServerError().body("Failed to store pricing configuration")
        }
    }
}
