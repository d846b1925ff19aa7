use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use taxi_booking_api::services::distance_service::DistanceService;
use taxi_booking_api::{db, routes};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let mongo_client = db::mongo::create_mongo_client(&mongo_uri).await;

    let stripe_key = std::env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
        log::warn!("STRIPE_SECRET_KEY not set; card payments will fail");
        String::new()
    });
    let stripe_client = Arc::new(stripe::Client::new(stripe_key));

    let distance_service = Arc::new(DistanceService::new(mongo_client.clone()));

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(mongo_client.clone()))
            .app_data(web::Data::new(stripe_client.clone()))
            .app_data(web::Data::new(distance_service.clone()))
            .route("/health", web::get().to(routes::health::health))
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/quote", web::post().to(routes::quote::create_quote))
                    .route("/pricing", web::get().to(routes::pricing::get_pricing))
                    .service(
                        web::scope("/bookings")
                            .route("", web::post().to(routes::bookings::create_booking))
                            .route("/{id}", web::get().to(routes::bookings::get_booking)),
                    )
                    .service(web::scope("/payment").route(
                        "/payment-intent",
                        web::post().to(routes::payment::create_payment_intent),
                    ))
                    // Admin routes (JWT-protected except login)
                    .configure(routes::admin::config),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
