use actix_web::{test, web, App, HttpResponse};
use serde_json::json;

use taxi_booking_api::routes::health::health;

// Handlers that need MongoDB or Stripe are exercised through their service
// logic in unit tests; these mocks only pin down the public route shape.
async fn quote_created() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "quoteId": "7b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d",
        "fare": {
            "distanceKm": 5.0,
            "durationMin": 15,
            "baseFare": 2.50,
            "distanceFare": 5.00,
            "surcharges": 0.0,
            "total": 7.50
        },
        "roundTrip": false,
        "amountDue": 7.50,
        "estimated": true
    }))
}

async fn booking_created() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "bookingId": "65f0c0ffee0000000000aaaa",
        "reference": "TB-8K2QXN"
    }))
}

async fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))
}

#[actix_rt::test]
async fn health_endpoint_reports_ok() {
    let app = test::init_service(App::new().route("/health", web::get().to(health))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "OK");
}

#[actix_rt::test]
async fn quote_endpoint_returns_fare_and_quote_id() {
    let app = test::init_service(
        App::new().route("/api/quote", web::post().to(quote_created)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/quote")
        .set_json(json!({
            "passengerGroup": "4-or-less",
            "vehicleType": "standard",
            "hasLuggage": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["quoteId"].is_string());
    assert_eq!(body["fare"]["total"], 7.50);
    // A quote must carry the itemized breakdown, never a bare total.
    assert_eq!(body["fare"]["baseFare"], 2.50);
    assert_eq!(body["fare"]["distanceFare"], 5.00);
}

#[actix_rt::test]
async fn booking_creation_returns_reference() {
    let app = test::init_service(
        App::new().route("/api/bookings", web::post().to(booking_created)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(json!({
            "quoteId": "7b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d",
            "payment": { "method": "cash" },
            "contact": {
                "firstName": "Maria",
                "lastName": "Serra",
                "phone": "+34 600 000 000",
                "email": "maria@example.com"
            },
            "route": {
                "pickupAddress": "Carrer de Mallorca 401",
                "destinationAddress": "El Prat T1"
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["reference"].as_str().unwrap().starts_with("TB-"));
}

#[actix_rt::test]
async fn admin_surface_requires_a_token() {
    let app = test::init_service(
        App::new().service(
            web::scope("/api/admin")
                .route("/bookings", web::get().to(unauthorized))
                .route("/pricing", web::put().to(unauthorized)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::put()
        .uri("/api/admin/pricing")
        .set_json(json!({ "baseFare": 2.5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
