use actix_web::web;

use crate::middleware::admin::RequireAdmin;
use crate::middleware::auth::AuthMiddleware;

pub mod auth;
pub mod bookings;
pub mod pricing;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(auth::login))
            .service(
                // AuthMiddleware validates the token and must run before
                // the role check, so it is the outer wrap.
                web::scope("")
                    .wrap(RequireAdmin)
                    .wrap(AuthMiddleware)
                    .route("/bookings", web::get().to(bookings::list_bookings))
                    .route("/bookings/{id}", web::get().to(bookings::get_booking))
                    .route(
                        "/bookings/{id}/status",
                        web::patch().to(bookings::update_status),
                    )
                    .route("/pricing", web::get().to(pricing::get_config))
                    .route("/pricing", web::put().to(pricing::update_config)),
            ),
    );
}
