use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceResponse},
    test, Error, HttpResponse,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use taxi_booking_api::middleware::auth::Claims;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Signs a token with an arbitrary role and expiry offset, so tests can
/// exercise the non-admin and expired paths as well as the happy one.
pub fn make_token(role: &str, expires_in_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "test-admin".to_string(),
        role: role.to_string(),
        iat: now as usize,
        exp: (now + expires_in_secs) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("failed to sign test token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Like `test::call_service`, but renders a service-level `Error` into the
/// HTTP response it would produce on a real server (the dispatcher does this
/// conversion in production), so middleware rejections can be asserted by
/// status code instead of panicking the harness.
pub async fn call_service<S, R, B>(app: &S, req: R) -> ServiceResponse<BoxBody>
where
    S: Service<R, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody + 'static,
{
    match app.call(req).await {
        Ok(resp) => resp.map_into_boxed_body(),
        Err(err) => ServiceResponse::new(
            test::TestRequest::default().to_http_request(),
            HttpResponse::from_error(err),
        ),
    }
}
