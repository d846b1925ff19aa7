use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::middleware::admin::ADMIN_ROLE;
use crate::middleware::auth::{jwt_secret, Claims};

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    auth_token: String,
}

/// Issues a 24h admin credential. Credentials come from the environment:
/// `ADMIN_USERNAME` and a bcrypt `ADMIN_PASSWORD_HASH`.
pub async fn login(input: web::Json<LoginInput>) -> impl Responder {
    let input = input.into_inner();

    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password_hash = match std::env::var("ADMIN_PASSWORD_HASH") {
        Ok(hash) => hash,
        Err(_) => {
            log::error!("ADMIN_PASSWORD_HASH not set; admin login disabled");
            return HttpResponse::InternalServerError().body("Admin login not configured");
        }
    };

    if input.username != username
        || !bcrypt::verify(&input.password, &password_hash).unwrap_or(false)
    {
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    match generate_token(&input.username) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
        Err(e) => {
            log::error!("Token generation failed: {}", e);
            HttpResponse::InternalServerError().body("Token generation failed")
        }
    }
}

pub fn generate_token(username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
}
