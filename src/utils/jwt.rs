use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use crate::errors::AppError;

pub const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Always "admin"; there is no per-user identity
    pub exp: usize,  // Expiration timestamp
}

pub fn generate_token(secret: &[u8], ttl_secs: i64) -> Result<String, AppError> {
    let expiration = chrono::Duration::try_seconds(ttl_secs)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| AppError::InternalServerError(format!("Session lifetime {}s is out of range", ttl_secs)))?
        .timestamp() as usize;

    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: expiration,
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
        .map_err(|err| AppError::InternalServerError(format!("Token generation error: {}", err)))
}

pub fn validate_token(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
}
