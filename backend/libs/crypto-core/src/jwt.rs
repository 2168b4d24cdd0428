//! Shared bearer-token module for the matching-platform core.
//!
//! Tokens are signed HMAC-SHA256 (HS256) carrying `{user_id, iat, exp, nbf}`,
//! per the access-token contract. Unlike Nova's original RS256-only
//! multi-service design, a single core process signs and validates its own
//! tokens, so a symmetric key is sufficient and avoids PEM key-pair
//! provisioning for a service that never hands validation to a peer.
//!
//! The signing secret is loaded once at startup (`initialize_jwt_secret`)
//! from the `JWT_HMAC_SECRET` environment variable (enforced to be at least
//! 32 bytes by the caller) and never touched again.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Access-token claims. Matches spec §4.4: `{user_id, iat, exp, nbf}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: user ID as a UUID string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

static ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize the HMAC signing/validation key from a raw secret. Must be
/// called once at startup before any `generate_*`/`validate_token` call.
pub fn initialize_jwt_secret(secret: &str) -> Result<()> {
    ENCODING_KEY
        .set(EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| anyhow!("JWT encoding key already initialized"))?;
    DECODING_KEY
        .set(DecodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;
    Ok(())
}

fn encoding_key() -> Result<&'static EncodingKey> {
    ENCODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT secret not initialized; call initialize_jwt_secret() at startup"))
}

fn decoding_key() -> Result<&'static DecodingKey> {
    DECODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT secret not initialized; call initialize_jwt_secret() at startup"))
}

/// Generate a bearer access token with the given TTL (seconds).
pub fn generate_access_token(user_id: Uuid, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
    };
    encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key()?)
        .map_err(|e| anyhow!("failed to sign access token: {e}"))
}

/// Validate a bearer token's signature, `exp`, and `nbf`.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    decode::<Claims>(token, decoding_key()?, &validation)
        .map_err(|e| anyhow!("token validation failed: {e}"))
}

pub fn get_user_id_from_token(token: &str) -> Result<Uuid> {
    let data = validate_token(token)?;
    Uuid::parse_str(&data.claims.sub).map_err(|e| anyhow!("invalid user_id in token: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    fn init() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            initialize_jwt_secret("test-secret-at-least-32-bytes-long!!").unwrap();
        });
    }

    #[test]
    fn round_trips_user_id() {
        init();
        let uid = Uuid::new_v4();
        let token = generate_access_token(uid, 3600).unwrap();
        let recovered = get_user_id_from_token(&token).unwrap();
        assert_eq!(uid, recovered);
    }

    #[test]
    fn rejects_expired_token() {
        init();
        let uid = Uuid::new_v4();
        let token = generate_access_token(uid, -1).unwrap();
        assert!(validate_token(&token).is_err());
    }

    #[test]
    fn rejects_tampered_signature() {
        init();
        let uid = Uuid::new_v4();
        let mut token = generate_access_token(uid, 3600).unwrap();
        token.push('x');
        assert!(validate_token(&token).is_err());
    }
}
