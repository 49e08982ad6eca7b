use crate::domain::entities::TokenInfo;
use crate::domain::ports::clock::Clock;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_seconds,
            clock,
        }
    }

    pub fn issue(&self, user_id: &str) -> ApiResult<TokenInfo> {
        let now = self.clock.unix_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_seconds,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(TokenInfo {
            token,
            expires_in: self.ttl_seconds,
            issued_at: now,
        })
    }

    /// Returns the user id of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> ApiResult<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            ApiError::Unauthorized
        })?;

        if data.claims.exp <= self.clock.unix_timestamp() {
            return Err(ApiError::Unauthorized);
        }

        Ok(data.claims.sub)
    }
}
