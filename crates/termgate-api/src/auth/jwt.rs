//! JWT issuing and validation
//!
//! Bearer tokens carry the gateway username; validation uses the
//! jsonwebtoken crate with a leeway for clock skew.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT authentication errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Missing JWT token")]
    MissingToken,

    #[error("Invalid token format (expected 'Bearer <token>')")]
    InvalidFormat,

    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    #[error("Token has expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (the gateway username)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: u64,

    /// Expiration time (Unix timestamp)
    pub exp: u64,

    /// Username, duplicated for response payloads
    pub username: String,
}

/// JWT sign/validate service for the gateway's single HMAC secret.
pub struct JwtAuth {
    secret: String,
    expiry_hours: i64,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 60; // 60 seconds leeway for clock skew

        Self {
            secret,
            expiry_hours,
            validation,
        }
    }

    /// Issue a signed token for the given username.
    pub fn sign(&self, username: &str) -> Result<(String, Claims), JwtError> {
        let now = chrono::Utc::now();
        let expires = now + chrono::Duration::hours(self.expiry_hours);
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp() as u64,
            exp: expires.timestamp() as u64,
            username: username.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::Signing(e.to_string()))?;
        Ok((token, claims))
    }

    /// Validate a raw token (without the "Bearer " prefix) and return its
    /// claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation,
        )
        .map_err(|e| {
            if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) {
                JwtError::Expired
            } else {
                JwtError::InvalidSignature(e.to_string())
            }
        })?;
        Ok(token_data.claims)
    }

    /// Extract the token from an Authorization header value.
    pub fn extract_token(auth_header: &str) -> Result<&str, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(JwtError::InvalidFormat)?;
        if token.is_empty() {
            return Err(JwtError::MissingToken);
        }
        Ok(token)
    }

    /// Configured token lifetime in hours.
    pub fn expiry_hours(&self) -> i64 {
        self.expiry_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_validate_round_trips() {
        let auth = JwtAuth::new("test-secret".to_string(), 8);
        let (token, claims) = auth.sign("operator").unwrap();
        assert_eq!(claims.username, "operator");

        let validated = auth.validate_token(&token).unwrap();
        assert_eq!(validated.sub, "operator");
        assert_eq!(validated.username, "operator");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = JwtAuth::new("secret-one".to_string(), 8);
        let verifier = JwtAuth::new("secret-two".to_string(), 8);
        let (token, _) = signer.sign("operator").unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtError::InvalidSignature(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative expiry puts exp beyond the leeway in the past.
        let auth = JwtAuth::new("test-secret".to_string(), -1);
        let (token, _) = auth.sign("operator").unwrap();
        assert!(matches!(auth.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn extract_token_requires_bearer_prefix() {
        assert_eq!(JwtAuth::extract_token("Bearer abc").unwrap(), "abc");
        assert!(matches!(
            JwtAuth::extract_token("Basic abc"),
            Err(JwtError::InvalidFormat)
        ));
        assert!(matches!(
            JwtAuth::extract_token("Bearer "),
            Err(JwtError::MissingToken)
        ));
    }
}
