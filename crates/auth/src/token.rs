//! HS256 token mint/validate on top of the claims model.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("token is invalid or tampered with")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Mints and validates caller tokens.
///
/// Trait seam so the HTTP middleware does not care which algorithm or key
/// source is in use.
pub trait TokenAuthority: Send + Sync {
    fn mint(&self, claims: &JwtClaims) -> Result<String, TokenError>;
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Symmetric-key HS256 implementation.
pub struct Hs256TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenAuthority {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl TokenAuthority for Hs256TokenAuthority {
    fn mint(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Time-window checks are done by `validate_claims` against our own
        // RFC3339 timestamps, not the numeric `exp` claim.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use stockflow_core::UserId;

    use crate::Role;

    use super::*;

    fn claims_for(window: Duration) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            username: "hamza".to_string(),
            role: Role::new("admin"),
            issued_at: now - Duration::minutes(1),
            expires_at: now - Duration::minutes(1) + window,
        }
    }

    #[test]
    fn mint_validate_round_trip() {
        let authority = Hs256TokenAuthority::new(b"test-secret");
        let claims = claims_for(Duration::days(7));

        let token = authority.mint(&claims).unwrap();
        let decoded = authority.validate(&token, Utc::now()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_wrong_key_and_expired_window() {
        let authority = Hs256TokenAuthority::new(b"test-secret");
        let other = Hs256TokenAuthority::new(b"other-secret");

        let token = authority.mint(&claims_for(Duration::days(7))).unwrap();
        assert_eq!(other.validate(&token, Utc::now()).unwrap_err(), TokenError::Invalid);

        let stale = authority.mint(&claims_for(Duration::seconds(30))).unwrap();
        assert!(matches!(
            authority.validate(&stale, Utc::now() + Duration::hours(1)).unwrap_err(),
            TokenError::Claims(TokenValidationError::Expired)
        ));
    }
}
