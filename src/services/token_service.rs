//! Token service - issues and verifies signed identity tokens.
//!
//! Tokens are HS256 JWTs carrying the subject id and role. Verification
//! is stateless: signature, `nbf` and `exp` decide validity, with no
//! leeway. Every failure collapses to `None` for callers; the concrete
//! reason only reaches the logs.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Identity recovered from a valid token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: UserRole,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_hours: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_hours,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jwt_secret_bytes(), config.jwt_expiration_hours)
    }

    /// Sign a token for `subject_id` valid from now until the configured TTL.
    pub fn issue(&self, subject_id: Uuid, role: UserRole) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::internal(format!("Token lifetime of {}h is out of range", self.ttl_hours))
            })?;

        let claims = Claims {
            sub: subject_id,
            role,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        self.sign(&claims)
    }

    /// Check signature and time bounds, returning the embedded identity.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(Identity {
                id: data.claims.sub,
                role: data.claims.role,
            }),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::warn!("Rejected token: expired"),
                    ErrorKind::ImmatureSignature => {
                        tracing::warn!("Rejected token: not yet valid")
                    }
                    ErrorKind::InvalidSignature => {
                        tracing::warn!("Rejected token: signature mismatch")
                    }
                    other => tracing::warn!("Rejected token: malformed ({:?})", other),
                }
                None
            }
        }
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret-with-enough-length!";

    fn service() -> TokenService {
        TokenService::new(SECRET, 24)
    }

    fn claims_at(offset_nbf: i64, offset_exp: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            role: UserRole::User,
            iat: now,
            nbf: now + offset_nbf,
            exp: now + offset_exp,
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let tokens = service();
        let id = Uuid::new_v4();

        let token = tokens.issue(id, UserRole::Admin).unwrap();
        let identity = tokens.verify(&token).unwrap();

        assert_eq!(identity, Identity { id, role: UserRole::Admin });
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens.sign(&claims_at(-7200, -60)).unwrap();

        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn test_immature_token_rejected() {
        let tokens = service();
        let token = tokens.sign(&claims_at(3600, 7200)).unwrap();

        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = TokenService::new(b"another-secret-entirely-different!!", 24);
        let token = other.issue(Uuid::new_v4(), UserRole::User).unwrap();

        assert!(service().verify(&token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service().verify("not.a.jwt").is_none());
        assert!(service().verify("").is_none());
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        for ttl in [i64::MAX, 10_000_000_000] {
            let tokens = TokenService::new(SECRET, ttl);
            let result = tokens.issue(Uuid::new_v4(), UserRole::User);
            assert!(matches!(result, Err(AppError::Internal(_))), "ttl {}", ttl);
        }
    }
}
