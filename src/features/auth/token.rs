//! Signed claims token for the auth cookie.
//!
//! HS256 with a configured secret. Verification failures are silent: a bad or
//! expired token simply authenticates as nobody.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Role};

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    first_name: String,
    last_name: String,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    /// Sign the user's public claims into a compact token
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user.user_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and recover the claims. Bad signature, tampering or
    /// expiry all return None.
    pub fn verify(&self, token: &str) -> Option<AuthenticatedUser> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).ok()?;

        Some(AuthenticatedUser {
            user_id: data.claims.sub,
            first_name: data.claims.first_name,
            last_name: data.claims.last_name,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Ames".into(),
            email: "alice@example.com".into(),
            role: Role::Contributor,
        }
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let service = TokenService::new("test-secret", 24);
        let token = service.issue(&alice()).unwrap();
        let user = service.verify(&token).expect("token should verify");
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::Contributor);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret-a", 24);
        let verifier = TokenService::new("secret-b", 24);
        let token = issuer.issue(&alice()).unwrap();
        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative TTL puts exp well past the default leeway
        let service = TokenService::new("test-secret", -2);
        let token = service.issue(&alice()).unwrap();
        assert!(service.verify(&token).is_none());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new("test-secret", 24);
        let mut token = service.issue(&alice()).unwrap();
        token.push('x');
        assert!(service.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new("test-secret", 24);
        assert!(service.verify("not.a.token").is_none());
        assert!(service.verify("").is_none());
    }
}
