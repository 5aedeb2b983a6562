use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;

/// Lifetime of every issued token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Source of the current time for issuing and checking tokens.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: Uuid,
    /// Capability of the subject at issuance.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// The authenticated caller, attached to a request by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A token that is malformed, forged or expired. The cause is deliberately not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid token")]
pub struct InvalidToken;

impl From<InvalidToken> for AppError {
    fn from(_: InvalidToken) -> AppError {
        AppError::Unauthenticated("Please authenticate".into())
    }
}

/// Issues and verifies HS256 session tokens with a secret fixed at construction.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &str, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against our own clock, without leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Generates a token for `user_id` that expires one hour after issuance.
    /// `iat` and `exp` are whole seconds, so the lifetime counts from the start of
    /// the current second and may fall short of a full hour by under a second.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Valid iff the signature checks out and the current time is before `exp`.
    pub fn verify(&self, token: &str) -> Result<Identity, InvalidToken> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected token: {}", e);
                InvalidToken
            })?;

        if self.clock.now().timestamp() >= claims.exp {
            log::debug!("Rejected token: expired");
            return Err(InvalidToken);
        }

        Ok(Identity {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "test_secret_for_tokens";

    fn at(clock: DateTime<Utc>) -> TokenService {
        TokenService::with_clock(SECRET, Arc::new(FixedClock(clock)))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, Role::User).unwrap();
        let identity = tokens.verify(&token).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::User);
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_expiry_is_exactly_one_hour() {
        let user_id = Uuid::new_v4();
        let token = at(t0()).issue(user_id, Role::Admin).unwrap();

        let lifetime = Duration::seconds(TOKEN_LIFETIME_SECS);
        let just_before = t0() + lifetime - Duration::seconds(1);
        assert_eq!(at(just_before).verify(&token).unwrap().user_id, user_id);

        assert_eq!(at(t0() + lifetime).verify(&token), Err(InvalidToken));
        assert_eq!(
            at(t0() + Duration::hours(2)).verify(&token),
            Err(InvalidToken)
        );
    }

    #[test]
    fn test_lifetime_counts_whole_seconds() {
        let issued = t0() + Duration::milliseconds(700);
        let token = at(issued).issue(Uuid::new_v4(), Role::User).unwrap();

        let lifetime = Duration::seconds(TOKEN_LIFETIME_SECS);
        assert!(at(t0() + lifetime - Duration::milliseconds(1))
            .verify(&token)
            .is_ok());
        assert_eq!(at(t0() + lifetime).verify(&token), Err(InvalidToken));
    }

    #[test]
    fn test_claims_contents() {
        let token = at(t0()).issue(Uuid::new_v4(), Role::User).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_flipped_signature_character_is_invalid() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue(Uuid::new_v4(), Role::User).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        let index = signature_start + 5;
        let original = token.as_bytes()[index] as char;
        let replacement = if original == 'A' { 'B' } else { 'A' };
        let mut tampered = token.clone();
        tampered.replace_range(index..index + 1, &replacement.to_string());

        assert_ne!(tampered, token);
        assert_eq!(tokens.verify(&tampered), Err(InvalidToken));
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::new("a_completely_different_secret");
        let token = other.issue(Uuid::new_v4(), Role::Admin).unwrap();
        assert_eq!(TokenService::new(SECRET).verify(&token), Err(InvalidToken));
    }

    #[test]
    fn test_malformed_tokens() {
        let tokens = TokenService::new(SECRET);
        for token in ["", "abc", "a.b.c", "eyJhbGciOiJub25lIn0.e30."] {
            assert_eq!(tokens.verify(token), Err(InvalidToken), "token {:?}", token);
        }
    }

    #[test]
    fn test_all_failures_map_to_the_same_error() {
        let error: AppError = InvalidToken.into();
        match error {
            AppError::Unauthenticated(msg) => assert_eq!(msg, "Please authenticate"),
            other => panic!("Unexpected error: {:?}", other),
        }
    }
}
