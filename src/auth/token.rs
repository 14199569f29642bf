//! Signed session credentials.
//!
//! A session token is a compact HS256 JWT carrying the account id and
//! username, bounded by an expiry instant. Verification distinguishes a
//! missing credential from a tampered one and from one that has merely
//! aged out, so the caller can surface an explicit "session expired"
//! signal instead of a generic rejection.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaim {
    /// Account id of the authenticated user.
    pub sub: i32,

    pub username: String,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiry instant, seconds since the epoch. The token is rejected
    /// from this second onward.
    pub exp: i64,
}

/// Verification outcomes that are not a valid claim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("No credential presented")]
    Missing,

    #[error("Credential rejected")]
    Invalid,

    #[error("Credential expired")]
    Expired,
}

/// Paired signing and verification keys derived from one HMAC secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues signed session tokens with a fixed lifetime.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: TokenKeys,
    ttl_seconds: i64,
}

impl TokenIssuer {
    #[must_use]
    pub const fn new(keys: TokenKeys, ttl_seconds: i64) -> Self {
        Self { keys, ttl_seconds }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token for the given account, valid from now for the
    /// configured lifetime.
    pub fn issue(&self, account_id: i32, username: &str) -> anyhow::Result<String> {
        self.issue_at(account_id, username, Utc::now())
    }

    /// Sign a token as of a caller-supplied instant. Exposed so expiry
    /// behavior can be tested without sleeping.
    pub fn issue_at(
        &self,
        account_id: i32,
        username: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        let claims = SessionClaim {
            sub: account_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign session token: {e}"))
    }
}

/// Verifies session tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: TokenKeys,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(keys: TokenKeys) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared manually in verify_at so that a token is
        // rejected from exactly its expiry second, with no leeway.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self { keys, validation }
    }

    /// Verify a credential as presented by a request.
    ///
    /// # Errors
    ///
    /// [`VerifyError::Missing`] when no token was presented,
    /// [`VerifyError::Invalid`] when the token is malformed or fails the
    /// signature check, [`VerifyError::Expired`] when it is authentic but
    /// past its expiry.
    pub fn verify(&self, token: Option<&str>) -> Result<SessionClaim, VerifyError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify against a caller-supplied clock. Exposed so the expiry
    /// boundary can be tested exactly.
    pub fn verify_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SessionClaim, VerifyError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(VerifyError::Missing)?;

        let data = decode::<SessionClaim>(token, &self.keys.decoding, &self.validation)
            .map_err(|_| VerifyError::Invalid)?;

        if now.timestamp() >= data.claims.exp {
            return Err(VerifyError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const TTL: i64 = 4 * 60 * 60;

    fn pair(secret: &str) -> (TokenIssuer, TokenVerifier) {
        let keys = TokenKeys::from_secret(secret);
        (TokenIssuer::new(keys.clone(), TTL), TokenVerifier::new(keys))
    }

    #[test]
    fn test_round_trip() {
        let (issuer, verifier) = pair("test-secret");

        let token = issuer.issue(42, "alice").unwrap();
        let claim = verifier.verify(Some(&token)).unwrap();

        assert_eq!(claim.sub, 42);
        assert_eq!(claim.username, "alice");
        assert_eq!(claim.exp - claim.iat, TTL);
    }

    #[test]
    fn test_missing_credential() {
        let (_, verifier) = pair("test-secret");

        assert_eq!(verifier.verify(None), Err(VerifyError::Missing));
        assert_eq!(verifier.verify(Some("")), Err(VerifyError::Missing));
    }

    #[test]
    fn test_expiry_boundary_is_exact() {
        let (issuer, verifier) = pair("test-secret");

        let issued = Utc::now();
        let token = issuer.issue_at(1, "alice", issued).unwrap();

        // One second before expiry the token is still good.
        let just_before = issued + Duration::seconds(TTL - 1);
        assert!(verifier.verify_at(Some(&token), just_before).is_ok());

        // At exactly the expiry instant it is already expired.
        let at_expiry = issued + Duration::seconds(TTL);
        assert_eq!(
            verifier.verify_at(Some(&token), at_expiry),
            Err(VerifyError::Expired)
        );

        let well_past = issued + Duration::seconds(TTL + 3600);
        assert_eq!(
            verifier.verify_at(Some(&token), well_past),
            Err(VerifyError::Expired)
        );
    }

    #[test]
    fn test_any_single_byte_tamper_is_rejected() {
        let (issuer, verifier) = pair("test-secret");
        let token = issuer.issue(7, "mallory").unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] ^= 0x01;
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                verifier.verify(Some(&tampered)),
                Err(VerifyError::Invalid),
                "tampered byte {i} was accepted"
            );
        }
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let (issuer, _) = pair("secret-a");
        let (_, other_verifier) = pair("secret-b");

        let token = issuer.issue(1, "alice").unwrap();
        assert_eq!(
            other_verifier.verify(Some(&token)),
            Err(VerifyError::Invalid)
        );
    }
}
