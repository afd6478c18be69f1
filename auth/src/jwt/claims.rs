use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Minimal session payload: the identity a token was issued for.
///
/// Serialized as the RFC 7519 `sub` claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaim {
    #[serde(rename = "sub")]
    pub identity_id: String,
}

impl SessionClaim {
    pub fn new(identity_id: impl ToString) -> Self {
        Self {
            identity_id: identity_id.to_string(),
        }
    }
}

/// Wire payload of a token: the caller's claim plus issue and expiry instants.
///
/// The claim's fields are flattened next to `iat` and `exp`, so a `SessionClaim`
/// produces `{"sub": "...", "iat": ..., "exp": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignedClaims<C> {
    #[serde(flatten)]
    pub claim: C,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl<C> SignedClaims<C> {
    /// Wrap a claim with an issue instant and a validity window.
    pub fn new(claim: C, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            claim,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Expiry as a UTC instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
