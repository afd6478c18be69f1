use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::SignedClaims;
use super::errors::TokenError;

/// Signs claims into bearer tokens and verifies presented tokens.
///
/// Tokens are HS256 JWTs. The secret is fixed at construction and shared read-only
/// by every concurrent `sign`/`verify` call; replacing it invalidates all tokens
/// issued with the previous one.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a new token service.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `ttl` - How long an issued token stays valid
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Sign a claim, issued now.
    ///
    /// # Returns
    /// Token string and its expiry instant
    ///
    /// # Errors
    /// * `EncodingFailed` - The claim could not be serialized or signed
    pub fn sign<C: Serialize>(&self, claim: &C) -> Result<(String, DateTime<Utc>), TokenError> {
        self.sign_at(claim, Utc::now())
    }

    /// Sign a claim with an explicit issue instant.
    ///
    /// # Errors
    /// * `EncodingFailed` - The claim could not be serialized or signed
    pub fn sign_at<C: Serialize>(
        &self,
        claim: &C,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let signed = SignedClaims::new(claim, issued_at, self.ttl);
        let expires_at = signed.expires_at();

        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding_key)
            .map(|token| (token, expires_at))
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return the claim it carries.
    ///
    /// The signature is checked before anything in the payload is trusted.
    ///
    /// # Errors
    /// * `InvalidSignature` - Payload or signature were altered, or another secret signed it
    /// * `Expired` - The current time is past the embedded expiry
    /// * `Malformed` - The token cannot be decoded
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        decode::<SignedClaims<C>>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.claim)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}
