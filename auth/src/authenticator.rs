use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::SessionClaim;
use crate::jwt::TokenError;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds the only copy of the signing keys; share it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,

    /// Instant after which the token no longer verifies
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator with default password hashing costs.
    ///
    /// # Arguments
    /// * `secret` - Secret key for token signing
    /// * `token_ttl` - Validity window of issued tokens
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_service: TokenService::new(secret, token_ttl),
        }
    }

    /// Replace the password hasher (e.g. with configured Argon2 costs).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Spend the same work as a password verification and discard the result.
    ///
    /// Used when there is no stored hash to check against, so that the caller
    /// takes about as long as it would for a wrong password.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.password_hasher.hash(password);
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `claim` - Session claim to sign on success
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match (or the hash is unreadable)
    /// * `Token` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        claim: &SessionClaim,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.generate_token(claim)?)
    }

    /// Issue a token without password verification.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn generate_token(&self, claim: &SessionClaim) -> Result<AuthenticationResult, TokenError> {
        let (access_token, expires_at) = self.token_service.sign(claim)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Validate a token and return its session claim.
    ///
    /// # Errors
    /// * `TokenError` - Token is malformed, tampered with, or expired
    pub fn validate_token(&self, token: &str) -> Result<SessionClaim, TokenError> {
        self.token_service.verify(token)
    }
}
