//! Authentication utilities library
//!
//! Provides the credential primitives used by the identity service:
//! - Password hashing (Argon2id, salted, PHC strings)
//! - Session token signing and verification (HS256 JWT)
//! - Authentication coordination
//!
//! The service defines its own ports and error types and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{SessionClaim, TokenService};
//! use chrono::Duration;
//!
//! let service = TokenService::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(1));
//! let claim = SessionClaim::new("user123");
//! let (token, _expires_at) = service.sign(&claim).unwrap();
//! let decoded: SessionClaim = service.verify(&token).unwrap();
//! assert_eq!(decoded, claim);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, SessionClaim};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let claim = SessionClaim::new("user123");
//! let result = auth.authenticate("password123", &hash, &claim).unwrap();
//!
//! // Later requests: validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.identity_id, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::SessionClaim;
pub use jwt::TokenError;
pub use jwt::TokenService;
pub use password::PasswordError;
pub use password::PasswordHasher;
