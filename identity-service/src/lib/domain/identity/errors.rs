use thiserror::Error;

/// Error for IdentityId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Name is required")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Please include a valid email: {0}")]
    InvalidFormat(String),
}

/// Error for password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Please enter a password with {min} or more characters")]
    TooShort { min: usize },

    #[error("Password too long: maximum {max} characters")]
    TooLong { max: usize },
}

/// Failures reported by an identity repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// A unique key (the email) is already taken.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The store could not be reached or the operation failed.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A stored record no longer satisfies the domain rules. Retrying will not help.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Errors of the registration and login flows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("User with this email already exists")]
    DuplicateIdentity,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity not found: {0}")]
    NotFound(String),

    /// Transient repository failure; the only kind worth retrying.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for IdentityError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateKey(_) => IdentityError::DuplicateIdentity,
            RepositoryError::Unavailable(msg) => IdentityError::Storage(msg),
            RepositoryError::Corrupt(msg) => IdentityError::Internal(msg),
        }
    }
}

impl From<auth::PasswordError> for IdentityError {
    fn from(err: auth::PasswordError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}

impl From<auth::TokenError> for IdentityError {
    fn from(err: auth::TokenError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}

impl From<auth::AuthenticationError> for IdentityError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => IdentityError::InvalidCredentials,
            auth::AuthenticationError::Token(e) => e.into(),
        }
    }
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(err: tokio::task::JoinError) -> Self {
        IdentityError::Internal(format!("Blocking task failed: {}", err))
    }
}

/// Errors that stop a protected request before its handler runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No token was presented.
    #[error("No token, authorization denied")]
    Unauthenticated,

    /// A token was presented but is invalid, expired, or names a missing identity.
    #[error("Token is not valid")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Corrupt(msg) => AuthError::Internal(msg),
            other => AuthError::Storage(other.to_string()),
        }
    }
}
