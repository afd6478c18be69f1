use async_trait::async_trait;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::IssuedToken;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::NewIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::identity::errors::AuthError;
use crate::identity::errors::IdentityError;
use crate::identity::errors::RepositoryError;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// Does not issue a token; clients log in separately.
    ///
    /// # Arguments
    /// * `command` - Validated command containing name, email, and password
    ///
    /// # Returns
    /// Created identity entity
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `Storage` - Repository operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Identity, IdentityError>;

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Storage` - Repository operation failed
    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, IdentityError>;

    /// Resolve the identity a bearer token was issued for.
    ///
    /// Performs exactly one repository lookup.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is malformed, tampered with, expired, or its identity is gone
    /// * `Storage` - Repository operation failed
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;

    /// Retrieve identity by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `Storage` - Repository operation failed
    async fn get_identity(&self, id: &IdentityId) -> Result<Identity, IdentityError>;
}

/// Persistence operations for the identity aggregate.
///
/// Implementations must enforce email uniqueness atomically: of two concurrent
/// inserts with the same email, exactly one succeeds.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Persist a new identity and assign its id.
    ///
    /// # Errors
    /// * `DuplicateKey` - Email is already registered
    /// * `Unavailable` - Storage operation failed
    async fn insert(&self, identity: NewIdentity) -> Result<IdentityId, RepositoryError>;

    /// Retrieve identity by identifier.
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, RepositoryError>;

    /// Retrieve identity by normalized email address.
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, RepositoryError>;
}
