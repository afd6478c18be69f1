use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::SessionClaim;
use chrono::Utc;

use crate::domain::identity::models::AvatarUrl;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::IssuedToken;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::NewIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::identity::errors::AuthError;
use crate::identity::errors::IdentityError;
use crate::identity::ports::IdentityRepository;
use crate::identity::ports::IdentityServicePort;

/// Domain service implementation for registration, login and token authentication.
///
/// Password hashing runs on tokio's blocking pool so that the Argon2 cost never
/// stalls the async workers.
pub struct IdentityService<R>
where
    R: IdentityRepository,
{
    repository: Arc<R>,
    authenticator: Arc<Authenticator>,
}

impl<R> IdentityService<R>
where
    R: IdentityRepository,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `authenticator` - Password hasher and token signer
    pub fn new(repository: Arc<R>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<R> IdentityServicePort for IdentityService<R>
where
    R: IdentityRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Identity, IdentityError> {
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            tracing::info!("Registration rejected: email already registered");
            return Err(IdentityError::DuplicateIdentity);
        }

        let avatar_url = AvatarUrl::gravatar(&command.email);

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let password_hash =
            tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
                .await??;

        let new_identity = NewIdentity {
            name: command.name,
            email: command.email,
            password_hash,
            avatar_url,
            created_at: Utc::now(),
        };

        // The repository's unique constraint settles concurrent registrations
        let id = self.repository.insert(new_identity.clone()).await?;
        tracing::info!(identity_id = %id, "Identity registered");

        Ok(new_identity.with_id(id))
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, IdentityError> {
        let identity = self.repository.find_by_email(&command.email).await?;
        let identity_id = identity.as_ref().map(|identity| identity.id);

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let result = tokio::task::spawn_blocking(move || match identity {
            Some(identity) => authenticator.authenticate(
                &password,
                &identity.password_hash,
                &SessionClaim::new(identity.id),
            ),
            None => {
                authenticator.verify_decoy(&password);
                Err(AuthenticationError::InvalidCredentials)
            }
        })
        .await?;

        match result {
            Ok(issued) => {
                if let Some(id) = identity_id {
                    tracing::info!(identity_id = %id, "Session token issued");
                }
                Ok(issued.into())
            }
            Err(e) => {
                tracing::info!("Login rejected");
                Err(e.into())
            }
        }
    }

    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claim = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(reason = %e, "Token verification failed");
            AuthError::Unauthorized
        })?;

        let id = IdentityId::from_string(&claim.identity_id).map_err(|e| {
            tracing::warn!(error = %e, "Token subject is not an identity id");
            AuthError::Unauthorized
        })?;

        self.repository.find_by_id(&id).await?.ok_or_else(|| {
            tracing::warn!(identity_id = %id, "Token subject no longer exists");
            AuthError::Unauthorized
        })
    }

    async fn get_identity(&self, id: &IdentityId) -> Result<Identity, IdentityError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;
    use auth::TokenService;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::identity::models::DisplayName;
    use crate::domain::identity::models::EmailAddress;
    use crate::domain::identity::models::Password;
    use crate::identity::errors::RepositoryError;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestIdentityRepository {}

        #[async_trait]
        impl IdentityRepository for TestIdentityRepository {
            async fn insert(&self, identity: NewIdentity) -> Result<IdentityId, RepositoryError>;
            async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, RepositoryError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, RepositoryError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::new(SECRET, Duration::hours(24))
                .with_password_hasher(PasswordHasher::with_params(1024, 1, 1).unwrap()),
        )
    }

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value.to_string()).unwrap()
    }

    fn register_command(address: &str, password: &str) -> RegisterCommand {
        RegisterCommand::new(
            DisplayName::new("A".to_string()).unwrap(),
            email(address),
            Password::new(password.to_string()).unwrap(),
        )
    }

    fn stored_identity(authenticator: &Authenticator, address: &str, password: &str) -> Identity {
        let email = email(address);
        NewIdentity {
            name: DisplayName::new("A".to_string()).unwrap(),
            avatar_url: AvatarUrl::gravatar(&email),
            email,
            password_hash: authenticator.hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
        .with_id(IdentityId::new())
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestIdentityRepository::new();
        let assigned_id = IdentityId::new();

        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "a@b.com")
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_insert()
            .withf(|identity| {
                identity.email.as_str() == "a@b.com"
                    && identity.name.as_str() == "A"
                    && identity.password_hash.starts_with("$argon2id$")
                    && identity.password_hash != "secret1"
                    && identity
                        .avatar_url
                        .as_str()
                        .starts_with("https://www.gravatar.com/avatar/")
            })
            .times(1)
            .returning(move |_| Ok(assigned_id));

        let authenticator = authenticator();
        let service = IdentityService::new(Arc::new(repository), Arc::clone(&authenticator));

        let identity = service
            .register(register_command("a@b.com", "secret1"))
            .await
            .expect("registration failed");

        assert_eq!(identity.id, assigned_id);
        assert!(authenticator.verify_password("secret1", &identity.password_hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestIdentityRepository::new();
        let authenticator = authenticator();
        let existing = stored_identity(&authenticator, "a@b.com", "secret1");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_insert().times(0);

        let service = IdentityService::new(Arc::new(repository), authenticator);

        let result = service.register(register_command("a@b.com", "secret2")).await;
        assert_eq!(result.unwrap_err(), IdentityError::DuplicateIdentity);
    }

    #[tokio::test]
    async fn test_register_loses_insert_race() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_insert()
            .times(1)
            .returning(|identity| Err(RepositoryError::DuplicateKey(identity.email.to_string())));

        let service = IdentityService::new(Arc::new(repository), authenticator());

        let result = service.register(register_command("a@b.com", "secret1")).await;
        assert_eq!(result.unwrap_err(), IdentityError::DuplicateIdentity);
    }

    #[tokio::test]
    async fn test_register_storage_unavailable() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("connection refused".to_string())));
        repository.expect_insert().times(0);

        let service = IdentityService::new(Arc::new(repository), authenticator());

        let result = service.register(register_command("a@b.com", "secret1")).await;
        assert!(matches!(result.unwrap_err(), IdentityError::Storage(_)));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_identity() {
        let mut repository = MockTestIdentityRepository::new();
        let authenticator = authenticator();
        let identity = stored_identity(&authenticator, "a@b.com", "secret1");
        let identity_id = identity.id;

        let by_email = identity.clone();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(by_email.clone())));
        repository
            .expect_find_by_id()
            .withf(move |id| *id == identity_id)
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));

        let service = IdentityService::new(Arc::new(repository), Arc::clone(&authenticator));

        let issued = service
            .login(LoginCommand {
                email: email("a@b.com"),
                password: "secret1".to_string(),
            })
            .await
            .expect("login failed");
        assert!(issued.expires_at > Utc::now());

        let claim = authenticator.validate_token(&issued.access_token).unwrap();
        assert_eq!(claim.identity_id, identity_id.to_string());

        let resolved = service.authenticate(&issued.access_token).await.unwrap();
        assert_eq!(resolved.id, identity_id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut repository = MockTestIdentityRepository::new();
        let authenticator = authenticator();
        let identity = stored_identity(&authenticator, "a@b.com", "secret1");

        repository
            .expect_find_by_email()
            .times(2)
            .returning(move |email| {
                if email.as_str() == "a@b.com" {
                    Ok(Some(identity.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = IdentityService::new(Arc::new(repository), authenticator);

        let wrong_password = service
            .login(LoginCommand {
                email: email("a@b.com"),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginCommand {
                email: email("nouser@b.com"),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password, IdentityError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_storage_unavailable() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("timeout".to_string())));

        let service = IdentityService::new(Arc::new(repository), authenticator());

        let result = service
            .login(LoginCommand {
                email: email("a@b.com"),
                password: "secret1".to_string(),
            })
            .await;
        assert!(matches!(result.unwrap_err(), IdentityError::Storage(_)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage_without_lookup() {
        let mut repository = MockTestIdentityRepository::new();
        repository.expect_find_by_id().times(0);

        let service = IdentityService::new(Arc::new(repository), authenticator());

        assert_eq!(
            service.authenticate("garbage").await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_forged_token() {
        let mut repository = MockTestIdentityRepository::new();
        repository.expect_find_by_id().times(0);

        let forger = TokenService::new(b"another-secret-key-also-32-bytes-long!!", Duration::hours(1));
        let (forged, _) = forger.sign(&SessionClaim::new(IdentityId::new())).unwrap();

        let service = IdentityService::new(Arc::new(repository), authenticator());

        assert_eq!(
            service.authenticate(&forged).await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_expired_token() {
        let mut repository = MockTestIdentityRepository::new();
        repository.expect_find_by_id().times(0);

        let signer = TokenService::new(SECRET, Duration::hours(24));
        let issued_at = Utc::now() - Duration::hours(25);
        let (expired, _) = signer
            .sign_at(&SessionClaim::new(IdentityId::new()), issued_at)
            .unwrap();

        let service = IdentityService::new(Arc::new(repository), authenticator());

        assert_eq!(
            service.authenticate(&expired).await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_non_uuid_subject() {
        let mut repository = MockTestIdentityRepository::new();
        repository.expect_find_by_id().times(0);

        let authenticator = authenticator();
        let issued = authenticator
            .generate_token(&SessionClaim::new("not-a-uuid"))
            .unwrap();

        let service = IdentityService::new(Arc::new(repository), authenticator);

        assert_eq!(
            service.authenticate(&issued.access_token).await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_authenticate_identity_gone() {
        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let authenticator = authenticator();
        let issued = authenticator
            .generate_token(&SessionClaim::new(IdentityId::new()))
            .unwrap();

        let service = IdentityService::new(Arc::new(repository), authenticator);

        assert_eq!(
            service.authenticate(&issued.access_token).await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_authenticate_storage_unavailable() {
        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("timeout".to_string())));

        let authenticator = authenticator();
        let issued = authenticator
            .generate_token(&SessionClaim::new(IdentityId::new()))
            .unwrap();

        let service = IdentityService::new(Arc::new(repository), authenticator);

        assert!(matches!(
            service.authenticate(&issued.access_token).await.unwrap_err(),
            AuthError::Storage(_)
        ));
    }

    #[tokio::test]
    async fn test_get_identity_not_found() {
        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = IdentityService::new(Arc::new(repository), authenticator());

        let result = service.get_identity(&IdentityId::new()).await;
        assert!(matches!(result.unwrap_err(), IdentityError::NotFound(_)));
    }
}
