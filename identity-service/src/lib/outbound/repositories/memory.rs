use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::NewIdentity;
use crate::domain::identity::ports::IdentityRepository;
use crate::identity::errors::RepositoryError;

/// Process-local identity store.
///
/// Used when no database URL is configured and by the integration tests. The email
/// index is claimed through a map entry before the record is stored, so two
/// concurrent inserts with one email cannot both succeed.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: DashMap<IdentityId, Identity>,
    email_index: DashMap<EmailAddress, IdentityId>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn insert(&self, identity: NewIdentity) -> Result<IdentityId, RepositoryError> {
        let id = IdentityId::new();

        match self.email_index.entry(identity.email.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateKey(identity.email.to_string())),
            Entry::Vacant(slot) => {
                // Store the record before the email entry becomes visible
                self.identities.insert(id, identity.with_id(id));
                slot.insert(id);
                Ok(id)
            }
        }
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.identities.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, RepositoryError> {
        let id = match self.email_index.get(email) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };

        self.find_by_id(&id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::identity::models::AvatarUrl;
    use crate::domain::identity::models::DisplayName;

    fn new_identity(address: &str) -> NewIdentity {
        let email = EmailAddress::new(address.to_string()).unwrap();
        NewIdentity {
            name: DisplayName::new("A".to_string()).unwrap(),
            avatar_url: AvatarUrl::gravatar(&email),
            email,
            password_hash: "$argon2id$hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repository = InMemoryIdentityRepository::new();

        let id = repository.insert(new_identity("a@b.com")).await.unwrap();

        let by_id = repository.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(by_id.email.as_str(), "a@b.com");

        let email = EmailAddress::new("A@B.com".to_string()).unwrap();
        let by_email = repository.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(by_email.id, id);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repository = InMemoryIdentityRepository::new();
        let email = EmailAddress::new("nouser@b.com".to_string()).unwrap();

        assert!(repository.find_by_id(&IdentityId::new()).await.unwrap().is_none());
        assert!(repository.find_by_email(&email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repository = InMemoryIdentityRepository::new();

        repository.insert(new_identity("a@b.com")).await.unwrap();
        let result = repository.insert(new_identity("a@b.com")).await;

        assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_single_winner() {
        let repository = Arc::new(InMemoryIdentityRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.insert(new_identity("a@b.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, RepositoryError::DuplicateKey(_))),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repository.len(), 1);
    }
}
