use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::models::AvatarUrl;
use crate::domain::identity::models::DisplayName;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::NewIdentity;
use crate::domain::identity::ports::IdentityRepository;
use crate::identity::errors::RepositoryError;

const EMAIL_UNIQUE_CONSTRAINT: &str = "identities_email_key";

pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    avatar_url: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let name = DisplayName::new(row.name)
            .map_err(|e| RepositoryError::Corrupt(format!("name column: {}", e)))?;
        let email = EmailAddress::new(row.email)
            .map_err(|e| RepositoryError::Corrupt(format!("email column: {}", e)))?;

        Ok(Identity {
            id: IdentityId(row.id),
            name,
            email,
            password_hash: row.password_hash,
            avatar_url: AvatarUrl::from_stored(row.avatar_url),
            created_at: row.created_at,
        })
    }
}

fn unavailable(e: sqlx::Error) -> RepositoryError {
    tracing::error!(error = %e, "Identity store query failed");
    RepositoryError::Unavailable(e.to_string())
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn insert(&self, identity: NewIdentity) -> Result<IdentityId, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO identities (name, email, password_hash, avatar_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(identity.name.as_str())
        .bind(identity.email.as_str())
        .bind(&identity.password_hash)
        .bind(identity.avatar_url.as_str())
        .bind(identity.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
                {
                    return RepositoryError::DuplicateKey(identity.email.to_string());
                }
            }
            unavailable(e)
        })?;

        Ok(IdentityId(id))
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, RepositoryError> {
        sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, name, email, password_hash, avatar_url, created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .map(Identity::try_from)
        .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, RepositoryError> {
        sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, name, email, password_hash, avatar_url, created_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .map(Identity::try_from)
        .transpose()
    }
}
