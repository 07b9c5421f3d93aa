//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use violet_pages_core::UserId;

use super::RepositoryError;
use crate::models::{GoogleIdentity, User, UserUpdate};

const USER_COLUMNS: &str = "id, google_subject, email, name, image, description, setup_completed, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    google_subject: String,
    email: String,
    name: Option<String>,
    image: Option<String>,
    description: Option<String>,
    setup_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            google_subject: r.google_subject,
            email: r.email,
            name: r.name,
            image: r.image,
            description: r.description,
            setup_completed: r.setup_completed,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Find or create the user for a Google identity.
    ///
    /// A returning user only has their email refreshed; name, image and
    /// description are theirs to edit and are never overwritten here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_google(&self, identity: &GoogleIdentity) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (google_subject, email, name, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (google_subject)
            DO UPDATE SET email = EXCLUDED.email, updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&identity.subject)
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(&identity.picture)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                image = COALESCE($3, image),
                description = COALESCE($4, description),
                setup_completed = COALESCE($5, setup_completed),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.name.as_ref().map(|n| n.as_str()))
        .bind(&update.image)
        .bind(&update.description)
        .bind(update.setup_completed)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a user. Lists, their membership edges and searches cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
