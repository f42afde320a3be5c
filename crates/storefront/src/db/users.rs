//! Customer repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use gamevault_core::{UserId, Username};

use super::RepositoryError;
use crate::models::User;

/// Raw customer row, mapped into the domain [`User`] after validation.
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    username: String,
    created_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        Ok(User {
            id: UserId::new(self.id),
            username,
            created_at: self.created_at,
        })
    }
}

/// Repository for customer database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT id, username, created_at
             FROM customers
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CustomerRow::into_user).transpose()
    }

    /// Get a user and their password hash by username, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<(i64, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at
             FROM customers
             WHERE username = ?1",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((id, username, password_hash, created_at)) => {
                let user = CustomerRow {
                    id,
                    username,
                    created_at,
                }
                .into_user()?;
                Ok(Some((user, password_hash)))
            }
            None => Ok(None),
        }
    }

    /// Create a new user with a username and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO customers (username, password_hash, created_at)
             VALUES (?1, ?2, ?3)",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(created_at)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            username: username.clone(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::parse("player_one").expect("valid");

        let user = repo.create(&name, "hash").await.expect("create");
        assert_eq!(user.username, name);

        let found = repo.get_by_id(user.id).await.expect("query").expect("present");
        assert_eq!(found.id, user.id);

        let (by_name, hash) = repo
            .get_with_password_hash(&name)
            .await
            .expect("query")
            .expect("present");
        assert_eq!(by_name.id, user.id);
        assert_eq!(hash, "hash");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::parse("player_one").expect("valid");

        repo.create(&name, "hash").await.expect("create");
        assert!(matches!(
            repo.create(&name, "other").await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        assert!(repo.get_by_id(UserId::new(1)).await.expect("query").is_none());
        let name = Username::parse("missing").expect("valid");
        assert!(
            repo.get_with_password_hash(&name)
                .await
                .expect("query")
                .is_none()
        );
    }
}
