//! Catalog repository.

use sqlx::SqlitePool;

use gamevault_core::{GameId, Price};

use super::RepositoryError;
use crate::models::Game;

/// Repository for catalog database operations.
pub struct GameRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GameRepository<'a> {
    /// Create a new game repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the full catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Game>, RepositoryError> {
        let games = sqlx::query_as(
            "SELECT id, title, description, price, image_url
             FROM games
             ORDER BY id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(games)
    }

    /// The newest catalog entries, for the account page recommendations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recommended(&self, limit: i64) -> Result<Vec<Game>, RepositoryError> {
        let games = sqlx::query_as(
            "SELECT id, title, description, price, image_url
             FROM games
             ORDER BY id DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(games)
    }

    /// Get a game by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: GameId) -> Result<Option<Game>, RepositoryError> {
        let game = sqlx::query_as(
            "SELECT id, title, description, price, image_url
             FROM games
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(game)
    }

    /// Whether a game exists in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: GameId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM games WHERE id = ?1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Add a game to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        title: &str,
        description: &str,
        price: Price,
        image_url: &str,
    ) -> Result<GameId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO games (title, description, price, image_url)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(image_url)
        .execute(self.pool)
        .await?;
        Ok(GameId::new(result.last_insert_rowid()))
    }

    /// Update a game's catalog price.
    ///
    /// Purchase snapshots are unaffected; only carts see the new price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the game does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_price(&self, id: GameId, price: Price) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE games SET price = ?1 WHERE id = ?2")
            .bind(price)
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_insert_and_get() {
        let pool = test_pool().await;
        let repo = GameRepository::new(&pool);

        let id = repo
            .insert("Star Drifter", "A space sim.", Price::from_cents(999), "/static/sd.png")
            .await
            .expect("insert");

        let game = repo.get(id).await.expect("get").expect("present");
        assert_eq!(game.title, "Star Drifter");
        assert_eq!(game.price, Price::from_cents(999));
        assert!(repo.exists(id).await.expect("exists"));
        assert!(!repo.exists(GameId::new(9999)).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = test_pool().await;
        let repo = GameRepository::new(&pool);

        let first = repo
            .insert("Old", "", Price::from_cents(100), "")
            .await
            .expect("insert");
        let second = repo
            .insert("New", "", Price::from_cents(200), "")
            .await
            .expect("insert");

        let games = repo.list().await.expect("list");
        assert_eq!(
            games.iter().map(|g| g.id).collect::<Vec<_>>(),
            vec![second, first]
        );

        let recs = repo.recommended(1).await.expect("recommended");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, second);
    }

    #[tokio::test]
    async fn test_set_price() {
        let pool = test_pool().await;
        let repo = GameRepository::new(&pool);

        let id = repo
            .insert("Game", "", Price::from_cents(100), "")
            .await
            .expect("insert");
        repo.set_price(id, Price::from_cents(250)).await.expect("update");

        let game = repo.get(id).await.expect("get").expect("present");
        assert_eq!(game.price, Price::from_cents(250));

        assert!(matches!(
            repo.set_price(GameId::new(9999), Price::ZERO).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
