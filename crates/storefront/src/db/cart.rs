//! Cart line repository.
//!
//! One row per (user, game); adds merge into the existing row via an
//! atomic upsert so concurrent adds never lose an increment. All mutations
//! are scoped by `user_id` in the WHERE clause - a user can only ever
//! touch their own lines.

use sqlx::SqlitePool;

use gamevault_core::{CartLineId, GameId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `quantity` of a game to the user's cart.
    ///
    /// Upserts in a single statement: an existing line is incremented, a
    /// missing one inserted. No application-side read-modify-write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(
        &self,
        user: UserId,
        game: GameId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_items (user_id, game_id, quantity)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, game_id)
             DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(user)
        .bind(game)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a cart line by its row ID, scoped to the owning user.
    ///
    /// No-op if the line does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_line(
        &self,
        user: UserId,
        line: CartLineId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE id = ?1 AND user_id = ?2")
            .bind(line)
            .bind(user)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Remove a game from the user's cart, whatever its quantity.
    ///
    /// No-op if the game is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_game(&self, user: UserId, game: GameId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND game_id = ?2")
            .bind(user)
            .bind(game)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// List the user's cart lines joined with the catalog, oldest first.
    ///
    /// Prices here are the live catalog prices, not snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as(
            "SELECT c.id, c.game_id, g.title, g.price, g.image_url, c.quantity
             FROM cart_items c
             JOIN games g ON g.id = c.game_id
             WHERE c.user_id = ?1
             ORDER BY c.id",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }
}
