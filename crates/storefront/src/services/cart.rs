//! Cart service.
//!
//! Wraps the cart repository with catalog validation and live totals.
//! Authentication is enforced upstream by the `RequireAuth` extractor;
//! every method takes an already-authenticated user id.

use sqlx::SqlitePool;
use thiserror::Error;

use gamevault_core::{CartLineId, GameId, UserId};

use crate::db::{CartRepository, GameRepository, RepositoryError};
use crate::models::{Cart, CartLine};

/// Largest quantity a single add may request. Keeps line extensions and
/// cart totals far below `i64` overflow no matter what a form posts.
pub const MAX_QUANTITY: i64 = 100;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced game does not exist in the catalog.
    #[error("no such game in the catalog")]
    InvalidProduct,

    /// The requested quantity is outside the accepted range.
    #[error("quantity must be between 1 and {MAX_QUANTITY}")]
    InvalidQuantity,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    games: GameRepository<'a>,
    cart: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            games: GameRepository::new(pool),
            cart: CartRepository::new(pool),
        }
    }

    /// Add a game to the user's cart, merging with any existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidProduct` if the game is not in the catalog.
    /// Returns `CartError::InvalidQuantity` if `quantity` is outside
    /// `1..=MAX_QUANTITY`.
    pub async fn add(&self, user: UserId, game: GameId, quantity: i64) -> Result<(), CartError> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity);
        }

        if !self.games.exists(game).await? {
            return Err(CartError::InvalidProduct);
        }

        self.cart.add(user, game, quantity).await?;
        Ok(())
    }

    /// Remove a cart line by row ID; no-op if it isn't the user's.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the delete fails.
    pub async fn remove_line(&self, user: UserId, line: CartLineId) -> Result<(), CartError> {
        self.cart.remove_line(user, line).await?;
        Ok(())
    }

    /// Remove a game from the user's cart; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the delete fails.
    pub async fn remove_game(&self, user: UserId, game: GameId) -> Result<(), CartError> {
        self.cart.remove_game(user, game).await?;
        Ok(())
    }

    /// The user's cart with a grand total at live catalog prices.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Cart, CartError> {
        let lines = self.cart.list(user).await?;
        let total = lines.iter().map(CartLine::line_total).sum();
        Ok(Cart { lines, total })
    }
}

#[cfg(test)]
mod tests {
    use gamevault_core::{Price, Username};

    use super::*;
    use crate::db::{UserRepository, test_pool};

    async fn seed_user(pool: &SqlitePool) -> UserId {
        UserRepository::new(pool)
            .create(&Username::parse("player_one").expect("valid"), "hash")
            .await
            .expect("user")
            .id
    }

    #[tokio::test]
    async fn test_add_unknown_game_is_invalid_product() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let cart = CartService::new(&pool);

        assert!(matches!(
            cart.add(user, GameId::new(404), 1).await,
            Err(CartError::InvalidProduct)
        ));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let cart = CartService::new(&pool);

        assert!(matches!(
            cart.add(user, GameId::new(1), 0).await,
            Err(CartError::InvalidQuantity)
        ));
        assert!(matches!(
            cart.add(user, GameId::new(1), -3).await,
            Err(CartError::InvalidQuantity)
        ));
    }

    #[tokio::test]
    async fn test_oversized_quantity_rejected_before_totals_overflow() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let game = GameRepository::new(&pool)
            .insert("A", "", Price::from_cents(999), "")
            .await
            .expect("game");
        let cart = CartService::new(&pool);

        // An i64-scale quantity would wrap the line extension; it must
        // never reach the cart.
        assert!(matches!(
            cart.add(user, game, 40_000_000_000_000_000).await,
            Err(CartError::InvalidQuantity)
        ));
        assert!(matches!(
            cart.add(user, game, MAX_QUANTITY + 1).await,
            Err(CartError::InvalidQuantity)
        ));
        assert!(cart.list(user).await.expect("list").is_empty());

        // The cap itself is accepted and totals stay exact.
        cart.add(user, game, MAX_QUANTITY).await.expect("add");
        let view = cart.list(user).await.expect("list");
        assert_eq!(view.total, Price::from_cents(999 * MAX_QUANTITY));
    }

    #[tokio::test]
    async fn test_grand_total_sums_live_line_extensions() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let games = GameRepository::new(&pool);
        let a = games
            .insert("A", "", Price::from_cents(999), "")
            .await
            .expect("game");
        let b = games
            .insert("B", "", Price::from_cents(450), "")
            .await
            .expect("game");
        let cart = CartService::new(&pool);

        cart.add(user, a, 2).await.expect("add");
        cart.add(user, b, 1).await.expect("add");

        let view = cart.list(user).await.expect("list");
        assert_eq!(view.total, Price::from_cents(2448));
        assert!(!view.is_empty());
    }
}
