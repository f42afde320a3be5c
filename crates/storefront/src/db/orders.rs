//! Order ledger repository: checkout, payment finalization, and the
//! read-only purchase/library views.
//!
//! Checkout and finalization are the two transactional boundaries of the
//! storefront. Each runs in a single transaction and either fully applies
//! or fully reverts; `SQLite`'s writer serialization plus the in-transaction
//! ownership/paid checks make retried payment confirmations idempotent.

use chrono::Utc;
use sqlx::SqlitePool;

use gamevault_core::{GameId, Price, PurchaseId, UserId};

use super::RepositoryError;
use crate::models::{OwnedGame, Purchase, PurchaseLine};

/// Result of a payment finalization that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The purchase was marked paid and entitlements were granted.
    Granted,
    /// The purchase was already paid; nothing changed.
    AlreadyPaid,
}

/// Repository for the order ledger.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Snapshot the user's cart into a new unpaid purchase.
    ///
    /// In one transaction: read the cart joined with current catalog
    /// prices, insert the purchase header with the summed total, insert
    /// one line per cart row capturing price and quantity at this
    /// instant, and clear the cart. Returns `None` without writing
    /// anything if the cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back and no partial purchase or partially
    /// cleared cart is observable.
    pub async fn checkout(&self, user: UserId) -> Result<Option<PurchaseId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines: Vec<(GameId, Price, i64)> = sqlx::query_as(
            "SELECT c.game_id, g.price, c.quantity
             FROM cart_items c
             JOIN games g ON g.id = c.game_id
             WHERE c.user_id = ?1
             ORDER BY c.id",
        )
        .bind(user)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            tx.rollback().await?;
            return Ok(None);
        }

        let total: Price = lines.iter().map(|(_, price, qty)| price.times(*qty)).sum();

        let purchase_id = sqlx::query(
            "INSERT INTO purchases (user_id, total, paid, created_at)
             VALUES (?1, ?2, 0, ?3)",
        )
        .bind(user)
        .bind(total)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (game, price, quantity) in &lines {
            sqlx::query(
                "INSERT INTO purchase_items (purchase_id, game_id, price, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(purchase_id)
            .bind(game)
            .bind(price)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(PurchaseId::new(purchase_id)))
    }

    /// Mark a purchase paid and grant library entitlements for its lines.
    ///
    /// The ownership check, paid check, state transition, and entitlement
    /// grants all happen inside one transaction. An already-paid purchase
    /// returns [`PaymentOutcome::AlreadyPaid`] without re-granting, so a
    /// retried payment confirmation is harmless. Entitlements the user
    /// already holds from other purchases are skipped, not duplicated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the purchase does not exist.
    /// Returns `RepositoryError::Forbidden` if it belongs to another user.
    /// Returns `RepositoryError::Database` if a statement fails; nothing
    /// is applied in that case.
    pub async fn finalize_payment(
        &self,
        purchase: PurchaseId,
        user: UserId,
    ) -> Result<PaymentOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(UserId, bool)> =
            sqlx::query_as("SELECT user_id, paid FROM purchases WHERE id = ?1")
                .bind(purchase)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((owner, paid)) = row else {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        };

        if owner != user {
            tx.rollback().await?;
            return Err(RepositoryError::Forbidden);
        }

        if paid {
            tx.rollback().await?;
            return Ok(PaymentOutcome::AlreadyPaid);
        }

        sqlx::query("UPDATE purchases SET paid = 1 WHERE id = ?1")
            .bind(purchase)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO user_games (user_id, game_id)
             SELECT ?1, game_id FROM purchase_items WHERE purchase_id = ?2
             ON CONFLICT(user_id, game_id) DO NOTHING",
        )
        .bind(user)
        .bind(purchase)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PaymentOutcome::Granted)
    }

    /// Get a purchase header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, purchase: PurchaseId) -> Result<Option<Purchase>, RepositoryError> {
        let purchase = sqlx::query_as(
            "SELECT id, user_id, total, created_at, paid
             FROM purchases
             WHERE id = ?1",
        )
        .bind(purchase)
        .fetch_optional(self.pool)
        .await?;
        Ok(purchase)
    }

    /// List a user's purchases, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Purchase>, RepositoryError> {
        let purchases = sqlx::query_as(
            "SELECT id, user_id, total, created_at, paid
             FROM purchases
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;
        Ok(purchases)
    }

    /// The immutable lines of a purchase, with their snapshot prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, purchase: PurchaseId) -> Result<Vec<PurchaseLine>, RepositoryError> {
        let lines = sqlx::query_as(
            "SELECT p.game_id, g.title, p.price, p.quantity
             FROM purchase_items p
             JOIN games g ON g.id = p.game_id
             WHERE p.purchase_id = ?1
             ORDER BY p.id",
        )
        .bind(purchase)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    /// The games a user owns, via paid purchases.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_owned(&self, user: UserId) -> Result<Vec<OwnedGame>, RepositoryError> {
        let games = sqlx::query_as(
            "SELECT g.id, g.title, g.image_url
             FROM user_games ug
             JOIN games g ON g.id = ug.game_id
             WHERE ug.user_id = ?1
             ORDER BY ug.id",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use gamevault_core::Username;

    use super::*;
    use crate::db::{CartRepository, GameRepository, UserRepository, test_pool};

    async fn seed_user(pool: &SqlitePool, name: &str) -> UserId {
        UserRepository::new(pool)
            .create(&Username::parse(name).expect("valid"), "hash")
            .await
            .expect("create user")
            .id
    }

    async fn seed_game(pool: &SqlitePool, title: &str, cents: i64) -> GameId {
        GameRepository::new(pool)
            .insert(title, "", Price::from_cents(cents), "")
            .await
            .expect("create game")
    }

    #[tokio::test]
    async fn test_empty_cart_creates_nothing() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let orders = OrderRepository::new(&pool);

        assert!(orders.checkout(user).await.expect("checkout").is_none());
        assert!(orders.list_for_user(user).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_checkout_snapshots_and_clears_cart() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let a = seed_game(&pool, "Star Drifter", 999).await;
        let b = seed_game(&pool, "Dungeon Loop", 450).await;
        let cart = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);

        cart.add(user, a, 2).await.expect("add");
        cart.add(user, b, 1).await.expect("add");

        let id = orders
            .checkout(user)
            .await
            .expect("checkout")
            .expect("non-empty");

        let purchase = orders.get(id).await.expect("get").expect("present");
        assert_eq!(purchase.total, Price::from_cents(2448));
        assert!(!purchase.paid);
        assert!(cart.list(user).await.expect("list").is_empty());

        let lines = orders.lines(id).await.expect("lines");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].price, Price::from_cents(999));
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_purchase_total_is_frozen_against_price_changes() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let game = seed_game(&pool, "Star Drifter", 999).await;
        let cart = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);

        cart.add(user, game, 1).await.expect("add");
        let id = orders
            .checkout(user)
            .await
            .expect("checkout")
            .expect("non-empty");

        GameRepository::new(&pool)
            .set_price(game, Price::from_cents(1999))
            .await
            .expect("price change");

        let purchase = orders.get(id).await.expect("get").expect("present");
        assert_eq!(purchase.total, Price::from_cents(999));
        let lines = orders.lines(id).await.expect("lines");
        assert_eq!(lines[0].price, Price::from_cents(999));
    }

    #[tokio::test]
    async fn test_finalize_grants_once_and_is_idempotent() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let a = seed_game(&pool, "Star Drifter", 999).await;
        let b = seed_game(&pool, "Dungeon Loop", 450).await;
        let cart = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);

        cart.add(user, a, 2).await.expect("add");
        cart.add(user, b, 1).await.expect("add");
        let id = orders
            .checkout(user)
            .await
            .expect("checkout")
            .expect("non-empty");

        let first = orders.finalize_payment(id, user).await.expect("finalize");
        assert_eq!(first, PaymentOutcome::Granted);

        // A retried confirmation succeeds without re-granting.
        let second = orders.finalize_payment(id, user).await.expect("retry");
        assert_eq!(second, PaymentOutcome::AlreadyPaid);

        let purchase = orders.get(id).await.expect("get").expect("present");
        assert!(purchase.paid);

        let owned = orders.list_owned(user).await.expect("owned");
        assert_eq!(owned.len(), 2, "one entitlement per line, not two");
    }

    #[tokio::test]
    async fn test_finalize_by_non_owner_is_forbidden() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "player_one").await;
        let intruder = seed_user(&pool, "player_two").await;
        let game = seed_game(&pool, "Star Drifter", 999).await;
        let cart = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);

        cart.add(owner, game, 1).await.expect("add");
        let id = orders
            .checkout(owner)
            .await
            .expect("checkout")
            .expect("non-empty");

        assert!(matches!(
            orders.finalize_payment(id, intruder).await,
            Err(RepositoryError::Forbidden)
        ));

        // No state change: still unpaid, no entitlements anywhere.
        let purchase = orders.get(id).await.expect("get").expect("present");
        assert!(!purchase.paid);
        assert!(orders.list_owned(owner).await.expect("owned").is_empty());
        assert!(orders.list_owned(intruder).await.expect("owned").is_empty());
    }

    #[tokio::test]
    async fn test_finalize_unknown_purchase_is_not_found() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let orders = OrderRepository::new(&pool);

        assert!(matches!(
            orders.finalize_payment(PurchaseId::new(42), user).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_owning_twice_does_not_duplicate() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let game = seed_game(&pool, "Star Drifter", 999).await;
        let cart = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);

        for _ in 0..2 {
            cart.add(user, game, 1).await.expect("add");
            let id = orders
                .checkout(user)
                .await
                .expect("checkout")
                .expect("non-empty");
            orders.finalize_payment(id, user).await.expect("finalize");
        }

        let owned = orders.list_owned(user).await.expect("owned");
        assert_eq!(owned.len(), 1, "second purchase of the same game is a no-op grant");
    }

    #[tokio::test]
    async fn test_purchases_listed_newest_first() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "player_one").await;
        let game = seed_game(&pool, "Star Drifter", 999).await;
        let cart = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);

        let mut ids = Vec::new();
        for _ in 0..3 {
            cart.add(user, game, 1).await.expect("add");
            ids.push(
                orders
                    .checkout(user)
                    .await
                    .expect("checkout")
                    .expect("non-empty"),
            );
        }

        let listed: Vec<PurchaseId> = orders
            .list_for_user(user)
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }
}
