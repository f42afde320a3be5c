//! Order service.
//!
//! Thin mapping from the order ledger repository onto the storefront's
//! operation contracts: checkout, payment finalization, and the purchase
//! and library views.

use sqlx::SqlitePool;
use thiserror::Error;

use gamevault_core::{PurchaseId, UserId};

use crate::db::orders::PaymentOutcome;
use crate::db::{OrderRepository, RepositoryError};
use crate::models::{OwnedGame, Purchase, PurchaseLine};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The referenced purchase does not exist.
    #[error("purchase not found")]
    NotFound,

    /// The purchase belongs to a different user.
    #[error("purchase belongs to another user")]
    Forbidden,

    /// Storage-level failure; the operation was fully rolled back.
    #[error("storage failure: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Forbidden => Self::Forbidden,
            other => Self::Storage(other),
        }
    }
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Snapshot the user's cart into a new unpaid purchase.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if there is nothing to buy; no
    /// purchase is created. Returns `OrderError::Storage` on database
    /// failure; the transaction is fully rolled back.
    pub async fn checkout(&self, user: UserId) -> Result<PurchaseId, OrderError> {
        self.orders
            .checkout(user)
            .await?
            .ok_or(OrderError::EmptyCart)
    }

    /// Mark a purchase paid and grant its entitlements, idempotently.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the purchase does not exist,
    /// `OrderError::Forbidden` if it belongs to another user, and
    /// `OrderError::Storage` on database failure.
    pub async fn finalize_payment(
        &self,
        purchase: PurchaseId,
        user: UserId,
    ) -> Result<PaymentOutcome, OrderError> {
        Ok(self.orders.finalize_payment(purchase, user).await?)
    }

    /// Load a purchase the user owns, for the payment page.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` / `OrderError::Forbidden` like
    /// [`Self::finalize_payment`].
    pub async fn get_own_purchase(
        &self,
        purchase: PurchaseId,
        user: UserId,
    ) -> Result<Purchase, OrderError> {
        let purchase = self.orders.get(purchase).await?.ok_or(OrderError::NotFound)?;
        if purchase.user_id != user {
            return Err(OrderError::Forbidden);
        }
        Ok(purchase)
    }

    /// The user's purchases, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the query fails.
    pub async fn list_purchases(&self, user: UserId) -> Result<Vec<Purchase>, OrderError> {
        Ok(self.orders.list_for_user(user).await?)
    }

    /// The immutable lines of a purchase.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the query fails.
    pub async fn purchase_lines(
        &self,
        purchase: PurchaseId,
    ) -> Result<Vec<PurchaseLine>, OrderError> {
        Ok(self.orders.lines(purchase).await?)
    }

    /// The user's library of owned games.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the query fails.
    pub async fn list_entitlements(&self, user: UserId) -> Result<Vec<OwnedGame>, OrderError> {
        Ok(self.orders.list_owned(user).await?)
    }
}
