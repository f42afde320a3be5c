//! Domain models for the storefront.
//!
//! One explicit struct per stored entity or query result; templates render
//! these directly instead of a catch-all page payload.

pub mod session;

use chrono::{DateTime, Utc};

use gamevault_core::{CartLineId, CommentId, GameId, Price, PurchaseId, UserId, Username};

/// A catalog entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub description: String,
    /// Current catalog price. Cart totals use this live value; purchase
    /// totals snapshot it at checkout.
    pub price: Price,
    pub image_url: String,
}

/// A registered customer (domain type).
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}

/// One cart line joined with its catalog entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    /// ID of the cart row itself, for removal forms.
    pub id: CartLineId,
    pub game_id: GameId,
    pub title: String,
    pub price: Price,
    pub image_url: String,
    pub quantity: i64,
}

impl CartLine {
    /// Line extension at current catalog prices.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A user's cart with its live grand total.
#[derive(Debug, Clone)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// An order header. `total` is frozen at checkout time and never
/// recomputed from the catalog.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub total: Price,
    pub created_at: DateTime<Utc>,
    pub paid: bool,
}

/// An immutable order line: price and quantity captured at checkout.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseLine {
    pub game_id: GameId,
    pub title: String,
    pub price: Price,
    pub quantity: i64,
}

/// A library entry: a game the user owns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnedGame {
    pub id: GameId,
    pub title: String,
    pub image_url: String,
}

/// A review on a game's detail page, joined with its author's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub game_id: GameId,
    pub user_id: UserId,
    pub author: String,
    pub rating: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
