use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use crate::db::GameRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::{Game, OwnedGame, Purchase, session::CurrentUser};
use crate::services::OrderService;
use crate::state::AppState;

/// How many catalog picks to show on the account overview.
const RECOMMENDED_COUNT: i64 = 6;

#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub user: Option<CurrentUser>,
    pub purchases: Vec<Purchase>,
    pub recommended: Vec<Game>,
}

/// Account overview: recent purchases plus a few catalog picks.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AccountTemplate> {
    let purchases = OrderService::new(state.pool())
        .list_purchases(user.id)
        .await?;
    let recommended = GameRepository::new(state.pool())
        .recommended(RECOMMENDED_COUNT)
        .await?;

    Ok(AccountTemplate {
        user: Some(user),
        purchases,
        recommended,
    })
}

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub user: Option<CurrentUser>,
    pub purchases: Vec<Purchase>,
}

/// Purchase history, most recent first.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate> {
    let purchases = OrderService::new(state.pool())
        .list_purchases(user.id)
        .await?;

    Ok(OrdersTemplate {
        user: Some(user),
        purchases,
    })
}

#[derive(Template, WebTemplate)]
#[template(path = "account/library.html")]
pub struct LibraryTemplate {
    pub user: Option<CurrentUser>,
    pub games: Vec<OwnedGame>,
}

/// The user's library of owned games.
pub async fn library(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<LibraryTemplate> {
    let games = OrderService::new(state.pool())
        .list_entitlements(user.id)
        .await?;

    Ok(LibraryTemplate {
        user: Some(user),
        games,
    })
}
