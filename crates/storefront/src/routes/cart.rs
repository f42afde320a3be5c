use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;

use gamevault_core::{CartLineId, GameId};

use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::{Cart, session::CurrentUser};
use crate::services::CartService;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub user: Option<CurrentUser>,
    pub cart: Cart,
}

/// Cart page: lines priced live from the catalog.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<CartTemplate> {
    let cart = CartService::new(state.pool()).list(user.id).await?;

    Ok(CartTemplate {
        user: Some(user),
        cart,
    })
}

#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub game_id: GameId,
    pub quantity: Option<i64>,
}

/// Add a game to the cart, merging into an existing line.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddForm>,
) -> Result<Redirect> {
    let quantity = form.quantity.unwrap_or(1);
    CartService::new(state.pool())
        .add(user.id, form.game_id, quantity)
        .await?;

    tracing::debug!(user = %user.id, game = %form.game_id, quantity, "added to cart");

    Ok(Redirect::to("/cart"))
}

/// Removal accepts either a specific line or a game; removing a game
/// clears every matching line.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub line_id: Option<CartLineId>,
    pub game_id: Option<GameId>,
}

/// Remove a line (or all lines for a game) from the cart.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveForm>,
) -> Result<Redirect> {
    let service = CartService::new(state.pool());
    if let Some(line) = form.line_id {
        service.remove_line(user.id, line).await?;
    } else if let Some(game) = form.game_id {
        service.remove_game(user.id, game).await?;
    }

    Ok(Redirect::to("/cart"))
}
