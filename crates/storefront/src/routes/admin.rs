use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use gamevault_core::Price;

use crate::db::GameRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::session::CurrentUser;
use crate::state::AppState;

fn flash_message(code: &str) -> &'static str {
    match code {
        "title" => "A title is required.",
        "price" => "Enter a price like 19.99 (whole cents, not negative).",
        _ => "Something went wrong. Please try again.",
    }
}

#[derive(Debug, Deserialize)]
pub struct NewGameQuery {
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/new_game.html")]
pub struct NewGameTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// Form for adding a game to the catalog.
pub async fn new_game(
    RequireAuth(user): RequireAuth,
    Query(query): Query<NewGameQuery>,
) -> NewGameTemplate {
    NewGameTemplate {
        user: Some(user),
        error: query.error.as_deref().map(flash_message),
    }
}

#[derive(Debug, Deserialize)]
pub struct NewGameForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

/// Create a game and jump to its detail page.
pub async fn create_game(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<NewGameForm>,
) -> Result<Redirect> {
    let title = form.title.trim();
    if title.is_empty() {
        return Ok(Redirect::to("/admin/games/new?error=title"));
    }

    let Ok(price) = form.price.trim().parse::<Price>() else {
        return Ok(Redirect::to("/admin/games/new?error=price"));
    };

    let id = GameRepository::new(state.pool())
        .insert(title, form.description.trim(), price, form.image_url.trim())
        .await?;

    tracing::info!(admin = %user.id, game = %id, %price, "game created");

    Ok(Redirect::to(&format!("/games/{id}")))
}
