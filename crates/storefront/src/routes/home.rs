use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use crate::db::games::GameRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::OptionalAuth;
use crate::models::{Game, session::CurrentUser};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub games: Vec<Game>,
}

/// Home page: full catalog, newest first.
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let games = GameRepository::new(state.pool()).list().await?;

    tracing::debug!(count = games.len(), "rendered catalog");

    Ok(HomeTemplate { user, games })
}
