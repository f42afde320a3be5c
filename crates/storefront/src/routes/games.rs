use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;

use gamevault_core::{CommentId, GameId};

use crate::db::{CommentRepository, GameRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::{OptionalAuth, RequireAuth};
use crate::models::{Comment, Game, session::CurrentUser};
use crate::state::AppState;

/// Ratings outside 1..=5 are coerced to a neutral 3 instead of rejected.
const NEUTRAL_RATING: i64 = 3;

fn clamp_rating(rating: i64) -> i64 {
    if (1..=5).contains(&rating) {
        rating
    } else {
        NEUTRAL_RATING
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "games/show.html")]
pub struct GameTemplate {
    pub user: Option<CurrentUser>,
    pub game: Game,
    pub comments: Vec<Comment>,
}

/// Game detail page with its comment thread.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<GameId>,
) -> Result<GameTemplate> {
    let game = GameRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("game".into()))?;
    let comments = CommentRepository::new(state.pool())
        .list_for_game(id)
        .await?;

    Ok(GameTemplate {
        user,
        game,
        comments,
    })
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub rating: i64,
    pub body: String,
}

/// Add a comment to a game.
pub async fn add_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<GameId>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect> {
    let body = form.body.trim();
    if body.is_empty() {
        return Ok(Redirect::to(&format!("/games/{id}")));
    }
    if !GameRepository::new(state.pool()).exists(id).await? {
        return Err(AppError::NotFound("game".into()));
    }

    CommentRepository::new(state.pool())
        .insert(id, user.id, clamp_rating(form.rating), body)
        .await?;

    Ok(Redirect::to(&format!("/games/{id}")))
}

#[derive(Template, WebTemplate)]
#[template(path = "games/edit_comment.html")]
pub struct EditCommentTemplate {
    pub user: Option<CurrentUser>,
    pub comment: Comment,
}

/// Edit form for one of the current user's comments.
pub async fn edit_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CommentId>,
) -> Result<EditCommentTemplate> {
    let comment = CommentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("comment".into()))?;
    if comment.user_id != user.id {
        return Err(crate::db::RepositoryError::Forbidden.into());
    }

    Ok(EditCommentTemplate {
        user: Some(user),
        comment,
    })
}

/// Update a comment; authorship is enforced by the repository.
pub async fn update_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CommentId>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect> {
    let repo = CommentRepository::new(state.pool());
    let comment = repo.get(id).await?.ok_or_else(|| AppError::NotFound("comment".into()))?;
    repo.update(id, user.id, clamp_rating(form.rating), form.body.trim())
        .await?;

    Ok(Redirect::to(&format!("/games/{}", comment.game_id)))
}

/// Delete a comment; authorship is enforced by the repository.
pub async fn delete_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CommentId>,
) -> Result<Redirect> {
    let repo = CommentRepository::new(state.pool());
    let comment = repo.get(id).await?.ok_or_else(|| AppError::NotFound("comment".into()))?;
    repo.delete(id, user.id).await?;

    Ok(Redirect::to(&format!("/games/{}", comment.game_id)))
}

#[cfg(test)]
mod tests {
    use super::clamp_rating;

    #[test]
    fn test_out_of_range_ratings_are_neutral() {
        assert_eq!(clamp_rating(0), 3);
        assert_eq!(clamp_rating(6), 3);
        assert_eq!(clamp_rating(-7), 3);
        assert_eq!(clamp_rating(1), 1);
        assert_eq!(clamp_rating(5), 5);
    }
}
