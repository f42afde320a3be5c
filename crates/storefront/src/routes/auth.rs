use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::session::CurrentUser;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Short error codes carried in the query string, turned into user-facing
/// messages at render time.
fn flash_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid username or password.",
        "taken" => "That username is already taken.",
        "password" => "Password must be at least 8 characters.",
        "username" => "Usernames are 3-32 letters, digits, '_' or '-'.",
        "confirm" => "Passwords do not match.",
        _ => "Something went wrong. Please try again.",
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub error: Option<String>,
    pub registered: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
    pub registered: bool,
}

/// Login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> LoginTemplate {
    LoginTemplate {
        user,
        error: query.error.as_deref().map(flash_message),
        registered: query.registered.is_some(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login action: verify credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Ok(Redirect::to("/auth/login?error=credentials"));
        }
        Err(err) => return Err(err.into()),
    };

    let current = CurrentUser {
        id: user.id,
        username: user.username,
    };
    set_current_user(&session, &current)
        .await
        .map_err(|err| AppError::Internal(format!("session write failed: {err}")))?;

    tracing::info!(user = %current.id, "logged in");

    Ok(Redirect::to("/"))
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// Registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> RegisterTemplate {
    RegisterTemplate {
        user,
        error: query.error.as_deref().map(flash_message),
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Registration action: create the account, then hand off to login.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect> {
    if form.password != form.password_confirm {
        return Ok(Redirect::to("/auth/register?error=confirm"));
    }

    match AuthService::new(state.pool())
        .register(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user = %user.id, "registered");
            Ok(Redirect::to("/auth/login?registered=1"))
        }
        Err(AuthError::UserAlreadyExists) => Ok(Redirect::to("/auth/register?error=taken")),
        Err(AuthError::WeakPassword(_)) => Ok(Redirect::to("/auth/register?error=password")),
        Err(AuthError::InvalidUsername(_)) => Ok(Redirect::to("/auth/register?error=username")),
        Err(err) => Err(err.into()),
    }
}

/// Logout action: clear the session user.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session)
        .await
        .map_err(|err| AppError::Internal(format!("session write failed: {err}")))?;

    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::flash_message;

    #[test]
    fn test_flash_codes_have_messages() {
        for code in ["credentials", "taken", "password", "username", "confirm"] {
            assert!(!flash_message(code).is_empty());
        }
        assert_eq!(
            flash_message("bogus"),
            "Something went wrong. Please try again."
        );
    }
}
