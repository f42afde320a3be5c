//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog)
//! GET  /health                 - Health check
//!
//! # Games
//! GET  /games/{id}             - Game detail with comments
//! POST /games/{id}/comments    - Add a comment
//! GET  /comments/{id}/edit     - Edit comment form
//! POST /comments/{id}          - Update a comment
//! POST /comments/{id}/delete   - Delete a comment
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (merge-increment)
//! POST /cart/remove            - Remove a line
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Order review
//! POST /checkout               - Snapshot cart into a purchase
//! GET  /purchases/{id}/pay     - Mock payment page
//! POST /purchases/{id}/pay     - Finalize payment, grant library entries
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! GET  /account/orders         - Purchase history
//! GET  /account/library        - Owned games
//!
//! # Admin (requires auth; no further roles in scope)
//! GET  /admin/games/new        - Add game form
//! POST /admin/games            - Create a game
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod games;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the game and comment routes router.
pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/games/{id}", get(games::show))
        .route("/games/{id}/comments", post(games::add_comment))
        .route("/comments/{id}/edit", get(games::edit_comment))
        .route("/comments/{id}", post(games::update_comment))
        .route("/comments/{id}/delete", post(games::delete_comment))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/library", get(account::library))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/games/new", get(admin::new_game))
        .route("/games", post(admin::create_game))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Game detail and comments
        .merge(game_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout and payment
        .route(
            "/checkout",
            get(checkout::review).post(checkout::place_order),
        )
        .route(
            "/purchases/{id}/pay",
            get(checkout::pay_page).post(checkout::pay),
        )
        // Account routes
        .nest("/account", account_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin routes
        .nest("/admin", admin_routes())
}
