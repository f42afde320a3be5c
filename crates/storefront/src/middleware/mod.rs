//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first, as layered in `main.rs`)
//!
//! 1. Sentry layers (request hub + transactions)
//! 2. `TraceLayer` (per-request span with status and latency)
//! 3. Session layer (tower-sessions with `SQLite` store)

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use session::create_session_layer;
