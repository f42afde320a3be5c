use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};

use gamevault_core::PurchaseId;

use crate::db::orders::PaymentOutcome;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::{Cart, Purchase, PurchaseLine, session::CurrentUser};
use crate::services::{CartService, OrderService};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub user: Option<CurrentUser>,
    pub cart: Cart,
}

/// Order review page before the cart is snapshotted.
pub async fn review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<CheckoutTemplate> {
    let cart = CartService::new(state.pool()).list(user.id).await?;

    Ok(CheckoutTemplate {
        user: Some(user),
        cart,
    })
}

/// Snapshot the cart into an unpaid purchase and move to payment.
///
/// An empty cart bounces back to the cart page without creating anything.
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect> {
    let purchase = OrderService::new(state.pool()).checkout(user.id).await?;

    tracing::info!(user = %user.id, purchase = %purchase, "order placed");

    Ok(Redirect::to(&format!("/purchases/{purchase}/pay")))
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/pay.html")]
pub struct PayTemplate {
    pub user: Option<CurrentUser>,
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
}

/// Mock payment page showing the frozen order total.
pub async fn pay_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PurchaseId>,
) -> Result<PayTemplate> {
    let service = OrderService::new(state.pool());
    let purchase = service.get_own_purchase(id, user.id).await?;
    let lines = service.purchase_lines(id).await?;

    Ok(PayTemplate {
        user: Some(user),
        purchase,
        lines,
    })
}

/// Finalize the mock payment and grant library entries.
///
/// Paying an already-paid purchase is a no-op, not an error.
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PurchaseId>,
) -> Result<Redirect> {
    let outcome = OrderService::new(state.pool())
        .finalize_payment(id, user.id)
        .await?;

    match outcome {
        PaymentOutcome::Granted => {
            tracing::info!(user = %user.id, purchase = %id, "payment finalized");
        }
        PaymentOutcome::AlreadyPaid => {
            tracing::debug!(user = %user.id, purchase = %id, "purchase already paid");
        }
    }

    Ok(Redirect::to("/account/library"))
}
