//! JSON API.
//!
//! Every body carries `success`. Failures are rendered by
//! [`StoreError`](crate::error::StoreError) as `{ success: false, message }`
//! with a matching status code.

use axum::{
    extract::State,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

mod addresses;
mod auth;
mod cart;
mod catalog;
mod extract;
mod favorites;
mod orders;
mod tickets;

pub use auth::{AdminAccess, CurrentUser, USER_ID_HEADER};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/config/pricing", get(pricing))
        .route("/api/product/list", get(catalog::list))
        .route("/api/product/single", post(catalog::single))
        .route("/api/product/add", post(catalog::add))
        .route("/api/product/stock", post(catalog::stock))
        .route("/api/product/:id", put(catalog::update).delete(catalog::remove))
        .route("/api/cart/get", get(cart::get))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/update", post(cart::update))
        .route("/api/cart/quote", post(cart::quote))
        .route("/api/address/add", post(addresses::add))
        .route("/api/address/get", get(addresses::list))
        .route("/api/order/cod", post(orders::place_cod))
        .route("/api/order/zarinpal", post(orders::place_zarinpal))
        .route("/api/order/userorders", post(orders::for_user))
        .route("/api/order/list", post(orders::all))
        .route("/api/order/status", post(orders::update_status))
        .route("/api/order/:id", delete(orders::remove))
        .route("/api/user/favorites", get(favorites::list))
        .route("/api/user/favorites/:book_id", post(favorites::toggle))
        .route("/api/user/tickets", get(tickets::mine))
        .route("/api/user/ticket", post(tickets::open))
        .route("/api/admin/users/:user_id/tickets", get(tickets::for_user))
        .route(
            "/api/admin/tickets/:ticket_id",
            patch(tickets::set_status).delete(tickets::remove),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "bookstore" }))
}

/// Clients price their preview with this instead of a copy of their own.
async fn pricing(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "currency": &*state.currency,
        "deliveryCharge": state.pricing.delivery_charge(),
        "taxRate": state.pricing.tax_rate(),
    }))
}
