use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{extract::Payload, CurrentUser};
use crate::{domain::aggregates::Cart, error::Result, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBody {
    item_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    item_id: Uuid,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBody {
    #[serde(default)]
    cart_data: Cart,
}

pub async fn get(CurrentUser(user): CurrentUser, State(state): State<AppState>) -> Result<Json<Value>> {
    let summary = state.carts.summary(user).await?;
    Ok(Json(json!({
        "success": true,
        "cartData": summary.cart_data,
        "itemCount": summary.item_count,
        "totals": summary.totals,
    })))
}

pub async fn add(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Payload(body): Payload<AddBody>,
) -> Result<Json<Value>> {
    let cart = state.carts.add_to_cart(user, body.item_id).await?;
    Ok(Json(json!({ "success": true, "message": "Added To Cart", "cartData": cart })))
}

pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Payload(body): Payload<UpdateBody>,
) -> Result<Json<Value>> {
    let cart = state.carts.update_quantity(user, body.item_id, body.quantity).await?;
    Ok(Json(json!({ "success": true, "message": "Cart Updated", "cartData": cart })))
}

/// Prices a cart the client holds, signed in or not.
pub async fn quote(State(state): State<AppState>, Payload(body): Payload<QuoteBody>) -> Result<Json<Value>> {
    let totals = state.carts.quote(&body.cart_data).await?;
    Ok(Json(json!({ "success": true, "itemCount": body.cart_data.item_count(), "totals": totals })))
}
