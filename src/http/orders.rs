use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{extract::Payload, AdminAccess, CurrentUser};
use crate::{
    domain::aggregates::{OrderStatus, PaymentMethod},
    error::{Result, StoreError},
    services::{CheckoutLine, PlaceOrder},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct OrderBody {
    #[serde(default)]
    items: Vec<CheckoutLine>,
    address: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    order_id: Uuid,
    status: String,
}

pub async fn place_cod(
    user: CurrentUser,
    State(state): State<AppState>,
    Payload(body): Payload<OrderBody>,
) -> Result<Json<Value>> {
    place(user, &state, body, PaymentMethod::Cod).await
}

pub async fn place_zarinpal(
    user: CurrentUser,
    State(state): State<AppState>,
    Payload(body): Payload<OrderBody>,
) -> Result<Json<Value>> {
    place(user, &state, body, PaymentMethod::ZarinPal).await
}

async fn place(
    CurrentUser(user): CurrentUser,
    state: &AppState,
    body: OrderBody,
    payment_method: PaymentMethod,
) -> Result<Json<Value>> {
    let request = PlaceOrder { items: body.items, address: body.address, payment_method };
    let order = state.checkout.place_order(user, request).await?;
    Ok(Json(json!({ "success": true, "message": "Order Placed", "order": order })))
}

pub async fn for_user(CurrentUser(user): CurrentUser, State(state): State<AppState>) -> Result<Json<Value>> {
    let orders = state.orders.for_user(user).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn all(_: AdminAccess, State(state): State<AppState>) -> Result<Json<Value>> {
    let orders = state.orders.all().await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn update_status(
    _: AdminAccess,
    State(state): State<AppState>,
    Payload(body): Payload<StatusBody>,
) -> Result<Json<Value>> {
    let status: OrderStatus = body.status.parse().map_err(|_| StoreError::InvalidStatus(body.status.clone()))?;
    let order = state.orders.update_status(body.order_id, status).await?;
    Ok(Json(json!({ "success": true, "message": "Order Status Updated", "order": order })))
}

pub async fn remove(_: AdminAccess, State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    state.orders.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Order Deleted" })))
}
