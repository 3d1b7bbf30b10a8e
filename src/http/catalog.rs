use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{extract::Payload, AdminAccess};
use crate::{
    domain::aggregates::{NewProduct, ProductQuery},
    error::Result,
    AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdBody {
    product_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBody {
    id: Uuid,
    in_stock: bool,
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ProductQuery>) -> Result<Json<Value>> {
    let page = state.catalog.list(&query).await?;
    Ok(Json(json!({ "success": true, "products": page.products, "total": page.total })))
}

pub async fn single(State(state): State<AppState>, Payload(body): Payload<ProductIdBody>) -> Result<Json<Value>> {
    let product = state.catalog.get(body.product_id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

pub async fn add(
    _: AdminAccess,
    State(state): State<AppState>,
    Payload(new): Payload<NewProduct>,
) -> Result<Json<Value>> {
    let product = state.catalog.add(new).await?;
    Ok(Json(json!({ "success": true, "message": "Product Added", "product": product })))
}

pub async fn update(
    _: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(edit): Payload<NewProduct>,
) -> Result<Json<Value>> {
    let product = state.catalog.update(id, edit).await?;
    Ok(Json(json!({ "success": true, "message": "Product Updated", "product": product })))
}

pub async fn remove(_: AdminAccess, State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    state.catalog.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Product Removed" })))
}

pub async fn stock(
    _: AdminAccess,
    State(state): State<AppState>,
    Payload(body): Payload<StockBody>,
) -> Result<Json<Value>> {
    let product = state.catalog.set_stock(body.id, body.in_stock).await?;
    Ok(Json(json!({ "success": true, "message": "Stock Updated", "product": product })))
}
