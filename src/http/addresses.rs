use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{extract::Payload, CurrentUser};
use crate::{domain::aggregates::NewAddress, error::Result, AppState};

#[derive(Debug, Deserialize)]
pub struct AddBody {
    address: NewAddress,
}

pub async fn add(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Payload(body): Payload<AddBody>,
) -> Result<Json<Value>> {
    let address = state.addresses.add(user, body.address).await?;
    Ok(Json(json!({ "success": true, "message": "Address created successfully", "address": address })))
}

pub async fn list(CurrentUser(user): CurrentUser, State(state): State<AppState>) -> Result<Json<Value>> {
    let addresses = state.addresses.list(user).await?;
    Ok(Json(json!({ "success": true, "addresses": addresses })))
}
