use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{extract::Payload, AdminAccess, CurrentUser};
use crate::{
    domain::aggregates::{NewTicket, TicketStatus},
    error::{Result, StoreError},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    status: String,
}

pub async fn mine(CurrentUser(user): CurrentUser, State(state): State<AppState>) -> Result<Json<Value>> {
    let tickets = state.support.for_user(user).await?;
    Ok(Json(json!({ "success": true, "tickets": tickets })))
}

pub async fn open(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Payload(new): Payload<NewTicket>,
) -> Result<Json<Value>> {
    let ticket = state.support.open(user, new).await?;
    Ok(Json(json!({ "success": true, "message": "Ticket submitted", "ticket": ticket })))
}

pub async fn for_user(
    _: AdminAccess,
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
) -> Result<Json<Value>> {
    let tickets = state.support.for_user(user).await?;
    Ok(Json(json!({ "success": true, "tickets": tickets })))
}

pub async fn set_status(
    _: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(body): Payload<StatusBody>,
) -> Result<Json<Value>> {
    let status: TicketStatus = body.status.parse().map_err(|_| StoreError::InvalidStatus(body.status.clone()))?;
    state.support.set_status(id, status).await?;
    Ok(Json(json!({ "success": true, "message": "Ticket status updated" })))
}

pub async fn remove(_: AdminAccess, State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    state.support.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Ticket deleted" })))
}
