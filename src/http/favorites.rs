use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::CurrentUser;
use crate::{error::Result, AppState};

pub async fn list(CurrentUser(user): CurrentUser, State(state): State<AppState>) -> Result<Json<Value>> {
    let favorites = state.favorites.list(user).await?;
    Ok(Json(json!({ "success": true, "favorites": favorites })))
}

pub async fn toggle(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let favorite = state.favorites.toggle(user, book_id).await?;
    let message = if favorite { "Added to favorites" } else { "Removed from favorites" };
    Ok(Json(json!({ "success": true, "message": message, "favorite": favorite })))
}
