use axum::extract::FromRequest;

use crate::error::StoreError;

/// `Json` whose rejections render like every other API error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(StoreError))]
pub struct Payload<T>(pub T);
