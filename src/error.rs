//! Error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::{
    aggregates::{OrderError, PaymentMethod},
    pricing::PricingError,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Address not found")]
    AddressNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Please Enter Your Address")]
    MissingAddress,

    #[error("Please add product first")]
    EmptyOrder,

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{} is currently under maintenance.", gateway_name(.0))]
    PaymentUnavailable(PaymentMethod),

    #[error("{}", first_message(.0))]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    MalformedRequest(String),

    #[error("Not Authorized. Login Again")]
    Unauthenticated,

    #[error("Not Authorized")]
    Forbidden,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProductNotFound
            | Self::OrderNotFound
            | Self::AddressNotFound
            | Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::MissingAddress
            | Self::EmptyOrder
            | Self::InvalidQuantity
            | Self::InvalidStatus(_)
            | Self::Validation(_)
            | Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::OutOfStock(_) | Self::Order(_) => StatusCode::CONFLICT,
            Self::PaymentUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Pricing(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() && !matches!(self, Self::PaymentUnavailable(_)) {
            error!(error = %self, "request failed");
            "Something went wrong, please try again".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<JsonRejection> for StoreError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

fn gateway_name(method: &PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::ZarinPal => "Zarinpal",
        PaymentMethod::Cod => "Cash on delivery",
    }
}

/// The first field message, picked in field-name order so responses are stable.
fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
        .map(|(field, e)| match &e.message {
            Some(msg) => msg.to_string(),
            None => format!("Invalid {field}"),
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}
