//! Address Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Shipping destination. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Zipcode is required"))]
    pub zipcode: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

impl Address {
    pub fn create(user_id: Uuid, new: NewAddress) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone.trim().to_string(),
            street: new.street.trim().to_string(),
            city: new.city.trim().to_string(),
            state: new.state.trim().to_string(),
            zipcode: new.zipcode.trim().to_string(),
            country: new.country.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// One-line rendering used on order summaries.
    pub fn one_line(&self) -> String {
        format!("{}, {}, {}, {}", self.street, self.city, self.state, self.country)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::new_address;
    use super::*;

    #[test]
    fn test_new_address_validation() {
        assert!(new_address().validate().is_ok());
        let mut bad = new_address();
        bad.email = "not-an-email".into();
        bad.city = String::new();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("city"));
    }

    #[test]
    fn test_one_line() {
        let a = Address::create(Uuid::now_v7(), new_address());
        assert_eq!(a.one_line(), "12 St James's Square, London, Greater London, UK");
    }
}
