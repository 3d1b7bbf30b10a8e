//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A book in the catalog.
///
/// `price` is the list price and is only ever displayed; every cart and order
/// computation uses `offer_price`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub offer_price: Decimal,
    pub in_stock: bool,
    pub popular: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin payload for adding or editing a product.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[validate(custom = "non_negative")]
    pub offer_price: Decimal,
    #[serde(default = "in_stock_by_default")]
    pub in_stock: bool,
    #[serde(default)]
    pub popular: bool,
    /// URLs handed back by the media host.
    #[serde(default)]
    pub images: Vec<String>,
}

fn in_stock_by_default() -> bool {
    true
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Price cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

impl Product {
    pub fn create(new: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: new.name,
            author: new.author,
            description: new.description,
            category: new.category,
            price: new.price,
            offer_price: new.offer_price,
            in_stock: new.in_stock,
            popular: new.popular,
            images: new.images,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field, keeping identity and creation time.
    pub fn apply(&mut self, edit: NewProduct) {
        self.name = edit.name;
        self.author = edit.author;
        self.description = edit.description;
        self.category = edit.category;
        self.price = edit.price;
        self.offer_price = edit.offer_price;
        self.in_stock = edit.in_stock;
        self.popular = edit.popular;
        self.images = edit.images;
        self.touch();
    }

    pub fn set_stock(&mut self, in_stock: bool) {
        self.in_stock = in_stock;
        self.touch();
    }

    /// Unit price used for all cart and order math.
    pub fn unit_price(&self) -> Decimal {
        self.offer_price
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Storefront browse filters.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductQuery {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Case-insensitive substring match on name, author or category, plus an
    /// exact (case-insensitive) category filter.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| product.category.eq_ignore_ascii_case(c));
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&product.name, &product.author, &product.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        };
        category_ok && search_ok
    }

    /// Returns `(offset, limit)` when the caller asked for a page.
    pub fn window(&self) -> Option<(usize, usize)> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let page = self.page.unwrap_or(1).max(1) as usize;
        let per_page = self.per_page.unwrap_or(20).clamp(1, Self::MAX_PER_PAGE) as usize;
        Some(((page - 1).saturating_mul(per_page), per_page))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn book(name: &str, offer_price: Decimal) -> Product {
        Product::create(NewProduct {
            name: name.into(),
            author: "Anonymous".into(),
            description: String::new(),
            category: "Fiction".into(),
            price: offer_price,
            offer_price,
            in_stock: true,
            popular: false,
            images: vec![],
        })
    }
}
