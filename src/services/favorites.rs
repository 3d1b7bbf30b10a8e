//! Favorite books.

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::aggregates::Product,
    error::{Result, StoreError},
    store::{CatalogStore, FavoriteStore},
};

#[derive(Clone)]
pub struct Favorites {
    favorites: Arc<dyn FavoriteStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl Favorites {
    pub fn new(favorites: Arc<dyn FavoriteStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { favorites, catalog }
    }

    /// Returns whether the product is a favorite after the toggle.
    pub async fn toggle(&self, user: Uuid, product: Uuid) -> Result<bool> {
        if self.catalog.get_product(product).await?.is_none() {
            return Err(StoreError::ProductNotFound);
        }
        self.favorites.toggle_favorite(user, product).await
    }

    pub async fn list(&self, user: Uuid) -> Result<Vec<Product>> {
        self.favorites.favorite_products(user).await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{domain::aggregates::product::fixtures::book, store::MemoryStore};

    #[tokio::test]
    async fn toggle_adds_then_removes() -> TestResult {
        let store = MemoryStore::new();
        let dune = book("Dune", Decimal::TEN);
        let emma = book("Emma", Decimal::TEN);
        store.insert_product(&dune).await?;
        store.insert_product(&emma).await?;
        let favorites = Favorites::new(Arc::new(store.clone()), Arc::new(store));
        let user = Uuid::now_v7();

        assert!(favorites.toggle(user, dune.id).await?);
        assert!(favorites.toggle(user, emma.id).await?);
        let names: Vec<String> = favorites.list(user).await?.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Emma", "Dune"]);

        assert!(!favorites.toggle(user, dune.id).await?);
        assert_eq!(favorites.list(user).await?.len(), 1);

        let missing = favorites.toggle(user, Uuid::now_v7()).await;
        assert!(matches!(missing, Err(StoreError::ProductNotFound)));
        Ok(())
    }
}
