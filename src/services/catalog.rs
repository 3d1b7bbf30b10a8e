//! Catalog service: storefront browsing and admin product management.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        aggregates::{NewProduct, Product, ProductQuery},
        events::ProductEvent,
    },
    error::{Result, StoreError},
    publisher::EventPublisher,
    store::CatalogStore,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Matching products before paging.
    pub total: usize,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    events: EventPublisher,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, events: EventPublisher) -> Self {
        Self { store, events }
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut products: Vec<Product> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        let total = products.len();
        if let Some((offset, limit)) = query.window() {
            products = products.into_iter().skip(offset).take(limit).collect();
        }
        Ok(ProductPage { products, total })
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        self.store.get_product(id).await?.ok_or(StoreError::ProductNotFound)
    }

    /// Current catalog entries for `ids`; missing products are simply absent.
    pub async fn snapshot(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.store.products_by_ids(ids).await
    }

    pub async fn add(&self, new: NewProduct) -> Result<Product> {
        new.validate()?;
        let product = Product::create(new);
        self.store.insert_product(&product).await?;
        info!(product_id = %product.id, name = %product.name, "product added");
        self.events.publish(ProductEvent::Created { product_id: product.id }).await;
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, edit: NewProduct) -> Result<Product> {
        edit.validate()?;
        let mut product = self.get(id).await?;
        product.apply(edit);
        if !self.store.update_product(&product).await? {
            return Err(StoreError::ProductNotFound);
        }
        info!(product_id = %id, "product updated");
        self.events.publish(ProductEvent::Updated { product_id: id }).await;
        Ok(product)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_product(id).await? {
            return Err(StoreError::ProductNotFound);
        }
        info!(product_id = %id, "product deleted");
        self.events.publish(ProductEvent::Deleted { product_id: id }).await;
        Ok(())
    }

    pub async fn set_stock(&self, id: Uuid, in_stock: bool) -> Result<Product> {
        let mut product = self.get(id).await?;
        product.set_stock(in_stock);
        if !self.store.update_product(&product).await? {
            return Err(StoreError::ProductNotFound);
        }
        info!(product_id = %id, in_stock, "stock updated");
        self.events.publish(ProductEvent::StockChanged { product_id: id, in_stock }).await;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::store::MemoryStore;

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            author: "Author".into(),
            description: String::new(),
            category: category.into(),
            price: Decimal::new(15, 0),
            offer_price: Decimal::new(12, 0),
            in_stock: true,
            popular: false,
            images: vec!["https://media.example.com/cover.png".into()],
        }
    }

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::new()), EventPublisher::disabled())
    }

    #[tokio::test]
    async fn list_filters_and_pages() -> TestResult {
        let catalog = service();
        for n in 0..5 {
            catalog.add(new_product(&format!("Rust {n}"), "Academic")).await?;
        }
        catalog.add(new_product("Dune", "Fiction")).await?;

        let page = catalog
            .list(&ProductQuery { search: Some("rust".into()), page: Some(2), per_page: Some(2), ..Default::default() })
            .await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.products.len(), 2);

        let fiction = catalog
            .list(&ProductQuery { category: Some("Fiction".into()), ..Default::default() })
            .await?;
        assert_eq!(fiction.total, 1);
        assert_eq!(fiction.products[0].name, "Dune");
        Ok(())
    }

    #[tokio::test]
    async fn update_and_stock_toggle() -> TestResult {
        let (events, seen) = EventPublisher::recording();
        let catalog = CatalogService::new(Arc::new(MemoryStore::new()), events);
        let product = catalog.add(new_product("Dune", "Fiction")).await?;

        let mut edit = new_product("Dune Messiah", "Fiction");
        edit.offer_price = Decimal::new(9, 0);
        let updated = catalog.update(product.id, edit).await?;
        assert_eq!(updated.offer_price, Decimal::new(9, 0));
        assert_eq!(updated.created_at, product.created_at);

        let out = catalog.set_stock(product.id, false).await?;
        assert!(!out.in_stock);
        assert!(!catalog.get(product.id).await?.in_stock);
        assert_eq!(seen.lock().unwrap().len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn missing_products_are_reported() {
        let catalog = service();
        let id = Uuid::now_v7();
        assert!(matches!(catalog.get(id).await, Err(StoreError::ProductNotFound)));
        assert!(matches!(catalog.delete(id).await, Err(StoreError::ProductNotFound)));
        assert!(matches!(catalog.set_stock(id, true).await, Err(StoreError::ProductNotFound)));
    }

    #[tokio::test]
    async fn snapshot_skips_missing_products() -> TestResult {
        let catalog = service();
        let dune = catalog.add(new_product("Dune", "Fiction")).await?;
        let emma = catalog.add(new_product("Emma", "Fiction")).await?;
        catalog.delete(emma.id).await?;

        let found = catalog.snapshot(&[dune.id, emma.id, Uuid::now_v7()]).await?;
        assert_eq!(found.into_iter().map(|p| p.id).collect::<Vec<_>>(), vec![dune.id]);
        assert!(catalog.snapshot(&[]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_products_are_rejected() {
        let catalog = service();
        let mut bad = new_product("", "Fiction");
        bad.offer_price = Decimal::new(-5, 0);
        assert!(matches!(catalog.add(bad).await, Err(StoreError::Validation(_))));
    }
}
