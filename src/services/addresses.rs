//! Address book.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::aggregates::{Address, NewAddress},
    error::{Result, StoreError},
    store::AddressStore,
};

#[derive(Clone)]
pub struct AddressBook {
    store: Arc<dyn AddressStore>,
}

impl AddressBook {
    pub fn new(store: Arc<dyn AddressStore>) -> Self {
        Self { store }
    }

    pub async fn add(&self, user: Uuid, new: NewAddress) -> Result<Address> {
        new.validate()?;
        let address = Address::create(user, new);
        self.store.insert_address(&address).await?;
        info!(%user, address_id = %address.id, "address created");
        Ok(address)
    }

    pub async fn list(&self, user: Uuid) -> Result<Vec<Address>> {
        self.store.list_addresses(user).await
    }

    /// Another user's address is reported as missing.
    pub async fn get(&self, user: Uuid, id: Uuid) -> Result<Address> {
        match self.store.get_address(id).await? {
            Some(address) if address.user_id == user => Ok(address),
            _ => Err(StoreError::AddressNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{domain::aggregates::address::fixtures::new_address, store::MemoryStore};

    #[tokio::test]
    async fn addresses_are_scoped_to_their_owner() -> TestResult {
        let book = AddressBook::new(Arc::new(MemoryStore::new()));
        let (ada, bob) = (Uuid::now_v7(), Uuid::now_v7());

        let first = book.add(ada, new_address()).await?;
        let second = book.add(ada, new_address()).await?;

        let listed: Vec<Uuid> = book.list(ada).await?.into_iter().map(|a| a.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);
        assert!(book.list(bob).await?.is_empty());
        assert_eq!(book.get(ada, first.id).await?, first);
        assert!(matches!(book.get(bob, first.id).await, Err(StoreError::AddressNotFound)));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_address_is_rejected() {
        let book = AddressBook::new(Arc::new(MemoryStore::new()));
        let mut new = new_address();
        new.street = String::new();
        let err = book.add(Uuid::now_v7(), new).await.unwrap_err();
        assert_eq!(err.to_string(), "Street is required");
    }
}
