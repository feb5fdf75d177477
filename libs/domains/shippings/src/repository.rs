use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ShippingError, ShippingResult};
use crate::models::{CreateShippingAddress, ShippingAddress, UpdateShippingAddress};

/// Repository trait for ShippingAddress persistence. All lookups are
/// scoped to the owning user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShippingRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        input: CreateShippingAddress,
    ) -> ShippingResult<ShippingAddress>;

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> ShippingResult<Option<ShippingAddress>>;

    /// The user's addresses, newest first
    async fn list_by_user(&self, user_id: Uuid) -> ShippingResult<Vec<ShippingAddress>>;

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateShippingAddress,
    ) -> ShippingResult<ShippingAddress>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> ShippingResult<ShippingAddress>;
}

/// In-memory implementation of ShippingRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryShippingRepository {
    addresses: Arc<RwLock<HashMap<Uuid, ShippingAddress>>>,
}

impl InMemoryShippingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShippingRepository for InMemoryShippingRepository {
    async fn create(
        &self,
        user_id: Uuid,
        input: CreateShippingAddress,
    ) -> ShippingResult<ShippingAddress> {
        let mut addresses = self.addresses.write().await;

        let address = ShippingAddress::new(user_id, input);
        addresses.insert(address.id, address.clone());

        tracing::info!(address_id = %address.id, user_id = %user_id, "Created shipping address");
        Ok(address)
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> ShippingResult<Option<ShippingAddress>> {
        let addresses = self.addresses.read().await;
        Ok(addresses
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> ShippingResult<Vec<ShippingAddress>> {
        let addresses = self.addresses.read().await;
        let mut result: Vec<ShippingAddress> = addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateShippingAddress,
    ) -> ShippingResult<ShippingAddress> {
        let mut addresses = self.addresses.write().await;

        let address = addresses
            .get_mut(&id)
            .filter(|a| a.user_id == user_id)
            .ok_or(ShippingError::NotFound)?;
        address.apply_update(input);
        Ok(address.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> ShippingResult<ShippingAddress> {
        let mut addresses = self.addresses.write().await;

        let owned = addresses
            .get(&id)
            .map(|a| a.user_id == user_id)
            .unwrap_or(false);
        if !owned {
            return Err(ShippingError::NotFound);
        }

        addresses.remove(&id).ok_or(ShippingError::NotFound)
    }
}
